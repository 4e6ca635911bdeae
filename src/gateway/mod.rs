// Gateway core - decides what to do with the provider's output

pub mod direct_link;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod playlist;
pub mod provider;
pub mod traits;
pub mod utils;

pub use direct_link::DirectLink;
pub use errors::{ErrorKind, GatewayError};
pub use format_selector::{FormatSelector, Selection};
pub use models::{FormatDescriptor, FormatSummary, MediaMetadata, PlaylistEntry, ResolutionIntent};
pub use orchestrator::{DownloadOrchestrator, StoredMedia};
pub use playlist::PlaylistCurator;
pub use provider::{ProviderOptions, YtDlpCli};
pub use traits::MediaProvider;
