// Provider module - the yt-dlp boundary
//
// Options are typed until this point and become command-line flags here.

mod cli;
pub mod diagnostics;
mod options;

pub use cli::YtDlpCli;
pub use diagnostics::{classify, FailureKind};
pub use options::{PlaylistMode, ProviderOptions};
