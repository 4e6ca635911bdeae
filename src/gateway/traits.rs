// Media provider trait definition

use async_trait::async_trait;

use super::errors::GatewayError;
use super::provider::ProviderOptions;

/// External extraction engine the gateway delegates to
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Name of the provider (for logging)
    fn name(&self) -> &'static str;

    /// Resolve metadata for a URL without transferring media.
    ///
    /// Returns the provider's raw metadata document so `/info` can pass it
    /// through untouched.
    async fn resolve(
        &self,
        url: &str,
        options: &ProviderOptions,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Transfer media to `options.destination` using `options.format`
    async fn download(&self, url: &str, options: &ProviderOptions) -> Result<(), GatewayError>;
}
