// Helper functions for provider implementations

use std::process::{Output, Stdio};

use tokio::process::Command as TokioCommand;

use super::errors::GatewayError;

/// Run a command to completion, capturing stdout and stderr.
///
/// No timeout: long transfers hold the request until the provider returns.
/// The child is killed if the calling future is dropped.
pub async fn run_output(program: &str, args: &[String]) -> Result<Output, GatewayError> {
    let child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| GatewayError::Upstream(format!("Failed to start {}: {}", program, e)))?;

    Ok(child.wait_with_output().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_upstream_error() {
        let err = run_output("definitely-not-a-real-binary-xyz", &[])
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to start definitely-not-a-real-binary-xyz"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout() {
        let out = run_output("echo", &["hello".to_string()]).await.unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hello");
    }
}
