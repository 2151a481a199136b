use crate::domain::transport::{HttpProber, TransportError, TransportResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Camera status probe; every request leaves through the named interface
/// since all cameras answer on the same address
#[derive(Debug, Default)]
pub struct ReqwestProber;

impl ReqwestProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HttpProber for ReqwestProber {
    async fn probe(&self, interface: &str, url: &str, timeout: Duration) -> TransportResult<u16> {
        let builder = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .no_proxy();
        #[cfg(target_os = "linux")]
        let builder = builder.interface(interface);

        let client = builder
            .build()
            .map_err(|e| TransportError::Failed(format!("http client: {}", e)))?;

        debug!("GET {} via {}", url, interface);
        match client.get(url).send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) if e.is_builder() => Err(TransportError::InvalidInput(e.to_string())),
            Err(e) if e.is_timeout() => Err(TransportError::TimedOut(timeout)),
            Err(e) => Err(TransportError::Failed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_url_is_invalid_input() {
        let err = ReqwestProber::new()
            .probe("lo", "not a url", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_closed_port_is_an_error() {
        let result = ReqwestProber::new()
            .probe("lo", "http://127.0.0.1:9/gp/gpControl/status", Duration::from_secs(1))
            .await;
        assert!(result.is_err());
    }
}
