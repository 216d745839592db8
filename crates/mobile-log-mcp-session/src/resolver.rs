//! Best-effort device resolution via the automation server.

use std::time::Duration;

use tracing::debug;

use mobile_log_mcp_core::Error;

/// Looks up the device a session is bound to by querying the automation
/// server's session capabilities.
///
/// Strictly best-effort: every failure mode (unreachable server, non-2xx,
/// malformed body, missing capability) yields `None`, and the caller falls
/// back to platform-default-device semantics.
#[derive(Debug, Clone)]
pub struct DeviceResolver {
    http: reqwest::Client,
}

impl DeviceResolver {
    /// Create a resolver with a bounded per-request timeout.
    pub fn new(request_timeout: Duration) -> mobile_log_mcp_core::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Resolve the device identifier for a session, or `None`.
    ///
    /// Issues one `GET {server_url}/session/{session_id}` and reads the
    /// `appium:udid` capability from the JSON body.
    pub async fn resolve(&self, server_url: &str, session_id: &str) -> Option<String> {
        match self.fetch_capabilities(server_url, session_id).await {
            Ok(body) => {
                let udid = extract_udid(&body);
                if udid.is_none() {
                    debug!(
                        "no appium:udid capability in session response: session_id={}",
                        session_id
                    );
                }
                udid
            }
            Err(e) => {
                debug!(
                    "device lookup failed, falling back to default device: session_id={}, error={}",
                    session_id, e
                );
                None
            }
        }
    }

    async fn fetch_capabilities(
        &self,
        server_url: &str,
        session_id: &str,
    ) -> Result<serde_json::Value, reqwest::Error> {
        let base = server_url.trim_end_matches('/');
        let url = format!("{base}/session/{session_id}");

        self.http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// Pull `value.capabilities["appium:udid"]` out of a session response body.
fn extract_udid(body: &serde_json::Value) -> Option<String> {
    body.get("value")?
        .get("capabilities")?
        .get("appium:udid")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_udid() {
        let body = json!({
            "value": {
                "capabilities": {
                    "platformName": "iOS",
                    "appium:udid": "00008030-001C2D"
                }
            }
        });
        assert_eq!(extract_udid(&body), Some("00008030-001C2D".to_string()));
    }

    #[test]
    fn test_extract_udid_missing_capability() {
        let body = json!({ "value": { "capabilities": { "platformName": "iOS" } } });
        assert_eq!(extract_udid(&body), None);
    }

    #[test]
    fn test_extract_udid_malformed_shapes() {
        assert_eq!(extract_udid(&json!(null)), None);
        assert_eq!(extract_udid(&json!({ "value": 7 })), None);
        assert_eq!(extract_udid(&json!({ "value": { "capabilities": [] } })), None);
        // Non-string udid is rejected too.
        assert_eq!(
            extract_udid(&json!({ "value": { "capabilities": { "appium:udid": 42 } } })),
            None
        );
    }

    #[tokio::test]
    async fn test_resolve_swallows_network_failure() {
        let resolver = DeviceResolver::new(Duration::from_millis(500)).unwrap();
        // Nothing listens on this port; the lookup must degrade to None.
        let udid = resolver.resolve("http://127.0.0.1:9/", "s1").await;
        assert_eq!(udid, None);
    }
}
