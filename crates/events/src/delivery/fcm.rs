//! Firebase Cloud Messaging delivery (HTTP v1 API).
//!
//! [`FcmDelivery`] posts one `messages:send` request per endpoint. There is
//! no retry: a failed attempt is reported straight back to the caller.
//! OAuth2 access tokens are short-lived, so one is requested from the
//! [`AccessTokenSource`] on every send; [`GcpTokenSource`] wraps
//! `gcp_auth`, which caches and refreshes tokens behind that call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tigersafe_core::composer::ComposedMessage;
use tigersafe_core::identity::Endpoint;

use super::{DeliveryError, DeliveryProvider};

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Production FCM API origin.
const DEFAULT_FCM_BASE_URL: &str = "https://fcm.googleapis.com";

/// OAuth2 scope required by the FCM send endpoint.
const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Longest provider error body kept in a [`DeliveryError::Rejected`].
const MAX_ERROR_DETAIL_LEN: usize = 512;

// ---------------------------------------------------------------------------
// FcmConfig
// ---------------------------------------------------------------------------

/// Configuration for the FCM delivery provider.
#[derive(Debug, Clone)]
pub struct FcmConfig {
    /// Firebase project id the device tokens belong to.
    pub project_id: String,
    /// API origin, overridable for emulators.
    pub base_url: String,
}

impl FcmConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable         | Required | Default                      |
    /// |------------------|----------|------------------------------|
    /// | `FCM_PROJECT_ID` | yes      | -                            |
    /// | `FCM_BASE_URL`   | no       | `https://fcm.googleapis.com` |
    ///
    /// Credentials are not read here; see [`GcpTokenSource::discover`].
    pub fn from_env() -> Option<Self> {
        let project_id = std::env::var("FCM_PROJECT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())?;
        Some(Self {
            project_id,
            base_url: std::env::var("FCM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_FCM_BASE_URL.to_string()),
        })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }
}

// ---------------------------------------------------------------------------
// Access tokens
// ---------------------------------------------------------------------------

/// Supplies a currently valid OAuth2 bearer token for FCM.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, DeliveryError>;
}

/// [`AccessTokenSource`] backed by Google application default credentials.
pub struct GcpTokenSource {
    provider: Arc<dyn gcp_auth::TokenProvider>,
}

impl GcpTokenSource {
    /// Discover credentials from the environment
    /// (`GOOGLE_APPLICATION_CREDENTIALS`, the metadata server, or gcloud).
    pub async fn discover() -> Result<Self, DeliveryError> {
        let provider = gcp_auth::provider()
            .await
            .map_err(|e| DeliveryError::Auth(format!("Failed to initialize GCP auth: {e}")))?;
        Ok(Self { provider })
    }
}

#[async_trait]
impl AccessTokenSource for GcpTokenSource {
    async fn access_token(&self) -> Result<String, DeliveryError> {
        let token = self
            .provider
            .token(&[FCM_SCOPE])
            .await
            .map_err(|e| DeliveryError::Auth(format!("Failed to get GCP access token: {e}")))?;
        Ok(token.as_str().to_string())
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: &'a std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

fn build_request<'a>(endpoint: &'a Endpoint, message: &'a ComposedMessage) -> SendRequest<'a> {
    SendRequest {
        message: FcmMessage {
            token: endpoint.as_str(),
            notification: FcmNotification {
                title: &message.title,
                body: &message.body,
            },
            data: &message.structured_data,
        },
    }
}

// ---------------------------------------------------------------------------
// FcmDelivery
// ---------------------------------------------------------------------------

/// Delivers composed messages to device tokens through FCM.
pub struct FcmDelivery {
    client: reqwest::Client,
    config: FcmConfig,
    tokens: Arc<dyn AccessTokenSource>,
}

impl FcmDelivery {
    /// Create a provider with a pre-configured HTTP client.
    pub fn new(
        config: FcmConfig,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// Create a provider authenticated with application default credentials.
    pub async fn with_default_credentials(config: FcmConfig) -> Result<Self, DeliveryError> {
        let tokens = GcpTokenSource::discover().await?;
        Self::new(config, Arc::new(tokens))
    }
}

#[async_trait]
impl DeliveryProvider for FcmDelivery {
    async fn send(
        &self,
        endpoint: &Endpoint,
        message: &ComposedMessage,
    ) -> Result<(), DeliveryError> {
        let access_token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(self.config.send_url())
            .bearer_auth(access_token)
            .json(&build_request(endpoint, message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut detail = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut detail, MAX_ERROR_DETAIL_LEN);
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        tracing::debug!(%endpoint, "FCM accepted message");
        Ok(())
    }
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Hands out `tok-1`, `tok-2`, ... so each fetch is observable.
    #[derive(Default)]
    struct RotatingTokens {
        issued: AtomicUsize,
        broken: bool,
    }

    #[async_trait]
    impl AccessTokenSource for RotatingTokens {
        async fn access_token(&self) -> Result<String, DeliveryError> {
            if self.broken {
                return Err(DeliveryError::Auth("no credentials".to_string()));
            }
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("tok-{n}"))
        }
    }

    fn config(base_url: &str) -> FcmConfig {
        FcmConfig {
            project_id: "tigersafe-test".to_string(),
            base_url: base_url.to_string(),
        }
    }

    fn message() -> ComposedMessage {
        ComposedMessage {
            title: "t".to_string(),
            body: "b".to_string(),
            structured_data: BTreeMap::new(),
        }
    }

    /// Accept `requests` connections, answer each with `status`, and return
    /// the raw request heads received.
    async fn serve_status(
        status: &'static str,
        requests: usize,
    ) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut heads = Vec::new();
            for _ in 0..requests {
                let (mut socket, _) = listener.accept().await.unwrap();
                heads.push(read_request(&mut socket).await);
                let body = r#"{"error":{"status":"UNREGISTERED"}}"#;
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
            }
            heads
        });
        (format!("http://{addr}"), handle)
    }

    /// Read one full HTTP/1.1 request (head plus `content-length` body) and
    /// return it lowercased.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&raw).to_lowercase();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let body_len = text[..head_end]
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= head_end + 4 + body_len {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&raw).to_lowercase()
    }

    #[test]
    fn send_url_targets_project() {
        assert_eq!(
            config("https://fcm.googleapis.com/").send_url(),
            "https://fcm.googleapis.com/v1/projects/tigersafe-test/messages:send"
        );
    }

    #[test]
    fn request_body_carries_token_notification_and_data() {
        let message = ComposedMessage {
            title: "Report Status Updated: Resolved".to_string(),
            body: "Your report (Fire) at Main St is now: Resolved".to_string(),
            structured_data: BTreeMap::from([
                ("reportId".to_string(), "rep-1".to_string()),
                ("status".to_string(), "Resolved".to_string()),
                ("type".to_string(), "report_status".to_string()),
            ]),
        };
        let endpoint = Endpoint::new("device-token-123");

        let json = serde_json::to_value(build_request(&endpoint, &message)).unwrap();

        assert_eq!(json["message"]["token"], "device-token-123");
        assert_eq!(
            json["message"]["notification"]["title"],
            "Report Status Updated: Resolved"
        );
        assert_eq!(json["message"]["data"]["type"], "report_status");
        assert_eq!(json["message"]["data"]["reportId"], "rep-1");
    }

    #[test]
    fn rejected_error_display() {
        let err = DeliveryError::Rejected {
            status: 404,
            detail: "UNREGISTERED".to_string(),
        };
        assert_eq!(err.to_string(), "Push provider returned HTTP 404: UNREGISTERED");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut s = "ééé".to_string(); // 6 bytes
        truncate_on_char_boundary(&mut s, 3);
        assert_eq!(s, "é");
    }

    #[tokio::test]
    async fn every_send_uses_a_freshly_fetched_token() {
        let (base_url, server) = serve_status("200 OK", 2).await;
        let tokens = Arc::new(RotatingTokens::default());
        let provider = FcmDelivery::new(config(&base_url), tokens.clone()).unwrap();

        provider.send(&Endpoint::new("a"), &message()).await.unwrap();
        provider.send(&Endpoint::new("b"), &message()).await.unwrap();

        let heads = server.await.unwrap();
        assert!(heads[0].contains("authorization: bearer tok-1"));
        assert!(heads[1].contains("authorization: bearer tok-2"));
        assert!(heads[0].starts_with("post /v1/projects/tigersafe-test/messages:send"));
        assert_eq!(tokens.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_body() {
        let (base_url, server) = serve_status("404 Not Found", 1).await;
        let provider =
            FcmDelivery::new(config(&base_url), Arc::new(RotatingTokens::default())).unwrap();

        let err = provider
            .send(&Endpoint::new("stale"), &message())
            .await
            .unwrap_err();

        server.await.unwrap();
        match err {
            DeliveryError::Rejected { status, detail } => {
                assert_eq!(status, 404);
                assert!(detail.contains("UNREGISTERED"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn token_failure_stops_before_any_request() {
        // Port 9 (discard) on localhost is not an HTTP server; reaching it
        // would surface as a Request error instead.
        let tokens = Arc::new(RotatingTokens {
            broken: true,
            ..RotatingTokens::default()
        });
        let provider = FcmDelivery::new(config("http://127.0.0.1:9"), tokens).unwrap();

        let err = provider
            .send(&Endpoint::new("tok"), &message())
            .await
            .unwrap_err();

        assert!(matches!(err, DeliveryError::Auth(_)));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_request_error() {
        let provider = FcmDelivery::new(
            config("http://127.0.0.1:9"),
            Arc::new(RotatingTokens::default()),
        )
        .unwrap();

        let err = provider
            .send(&Endpoint::new("tok"), &message())
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Request(_)));
    }
}
