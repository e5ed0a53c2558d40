use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::error::SsoError;

/// Bounded exponential backoff.
///
/// Attempt `n` (1-based) that fails transiently is followed by a sleep of
/// `base_delay * 2^(n-1)`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// A response that made it over the wire. Status is carried, not judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

enum Attempt {
    Done(RawResponse),
    Retry(String),
    Fail(String),
}

/// Shared by every fetch task; `reqwest::Client` pools connections internally.
#[derive(Clone)]
pub struct PortalHttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl PortalHttpClient {
    pub fn new(mut headers: HeaderMap, policy: RetryPolicy) -> Result<Self, SsoError> {
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("sso-deeplink/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SsoError::InvalidHeader(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| SsoError::HttpClient(err.to_string()))?;
        Ok(Self { client, policy })
    }

    /// GETs `url`, retrying transport failures and 5xx responses.
    ///
    /// Any other status is returned as-is together with its body.
    pub async fn fetch(&self, url: &str) -> Result<RawResponse, SsoError> {
        let mut attempt = 1u32;
        loop {
            let reason = match self.attempt(url).await {
                Attempt::Done(response) => {
                    debug!(url, attempt, status = response.status, "request completed");
                    return Ok(response);
                }
                Attempt::Fail(message) => {
                    return Err(SsoError::Transport {
                        url: url.to_string(),
                        message,
                    });
                }
                Attempt::Retry(reason) => reason,
            };

            if attempt >= self.policy.max_attempts {
                return Err(SsoError::Transport {
                    url: url.to_string(),
                    message: format!("{reason} (gave up after {attempt} attempts)"),
                });
            }

            let delay = self.policy.delay_after(attempt);
            warn!(url, attempt, delay_ms = delay.as_millis() as u64, %reason, "retrying request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) if is_retryable_error(&err) => return Attempt::Retry(err.to_string()),
            Err(err) => return Attempt::Fail(err.to_string()),
        };

        let status = response.status().as_u16();
        if is_retryable_status(status) {
            return Attempt::Retry(format!("status {status}"));
        }

        match response.text().await {
            Ok(body) => Attempt::Done(RawResponse { status, body }),
            Err(err) => Attempt::Retry(err.to_string()),
        }
    }
}

fn is_retryable_status(status: u16) -> bool {
    (500..600).contains(&status)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    fn client() -> PortalHttpClient {
        let mut headers = HeaderMap::new();
        headers.insert("x-amz-sso-bearer-token", HeaderValue::from_static("token"));
        PortalHttpClient::new(headers, fast_policy()).unwrap()
    }

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = RetryPolicy::default();
        let delays = (1..=8).map(|n| policy.delay_after(n)).collect::<Vec<_>>();
        assert_eq!(delays[0], Duration::from_millis(100));
        assert_eq!(delays[1], Duration::from_millis(200));
        assert_eq!(delays[4], Duration::from_millis(1600));
        assert_eq!(delays[7], Duration::from_secs(3));
        assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn attempts_never_drop_to_zero() {
        assert_eq!(RetryPolicy::default().with_attempts(0).max_attempts, 1);
    }

    #[tokio::test]
    async fn sends_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .and(header("x-amz-sso-bearer-token", "token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let response = client()
            .fetch(&format!("{}/ok", server.uri()))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "{}");
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/denied"))
            .respond_with(
                ResponseTemplate::new(403).set_body_string(r#"{"message":"access denied"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client()
            .fetch(&format!("{}/denied", server.uri()))
            .await
            .unwrap();
        assert_eq!(response.status, 403);
        assert!(response.body.contains("access denied"));
    }

    #[tokio::test]
    async fn connection_refused_exhausts_attempts() {
        let err = client()
            .fetch("http://127.0.0.1:1/unreachable")
            .await
            .unwrap_err();
        assert_matches!(err, SsoError::Transport { ref message, .. } if message.contains("5 attempts"));
    }
}
