use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, Fetch};
use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Extra client-side wait on top of the proxy's own `maxTimeout`.
const CLIENT_TIMEOUT_MARGIN_SECS: u64 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProxyRequest<'a> {
    cmd: &'static str,
    url: &'a str,
    max_timeout: u64,
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    solution: Option<Solution>,
}

#[derive(Debug, Deserialize)]
struct Solution {
    status: u16,
    #[serde(default)]
    response: String,
}

/// Fetches pages through a FlareSolverr instance, which drives a real browser
/// past Cloudflare-style challenges.
///
/// The proxy answers every command with HTTP 200; success is signalled by a
/// top-level `status` of `"ok"` and a nested `solution.status` of 200.
/// Anything else is [`ScraperError::ProtectionBypass`] and is not retried.
pub struct FlareSolverrClient {
    client: Client,
    endpoint: String,
    max_timeout_ms: u64,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl FlareSolverrClient {
    /// `endpoint` is the proxy's command URL, e.g. `http://localhost:8191/v1`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        endpoint: &str,
        max_timeout_ms: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let timeout = Duration::from_millis(max_timeout_ms)
            + Duration::from_secs(CLIENT_TIMEOUT_MARGIN_SECS);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
            max_timeout_ms,
            max_retries,
            backoff_base_secs,
        })
    }

    async fn solve(&self, url: &str) -> Result<String, ScraperError> {
        let request = ProxyRequest {
            cmd: "request.get",
            url,
            max_timeout: self.max_timeout_ms,
        };

        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let request = &request;
            async move {
                let response = self
                    .client
                    .post(&self.endpoint)
                    .json(request)
                    .send()
                    .await
                    .map_err(|e| ScraperError::from_request(url, e))?;
                check_status(&self.endpoint, response)?
                    .text()
                    .await
                    .map_err(|e| ScraperError::from_request(url, e))
            }
        })
        .await?;

        let parsed: ProxyResponse =
            serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
                context: format!("FlareSolverr response for {url}"),
                source: e,
            })?;
        into_page(url, parsed)
    }
}

fn into_page(url: &str, response: ProxyResponse) -> Result<String, ScraperError> {
    if response.status != "ok" {
        return Err(ScraperError::ProtectionBypass {
            url: url.to_owned(),
            reason: response
                .message
                .unwrap_or_else(|| format!("status \"{}\"", response.status)),
        });
    }
    let Some(solution) = response.solution else {
        return Err(ScraperError::ProtectionBypass {
            url: url.to_owned(),
            reason: "response has no solution".to_owned(),
        });
    };
    if solution.status != 200 {
        return Err(ScraperError::ProtectionBypass {
            url: url.to_owned(),
            reason: format!("target answered HTTP {}", solution.status),
        });
    }
    tracing::debug!(url, "fetched through FlareSolverr");
    Ok(solution.response)
}

#[async_trait]
impl Fetch for FlareSolverrClient {
    async fn fetch_text(&self, url: &str) -> Result<String, ScraperError> {
        self.solve(url).await
    }

    /// The proxy returns bodies as text. Binary resources come back with
    /// each byte mapped to one code point (latin-1), which is reversed here.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        let text = self.solve(url).await?;
        latin1_bytes(&text).ok_or_else(|| ScraperError::Parse {
            url: url.to_owned(),
            reason: "proxied body is not latin-1 encoded binary".to_owned(),
        })
    }
}

fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ProxyResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn ok_response_yields_solution_body() {
        let parsed = response(
            r#"{"status":"ok","message":"","solution":{"status":200,"response":"<html></html>","cookies":[]}}"#,
        );
        assert_eq!(into_page("https://x", parsed).unwrap(), "<html></html>");
    }

    #[test]
    fn non_ok_status_is_protection_bypass() {
        let parsed = response(r#"{"status":"error","message":"Challenge not solved"}"#);
        let err = into_page("https://x", parsed).unwrap_err();
        assert!(
            matches!(err, ScraperError::ProtectionBypass { ref reason, .. } if reason == "Challenge not solved")
        );
    }

    #[test]
    fn nested_non_200_is_protection_bypass() {
        let parsed = response(r#"{"status":"ok","solution":{"status":403,"response":"denied"}}"#);
        assert!(matches!(
            into_page("https://x", parsed),
            Err(ScraperError::ProtectionBypass { .. })
        ));
    }

    #[test]
    fn request_serializes_with_camel_case_timeout() {
        let body = serde_json::to_value(ProxyRequest {
            cmd: "request.get",
            url: "https://www.metal-archives.com/bands/_/1",
            max_timeout: 60_000,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "cmd": "request.get",
                "url": "https://www.metal-archives.com/bands/_/1",
                "maxTimeout": 60000
            })
        );
    }

    #[test]
    fn latin1_round_trips_binary_and_rejects_wide_chars() {
        assert_eq!(latin1_bytes("\u{ff}\u{d8}\u{0}A"), Some(vec![0xff, 0xd8, 0x00, b'A']));
        assert_eq!(latin1_bytes("\u{20ac}"), None);
    }
}
