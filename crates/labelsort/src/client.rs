//! Challenge endpoint client: fetch the shuffled items and submit the order.
//!
//! `ChallengeClient` is the seam between the resolver and the network; the
//! default `HttpChallengeClient` issues a single GET and a single POST with
//! a per-request timeout and no retries.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ChallengeError;

/// Opaque session credential passed from fetch to submit unchanged.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<{} chars>)", self.0.len())
    }
}

/// One fetched challenge: shuffled labels plus the session token.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub items: Vec<String>,
    pub token: Token,
}

/// Response body of the submit call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitBody {
    Json(JsonValue),
    Text(String),
}

impl fmt::Display for SubmitBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitBody::Json(v) => write!(f, "{}", v),
            SubmitBody::Text(t) => f.write_str(t),
        }
    }
}

/// Status and body of the submit call; non-success statuses are reported here
/// rather than raised.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub status: u16,
    pub body: SubmitBody,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ChallengeClient: Send + Sync {
    /// Fetch the shuffled items and a token. Non-success statuses and
    /// malformed bodies are errors.
    async fn fetch(&self) -> Result<Challenge, ChallengeError>;

    /// Submit the computed order with the token from `fetch`.
    async fn submit(&self, ordered: &[usize], token: &Token)
    -> Result<SubmitOutcome, ChallengeError>;
}

#[derive(Debug, Deserialize)]
struct RawChallenge {
    #[serde(default)]
    items: Option<Vec<Option<String>>>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct SubmitPayload<'a> {
    #[serde(rename = "orderedList")]
    ordered_list: &'a [usize],
    token: &'a Token,
}

/// Parse a fetch response body. `items` must be a non-empty array and `token`
/// a non-empty string; `null` items become empty labels, which normalize to
/// the empty string.
pub fn parse_challenge(body: &str) -> Result<Challenge, ChallengeError> {
    let raw: RawChallenge = serde_json::from_str(body)
        .map_err(|e| ChallengeError::MalformedResponse(format!("{}: {}", e, snippet(body))))?;
    let items = match raw.items {
        Some(items) if !items.is_empty() => items
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect::<Vec<_>>(),
        _ => {
            return Err(ChallengeError::MalformedResponse(format!(
                "missing or empty 'items': {}",
                snippet(body)
            )));
        }
    };
    let token = match raw.token {
        Some(t) if !t.is_empty() => Token(t),
        _ => {
            return Err(ChallengeError::MalformedResponse(
                "missing or empty 'token'".to_string(),
            ));
        }
    };
    Ok(Challenge { items, token })
}

/// JSON when it parses, raw text otherwise.
pub fn parse_submit_body(text: String) -> SubmitBody {
    match serde_json::from_str::<JsonValue>(&text) {
        Ok(v) => SubmitBody::Json(v),
        Err(_) => SubmitBody::Text(text),
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX).collect();
        format!("{}…", head)
    }
}

/// Single-attempt HTTP client for the challenge endpoints.
pub struct HttpChallengeClient {
    client: reqwest::Client,
    fetch_url: String,
    submit_url: String,
}

impl HttpChallengeClient {
    pub fn new(
        fetch_url: impl Into<String>,
        submit_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChallengeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            fetch_url: fetch_url.into(),
            submit_url: submit_url.into(),
        })
    }
}

#[async_trait]
impl ChallengeClient for HttpChallengeClient {
    async fn fetch(&self) -> Result<Challenge, ChallengeError> {
        tracing::debug!("GET {}", self.fetch_url);
        let resp = self.client.get(&self.fetch_url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ChallengeError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        let challenge = parse_challenge(&body)?;
        tracing::debug!("fetched {} item(s)", challenge.items.len());
        Ok(challenge)
    }

    async fn submit(
        &self,
        ordered: &[usize],
        token: &Token,
    ) -> Result<SubmitOutcome, ChallengeError> {
        tracing::debug!("POST {} (orderedList={:?})", self.submit_url, ordered);
        let payload = SubmitPayload {
            ordered_list: ordered,
            token,
        };
        let resp = self
            .client
            .post(&self.submit_url)
            .json(&payload)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        Ok(SubmitOutcome {
            status,
            body: parse_submit_body(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_items_and_token() {
        let c = parse_challenge(r#"{"items": ["B", null, "A"], "token": "t-1", "extra": 1}"#)
            .unwrap();
        assert_eq!(c.items, vec!["B".to_string(), String::new(), "A".to_string()]);
        assert_eq!(c.token.as_str(), "t-1");
    }

    #[test]
    fn rejects_missing_or_empty_fields() {
        for body in [
            r#"{"token": "t"}"#,
            r#"{"items": [], "token": "t"}"#,
            r#"{"items": ["a"]}"#,
            r#"{"items": ["a"], "token": ""}"#,
            r#"{"items": "a", "token": "t"}"#,
            "not json",
        ] {
            let err = parse_challenge(body).unwrap_err();
            assert!(
                matches!(err, ChallengeError::MalformedResponse(_)),
                "{body}: {err}"
            );
        }
    }

    #[test]
    fn submit_payload_shape() {
        let token = Token::new("abc");
        let payload = SubmitPayload {
            ordered_list: &[2, 0, 1],
            token: &token,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"orderedList": [2, 0, 1], "token": "abc"})
        );
    }

    #[test]
    fn submit_body_falls_back_to_text() {
        assert_eq!(
            parse_submit_body(r#"{"ok": true}"#.to_string()),
            SubmitBody::Json(json!({"ok": true}))
        );
        assert_eq!(
            parse_submit_body("Too slow".to_string()),
            SubmitBody::Text("Too slow".to_string())
        );
    }

    #[test]
    fn token_debug_is_redacted() {
        let t = Token::new("secret-value");
        assert_eq!(format!("{:?}", t), "Token(<12 chars>)");
    }

    #[test]
    fn outcome_success_range() {
        let mk = |status| SubmitOutcome {
            status,
            body: SubmitBody::Text(String::new()),
        };
        assert!(mk(200).is_success());
        assert!(!mk(400).is_success());
    }
}
