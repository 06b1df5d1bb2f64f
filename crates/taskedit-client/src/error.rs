use thiserror::Error;

/// Errors raised outside the update path:
/// building the client and fetching
/// records.
#[derive(Error, Debug)]
pub enum ClientError {
  #[error("HTTP request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid records URL: {0}")]
  Url(#[from] url::ParseError),

  #[error("records URL cannot take a path: {0}")]
  NotABase(String),

  #[error("records API returned HTTP {status}{}", message_suffix(.message))]
  Status {
    status:  u16,
    message: Option<String>
  },

  #[error("failed to decode records response: {0}")]
  Decode(#[from] serde_json::Error)
}

fn message_suffix(
  message: &Option<String>
) -> String {
  message
    .as_deref()
    .map(|m| format!(": {m}"))
    .unwrap_or_default()
}

pub type Result<T> =
  std::result::Result<T, ClientError>;
