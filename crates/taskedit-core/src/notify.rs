use std::time::Duration;

use crate::error::UpdateError;

pub const SUCCESS_SUMMARY: &str = "Success";
pub const SUCCESS_DETAIL: &str =
  "The entry was updated successfully";
pub const FAILURE_SUMMARY: &str = "Failed";
pub const FAILURE_FALLBACK: &str =
  "Something went wrong when attempting \
   to update the entry";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Severity {
  Success,
  Warn
}

impl Severity {
  pub fn as_str(self) -> &'static str {
    match self {
      | Severity::Success => "success",
      | Severity::Warn => "warn"
    }
  }
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub severity: Severity,
  pub summary:  String,
  pub detail:   String,
  pub life:     Duration
}

impl Toast {
  pub fn success(life: Duration) -> Self {
    Self {
      severity: Severity::Success,
      summary: SUCCESS_SUMMARY.to_string(),
      detail: SUCCESS_DETAIL.to_string(),
      life
    }
  }

  pub fn failure(
    err: &UpdateError,
    life: Duration
  ) -> Self {
    Self {
      severity: Severity::Warn,
      summary: FAILURE_SUMMARY.to_string(),
      detail: failure_detail(err),
      life
    }
  }
}

pub fn failure_detail(
  err: &UpdateError
) -> String {
  match err.detail_message() {
    | Some(message) => {
      format!("Error: {message}")
    }
    | None => FAILURE_FALLBACK.to_string()
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use taskedit_shared::{
    ErrorBody,
    ErrorResponse
  };

  use super::{
    FAILURE_FALLBACK,
    Severity,
    Toast,
    failure_detail
  };
  use crate::error::UpdateError;

  #[test]
  fn failure_uses_nested_message() {
    let err = UpdateError::rejected(
      400,
      Some(ErrorResponse {
        error: Some(ErrorBody {
          message: Some(
            "end_date before start_date"
              .to_string()
          ),
          ..ErrorBody::default()
        })
      })
    );
    let toast = Toast::failure(
      &err,
      Duration::from_millis(6000)
    );
    assert_eq!(toast.severity, Severity::Warn);
    assert_eq!(
      toast.detail,
      "Error: end_date before start_date"
    );
  }

  #[test]
  fn failure_falls_back_without_body() {
    assert_eq!(
      failure_detail(&UpdateError::rejected(
        500, None
      )),
      FAILURE_FALLBACK
    );
    assert_eq!(
      failure_detail(
        &UpdateError::Transport(
          "connection refused".to_string()
        )
      ),
      FAILURE_FALLBACK
    );
  }
}
