use std::collections::BTreeMap;
use std::fmt;

use taskedit_shared::ErrorResponse;
use thiserror::Error;

use crate::dialog::DialogPhase;
use crate::schema::FieldName;

/// Failure of the remote update call.
#[derive(Debug, Clone, Error)]
pub enum UpdateError {
  #[error("update rejected with HTTP {status}")]
  Rejected {
    status: u16,
    body:   Option<ErrorResponse>
  },

  #[error("transport error: {0}")]
  Transport(String),

  #[error("failed to encode update payload: {0}")]
  Encode(String)
}

impl UpdateError {
  pub fn rejected(
    status: u16,
    body: Option<ErrorResponse>
  ) -> Self {
    UpdateError::Rejected { status, body }
  }

  /// The server's nested
  /// `error.message`, when it sent one.
  pub fn detail_message(
    &self
  ) -> Option<&str> {
    match self {
      | UpdateError::Rejected {
        body: Some(body),
        ..
      } => body.message(),
      | _ => None
    }
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
#[error("invalid {expected} for field {field}: {raw:?}")]
pub struct FieldInputError {
  pub field:    FieldName,
  pub raw:      String,
  pub expected: &'static str
}

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
pub enum DialogError {
  #[error("dialog is not accepting edits (phase: {0})")]
  NotEditing(DialogPhase),

  #[error("no update in flight (phase: {0})")]
  NotSubmitting(DialogPhase),

  #[error("an update is already in flight")]
  UpdateInFlight,

  #[error(transparent)]
  Input(#[from] FieldInputError)
}

/// Required-field failures keyed by
/// field, in display order.
#[derive(
  Debug, Clone, PartialEq, Eq, Default,
)]
pub struct ValidationErrors {
  entries: BTreeMap<FieldName, String>
}

impl ValidationErrors {
  pub fn insert(
    &mut self,
    field: FieldName,
    message: impl Into<String>
  ) {
    self
      .entries
      .insert(field, message.into());
  }

  pub fn remove(
    &mut self,
    field: FieldName
  ) -> Option<String> {
    self.entries.remove(&field)
  }

  pub fn get(
    &self,
    field: FieldName
  ) -> Option<&str> {
    self
      .entries
      .get(&field)
      .map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = (FieldName, &str)>
  {
    self
      .entries
      .iter()
      .map(|(k, v)| (*k, v.as_str()))
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(f, "validation failed")?;
    for (idx, (field, message)) in
      self.iter().enumerate()
    {
      let sep =
        if idx == 0 { ": " } else { "; " };
      write!(f, "{sep}{field}: {message}")?;
    }
    Ok(())
  }
}

impl std::error::Error
  for ValidationErrors
{
}
