use serde::{
  Deserialize,
  Serialize
};
use serde_json::{
  Map,
  Number,
  Value
};

/// Reviewer relation as the records API
/// embeds it: `{ "reviewer": "AB" }`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct ReviewerRef {
  #[serde(default)]
  pub reviewer: String
}

/// Status relation: `{ "status": "OPEN" }`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct StatusRef {
  #[serde(default)]
  pub status: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskRecord {
  pub id:         u64,
  pub file_no:    Option<Number>,
  pub est:        Option<Number>,
  pub start_date: Option<String>,
  pub end_date:   Option<String>,
  pub effort:     Option<String>,
  pub reviewer:   Option<ReviewerRef>,
  pub status:     Option<StatusRef>,
  pub remarks:    Option<String>
}

impl TaskRecord {
  pub fn new(id: u64) -> Self {
    Self {
      id,
      file_no: None,
      est: None,
      start_date: None,
      end_date: None,
      effort: None,
      reviewer: None,
      status: None,
      remarks: None
    }
  }
}

/// One entry of a single-select widget.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct SelectOption {
  pub label: String,
  pub value: String
}

impl SelectOption {
  pub fn new(
    label: impl Into<String>,
    value: impl Into<String>
  ) -> Self {
    Self {
      label: label.into(),
      value: value.into()
    }
  }
}

/// Partial update body: field name to
/// scalar, only for fields the user set.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Default,
)]
#[serde(transparent)]
pub struct UpdatePayload(
  Map<String, Value>
);

impl UpdatePayload {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(
    &mut self,
    field: impl Into<String>,
    value: Value
  ) {
    self.0.insert(field.into(), value);
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn to_value(&self) -> Value {
    Value::Object(self.0.clone())
  }
}

/// Request body for the update call.
#[derive(Debug, Serialize)]
pub struct UpdateEnvelope<'a> {
  pub data: &'a UpdatePayload
}

/// Response body for a single-record
/// fetch.
#[derive(
  Debug, Clone, Deserialize,
)]
pub struct RecordEnvelope {
  pub data: TaskRecord
}

/// Response body for a collection fetch.
#[derive(
  Debug, Clone, Deserialize,
)]
pub struct RecordListEnvelope {
  #[serde(default)]
  pub data: Vec<TaskRecord>
}

/// Error body returned by the records
/// API on a rejected request.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Default,
)]
pub struct ErrorResponse {
  #[serde(default)]
  pub error: Option<ErrorBody>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Default,
)]
pub struct ErrorBody {
  pub status:  Option<u16>,
  pub name:    Option<String>,
  pub message: Option<String>,
  pub details: Option<Value>
}

impl ErrorResponse {
  /// The nested `error.message`, if the
  /// server sent a non-empty one.
  pub fn message(
    &self
  ) -> Option<&str> {
    self
      .error
      .as_ref()
      .and_then(|body| {
        body.message.as_deref()
      })
      .filter(|msg| {
        !msg.trim().is_empty()
      })
  }
}
