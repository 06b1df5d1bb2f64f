use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  NaiveTime
};
use serde_json::{
  Number,
  Value
};
use taskedit_shared::{
  ReviewerRef,
  SelectOption,
  StatusRef
};

use crate::error::FieldInputError;
use crate::schema::{
  FieldKind,
  FieldName
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str =
  "%H:%M:%S%.3f";

const TIME_INPUT_FORMATS: [&str; 3] =
  ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// The live value of one form field.
///
/// Each variant knows how it appears in
/// an update payload, see
/// [`FieldValue::payload_value`].
#[derive(
  Debug, Clone, PartialEq, Default,
)]
pub enum FieldValue {
  #[default]
  Empty,
  Number(Number),
  Date(NaiveDate),
  Time(NaiveTime),
  Text(String),
  /// A pick from a single-select widget.
  Choice(SelectOption),
  /// Reviewer relation as loaded from
  /// the record.
  Reviewer(ReviewerRef),
  /// Status relation as loaded from the
  /// record.
  Status(StatusRef)
}

impl FieldValue {
  /// Scalar sent for this value, or
  /// `None` when the field is empty and
  /// must be left out of the payload.
  pub fn payload_value(
    &self
  ) -> Option<Value> {
    match self {
      | FieldValue::Empty => None,
      | FieldValue::Number(n) => {
        Some(Value::Number(n.clone()))
      }
      | FieldValue::Date(date) => {
        Some(Value::String(
          date
            .format(DATE_FORMAT)
            .to_string()
        ))
      }
      | FieldValue::Time(time) => {
        Some(Value::String(
          time
            .format(TIME_FORMAT)
            .to_string()
        ))
      }
      | FieldValue::Text(text) => {
        non_empty(text)
      }
      | FieldValue::Choice(option) => {
        non_empty(&option.value)
      }
      | FieldValue::Reviewer(r) => {
        non_empty(&r.reviewer)
      }
      | FieldValue::Status(s) => {
        non_empty(&s.status)
      }
    }
  }

  pub fn is_empty(&self) -> bool {
    self.payload_value().is_none()
  }

  /// Text shown in the field's widget.
  pub fn display(&self) -> String {
    match self {
      | FieldValue::Empty => {
        String::new()
      }
      | FieldValue::Number(n) => {
        n.to_string()
      }
      | FieldValue::Date(date) => date
        .format(DATE_FORMAT)
        .to_string(),
      | FieldValue::Time(time) => {
        time.format("%H:%M").to_string()
      }
      | FieldValue::Text(text) => {
        text.clone()
      }
      | FieldValue::Choice(option) => {
        option.value.clone()
      }
      | FieldValue::Reviewer(r) => {
        r.reviewer.clone()
      }
      | FieldValue::Status(s) => {
        s.status.clone()
      }
    }
  }

  /// Parses raw widget text for `field`.
  /// Blank input clears the field.
  pub fn parse_input(
    field: FieldName,
    raw: &str
  ) -> Result<Self, FieldInputError> {
    let kind = field.kind();
    if raw.is_empty()
      || (kind != FieldKind::Text
        && raw.trim().is_empty())
    {
      return Ok(FieldValue::Empty);
    }

    let invalid = |expected| {
      FieldInputError {
        field,
        raw: raw.to_string(),
        expected
      }
    };

    match kind {
      | FieldKind::Number => {
        parse_number(raw.trim())
          .map(FieldValue::Number)
          .ok_or_else(|| {
            invalid("number")
          })
      }
      | FieldKind::Date => {
        NaiveDate::parse_from_str(
          raw.trim(),
          DATE_FORMAT
        )
        .map(FieldValue::Date)
        .map_err(|_| {
          invalid("date (YYYY-MM-DD)")
        })
      }
      | FieldKind::Time => {
        normalize_time(raw)
          .map(FieldValue::Time)
          .ok_or_else(|| {
            invalid("time (HH:MM)")
          })
      }
      | FieldKind::Select(_) => {
        let code = raw.trim();
        Ok(FieldValue::Choice(
          SelectOption::new(code, code)
        ))
      }
      | FieldKind::Text => {
        Ok(FieldValue::Text(
          raw.to_string()
        ))
      }
    }
  }
}

fn non_empty(text: &str) -> Option<Value> {
  if text.is_empty() {
    None
  } else {
    Some(Value::String(text.to_string()))
  }
}

fn parse_number(
  raw: &str
) -> Option<Number> {
  if let Ok(int) = raw.parse::<i64>() {
    return Some(Number::from(int));
  }
  raw
    .parse::<f64>()
    .ok()
    .and_then(Number::from_f64)
}

/// Accepts `YYYY-MM-DD`, RFC 3339 and
/// naive `YYYY-MM-DDTHH:MM:SS` and keeps
/// only the calendar date.
pub fn normalize_date(
  raw: &str
) -> Option<NaiveDate> {
  let raw = raw.trim();
  if let Ok(date) =
    NaiveDate::parse_from_str(
      raw,
      DATE_FORMAT
    )
  {
    return Some(date);
  }
  if let Ok(stamp) =
    DateTime::parse_from_rfc3339(raw)
  {
    return Some(stamp.date_naive());
  }
  NaiveDateTime::parse_from_str(
    raw,
    "%Y-%m-%dT%H:%M:%S%.f"
  )
  .ok()
  .map(|stamp| stamp.date())
}

pub fn normalize_time(
  raw: &str
) -> Option<NaiveTime> {
  let raw = raw.trim();
  TIME_INPUT_FORMATS
    .iter()
    .find_map(|format| {
      NaiveTime::parse_from_str(
        raw, format
      )
      .ok()
    })
}
