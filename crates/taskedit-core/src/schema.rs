use std::fmt;
use std::str::FromStr;

use taskedit_shared::TaskRecord;
use tracing::debug;

use crate::error::UnknownField;
use crate::value::{
  FieldValue,
  normalize_date,
  normalize_time
};

/// Every editable attribute of a task.
/// Declaration order is display order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub enum FieldName {
  FileNo,
  Est,
  StartDate,
  EndDate,
  Effort,
  Reviewer,
  Status,
  Remarks
}

impl FieldName {
  pub const ALL: [FieldName; 8] = [
    FieldName::FileNo,
    FieldName::Est,
    FieldName::StartDate,
    FieldName::EndDate,
    FieldName::Effort,
    FieldName::Reviewer,
    FieldName::Status,
    FieldName::Remarks
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | FieldName::FileNo => "file_no",
      | FieldName::Est => "est",
      | FieldName::StartDate => {
        "start_date"
      }
      | FieldName::EndDate => "end_date",
      | FieldName::Effort => "effort",
      | FieldName::Reviewer => "reviewer",
      | FieldName::Status => "status",
      | FieldName::Remarks => "remarks"
    }
  }

  pub fn spec(
    self
  ) -> &'static FieldSpec {
    &FIELD_SPECS[self as usize]
  }

  pub fn kind(self) -> FieldKind {
    self.spec().kind
  }
}

impl fmt::Display for FieldName {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FieldName {
  type Err = UnknownField;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    FieldName::ALL
      .into_iter()
      .find(|name| {
        name.as_str() == wanted
      })
      .ok_or_else(|| {
        UnknownField(wanted.to_string())
      })
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum SelectSource {
  Reviewer,
  Status
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FieldKind {
  Number,
  Date,
  Time,
  Select(SelectSource),
  Text
}

impl FieldKind {
  /// Widget type used to render the
  /// field.
  pub fn input_type(
    self
  ) -> &'static str {
    match self {
      | FieldKind::Number => "number",
      | FieldKind::Date => "date",
      | FieldKind::Time => "time",
      | FieldKind::Select(_) => "select",
      | FieldKind::Text => "text"
    }
  }
}

/// Compile-time half of a field
/// descriptor.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldSpec {
  pub name:     FieldName,
  pub label:    &'static str,
  pub kind:     FieldKind,
  pub required: Option<&'static str>
}

pub static FIELD_SPECS: [FieldSpec; 8] = [
  FieldSpec {
    name:     FieldName::FileNo,
    label:    "File No",
    kind:     FieldKind::Number,
    required: Some(
      "File number is required"
    )
  },
  FieldSpec {
    name:     FieldName::Est,
    label:    "Estimated Hours",
    kind:     FieldKind::Number,
    required: Some(
      "Please enter estimated hours"
    )
  },
  FieldSpec {
    name:     FieldName::StartDate,
    label:    "Start Date",
    kind:     FieldKind::Date,
    required: Some(
      "Please select start date"
    )
  },
  FieldSpec {
    name:     FieldName::EndDate,
    label:    "End Date",
    kind:     FieldKind::Date,
    required: Some(
      "Please select end date"
    )
  },
  FieldSpec {
    name:     FieldName::Effort,
    label:    "Effort",
    kind:     FieldKind::Time,
    required: Some(
      "Please enter effort time"
    )
  },
  FieldSpec {
    name:     FieldName::Reviewer,
    label:    "Reviewer",
    kind:     FieldKind::Select(
      SelectSource::Reviewer
    ),
    required: Some(
      "Please select reviewer code"
    )
  },
  FieldSpec {
    name:     FieldName::Status,
    label:    "Status Code",
    kind:     FieldKind::Select(
      SelectSource::Status
    ),
    required: Some(
      "Please select status code"
    )
  },
  FieldSpec {
    name:     FieldName::Remarks,
    label:    "Remarks",
    kind:     FieldKind::Text,
    required: Some(
      "Please enter remarks"
    )
  }
];

/// A field spec bound to the value it
/// starts from for one edit session.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
  pub name:     FieldName,
  pub label:    &'static str,
  pub kind:     FieldKind,
  pub required: Option<&'static str>,
  pub initial:  FieldValue
}

/// Builds the ordered descriptors for
/// `record`. Pure; dates and times are
/// normalized to concrete values.
pub fn task_fields(
  record: &TaskRecord
) -> Vec<FieldDescriptor> {
  FIELD_SPECS
    .iter()
    .map(|spec| FieldDescriptor {
      name:     spec.name,
      label:    spec.label,
      kind:     spec.kind,
      required: spec.required,
      initial:  initial_value(
        spec.name, record
      )
    })
    .collect()
}

fn initial_value(
  name: FieldName,
  record: &TaskRecord
) -> FieldValue {
  match name {
    | FieldName::FileNo => record
      .file_no
      .clone()
      .map(FieldValue::Number)
      .unwrap_or_default(),
    | FieldName::Est => record
      .est
      .clone()
      .map(FieldValue::Number)
      .unwrap_or_default(),
    | FieldName::StartDate => {
      date_value(
        name,
        record.start_date.as_deref()
      )
    }
    | FieldName::EndDate => {
      date_value(
        name,
        record.end_date.as_deref()
      )
    }
    | FieldName::Effort => {
      match record.effort.as_deref() {
        | None => FieldValue::Empty,
        | Some(raw) => {
          normalize_time(raw)
            .map(FieldValue::Time)
            .unwrap_or_else(|| {
              debug!(field = %name, raw, "unparseable time on record");
              FieldValue::Empty
            })
        }
      }
    }
    | FieldName::Reviewer => record
      .reviewer
      .clone()
      .map(FieldValue::Reviewer)
      .unwrap_or_default(),
    | FieldName::Status => record
      .status
      .clone()
      .map(FieldValue::Status)
      .unwrap_or_default(),
    | FieldName::Remarks => record
      .remarks
      .clone()
      .map(FieldValue::Text)
      .unwrap_or_default()
  }
}

fn date_value(
  name: FieldName,
  raw: Option<&str>
) -> FieldValue {
  let Some(raw) = raw else {
    return FieldValue::Empty;
  };
  match normalize_date(raw) {
    | Some(date) => FieldValue::Date(date),
    | None => {
      debug!(field = %name, raw, "unparseable date on record");
      FieldValue::Empty
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    NaiveTime
  };
  use taskedit_shared::{
    ReviewerRef,
    TaskRecord
  };

  use super::{
    FIELD_SPECS,
    FieldName,
    task_fields
  };
  use crate::value::FieldValue;

  #[test]
  fn spec_table_is_indexed_by_name() {
    for name in FieldName::ALL {
      assert_eq!(name.spec().name, name);
    }
    assert_eq!(
      FIELD_SPECS.len(),
      FieldName::ALL.len()
    );
  }

  #[test]
  fn parses_field_names() {
    assert_eq!(
      "start_date".parse::<FieldName>(),
      Ok(FieldName::StartDate)
    );
    assert!(
      "due".parse::<FieldName>().is_err()
    );
  }

  #[test]
  fn descriptors_follow_record_values() {
    let mut record = TaskRecord::new(3);
    record.file_no = Some(12.into());
    record.start_date = Some(
      "2024-03-01T09:30:00.000Z"
        .to_string()
    );
    record.end_date =
      Some("2024-03-08".to_string());
    record.effort =
      Some("02:30:00.000".to_string());
    record.reviewer = Some(ReviewerRef {
      reviewer: "AB".to_string()
    });

    let fields = task_fields(&record);
    let names: Vec<FieldName> = fields
      .iter()
      .map(|f| f.name)
      .collect();
    assert_eq!(names, FieldName::ALL);

    assert_eq!(
      fields[0].initial,
      FieldValue::Number(12.into())
    );
    assert_eq!(
      fields[1].initial,
      FieldValue::Empty
    );
    assert_eq!(
      fields[2].initial,
      FieldValue::Date(
        NaiveDate::from_ymd_opt(
          2024, 3, 1
        )
        .expect("date")
      )
    );
    assert_eq!(
      fields[4].initial,
      FieldValue::Time(
        NaiveTime::from_hms_opt(2, 30, 0)
          .expect("time")
      )
    );
    assert!(matches!(
      fields[5].initial,
      FieldValue::Reviewer(_)
    ));
    assert!(
      fields
        .iter()
        .all(|f| f.required.is_some())
    );
  }

  #[test]
  fn garbage_dates_start_empty() {
    let mut record = TaskRecord::new(1);
    record.start_date =
      Some("next tuesday".to_string());
    let fields = task_fields(&record);
    assert_eq!(
      fields[2].initial,
      FieldValue::Empty
    );
  }
}
