use std::collections::BTreeMap;

use taskedit_shared::TaskRecord;
use tracing::{
  debug,
  trace
};

use crate::error::ValidationErrors;
use crate::schema::{
  FieldDescriptor,
  FieldName,
  task_fields
};
use crate::value::FieldValue;

static EMPTY: FieldValue =
  FieldValue::Empty;

/// Draft values and validation state
/// for one edit session.
///
/// The draft is always built from the
/// full schema, so its keys are exactly
/// the descriptor names.
#[derive(Debug, Clone, PartialEq)]
pub struct FormController {
  descriptors: Vec<FieldDescriptor>,
  values:      BTreeMap<FieldName, FieldValue>,
  errors:      ValidationErrors
}

impl FormController {
  pub fn for_record(
    record: &TaskRecord
  ) -> Self {
    let descriptors = task_fields(record);
    let values = initial_values(
      &descriptors
    );
    Self {
      descriptors,
      values,
      errors: ValidationErrors::default()
    }
  }

  /// Drops every edit and error and
  /// starts over from `record`.
  #[tracing::instrument(skip_all, fields(record = record.id))]
  pub fn reset(
    &mut self,
    record: &TaskRecord
  ) {
    self.descriptors =
      task_fields(record);
    self.values =
      initial_values(&self.descriptors);
    self.errors.clear();
    debug!("form reset to record values");
  }

  pub fn descriptors(
    &self
  ) -> &[FieldDescriptor] {
    &self.descriptors
  }

  pub fn descriptor(
    &self,
    name: FieldName
  ) -> Option<&FieldDescriptor> {
    self
      .descriptors
      .iter()
      .find(|d| d.name == name)
  }

  pub fn value(
    &self,
    name: FieldName
  ) -> &FieldValue {
    self.values.get(&name).unwrap_or(&EMPTY)
  }

  pub fn values(
    &self
  ) -> impl Iterator<Item = (FieldName, &FieldValue)>
  {
    self
      .values
      .iter()
      .map(|(k, v)| (*k, v))
  }

  pub fn set_value(
    &mut self,
    name: FieldName,
    value: FieldValue
  ) {
    trace!(field = %name, ?value, "set field");
    self.errors.remove(name);
    self.values.insert(name, value);
  }

  /// Empty compares equal to empty, so
  /// `Text("")` cleared to `Empty` is
  /// not an edit.
  pub fn is_dirty(
    &self,
    name: FieldName
  ) -> bool {
    let current = self.value(name);
    self
      .descriptor(name)
      .is_some_and(|d| {
        if d.initial.is_empty()
          && current.is_empty()
        {
          return false;
        }
        &d.initial != current
      })
  }

  pub fn dirty_fields(
    &self
  ) -> Vec<FieldName> {
    self
      .descriptors
      .iter()
      .map(|d| d.name)
      .filter(|name| self.is_dirty(*name))
      .collect()
  }

  /// Applies the required rules and
  /// keeps the result for display.
  ///
  /// A required field fails when the
  /// user emptied it. Fields that arrived
  /// empty and were left alone are not
  /// part of the update and pass.
  pub fn validate(
    &mut self
  ) -> Result<(), ValidationErrors> {
    let mut errors =
      ValidationErrors::default();
    for descriptor in &self.descriptors {
      let Some(message) =
        descriptor.required
      else {
        continue;
      };
      let name = descriptor.name;
      if self.is_dirty(name)
        && self.value(name).is_empty()
      {
        errors.insert(name, message);
      }
    }

    self.errors = errors.clone();
    if errors.is_empty() {
      Ok(())
    } else {
      debug!(count = errors.len(), "validation failed");
      Err(errors)
    }
  }

  pub fn errors(
    &self
  ) -> &ValidationErrors {
    &self.errors
  }

  pub fn error(
    &self,
    name: FieldName
  ) -> Option<&str> {
    self.errors.get(name)
  }
}

fn initial_values(
  descriptors: &[FieldDescriptor]
) -> BTreeMap<FieldName, FieldValue> {
  descriptors
    .iter()
    .map(|d| (d.name, d.initial.clone()))
    .collect()
}
