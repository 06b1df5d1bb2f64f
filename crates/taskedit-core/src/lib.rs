//! Edit-task dialog: field schema, form
//! draft, partial-update payloads and the
//! dialog lifecycle around one update
//! call.

pub mod config;
pub mod dialog;
pub mod error;
pub mod form;
pub mod invalidation;
pub mod notify;
pub mod payload;
pub mod schema;
pub mod value;

pub use dialog::{
  DialogPhase,
  DialogSettings,
  EditTaskDialog,
  SubmitAttempt,
  SubmitOutcome,
  TaskUpdater,
  UpdateRequest
};
pub use error::{
  DialogError,
  FieldInputError,
  UpdateError,
  ValidationErrors
};
pub use invalidation::{
  InvalidationBus,
  TASKS_TAG
};
pub use schema::{
  FieldKind,
  FieldName
};
pub use value::FieldValue;
