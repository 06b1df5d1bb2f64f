use std::fmt;
use std::future::Future;
use std::time::Duration;

use taskedit_shared::{
  TaskRecord,
  UpdatePayload
};
use tracing::{
  debug,
  info,
  warn
};

use crate::error::{
  DialogError,
  UpdateError,
  ValidationErrors
};
use crate::form::FormController;
use crate::invalidation::{
  InvalidationBus,
  TASKS_TAG
};
use crate::notify::Toast;
use crate::payload::build_payload;
use crate::schema::FieldName;
use crate::value::FieldValue;

/// Persists a partial update of one task
/// record.
pub trait TaskUpdater {
  fn update_record(
    &self,
    id: u64,
    payload: &UpdatePayload
  ) -> impl Future<Output = Result<(), UpdateError>>;
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum DialogPhase {
  Closed,
  Editing,
  Submitting
}

impl fmt::Display for DialogPhase {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(match self {
      | DialogPhase::Closed => "closed",
      | DialogPhase::Editing => "editing",
      | DialogPhase::Submitting => {
        "submitting"
      }
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSettings {
  pub cache_tag:    String,
  pub success_life: Duration,
  pub failure_life: Duration
}

impl Default for DialogSettings {
  fn default() -> Self {
    Self {
      cache_tag:    TASKS_TAG.to_string(),
      success_life: Duration::from_millis(
        3000
      ),
      failure_life: Duration::from_millis(
        6000
      )
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
  pub id:      u64,
  pub payload: UpdatePayload
}

/// Result of pressing Submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAttempt {
  /// Send this request, then report back
  /// through
  /// [`EditTaskDialog::complete_submit`].
  Dispatch(UpdateRequest),
  Invalid(ValidationErrors),
  /// An update is already outstanding.
  InFlight,
  NotOpen
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
  Saved,
  Failed,
  Invalid(ValidationErrors),
  InFlight,
  NotOpen
}

/// Edit-task dialog lifecycle.
///
/// Closed → Editing → Submitting, then
/// back to Closed on success or Editing
/// on failure. Cancel closes from
/// Editing. An outstanding update cannot
/// be cancelled.
#[derive(Debug)]
pub struct EditTaskDialog {
  phase:    DialogPhase,
  record:   Option<TaskRecord>,
  form:     Option<FormController>,
  settings: DialogSettings,
  bus:      InvalidationBus,
  toasts:   Vec<Toast>
}

impl EditTaskDialog {
  /// Creates a closed dialog and tells
  /// the cache its tag is stale.
  pub fn mount(
    bus: InvalidationBus,
    settings: DialogSettings
  ) -> Self {
    bus.publish(&settings.cache_tag);
    Self {
      phase: DialogPhase::Closed,
      record: None,
      form: None,
      settings,
      bus,
      toasts: Vec::new()
    }
  }

  pub fn phase(&self) -> DialogPhase {
    self.phase
  }

  pub fn is_open(&self) -> bool {
    self.phase != DialogPhase::Closed
  }

  pub fn is_submit_enabled(&self) -> bool {
    self.phase == DialogPhase::Editing
  }

  pub fn record(
    &self
  ) -> Option<&TaskRecord> {
    self.record.as_ref()
  }

  pub fn form(
    &self
  ) -> Option<&FormController> {
    self.form.as_ref()
  }

  pub fn settings(
    &self
  ) -> &DialogSettings {
    &self.settings
  }

  /// Shows the dialog for `record`,
  /// discarding whatever the previous
  /// session left behind.
  #[tracing::instrument(skip_all, fields(record = record.id, phase = %self.phase))]
  pub fn open(
    &mut self,
    record: TaskRecord
  ) -> Result<(), DialogError> {
    if self.phase == DialogPhase::Submitting
    {
      return Err(
        DialogError::UpdateInFlight
      );
    }

    match self.form.as_mut() {
      | Some(form) => form.reset(&record),
      | None => {
        self.form = Some(
          FormController::for_record(
            &record
          )
        );
      }
    }
    self.record = Some(record);
    self.phase = DialogPhase::Editing;
    info!("edit dialog opened");
    Ok(())
  }

  pub fn set_field(
    &mut self,
    name: FieldName,
    value: FieldValue
  ) -> Result<(), DialogError> {
    let form = self.editing_form()?;
    form.set_value(name, value);
    Ok(())
  }

  /// Parses raw widget text and stores it.
  pub fn set_input(
    &mut self,
    name: FieldName,
    raw: &str
  ) -> Result<(), DialogError> {
    self.editing_form()?;
    let value =
      FieldValue::parse_input(name, raw)?;
    self.set_field(name, value)
  }

  /// Closes without saving. Returns
  /// false while an update is in flight.
  pub fn cancel(&mut self) -> bool {
    match self.phase {
      | DialogPhase::Submitting => {
        debug!("cancel ignored while update is in flight");
        false
      }
      | DialogPhase::Editing => {
        self.close();
        info!("edit dialog cancelled");
        true
      }
      | DialogPhase::Closed => true
    }
  }

  /// Validates the draft and, when it
  /// passes, moves to Submitting and
  /// hands back the request to send.
  #[tracing::instrument(skip_all, fields(phase = %self.phase))]
  pub fn begin_submit(
    &mut self
  ) -> SubmitAttempt {
    match self.phase {
      | DialogPhase::Closed => {
        return SubmitAttempt::NotOpen;
      }
      | DialogPhase::Submitting => {
        debug!("submit ignored while update is in flight");
        return SubmitAttempt::InFlight;
      }
      | DialogPhase::Editing => {}
    }

    let (Some(form), Some(record)) =
      (self.form.as_mut(), self.record.as_ref())
    else {
      return SubmitAttempt::NotOpen;
    };

    if let Err(errors) = form.validate() {
      return SubmitAttempt::Invalid(errors);
    }

    let request = UpdateRequest {
      id:      record.id,
      payload: build_payload(form)
    };
    debug!(
      id = request.id,
      fields = request.payload.len(),
      "dispatching update"
    );
    self.phase = DialogPhase::Submitting;
    SubmitAttempt::Dispatch(request)
  }

  /// Applies the outcome of the request
  /// returned by
  /// [`EditTaskDialog::begin_submit`].
  pub fn complete_submit(
    &mut self,
    result: Result<(), UpdateError>
  ) -> Result<DialogPhase, DialogError> {
    if self.phase != DialogPhase::Submitting
    {
      return Err(
        DialogError::NotSubmitting(
          self.phase
        )
      );
    }
    self.finish(result);
    Ok(self.phase)
  }

  /// Runs a whole submit against
  /// `updater`.
  pub async fn submit<U>(
    &mut self,
    updater: &U
  ) -> SubmitOutcome
  where
    U: TaskUpdater
  {
    let request = match self.begin_submit()
    {
      | SubmitAttempt::Dispatch(request) => {
        request
      }
      | SubmitAttempt::Invalid(errors) => {
        return SubmitOutcome::Invalid(
          errors
        );
      }
      | SubmitAttempt::InFlight => {
        return SubmitOutcome::InFlight;
      }
      | SubmitAttempt::NotOpen => {
        return SubmitOutcome::NotOpen;
      }
    };

    let result = updater
      .update_record(
        request.id,
        &request.payload
      )
      .await;
    if self.finish(result) {
      SubmitOutcome::Saved
    } else {
      SubmitOutcome::Failed
    }
  }

  /// Drains notifications raised since
  /// the last call.
  pub fn take_toasts(&mut self) -> Vec<Toast> {
    std::mem::take(&mut self.toasts)
  }

  fn finish(
    &mut self,
    result: Result<(), UpdateError>
  ) -> bool {
    match result {
      | Ok(()) => {
        let notified = self
          .bus
          .publish(&self.settings.cache_tag);
        info!(notified, "task updated");
        self.close();
        self.toasts.push(Toast::success(
          self.settings.success_life
        ));
        true
      }
      | Err(err) => {
        warn!(error = %err, "task update failed");
        self.phase = DialogPhase::Editing;
        self.toasts.push(Toast::failure(
          &err,
          self.settings.failure_life
        ));
        false
      }
    }
  }

  fn close(&mut self) {
    if let (Some(form), Some(record)) =
      (self.form.as_mut(), self.record.as_ref())
    {
      form.reset(record);
    }
    self.phase = DialogPhase::Closed;
  }

  fn editing_form(
    &mut self
  ) -> Result<&mut FormController, DialogError>
  {
    if self.phase != DialogPhase::Editing {
      return Err(DialogError::NotEditing(
        self.phase
      ));
    }
    self.form.as_mut().ok_or(
      DialogError::NotEditing(self.phase)
    )
  }
}
