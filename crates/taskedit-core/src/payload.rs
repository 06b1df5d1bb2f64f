use taskedit_shared::UpdatePayload;
use tracing::trace;

use crate::form::FormController;

/// Partial update for the fields the user
/// changed. Empty values are left out;
/// select values contribute only their
/// scalar code.
pub fn build_payload(
  form: &FormController
) -> UpdatePayload {
  let mut payload = UpdatePayload::new();
  for name in form.dirty_fields() {
    match form.value(name).payload_value() {
      | Some(value) => {
        payload.insert(name.as_str(), value);
      }
      | None => {
        trace!(field = %name, "omitting empty field");
      }
    }
  }
  payload
}
