use std::collections::BTreeMap;

use taskedit_core::config::ApiSettings;
use taskedit_core::notify::Toast;
use taskedit_core::schema::SelectSource;
use taskedit_core::{
  DialogPhase,
  DialogSettings,
  EditTaskDialog,
  FieldKind,
  FieldName,
  FieldValue,
  InvalidationBus,
  SubmitAttempt,
  TaskUpdater
};
use taskedit_shared::{
  SelectOption,
  TaskRecord
};
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  TargetCast,
  classes,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref,
  use_state
};

use crate::api::HttpUpdater;

#[derive(Properties, PartialEq)]
pub struct FieldInputProps {
  pub name:      FieldName,
  pub label:     String,
  pub kind:      FieldKind,
  pub value:     String,
  pub error:     Option<String>,
  #[prop_or_default]
  pub options:   Vec<SelectOption>,
  pub disabled:  bool,
  pub on_change:
    Callback<(FieldName, String)>
}

#[function_component(FieldInput)]
pub fn field_input(
  props: &FieldInputProps
) -> Html {
  let name = props.name;
  let id =
    format!("field-{}", name.as_str());
  let class = classes!(
    "field",
    props.error.as_ref().map(|_| "invalid")
  );

  let control = match props.kind {
    | FieldKind::Select(_) => {
      let on_change =
        props.on_change.clone();
      let onchange = Callback::from(
        move |e: web_sys::Event| {
          let select: HtmlSelectElement =
            e.target_unchecked_into();
          on_change
            .emit((name, select.value()));
        }
      );
      html! {
          <select id={id.clone()} onchange={onchange} disabled={props.disabled}>
              <option value="" selected={props.value.is_empty()}>{ "Select" }</option>
              {
                  for props.options.iter().map(|option| html! {
                      <option
                          value={option.value.clone()}
                          selected={option.value == props.value}
                      >
                          { option.label.clone() }
                      </option>
                  })
              }
          </select>
      }
    }
    | kind => {
      let on_change =
        props.on_change.clone();
      let oninput = Callback::from(
        move |e: web_sys::InputEvent| {
          let input: HtmlInputElement =
            e.target_unchecked_into();
          on_change
            .emit((name, input.value()));
        }
      );
      html! {
          <input
              id={id.clone()}
              type={kind.input_type()}
              step={(kind == FieldKind::Number).then_some("any")}
              value={props.value.clone()}
              oninput={oninput}
              disabled={props.disabled}
          />
      }
    }
  };

  html! {
      <div class={class}>
          <label for={id}>{ props.label.clone() }</label>
          { control }
          {
              if let Some(err) = props.error.clone() {
                  html! { <small class="field-error">{ err }</small> }
              } else {
                  html! {}
              }
          }
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct ToastStackProps {
  pub toasts:     Vec<(u64, Toast)>,
  pub on_dismiss: Callback<u64>
}

#[function_component(ToastStack)]
pub fn toast_stack(
  props: &ToastStackProps
) -> Html {
  html! {
      <div class="toasts">
          {
              for props.toasts.iter().map(|(id, toast)| {
                  let id = *id;
                  let on_dismiss = props.on_dismiss.clone();
                  html! {
                      <div
                          class={classes!("toast", toast.severity.as_str())}
                          onclick={move |_| on_dismiss.emit(id)}
                      >
                          <div class="summary">{ toast.summary.clone() }</div>
                          <div class="detail">{ toast.detail.clone() }</div>
                      </div>
                  }
              })
          }
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct EditTaskModalProps {
  pub visible:          bool,
  pub record:           TaskRecord,
  pub bus:              InvalidationBus,
  pub api:              ApiSettings,
  pub settings:         DialogSettings,
  pub reviewer_options: Vec<SelectOption>,
  pub status_options:   Vec<SelectOption>,
  pub on_hide:          Callback<()>,
  pub on_toasts:        Callback<Vec<Toast>>
}

#[function_component(EditTaskModal)]
pub fn edit_task_modal(
  props: &EditTaskModalProps
) -> Html {
  let dialog = {
    let bus = props.bus.clone();
    let settings = props.settings.clone();
    use_mut_ref(move || {
      EditTaskDialog::mount(bus, settings)
    })
  };
  let redraw = use_force_update();
  let input_errors = use_state(
    BTreeMap::<FieldName, String>::new
  );

  {
    let dialog = dialog.clone();
    let record = props.record.clone();
    let redraw = redraw.clone();
    let input_errors = input_errors.clone();
    use_effect_with(
      (props.visible, props.record.id),
      move |(visible, _)| {
        if *visible {
          if let Err(err) =
            dialog.borrow_mut().open(record)
          {
            tracing::warn!(error = %err, "could not open edit dialog");
          }
          input_errors.set(BTreeMap::new());
        } else {
          dialog.borrow_mut().cancel();
        }
        redraw.force_update();
      }
    );
  }

  let on_field_change = {
    let dialog = dialog.clone();
    let redraw = redraw.clone();
    let input_errors = input_errors.clone();
    let reviewer_options =
      props.reviewer_options.clone();
    let status_options =
      props.status_options.clone();
    Callback::from(
      move |(name, raw): (
        FieldName,
        String
      )| {
        let result = match name.kind() {
          | FieldKind::Select(source) => {
            let options = match source {
              | SelectSource::Reviewer => {
                &reviewer_options
              }
              | SelectSource::Status => {
                &status_options
              }
            };
            let value = options
              .iter()
              .find(|option| {
                option.value == raw
              })
              .cloned()
              .map(FieldValue::Choice)
              .unwrap_or_default();
            dialog
              .borrow_mut()
              .set_field(name, value)
          }
          | _ => {
            dialog
              .borrow_mut()
              .set_input(name, &raw)
          }
        };

        let mut errors =
          (*input_errors).clone();
        match result {
          | Ok(()) => {
            errors.remove(&name);
          }
          | Err(err) => {
            tracing::debug!(field = %name, error = %err, "rejected input");
            errors.insert(name, err.to_string());
          }
        }
        input_errors.set(errors);
        redraw.force_update();
      }
    )
  };

  // Cancel button, header close and
  // backdrop click all land here. The
  // dialog refuses while an update is
  // in flight.
  let on_close = {
    let dialog = dialog.clone();
    let on_hide = props.on_hide.clone();
    let redraw = redraw.clone();
    Callback::from(move |_: MouseEvent| {
      if dialog.borrow_mut().cancel() {
        on_hide.emit(());
      }
      redraw.force_update();
    })
  };

  let on_submit = {
    let dialog = dialog.clone();
    let redraw = redraw.clone();
    let api = props.api.clone();
    let on_hide = props.on_hide.clone();
    let on_toasts = props.on_toasts.clone();
    Callback::from(move |_: MouseEvent| {
      let attempt =
        dialog.borrow_mut().begin_submit();
      let request = match attempt {
        | SubmitAttempt::Dispatch(
          request
        ) => request,
        | SubmitAttempt::Invalid(errors) => {
          tracing::debug!(count = errors.len(), "submit blocked by validation");
          redraw.force_update();
          return;
        }
        | SubmitAttempt::InFlight
        | SubmitAttempt::NotOpen => return
      };
      redraw.force_update();

      let dialog = dialog.clone();
      let redraw = redraw.clone();
      let updater =
        HttpUpdater::new(api.clone());
      let on_hide = on_hide.clone();
      let on_toasts = on_toasts.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let result = updater
            .update_record(
              request.id,
              &request.payload
            )
            .await;
          let phase = dialog
            .borrow_mut()
            .complete_submit(result);
          let toasts =
            dialog.borrow_mut().take_toasts();
          on_toasts.emit(toasts);
          match phase {
            | Ok(DialogPhase::Closed) => {
              on_hide.emit(())
            }
            | Ok(_) => {}
            | Err(err) => {
              tracing::warn!(error = %err, "stray update completion")
            }
          }
          redraw.force_update();
        }
      );
    })
  };

  let view = dialog.borrow();
  if !props.visible || !view.is_open() {
    return html! {};
  }
  let Some(form) = view.form() else {
    return html! {};
  };
  let busy =
    view.phase() == DialogPhase::Submitting;

  html! {
      <div class="modal-backdrop" onclick={on_close.clone()}>
          <div class="modal" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
              <div class="header">
                  <span>{ "Edit Task" }</span>
                  <button
                      type="button"
                      class="close"
                      title="Close"
                      onclick={on_close.clone()}
                      disabled={busy}
                  >
                      { "×" }
                  </button>
              </div>
              <div class="content">
                  <div class="grid">
                      {
                          for form.descriptors().iter().enumerate().map(|(index, descriptor)| {
                              let name = descriptor.name;
                              let options = match descriptor.kind {
                                  FieldKind::Select(SelectSource::Reviewer) => {
                                      with_current(&props.reviewer_options, form.value(name))
                                  }
                                  FieldKind::Select(SelectSource::Status) => {
                                      with_current(&props.status_options, form.value(name))
                                  }
                                  _ => Vec::new(),
                              };
                              let error = input_errors
                                  .get(&name)
                                  .cloned()
                                  .or_else(|| form.error(name).map(str::to_string));
                              let side = if index % 2 == 0 { "pr-3" } else { "pl-3" };
                              html! {
                                  <div class={classes!("col-6", side)}>
                                      <FieldInput
                                          name={name}
                                          label={descriptor.label.to_string()}
                                          kind={descriptor.kind}
                                          value={form.value(name).display()}
                                          error={error}
                                          options={options}
                                          disabled={busy}
                                          on_change={on_field_change.clone()}
                                      />
                                  </div>
                              }
                          })
                      }
                  </div>
                  <div class="footer">
                      <button
                          id="cancel"
                          type="button"
                          class="btn outlined"
                          onclick={on_close}
                          disabled={busy}
                      >
                          { "Cancel" }
                      </button>
                      <button
                          id="submit"
                          type="button"
                          class="btn"
                          onclick={on_submit}
                          disabled={!view.is_submit_enabled()}
                      >
                          { if busy { "Saving..." } else { "Submit" } }
                      </button>
                  </div>
              </div>
          </div>
      </div>
  }
}

/// Options for a select, plus the
/// record's current code when the list
/// does not carry it yet.
fn with_current(
  options: &[SelectOption],
  current: &FieldValue
) -> Vec<SelectOption> {
  let mut options = options.to_vec();
  let code = current.display();
  if !code.is_empty()
    && !options
      .iter()
      .any(|option| option.value == code)
  {
    options.push(SelectOption::new(
      code.clone(),
      code
    ));
  }
  options
}

#[cfg(test)]
mod tests {
  use taskedit_core::FieldValue;
  use taskedit_shared::{
    SelectOption,
    StatusRef
  };

  use super::with_current;

  #[test]
  fn keeps_record_code_missing_from_options() {
    let options =
      vec![SelectOption::new("Open", "OPEN")];
    let current =
      FieldValue::Status(StatusRef {
        status: "HOLD".to_string()
      });
    let merged =
      with_current(&options, &current);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[1].value, "HOLD");

    let known =
      FieldValue::Status(StatusRef {
        status: "OPEN".to_string()
      });
    assert_eq!(
      with_current(&options, &known).len(),
      1
    );
  }
}
