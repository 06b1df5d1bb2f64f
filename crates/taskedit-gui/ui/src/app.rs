use std::collections::BTreeSet;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use taskedit_core::config::ApiSettings;
use taskedit_core::notify::Toast;
use taskedit_core::{
  DialogSettings,
  InvalidationBus
};
use taskedit_shared::{
  SelectOption,
  TaskRecord
};
use yew::{
  Callback,
  Html,
  Reducible,
  function_component,
  html,
  use_effect_with,
  use_memo,
  use_mut_ref,
  use_reducer,
  use_state
};

use crate::api::fetch_tasks;
use crate::components::{
  EditTaskModal,
  ToastStack
};

#[derive(Default, PartialEq)]
struct ToastState {
  toasts: Vec<(u64, Toast)>
}

enum ToastAction {
  Push(u64, Toast),
  Dismiss(u64)
}

impl Reducible for ToastState {
  type Action = ToastAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut toasts = self.toasts.clone();
    match action {
      | ToastAction::Push(id, toast) => {
        toasts.push((id, toast));
      }
      | ToastAction::Dismiss(id) => {
        toasts.retain(|(tid, _)| *tid != id);
      }
    }
    Rc::new(ToastState { toasts })
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let api = ApiSettings::default();
  let settings = DialogSettings::default();
  let bus =
    use_memo((), |_| InvalidationBus::new());

  let tasks =
    use_state(Vec::<TaskRecord>::new);
  let load_error =
    use_state(|| None::<String>);
  let editing =
    use_state(|| None::<TaskRecord>);
  let toasts =
    use_reducer(ToastState::default);
  let next_toast_id = use_mut_ref(|| 0_u64);

  {
    let bus = bus.clone();
    let api = api.clone();
    let tasks = tasks.clone();
    let load_error = load_error.clone();
    let cache_tag =
      settings.cache_tag.clone();
    use_effect_with((), move |_| {
      let reload = {
        let tasks = tasks.clone();
        let load_error = load_error.clone();
        move || {
          let api = api.clone();
          let tasks = tasks.clone();
          let load_error =
            load_error.clone();
          wasm_bindgen_futures::spawn_local(
            async move {
              match fetch_tasks(&api).await {
                | Ok(list) => {
                  tracing::debug!(
                    count = list.len(),
                    "tasks loaded"
                  );
                  load_error.set(None);
                  tasks.set(list);
                }
                | Err(err) => {
                  tracing::warn!(error = %err, "failed loading tasks");
                  load_error.set(Some(err));
                }
              }
            }
          );
        }
      };

      reload();
      let subscription =
        bus.subscribe(cache_tag, move |_| {
          reload();
        });
      move || {
        bus.unsubscribe(subscription);
      }
    });
  }

  let on_toasts = {
    let toasts = toasts.dispatcher();
    let next_toast_id = next_toast_id.clone();
    Callback::from(
      move |new: Vec<Toast>| {
        for toast in new {
          let id = {
            let mut next =
              next_toast_id.borrow_mut();
            *next += 1;
            *next
          };
          let millis = u32::try_from(
            toast.life.as_millis()
          )
          .unwrap_or(u32::MAX);
          let dismiss = toasts.clone();
          Timeout::new(millis, move || {
            dismiss
              .dispatch(ToastAction::Dismiss(id));
          })
          .forget();
          toasts.dispatch(ToastAction::Push(
            id, toast
          ));
        }
      }
    )
  };

  let on_dismiss = {
    let toasts = toasts.dispatcher();
    Callback::from(move |id: u64| {
      toasts.dispatch(ToastAction::Dismiss(id));
    })
  };

  let on_hide = {
    let editing = editing.clone();
    Callback::from(move |()| {
      editing.set(None);
    })
  };

  let (reviewer_options, status_options) =
    select_options(&tasks);

  html! {
    <>
      <ToastStack
        toasts={toasts.toasts.clone()}
        on_dismiss={on_dismiss}
      />
      <div class="panel">
        <div class="header">{ "Tasks" }</div>
        {
          if let Some(err) = (*load_error).clone() {
            html! { <div class="form-error">{ err }</div> }
          } else {
            html! {}
          }
        }
        <table>
          <thead>
            <tr>
              <th>{ "File No" }</th>
              <th>{ "Est" }</th>
              <th>{ "Start" }</th>
              <th>{ "End" }</th>
              <th>{ "Reviewer" }</th>
              <th>{ "Status" }</th>
              <th>{ "Remarks" }</th>
              <th></th>
            </tr>
          </thead>
          <tbody>
            {
              for tasks.iter().map(|task| {
                let on_edit = {
                  let editing = editing.clone();
                  let task = task.clone();
                  Callback::from(move |_| editing.set(Some(task.clone())))
                };
                html! {
                  <tr key={task.id.to_string()}>
                    <td>{ opt_text(task.file_no.as_ref().map(|n| n.to_string())) }</td>
                    <td>{ opt_text(task.est.as_ref().map(|n| n.to_string())) }</td>
                    <td>{ opt_text(task.start_date.clone()) }</td>
                    <td>{ opt_text(task.end_date.clone()) }</td>
                    <td>{ opt_text(task.reviewer.as_ref().map(|r| r.reviewer.clone())) }</td>
                    <td>{ opt_text(task.status.as_ref().map(|s| s.status.clone())) }</td>
                    <td>{ opt_text(task.remarks.clone()) }</td>
                    <td><button class="btn" onclick={on_edit}>{ "Edit" }</button></td>
                  </tr>
                }
              })
            }
          </tbody>
        </table>
      </div>
      <EditTaskModal
        visible={editing.is_some()}
        record={(*editing).clone().unwrap_or_else(|| TaskRecord::new(0))}
        bus={(*bus).clone()}
        api={api}
        settings={settings}
        reviewer_options={reviewer_options}
        status_options={status_options}
        on_hide={on_hide}
        on_toasts={on_toasts}
      />
    </>
  }
}

fn opt_text(value: Option<String>) -> String {
  value.unwrap_or_else(|| "—".to_string())
}

/// Reviewer and status codes seen across
/// the loaded tasks.
fn select_options(
  tasks: &[TaskRecord]
) -> (Vec<SelectOption>, Vec<SelectOption>)
{
  let reviewers: BTreeSet<&str> = tasks
    .iter()
    .filter_map(|t| t.reviewer.as_ref())
    .map(|r| r.reviewer.as_str())
    .filter(|code| !code.is_empty())
    .collect();
  let statuses: BTreeSet<&str> = tasks
    .iter()
    .filter_map(|t| t.status.as_ref())
    .map(|s| s.status.as_str())
    .filter(|code| !code.is_empty())
    .collect();

  let to_options = |codes: BTreeSet<&str>| {
    codes
      .into_iter()
      .map(|code| SelectOption::new(code, code))
      .collect::<Vec<_>>()
  };
  (to_options(reviewers), to_options(statuses))
}

#[cfg(test)]
mod tests {
  use taskedit_shared::{
    ReviewerRef,
    StatusRef,
    TaskRecord
  };

  use super::select_options;

  fn task(
    id: u64,
    reviewer: &str,
    status: &str
  ) -> TaskRecord {
    let mut task = TaskRecord::new(id);
    task.reviewer = Some(ReviewerRef {
      reviewer: reviewer.to_string()
    });
    task.status = Some(StatusRef {
      status: status.to_string()
    });
    task
  }

  #[test]
  fn collects_distinct_sorted_codes() {
    let tasks = vec![
      task(1, "CD", "OPEN"),
      task(2, "AB", "OPEN"),
      task(3, "", "DONE"),
    ];
    let (reviewers, statuses) =
      select_options(&tasks);
    let reviewer_codes: Vec<&str> = reviewers
      .iter()
      .map(|o| o.value.as_str())
      .collect();
    let status_codes: Vec<&str> = statuses
      .iter()
      .map(|o| o.value.as_str())
      .collect();
    assert_eq!(reviewer_codes, ["AB", "CD"]);
    assert_eq!(status_codes, ["DONE", "OPEN"]);
  }
}
