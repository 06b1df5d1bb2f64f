pub mod cli;

use std::ffi::OsString;

use anyhow::{
  Context,
  anyhow,
  bail
};
use taskedit_client::RecordsClient;
use taskedit_core::config::{
  ApiSettings,
  Config
};
use taskedit_core::notify::Toast;
use taskedit_core::{
  DialogSettings,
  EditTaskDialog,
  InvalidationBus,
  SubmitAttempt,
  SubmitOutcome
};
use tracing::{
  debug,
  info
};

use crate::cli::{
  FieldAssignment,
  GlobalCli
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli = GlobalCli::parse_args(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    id = cli.id,
    edits = cli.sets.len(),
    dry_run = cli.dry_run,
    "starting taskedit"
  );

  let mut cfg = Config::load(
    cli.taskeditrc.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );

  let api = cfg.api_settings()?;
  let settings = cfg.dialog_settings()?;

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;

  runtime.block_on(edit_task(
    &api,
    settings,
    cli.id,
    &cli.sets,
    cli.dry_run
  ))?;

  info!("done");
  Ok(())
}

async fn edit_task(
  api: &ApiSettings,
  settings: DialogSettings,
  id: u64,
  sets: &[FieldAssignment],
  dry_run: bool
) -> anyhow::Result<()> {
  let client = RecordsClient::new(api)
    .context(
      "failed to build records client"
    )?;

  let bus = InvalidationBus::new();
  bus.subscribe(
    settings.cache_tag.clone(),
    |event| {
      debug!(
        tag = %event.tag,
        sequence = event.sequence,
        "cached records marked stale"
      );
    }
  );
  let mut dialog =
    EditTaskDialog::mount(bus, settings);

  let record = client
    .fetch_record(id)
    .await
    .with_context(|| {
      format!("failed to fetch task {id}")
    })?;
  dialog.open(record)?;

  for set in sets {
    dialog
      .set_input(set.field, &set.raw)
      .with_context(|| {
        format!(
          "cannot set {} to {:?}",
          set.field, set.raw
        )
      })?;
  }

  if dry_run {
    return match dialog.begin_submit() {
      | SubmitAttempt::Dispatch(request) => {
        let text =
          serde_json::to_string_pretty(
            &request.payload
          )?;
        println!("{text}");
        Ok(())
      }
      | SubmitAttempt::Invalid(errors) => {
        Err(errors.into())
      }
      | other => {
        Err(anyhow!(
          "dialog refused to submit: \
           {other:?}"
        ))
      }
    };
  }

  let outcome =
    dialog.submit(&client).await;
  for toast in dialog.take_toasts() {
    print_toast(&toast);
  }

  match outcome {
    | SubmitOutcome::Saved => Ok(()),
    | SubmitOutcome::Failed => {
      bail!("update of task {id} failed")
    }
    | SubmitOutcome::Invalid(errors) => {
      Err(errors.into())
    }
    | other => {
      bail!(
        "dialog refused to submit: \
         {other:?}"
      )
    }
  }
}

fn print_toast(toast: &Toast) {
  println!(
    "[{}] {}: {}",
    toast.severity.as_str(),
    toast.summary,
    toast.detail
  );
}
