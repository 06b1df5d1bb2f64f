use reqwest::{
  Client,
  Response,
  Url
};
use taskedit_core::config::ApiSettings;
use taskedit_core::{
  TaskUpdater,
  UpdateError
};
use taskedit_shared::{
  ErrorResponse,
  RecordEnvelope,
  TaskRecord,
  UpdateEnvelope,
  UpdatePayload
};
use tracing::{
  debug,
  info,
  warn
};

use crate::error::{
  ClientError,
  Result
};

/// REST client for one records
/// resource, e.g. `/api/tasks`.
#[derive(Debug, Clone)]
pub struct RecordsClient {
  http:         Client,
  resource_url: Url
}

impl RecordsClient {
  pub fn new(
    settings: &ApiSettings
  ) -> Result<Self> {
    let http = Client::builder()
      .timeout(settings.timeout)
      .build()?;
    let resource_url =
      Url::parse(&settings.resource_url())?;
    if resource_url.cannot_be_a_base() {
      return Err(ClientError::NotABase(
        resource_url.to_string()
      ));
    }

    debug!(url = %resource_url, "records client ready");
    Ok(Self {
      http,
      resource_url
    })
  }

  pub fn record_url(&self, id: u64) -> Url {
    let mut url = self.resource_url.clone();
    if let Ok(mut segments) =
      url.path_segments_mut()
    {
      segments
        .pop_if_empty()
        .push(&id.to_string());
    }
    url
  }

  #[tracing::instrument(skip(self))]
  pub async fn fetch_record(
    &self,
    id: u64
  ) -> Result<TaskRecord> {
    let response = self
      .http
      .get(self.record_url(id))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = error_body(response).await;
      return Err(ClientError::Status {
        status:  status.as_u16(),
        message: body
          .as_ref()
          .and_then(|b| b.message())
          .map(str::to_string)
      });
    }

    let text = response.text().await?;
    let envelope: RecordEnvelope =
      serde_json::from_str(&text)?;
    debug!(id = envelope.data.id, "fetched record");
    Ok(envelope.data)
  }
}

impl TaskUpdater for RecordsClient {
  #[tracing::instrument(skip(self, payload), fields(fields = payload.len()))]
  async fn update_record(
    &self,
    id: u64,
    payload: &UpdatePayload
  ) -> std::result::Result<(), UpdateError>
  {
    let url = self.record_url(id);
    let response = self
      .http
      .put(url.clone())
      .json(&UpdateEnvelope { data: payload })
      .send()
      .await
      .map_err(|err| {
        warn!(url = %url, error = %err, "update request failed");
        UpdateError::Transport(err.to_string())
      })?;

    let status = response.status();
    if status.is_success() {
      info!(id, status = status.as_u16(), "record updated");
      return Ok(());
    }

    let body = error_body(response).await;
    warn!(
      id,
      status = status.as_u16(),
      message = body.as_ref().and_then(|b| b.message()),
      "update rejected"
    );
    Err(UpdateError::rejected(
      status.as_u16(),
      body
    ))
  }
}

/// Best-effort decode of an error body;
/// anything unreadable counts as absent.
async fn error_body(
  response: Response
) -> Option<ErrorResponse> {
  let text = match response.text().await {
    | Ok(text) => text,
    | Err(err) => {
      debug!(error = %err, "unreadable error body");
      return None;
    }
  };
  match serde_json::from_str(&text) {
    | Ok(body) => Some(body),
    | Err(err) => {
      debug!(error = %err, "error body is not JSON");
      None
    }
  }
}
