use gloo::net::http::Request;
use taskedit_core::config::ApiSettings;
use taskedit_core::{
    TaskUpdater,
    UpdateError,
};
use taskedit_shared::{
    ErrorResponse,
    RecordListEnvelope,
    TaskRecord,
    UpdateEnvelope,
    UpdatePayload,
};

/// Browser-side `TaskUpdater` over fetch.
#[derive(Debug, Clone)]
pub struct HttpUpdater {
    api: ApiSettings,
}

impl HttpUpdater {
    pub fn new(api: ApiSettings) -> Self {
        Self { api }
    }
}

impl TaskUpdater for HttpUpdater {
    async fn update_record(&self, id: u64, payload: &UpdatePayload) -> Result<(), UpdateError> {
        let url = self.api.record_url(id);
        let request = Request::put(&url)
            .json(&UpdateEnvelope { data: payload })
            .map_err(|e| UpdateError::Encode(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| UpdateError::Transport(e.to_string()))?;

        if response.ok() {
            return Ok(());
        }

        let status = response.status();
        let body = match response.text().await {
            Ok(text) => serde_json::from_str::<ErrorResponse>(&text).ok(),
            Err(err) => {
                tracing::debug!(error = %err, "unreadable error body");
                None
            }
        };
        Err(UpdateError::rejected(status, body))
    }
}

pub async fn fetch_tasks(api: &ApiSettings) -> Result<Vec<TaskRecord>, String> {
    let url = api.resource_url();
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("request error: {e}"))?;
    if !response.ok() {
        return Err(format!("records API returned HTTP {}", response.status()));
    }
    let text = response
        .text()
        .await
        .map_err(|e| format!("read error: {e}"))?;
    serde_json::from_str::<RecordListEnvelope>(&text)
        .map(|envelope| envelope.data)
        .map_err(|e| format!("decode error: {e}"))
}
