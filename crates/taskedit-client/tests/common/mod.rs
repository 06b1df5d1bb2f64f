use std::time::Duration;

use taskedit_client::RecordsClient;
use taskedit_core::config::ApiSettings;
use wiremock::MockServer;

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> RecordsClient {
    let settings = ApiSettings {
        base_url: format!("{}/api", server.uri()),
        resource: "tasks".to_string(),
        timeout: Duration::from_secs(5),
    };
    RecordsClient::new(&settings).expect("client")
}
