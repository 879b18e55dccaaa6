//! Mock object storage server
//!
//! Answers the unsigned upload endpoint the storage client calls:
//! `POST /{cloud_name}/{resource_type}/upload`.

use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};
use mp_tourify::config::StorageConfig;

pub const TEST_CLOUD_NAME: &str = "tourify-test";

pub struct StorageMockServer {
    pub server: MockServer,
}

impl StorageMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Storage settings pointing at this server
    pub fn config(&self) -> StorageConfig {
        StorageConfig {
            base_url: self.server.uri(),
            cloud_name: TEST_CLOUD_NAME.to_string(),
            upload_preset: "tourify_unsigned".to_string(),
            folder: "mp-tourify".to_string(),
            timeout_seconds: 5,
            max_file_size_mb: 1,
        }
    }

    fn upload_path(resource_type: &str) -> String {
        format!("/{}/{}/upload", TEST_CLOUD_NAME, resource_type)
    }

    /// Accept uploads of `resource_type`, expecting exactly `times` calls
    pub async fn mock_upload_success(&self, resource_type: &str, public_id: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(Self::upload_path(resource_type)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "public_id": public_id,
                "secure_url": format!("https://cdn.example.org/{}/{}", resource_type, public_id),
                "url": format!("http://cdn.example.org/{}/{}", resource_type, public_id),
                "resource_type": resource_type,
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Reject uploads of `resource_type` with `status`
    pub async fn mock_upload_failure(&self, resource_type: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(Self::upload_path(resource_type)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": { "message": "Upload preset not found" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer with a body missing every URL field
    pub async fn mock_upload_malformed(&self, resource_type: &str) {
        Mock::given(method("POST"))
            .and(path(Self::upload_path(resource_type)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "public_id": "orphan" })))
            .mount(&self.server)
            .await;
    }

    /// Fail the test if an upload reaches the server
    pub async fn expect_no_uploads(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}
