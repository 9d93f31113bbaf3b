//! REST binding of the remote store.
//!
//! Routes follow the video library API: `/folders/` for the folder
//! collection, `/folders/{id}` for a single folder, `/videos/` and
//! `/videos/{id}` for videos. Error bodies carry a `detail` field whose
//! text is preserved verbatim on the resulting [`AppError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use foldertree_core::config::remote::RemoteConfig;
use foldertree_core::error::{AppError, ErrorKind};
use foldertree_core::result::AppResult;
use foldertree_core::types::{FolderId, VideoId};
use foldertree_entity::folder::{CreateFolder, Folder, FolderUpdate};
use foldertree_entity::video::{AssignVideoFolder, Video};

use crate::store::{FolderStore, VideoStore};

/// HTTP client for the folder and video API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    /// Shared connection pool.
    client: Client,
    /// Base URL without trailing slash.
    base_url: String,
    /// Optional bearer token.
    token: Option<String>,
}

impl HttpStore {
    /// Build a client from configuration.
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Absolute URL for an API path (path starts with `/`).
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> AppResult<T> {
        let response = self.dispatch(req).await?;
        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Invalid response body: {e}"),
                e,
            )
        })
    }

    /// Send a request and discard the body.
    async fn send_empty(&self, req: RequestBuilder) -> AppResult<()> {
        self.dispatch(req).await.map(|_| ())
    }

    async fn dispatch(&self, req: RequestBuilder) -> AppResult<reqwest::Response> {
        let response = self.authorize(req).send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Request failed: {e}"),
                e,
            )
        })?;

        let status = response.status();
        debug!(status = %status, url = %response.url(), "Remote store responded");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }
}

/// Map a non-success response to an [`AppError`], keeping the server's
/// `detail` text when the body has one.
pub fn error_from_response(status: StatusCode, body: &str) -> AppError {
    let kind = match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
        StatusCode::UNAUTHORIZED => ErrorKind::Authentication,
        StatusCode::FORBIDDEN => ErrorKind::Authorization,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        StatusCode::SERVICE_UNAVAILABLE => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::ExternalService,
    };

    let err = AppError::new(kind, format!("Remote store returned {status}"));
    match extract_detail(body) {
        Some(detail) => err.with_detail(detail),
        None => err,
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"detail": "..."}`, a list of `{"msg": "..."}` validation
/// entries under `detail`, or `{"message": "..."}`.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    match value.get("detail") {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl FolderStore for HttpStore {
    async fn list_folders(&self) -> AppResult<Vec<Folder>> {
        self.send_json(self.client.get(self.url("/folders/"))).await
    }

    async fn create_folder(&self, req: &CreateFolder) -> AppResult<Folder> {
        self.send_json(self.client.post(self.url("/folders/")).json(req))
            .await
    }

    async fn rename_folder(&self, id: FolderId, name: &str) -> AppResult<Folder> {
        let body = FolderUpdate::Rename {
            name: name.to_string(),
        };
        self.send_json(self.client.put(self.url(&format!("/folders/{id}"))).json(&body))
            .await
    }

    async fn move_folder(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder> {
        let body = FolderUpdate::Move { parent_id };
        self.send_json(self.client.put(self.url(&format!("/folders/{id}"))).json(&body))
            .await
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<()> {
        self.send_empty(self.client.delete(self.url(&format!("/folders/{id}"))))
            .await
    }
}

#[async_trait]
impl VideoStore for HttpStore {
    async fn list_videos(&self) -> AppResult<Vec<Video>> {
        self.send_json(self.client.get(self.url("/videos/"))).await
    }

    async fn assign_folder(&self, id: VideoId, folder_id: Option<FolderId>) -> AppResult<Video> {
        let body = AssignVideoFolder { folder_id };
        self.send_json(self.client.put(self.url(&format!("/videos/{id}"))).json(&body))
            .await
    }
}
