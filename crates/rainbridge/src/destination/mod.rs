//! Karakeep destination client.

mod types;

pub use types::*;

use crate::error::Result;
use crate::http::{ApiRequest, RequestExecutor, StatusCode};
use async_trait::async_trait;

/// Default Karakeep API endpoint.
pub const DEFAULT_KARAKEEP_URL: &str = "https://api.karakeep.app/v1";

/// Write access to the service bookmarks are migrated into.
#[async_trait]
pub trait BookmarkDestination: Send + Sync {
    /// Create a folder and return it with its assigned identifier.
    async fn create_folder(&self, folder: &DestinationFolder) -> Result<DestinationFolder>;

    /// Create an item and return it with its assigned identifier.
    async fn create_item(&self, item: &DestinationItem) -> Result<DestinationItem>;

    /// Attach an existing item to an existing folder.
    async fn link_item(&self, item_id: &str, folder_id: &str) -> Result<()>;
}

/// Listing and deletion, used by cleanup tooling rather than the import.
#[async_trait]
pub trait DestinationMaintenance: Send + Sync {
    async fn list_items(&self) -> Result<Vec<DestinationItem>>;

    async fn list_folders(&self) -> Result<Vec<DestinationFolder>>;

    async fn delete_item(&self, item_id: &str) -> Result<()>;

    async fn delete_folder(&self, folder_id: &str) -> Result<()>;
}

/// Client for the Karakeep REST API.
#[derive(Debug, Clone)]
pub struct KarakeepClient {
    base_url: String,
    token: String,
    executor: RequestExecutor,
}

impl KarakeepClient {
    /// Create a client. A trailing slash on `base_url` is ignored.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, executor: RequestExecutor) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            executor,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request whose body is ignored, accepting any of `accepted`.
    async fn send_expecting(
        &self,
        request: ApiRequest,
        operation: &str,
        accepted: &[StatusCode],
    ) -> Result<()> {
        let request = request.bearer_auth(&self.token)?;
        self.executor
            .execute(&request)
            .await?
            .expect_status(operation, accepted)?;
        Ok(())
    }
}

#[async_trait]
impl BookmarkDestination for KarakeepClient {
    async fn create_folder(&self, folder: &DestinationFolder) -> Result<DestinationFolder> {
        const OPERATION: &str = "create list";

        let request = ApiRequest::post(self.url("/lists"))
            .json(folder)?
            .bearer_auth(&self.token)?;

        self.executor
            .execute(&request)
            .await?
            .expect_status(OPERATION, &[StatusCode::CREATED])?
            .decode(OPERATION)
    }

    async fn create_item(&self, item: &DestinationItem) -> Result<DestinationItem> {
        const OPERATION: &str = "create bookmark";

        let request = ApiRequest::post(self.url("/bookmarks"))
            .json(item)?
            .bearer_auth(&self.token)?;

        self.executor
            .execute(&request)
            .await?
            .expect_status(OPERATION, &[StatusCode::CREATED])?
            .decode(OPERATION)
    }

    async fn link_item(&self, item_id: &str, folder_id: &str) -> Result<()> {
        let request = ApiRequest::post(self.url(&format!(
            "/lists/{}/bookmarks/{}",
            folder_id, item_id
        )));
        self.send_expecting(
            request,
            "add bookmark to list",
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
    }
}

#[async_trait]
impl DestinationMaintenance for KarakeepClient {
    async fn list_items(&self) -> Result<Vec<DestinationItem>> {
        const OPERATION: &str = "get bookmarks";

        let request = ApiRequest::get(self.url("/bookmarks")).bearer_auth(&self.token)?;
        self.executor
            .execute(&request)
            .await?
            .expect_status(OPERATION, &[StatusCode::OK])?
            .decode(OPERATION)
    }

    async fn list_folders(&self) -> Result<Vec<DestinationFolder>> {
        const OPERATION: &str = "get lists";

        let request = ApiRequest::get(self.url("/lists")).bearer_auth(&self.token)?;
        self.executor
            .execute(&request)
            .await?
            .expect_status(OPERATION, &[StatusCode::OK])?
            .decode(OPERATION)
    }

    async fn delete_item(&self, item_id: &str) -> Result<()> {
        let request = ApiRequest::delete(self.url(&format!("/bookmarks/{}", item_id)));
        self.send_expecting(
            request,
            "delete bookmark",
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
    }

    async fn delete_folder(&self, folder_id: &str) -> Result<()> {
        let request = ApiRequest::delete(self.url(&format!("/lists/{}", folder_id)));
        self.send_expecting(
            request,
            "delete list",
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
    }
}
