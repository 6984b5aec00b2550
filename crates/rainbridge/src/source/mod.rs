//! Raindrop.io source client.

mod types;

pub use types::*;

use crate::error::Result;
use crate::http::{ApiRequest, RequestExecutor, StatusCode};
use crate::pagination::Paginator;
use async_trait::async_trait;
use tracing::debug;

/// Default Raindrop.io REST endpoint.
pub const DEFAULT_RAINDROP_URL: &str = "https://api.raindrop.io/rest/v1";

/// Items requested per page. Raindrop.io caps `perpage` at 50.
pub const PAGE_SIZE: usize = 50;

/// Read access to the service bookmarks are migrated from.
#[async_trait]
pub trait BookmarkSource: Send + Sync {
    /// List every folder. The endpoint returns the full set in one response.
    async fn list_folders(&self) -> Result<Vec<Folder>>;

    /// List every item in a folder, draining all pages.
    async fn list_items(&self, folder_id: FolderId) -> Result<Vec<Item>>;
}

/// Client for the Raindrop.io REST API.
#[derive(Debug, Clone)]
pub struct RaindropClient {
    base_url: String,
    token: String,
    executor: RequestExecutor,
    paginator: Paginator,
}

impl RaindropClient {
    /// Create a client. A trailing slash on `base_url` is ignored.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, executor: RequestExecutor) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            executor,
            paginator: Paginator::unbounded(),
        }
    }

    /// Cap the number of pages read per folder.
    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List every bookmark in the account (collection 0).
    pub async fn list_all_items(&self) -> Result<Vec<Item>> {
        self.list_items(UNSORTED_FOLDER).await
    }

    async fn fetch_items_page(&self, folder_id: FolderId, page: usize) -> Result<Vec<Item>> {
        const OPERATION: &str = "get raindrops";

        let request = ApiRequest::get(format!(
            "{}/raindrops/{}?page={}&perpage={}",
            self.base_url, folder_id, page, PAGE_SIZE
        ))
        .bearer_auth(&self.token)?;

        let response = self
            .executor
            .execute(&request)
            .await?
            .expect_status(OPERATION, &[StatusCode::OK])?;
        let envelope: ItemsEnvelope<Item> = response.decode(OPERATION)?;

        debug!(
            "folder {} page {}: {} items",
            folder_id,
            page,
            envelope.items.len()
        );
        Ok(envelope.items)
    }
}

#[async_trait]
impl BookmarkSource for RaindropClient {
    async fn list_folders(&self) -> Result<Vec<Folder>> {
        const OPERATION: &str = "get collections";

        let request =
            ApiRequest::get(format!("{}/collections", self.base_url)).bearer_auth(&self.token)?;

        let response = self
            .executor
            .execute(&request)
            .await?
            .expect_status(OPERATION, &[StatusCode::OK])?;
        let envelope: ItemsEnvelope<Folder> = response.decode(OPERATION)?;
        Ok(envelope.items)
    }

    async fn list_items(&self, folder_id: FolderId) -> Result<Vec<Item>> {
        self.paginator
            .read_all(|page| self.fetch_items_page(folder_id, page))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::http::{ApiResponse, Sleeper, Transport};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Answers requests from a queue and records what was sent.
    #[derive(Default)]
    struct QueueTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl QueueTransport {
        fn with(responses: Vec<(u16, &str)>) -> Arc<Self> {
            let queue = responses
                .into_iter()
                .map(|(status, body)| {
                    ApiResponse::new(StatusCode::from_u16(status).unwrap(), body.to_string())
                })
                .collect();
            Arc::new(Self {
                responses: Mutex::new(queue),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for QueueTransport {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BridgeError::transport("no scripted response left"))
        }
    }

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn client(transport: Arc<QueueTransport>) -> RaindropClient {
        let executor = RequestExecutor::new(transport, Arc::new(NoSleep));
        RaindropClient::new("http://raindrop.test/rest/v1/", "test-token", executor)
    }

    #[tokio::test]
    async fn test_list_folders() {
        let transport = QueueTransport::with(vec![(
            200,
            r#"{"result": true, "items": [{"_id": 1, "title": "Reading"}, {"_id": 2, "title": "Work"}]}"#,
        )]);

        let folders = client(transport.clone()).list_folders().await.unwrap();

        assert_eq!(
            folders,
            vec![
                Folder { id: 1, title: "Reading".into() },
                Folder { id: 2, title: "Work".into() },
            ]
        );
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://raindrop.test/rest/v1/collections");
        assert_eq!(requests[0].header("authorization"), Some("Bearer test-token"));
    }

    #[tokio::test]
    async fn test_list_items_walks_pages() {
        let transport = QueueTransport::with(vec![
            (200, r#"{"items": [{"_id": 1, "title": "A"}, {"_id": 2, "title": "B"}]}"#),
            (200, r#"{"items": [{"_id": 3, "title": "C"}]}"#),
            (200, r#"{"items": []}"#),
        ]);

        let items = client(transport.clone()).list_items(42).await.unwrap();

        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        for (page, request) in requests.iter().enumerate() {
            assert_eq!(request.path(), "/rest/v1/raindrops/42");
            assert_eq!(request.query_param("page"), Some(page.to_string().as_str()));
            assert_eq!(request.query_param("perpage"), Some("50"));
        }
    }

    #[tokio::test]
    async fn test_list_all_items_uses_collection_zero() {
        let transport = QueueTransport::with(vec![(200, r#"{"items": []}"#)]);

        let items = client(transport.clone()).list_all_items().await.unwrap();

        assert!(items.is_empty());
        assert_eq!(transport.requests()[0].path(), "/rest/v1/raindrops/0");
    }

    #[tokio::test]
    async fn test_status_error_names_operation() {
        let transport = QueueTransport::with(vec![(401, r#"{"error": "unauthorized"}"#)]);

        let err = client(transport).list_folders().await.unwrap_err();

        assert_eq!(err.to_string(), "failed to get collections: 401 Unauthorized");
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let transport = QueueTransport::with(vec![(200, r#"{"items": [{"_id": 1,"#)]);

        let err = client(transport).list_folders().await.unwrap_err();

        assert!(matches!(err, BridgeError::Decode { .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn test_error_on_later_page_discards_results() {
        let transport = QueueTransport::with(vec![
            (200, r#"{"items": [{"_id": 1, "title": "A"}]}"#),
            (500, "oops"),
        ]);

        let err = client(transport.clone()).list_items(7).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to get raindrops: 500 Internal Server Error"
        );
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limited_page_is_retried() {
        let transport = QueueTransport::with(vec![
            (429, ""),
            (200, r#"{"items": [{"_id": 1, "title": "A"}]}"#),
            (200, r#"{"items": []}"#),
        ]);

        let items = client(transport.clone()).list_items(1).await.unwrap();

        assert_eq!(items.len(), 1);
        let pages: Vec<_> = transport
            .requests()
            .iter()
            .map(|r| r.query_param("page").unwrap().to_string())
            .collect();
        assert_eq!(pages, vec!["0", "0", "1"]);
    }

    #[tokio::test]
    async fn test_page_cap_applies_to_items() {
        let transport = QueueTransport::with(vec![
            (200, r#"{"items": [{"_id": 1}]}"#),
            (200, r#"{"items": [{"_id": 2}]}"#),
            (200, r#"{"items": [{"_id": 3}]}"#),
        ]);

        let err = client(transport.clone())
            .with_paginator(Paginator::with_max_pages(Some(2)))
            .list_items(1)
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::PageLimitExceeded { pages: 2 }));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_page_cap_allows_exactly_cap_pages() {
        let transport = QueueTransport::with(vec![
            (200, r#"{"items": [{"_id": 1}, {"_id": 2}]}"#),
            (200, r#"{"items": []}"#),
        ]);

        let items = client(transport)
            .with_paginator(Paginator::with_max_pages(Some(1)))
            .list_items(1)
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
    }
}
