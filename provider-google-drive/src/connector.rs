//! Google Drive API connector implementation
//!
//! Implements the `ResourceClient` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::storage::{Page, Permission, RemoteResource, ResourceClient, ResourceQuery};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{GoogleDriveError, Result};
use crate::types::{FilesListResponse, PermissionsListResponse};

/// Google Drive API base URL
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Maximum results per files.list page (Google Drive API limit)
const FILES_PAGE_SIZE: u32 = 1000;

/// Maximum results per permissions.list page (Google Drive API limit)
const PERMISSIONS_PAGE_SIZE: u32 = 100;

/// Field mask for files.list
pub const FILE_LIST_FIELDS: &str =
    "nextPageToken,incompleteSearch,files(id,name,mimeType,ownedByMe,owners)";

/// Field mask for permissions.list
pub const PERMISSION_LIST_FIELDS: &str = "nextPageToken,permissions(kind,id,type,emailAddress,domain,role,allowFileDiscovery,displayName,photoLink,expirationTime,deleted)";

/// Google Drive API connector
///
/// Issues one request per call; pagination is driven by the caller through
/// the returned page cursor.
///
/// The HTTP client is expected to authenticate requests itself (normally a
/// `core_auth::Session`), so the connector never sees a token.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveConnector;
/// use bridge_traits::storage::{ResourceClient, ResourceQuery};
///
/// let connector = GoogleDriveConnector::new(session);
/// let page = connector
///     .list_resources(&ResourceQuery::NameEquals("Reports".into()), None)
///     .await?;
/// ```
pub struct GoogleDriveConnector {
    http_client: Arc<dyn HttpClient>,
    api_base: String,
    retry_policy: RetryPolicy,
}

impl GoogleDriveConnector {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_base_url(http_client, DRIVE_API_BASE)
    }

    /// Connector against a different API root (tests, proxies)
    pub fn with_base_url(http_client: Arc<dyn HttpClient>, api_base: impl Into<String>) -> Self {
        Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }

    fn files_url(&self, query: &ResourceQuery, cursor: Option<&str>) -> String {
        let mut url = format!(
            "{}/files?q={}&pageSize={}&fields={}",
            self.api_base,
            urlencoding::encode(&query.to_query_string()),
            FILES_PAGE_SIZE,
            urlencoding::encode(FILE_LIST_FIELDS)
        );
        if let Some(page_token) = cursor {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(page_token)));
        }
        url
    }

    fn permissions_url(&self, resource_id: &str, cursor: Option<&str>) -> String {
        let mut url = format!(
            "{}/files/{}/permissions?pageSize={}&fields={}",
            self.api_base,
            urlencoding::encode(resource_id),
            PERMISSIONS_PAGE_SIZE,
            urlencoding::encode(PERMISSION_LIST_FIELDS)
        );
        if let Some(page_token) = cursor {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(page_token)));
        }
        url
    }

    /// GET `url` and decode a JSON body, mapping API failures by status
    async fn get_json<T: DeserializeOwned>(&self, url: String, resource_id: &str) -> Result<T> {
        let request = HttpRequest::get(url).header("Accept", "application/json");

        let response = self
            .http_client
            .execute_with_retry(request, self.retry_policy.clone())
            .await?;

        if !response.is_success() {
            return Err(Self::status_error(&response, resource_id));
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            GoogleDriveError::ParseError(e.to_string())
        })
    }

    fn status_error(response: &HttpResponse, resource_id: &str) -> GoogleDriveError {
        let status_code = response.status;
        let message = response.error_text();
        warn!(status = status_code, "Google Drive API request failed");

        match status_code {
            401 | 403 => GoogleDriveError::AuthenticationFailed {
                status_code,
                message,
            },
            404 => GoogleDriveError::NotFound {
                resource_id: resource_id.to_string(),
            },
            429 => GoogleDriveError::RateLimitExceeded(message),
            _ => GoogleDriveError::ApiError {
                status_code,
                message,
            },
        }
    }
}

#[async_trait]
impl ResourceClient for GoogleDriveConnector {
    #[instrument(skip(self, query), fields(query = %query.to_query_string()))]
    async fn list_resources(
        &self,
        query: &ResourceQuery,
        cursor: Option<&str>,
    ) -> BridgeResult<Page<RemoteResource>> {
        let url = self.files_url(query, cursor);
        let response: FilesListResponse = self.get_json(url, "files").await?;

        if response.incomplete_search {
            warn!("Drive reported an incomplete search");
        }

        let resources: Vec<RemoteResource> = response
            .files
            .into_iter()
            .map(RemoteResource::from)
            .collect();

        debug!(
            count = resources.len(),
            has_next = response.next_page_token.is_some(),
            "Listed resources"
        );

        Ok(Page::new(resources, response.next_page_token))
    }

    #[instrument(skip(self))]
    async fn list_permissions(
        &self,
        resource_id: &str,
        cursor: Option<&str>,
    ) -> BridgeResult<Page<Permission>> {
        let url = self.permissions_url(resource_id, cursor);
        let response: PermissionsListResponse = self.get_json(url, resource_id).await?;

        let permissions: Vec<Permission> = response
            .permissions
            .into_iter()
            .map(Permission::from)
            .collect();

        debug!(
            count = permissions.len(),
            has_next = response.next_page_token.is_some(),
            "Listed permissions"
        );

        Ok(Page::new(permissions, response.next_page_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use mockall::mock;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    #[tokio::test]
    async fn test_list_resources_by_name() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.starts_with("https://www.googleapis.com/drive/v3/files?"));
            assert!(req.url.contains("q=name%3D%27Reports%27"));
            assert!(req.url.contains("pageSize=1000"));
            assert!(req
                .url
                .contains("fields=nextPageToken%2CincompleteSearch%2Cfiles%28id%2Cname%2CmimeType"));
            assert!(!req.url.contains("pageToken="));
            assert!(!req.has_authorization());

            Ok(HttpResponse::new(
                200,
                r#"{
                    "nextPageToken": "p2",
                    "incompleteSearch": true,
                    "files": [
                        {"id": "f1", "name": "Reports", "mimeType": "application/vnd.google-apps.folder"}
                    ]
                }"#,
            ))
        });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http));
        let page = connector
            .list_resources(&ResourceQuery::NameEquals("Reports".to_string()), None)
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert!(page.items[0].is_folder());
        assert_eq!(page.next_cursor(), Some("p2"));
    }

    #[tokio::test]
    async fn test_list_children_with_cursor() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("q=%27folder-1%27%20in%20parents"));
            assert!(req.url.contains("pageToken=abc%2Fdef"));
            Ok(HttpResponse::new(200, r#"{"files": []}"#))
        });

        let connector = GoogleDriveConnector::new(Arc::new(mock_http));
        let page = connector
            .list_resources(
                &ResourceQuery::ChildrenOf("folder-1".to_string()),
                Some("abc/def"),
            )
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn test_list_permissions() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req
                .url
                .starts_with("https://drive.test/v3/files/file-1/permissions?pageSize=100"));
            assert!(req.url.contains("allowFileDiscovery"));
            Ok(HttpResponse::new(
                200,
                r#"{
                    "nextPageToken": "",
                    "permissions": [
                        {"id": "p1", "type": "user", "role": "owner", "emailAddress": "alice@example.com"}
                    ]
                }"#,
            ))
        });

        let connector =
            GoogleDriveConnector::with_base_url(Arc::new(mock_http), "https://drive.test/v3/");
        let page = connector.list_permissions("file-1", None).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].role, "owner");
        // Empty token terminates pagination
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Ok(HttpResponse::new(404, r#"{"error":{"code":404}}"#)));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http));
        let result = connector.list_permissions("missing", None).await;

        match result {
            Err(BridgeError::OperationFailed(message)) => assert!(message.contains("missing")),
            other => panic!("Expected OperationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_reported() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Ok(HttpResponse::new(401, "Invalid Credentials")));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http));
        let error = connector
            .list_resources(&ResourceQuery::NameEquals("x".to_string()), None)
            .await
            .unwrap_err();

        assert!(error.to_string().contains("Authentication failed"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Ok(HttpResponse::new(200, "<html>")));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http));
        let error = connector
            .list_resources(&ResourceQuery::NameEquals("x".to_string()), None)
            .await
            .unwrap_err();

        assert!(error.to_string().contains("parse"));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("Request timed out".to_string())));

        let connector = GoogleDriveConnector::new(Arc::new(mock_http));
        let error = connector.list_permissions("f", None).await.unwrap_err();

        assert_eq!(error.to_string(), "Bridge operation failed: Request timed out");
    }
}
