//! Storage Abstractions
//!
//! Local credential persistence (`SecureStore`) and the remote resource
//! listing contract (`ResourceClient`) implemented by cloud providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// MIME type the remote store uses to tag folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Credential storage trait
///
/// Keys are opaque strings chosen by the caller. Implementations must
/// restrict access to the current user and must never log stored values.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// async fn store_token(store: &dyn SecureStore, token: &[u8]) -> Result<()> {
///     store.set_secret("user@example.com", token).await
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value, replacing any previous value for the key
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret
    ///
    /// Deleting a key that does not exist succeeds.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check if a secret exists without retrieving it
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }
}

/// Owner of a remote resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub permission_id: Option<String>,
    pub photo_link: Option<String>,
    pub kind: Option<String>,
    /// Whether this owner is the authenticated account
    pub me: bool,
}

/// A file or folder entry returned by a listing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResource {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub owned_by_me: bool,
    pub owners: Vec<Owner>,
}

impl RemoteResource {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }
}

/// A grant attached to a remote resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub kind: Option<String>,
    pub id: String,
    /// Grantee type: `user`, `group`, `domain` or `anyone`
    pub permission_type: String,
    pub email_address: Option<String>,
    pub domain: Option<String>,
    /// `owner`, `organizer`, `fileOrganizer`, `writer`, `commenter` or `reader`
    pub role: String,
    pub allow_file_discovery: Option<bool>,
    pub display_name: Option<String>,
    pub photo_link: Option<String>,
    /// RFC 3339 expiration time, if the grant expires
    pub expiration_time: Option<String>,
    pub deleted: bool,
}

/// One page of a cursor-paginated collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    /// Cursor for the next page
    ///
    /// An empty cursor is treated the same as an absent one: both end the
    /// collection.
    pub fn next_cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor().is_none()
    }
}

/// Server-side filter for `ResourceClient::list_resources`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceQuery {
    /// Resources whose name equals the given string
    NameEquals(String),
    /// Direct children of the given folder id
    ChildrenOf(String),
}

impl ResourceQuery {
    /// Render as a Drive `q` expression
    pub fn to_query_string(&self) -> String {
        match self {
            ResourceQuery::NameEquals(name) => format!("name='{}'", escape_literal(name)),
            ResourceQuery::ChildrenOf(id) => format!("'{}' in parents", escape_literal(id)),
        }
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Remote resource listing contract
///
/// Each call fetches exactly one page; callers follow `Page::next_cursor`
/// until it is exhausted. No caching.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// List resources matching `query`, starting at `cursor`
    async fn list_resources(
        &self,
        query: &ResourceQuery,
        cursor: Option<&str>,
    ) -> Result<Page<RemoteResource>>;

    /// List the permissions granted on `resource_id`, starting at `cursor`
    async fn list_permissions(
        &self,
        resource_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Permission>>;
}
