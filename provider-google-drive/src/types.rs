//! Google Drive API response types
//!
//! Data structures for deserializing Google Drive API v3 responses, and
//! their conversions into the bridge resource model.

use bridge_traits::storage::{Owner, Permission, RemoteResource};
use serde::Deserialize;

/// Google Drive API file resource
///
/// Only the fields requested through the listing field mask.
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub mime_type: String,

    #[serde(default)]
    pub owned_by_me: bool,

    #[serde(default)]
    pub owners: Vec<DriveUser>,
}

/// Google Drive API user resource (file owners)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUser {
    pub kind: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub permission_id: Option<String>,
    pub photo_link: Option<String>,
    #[serde(default)]
    pub me: bool,
}

/// Google Drive API permission resource
///
/// See: https://developers.google.com/drive/api/v3/reference/permissions#resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivePermission {
    pub kind: Option<String>,

    #[serde(default)]
    pub id: String,

    /// `user`, `group`, `domain` or `anyone`
    #[serde(rename = "type", default)]
    pub permission_type: String,

    pub email_address: Option<String>,
    pub domain: Option<String>,

    #[serde(default)]
    pub role: String,

    pub allow_file_discovery: Option<bool>,
    pub display_name: Option<String>,
    pub photo_link: Option<String>,

    /// RFC 3339
    pub expiration_time: Option<String>,

    #[serde(default)]
    pub deleted: bool,
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for next page
    pub next_page_token: Option<String>,

    /// Whether the search skipped some corpora
    #[serde(default)]
    pub incomplete_search: bool,
}

/// Google Drive API permissions.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/permissions/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsListResponse {
    #[serde(default)]
    pub permissions: Vec<DrivePermission>,

    /// Token for next page
    pub next_page_token: Option<String>,
}

impl From<DriveUser> for Owner {
    fn from(user: DriveUser) -> Self {
        Owner {
            display_name: user.display_name,
            email_address: user.email_address,
            permission_id: user.permission_id,
            photo_link: user.photo_link,
            kind: user.kind,
            me: user.me,
        }
    }
}

impl From<DriveFile> for RemoteResource {
    fn from(file: DriveFile) -> Self {
        RemoteResource {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            owned_by_me: file.owned_by_me,
            owners: file.owners.into_iter().map(Owner::from).collect(),
        }
    }
}

impl From<DrivePermission> for Permission {
    fn from(permission: DrivePermission) -> Self {
        Permission {
            kind: permission.kind,
            id: permission.id,
            permission_type: permission.permission_type,
            email_address: permission.email_address,
            domain: permission.domain,
            role: permission.role,
            allow_file_discovery: permission.allow_file_discovery,
            display_name: permission.display_name,
            photo_link: permission.photo_link,
            expiration_time: permission.expiration_time,
            deleted: permission.deleted,
        }
    }
}
