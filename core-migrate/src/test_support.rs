//! Scripted `ResourceClient` shared by the unit tests of this crate

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::storage::{
    Owner, Page, Permission, RemoteResource, ResourceClient, ResourceQuery, FOLDER_MIME_TYPE,
};
use std::collections::HashMap;
use std::sync::Mutex;

type PageKey = (String, Option<String>);

/// Answers listing calls from pages registered per (query or resource id,
/// cursor). Unregistered keys and pages registered as `Err` fail the call.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    resource_pages: HashMap<PageKey, Result<Page<RemoteResource>, String>>,
    permission_pages: HashMap<PageKey, Result<Page<Permission>, String>>,
    pub(crate) resource_calls: Mutex<Vec<PageKey>>,
    pub(crate) permission_calls: Mutex<Vec<PageKey>>,
}

impl ScriptedClient {
    pub(crate) fn resources(
        mut self,
        query: &ResourceQuery,
        cursor: Option<&str>,
        items: Vec<RemoteResource>,
        next: Option<&str>,
    ) -> Self {
        self.resource_pages.insert(
            (query.to_query_string(), cursor.map(str::to_string)),
            Ok(Page::new(items, next.map(str::to_string))),
        );
        self
    }

    pub(crate) fn resources_error(mut self, query: &ResourceQuery, cursor: Option<&str>) -> Self {
        self.resource_pages.insert(
            (query.to_query_string(), cursor.map(str::to_string)),
            Err("backend unavailable".to_string()),
        );
        self
    }

    pub(crate) fn permissions(
        mut self,
        resource_id: &str,
        cursor: Option<&str>,
        items: Vec<Permission>,
        next: Option<&str>,
    ) -> Self {
        self.permission_pages.insert(
            (resource_id.to_string(), cursor.map(str::to_string)),
            Ok(Page::new(items, next.map(str::to_string))),
        );
        self
    }

    pub(crate) fn permissions_error(mut self, resource_id: &str, cursor: Option<&str>) -> Self {
        self.permission_pages.insert(
            (resource_id.to_string(), cursor.map(str::to_string)),
            Err("permission listing refused".to_string()),
        );
        self
    }

    pub(crate) fn resource_call_count(&self) -> usize {
        self.resource_calls.lock().unwrap().len()
    }

    pub(crate) fn permission_calls_for(&self, resource_id: &str) -> Vec<Option<String>> {
        self.permission_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == resource_id)
            .map(|(_, cursor)| cursor.clone())
            .collect()
    }
}

#[async_trait]
impl ResourceClient for ScriptedClient {
    async fn list_resources(
        &self,
        query: &ResourceQuery,
        cursor: Option<&str>,
    ) -> BridgeResult<Page<RemoteResource>> {
        let key = (query.to_query_string(), cursor.map(str::to_string));
        self.resource_calls.lock().unwrap().push(key.clone());
        match self.resource_pages.get(&key) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(reason)) => Err(BridgeError::OperationFailed(reason.clone())),
            None => Err(BridgeError::OperationFailed(format!(
                "unscripted listing {:?}",
                key
            ))),
        }
    }

    async fn list_permissions(
        &self,
        resource_id: &str,
        cursor: Option<&str>,
    ) -> BridgeResult<Page<Permission>> {
        let key = (resource_id.to_string(), cursor.map(str::to_string));
        self.permission_calls.lock().unwrap().push(key.clone());
        match self.permission_pages.get(&key) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(reason)) => Err(BridgeError::OperationFailed(reason.clone())),
            None => Err(BridgeError::OperationFailed(format!(
                "unscripted permissions {:?}",
                key
            ))),
        }
    }
}

pub(crate) fn folder(id: &str, name: &str) -> RemoteResource {
    RemoteResource {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: FOLDER_MIME_TYPE.to_string(),
        owned_by_me: true,
        owners: vec![],
    }
}

pub(crate) fn file(id: &str, name: &str) -> RemoteResource {
    RemoteResource {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: "application/pdf".to_string(),
        owned_by_me: true,
        owners: vec![Owner {
            email_address: Some("alice@example.com".to_string()),
            me: true,
            ..Default::default()
        }],
    }
}

pub(crate) fn permission(id: &str, role: &str) -> Permission {
    Permission {
        id: id.to_string(),
        permission_type: "user".to_string(),
        role: role.to_string(),
        email_address: Some(format!("{}@example.com", id)),
        ..Default::default()
    }
}
