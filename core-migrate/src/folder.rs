use bridge_traits::storage::ResourceClient;
use core_auth::AccountId;
use std::fmt;
use std::sync::Arc;

/// A resolved remote folder, bound to the client of the account it lives in
#[derive(Clone)]
pub struct Folder {
    client: Arc<dyn ResourceClient>,
    id: String,
    name: String,
    account: AccountId,
}

impl Folder {
    pub fn new(
        client: Arc<dyn ResourceClient>,
        id: impl Into<String>,
        name: impl Into<String>,
        account: AccountId,
    ) -> Self {
        Self {
            client,
            id: id.into(),
            name: name.into(),
            account,
        }
    }

    pub fn client(&self) -> &Arc<dyn ResourceClient> {
        &self.client
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }
}

impl fmt::Debug for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Folder")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}
