//! Owner and group name resolution
//!
//! Directory listings show names rather than numeric ids. Lookups go to the
//! remote API; any failure falls back to the decimal id so a listing never
//! fails because an identity is unknown to the backend.

use crate::remote::RemoteClient;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    User,
    Group,
}

/// Resolves numeric owner and group ids to display names
///
/// The optional cache is scoped to one session and only remembers successful
/// lookups, so enabling it never changes a result.
pub struct IdentityResolver {
    client: Arc<dyn RemoteClient>,
    cache: Option<Mutex<HashMap<(Kind, u64), String>>>,
}

impl IdentityResolver {
    /// Create a resolver over the given session
    pub fn new(client: Arc<dyn RemoteClient>, cache: bool) -> Self {
        Self {
            client,
            cache: cache.then(|| Mutex::new(HashMap::new())),
        }
    }

    /// Name of user `uid`, or its decimal form if the lookup fails
    pub async fn resolve_user_name(&self, uid: u64) -> String {
        self.resolve(Kind::User, uid).await
    }

    /// Name of group `gid`, or its decimal form if the lookup fails
    pub async fn resolve_group_name(&self, gid: u64) -> String {
        self.resolve(Kind::Group, gid).await
    }

    async fn resolve(&self, kind: Kind, id: u64) -> String {
        if let Some(name) = self.cached(kind, id) {
            return name;
        }

        let lookup = match kind {
            Kind::User => self.client.get_user(id).await,
            Kind::Group => self.client.get_group(id).await,
        };

        match lookup {
            Ok(identity) => {
                self.remember(kind, id, &identity.name);
                identity.name
            }
            Err(e) => {
                debug!("Identity lookup for {} failed, using the id: {}", id, e);
                id.to_string()
            }
        }
    }

    fn cached(&self, kind: Kind, id: u64) -> Option<String> {
        let cache = self.cache.as_ref()?.lock().ok()?;
        cache.get(&(kind, id)).cloned()
    }

    fn remember(&self, kind: Kind, id: u64, name: &str) {
        if let Some(Ok(mut cache)) = self.cache.as_ref().map(Mutex::lock) {
            cache.insert((kind, id), name.to_string());
        }
    }
}
