//! Stand-in for the authentication provider: the current identity, if any,
//! and a way to follow changes to it.

use crate::model::Identity;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Clone)]
pub struct AuthSession {
    identity: Arc<watch::Sender<Option<Identity>>>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSession {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            identity: Arc::new(identity),
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        info!(user_id = %identity.id, "Signed in");
        self.identity.send_replace(Some(identity));
    }

    /// Signing out without an identity does not notify watchers.
    pub fn sign_out(&self) {
        let changed = self.identity.send_if_modified(|current| current.take().is_some());
        if changed {
            info!("Signed out");
        }
    }

    pub fn current(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watchers_see_sign_in_and_out() {
        let session = AuthSession::new();
        let mut watcher = session.watch();

        session.sign_in(Identity::new("u1"));
        watcher.changed().await.unwrap();
        assert_eq!(watcher.borrow_and_update().as_ref().map(|i| i.id.as_str()), Some("u1"));

        session.sign_out();
        watcher.changed().await.unwrap();
        assert!(watcher.borrow_and_update().is_none());

        session.sign_out();
        assert!(!watcher.has_changed().unwrap());
        assert!(session.current().is_none());
    }
}
