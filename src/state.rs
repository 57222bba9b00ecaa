use crate::adapters::{SystemTimeProvider, WebPushSender};
use crate::auth::AuthState;
use crate::config::AppConfig;
use crate::ports::TimeProvider;
use crate::store::Store;

use time::OffsetDateTime;

use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth: AuthState,
    pub store: Arc<Mutex<Store>>,
    /// Present only when a complete VAPID keypair is configured.
    pub push: Option<WebPushSender>,
    pub time: SystemTimeProvider,
}

impl AppState {
    pub(crate) fn now(&self) -> OffsetDateTime {
        self.time.now()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        let store = self.store.lock().expect("store lock");
        f(&store)
    }

    /// Applies `f` and rewrites the state file, if one is configured.
    /// A failed write is logged; the in-memory change stands.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut Store, OffsetDateTime) -> R) -> R {
        self.mutate_if(f, |_| true)
    }

    /// Like [`AppState::mutate`], but only persists when `changed` holds for
    /// the result.
    pub(crate) fn mutate_if<R>(
        &self,
        f: impl FnOnce(&mut Store, OffsetDateTime) -> R,
        changed: impl FnOnce(&R) -> bool,
    ) -> R {
        let now = self.now();
        let mut store = self.store.lock().expect("store lock");
        let result = f(&mut store, now);
        if changed(&result)
            && let Some(path) = self.config.state_file.as_deref()
            && let Err(err) = store.save(path)
        {
            tracing::error!(path = %path.display(), %err, "failed to persist state");
        }
        result
    }

    /// Creates the user's account on first contact. Known users take the
    /// read lock path only.
    pub(crate) fn ensure_account(&self, user: &str) {
        if self.read(|store| store.has_account(user)) {
            return;
        }
        self.mutate(|store, now| {
            store.account(user, now);
        });
    }
}
