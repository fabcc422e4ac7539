use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use log::info;
use tokio::sync::Mutex;
use crate::server::model::menu::MenuCatalog;
use crate::server::model::order::OrderSession;
use crate::server::model::session::SessionId;
use crate::server::store::OrderStore;
use crate::server::util::time;

/// Live order sessions, isolated from each other by id.
#[derive(Default)]
pub(crate) struct SessionRegistry {
    next_id: AtomicU64,
    sessions: Mutex<HashMap<SessionId, OrderSession>>,
}

impl SessionRegistry {
    pub async fn open(&self) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.sessions
            .lock()
            .await
            .insert(id, OrderSession::new(time::helper::get_utc_now()));
        info!("opened session={}", id);
        id
    }

    /// Returns whether the session existed.
    pub async fn close(&self, id: SessionId) -> bool {
        let existed = self.sessions.lock().await.remove(&id).is_some();
        if existed {
            info!("closed session={}", id);
        }
        existed
    }

    /// Run `f` on the session, `None` if there is no such session.
    pub async fn with_session<T>(&self, id: SessionId, f: impl FnOnce(&mut OrderSession) -> T) -> Option<T> {
        self.sessions.lock().await.get_mut(&id).map(f)
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    catalog: Arc<MenuCatalog>,
    sessions: Arc<SessionRegistry>,
    order_store: Arc<dyn OrderStore>,
}

impl AppState {
    pub fn new(catalog: MenuCatalog, order_store: Arc<dyn OrderStore>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(SessionRegistry::default()),
            order_store,
        }
    }

    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn order_store(&self) -> Arc<dyn OrderStore> {
        self.order_store.clone()
    }
}
