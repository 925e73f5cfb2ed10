use crate::config::{ApiConfig, StoreBackend, WebConfig};
use crate::users::{MemoryUserStore, PgUserStore, UserStore};
use crate::web::client::UsersApiClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init(config: &ApiConfig) -> anyhow::Result<Self> {
        let users = match config.backend {
            StoreBackend::Postgres => {
                let pool = crate::db::connect_lazy(&config.database)?;
                let store = PgUserStore::new(pool);
                // The server still starts with the database down; requests report it.
                match store.ping().await {
                    Ok(()) => store.ensure_schema().await?,
                    Err(e) => tracing::warn!(error = %e, "database not reachable at startup"),
                }
                Arc::new(store) as Arc<dyn UserStore>
            }
            StoreBackend::Memory => {
                tracing::warn!("STORE_BACKEND=memory; users are not persisted");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };
        Ok(Self { users })
    }

    pub fn from_store(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub fn fake() -> Self {
        Self::from_store(Arc::new(MemoryUserStore::new()))
    }
}

#[derive(Clone)]
pub struct WebState {
    pub api: UsersApiClient,
}

impl WebState {
    pub fn init(config: &WebConfig) -> anyhow::Result<Self> {
        let api = UsersApiClient::new(&config.api_base_url, config.api_timeout())?;
        Ok(Self { api })
    }
}
