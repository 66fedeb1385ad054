use std::sync::Arc;

use crate::auth::{
    memory::MemoryUserStore,
    repo::{PgUserStore, UserStore},
};
use crate::config::{AppConfig, StoreBackend};
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let users = match config.store {
            StoreBackend::Postgres => {
                let pool = db::connect(&config).await?;
                db::run_migrations(&pool).await;
                Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory user store; records are lost on restart");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        Ok(Self::from_parts(users, Arc::new(config)))
    }

    pub fn from_parts(users: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: StoreBackend::Memory,
            database_url: None,
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(Arc::new(MemoryUserStore::new()), config)
    }
}
