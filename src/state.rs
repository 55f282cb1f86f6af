use std::sync::Arc;

use sqlx::SqlitePool;

use crate::store::{EntityStore, SqliteStore};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        let store = Arc::new(SqliteStore::new(db.clone()));
        Self { db, store }
    }
}
