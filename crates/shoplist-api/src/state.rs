//! Application state

use shoplist_auth::JwtManager;
use shoplist_core::{AccountService, InventoryService};
use shoplist_db::Database;
use std::sync::Arc;

/// Prometheus render handle served at `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
///
/// Everything here is read-only after startup; request tasks never contend
/// on a lock.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub accounts: AccountService,
    pub inventory: InventoryService,
}

impl AppState {
    pub fn new(db: Database, jwt: Arc<JwtManager>) -> Self {
        Self {
            accounts: AccountService::new(db.clone(), jwt.clone()),
            inventory: InventoryService::new(db.clone()),
            db,
            jwt,
        }
    }
}
