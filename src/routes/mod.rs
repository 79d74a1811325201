use axum::Router;
use sqlx::PgPool;

use crate::store::PgRecordStore;

mod health;
mod sensor;

// ---

pub fn router(pool: PgPool) -> Router {
    // ---
    Router::new()
        .merge(sensor::router())
        .merge(health::router())
        .with_state(PgRecordStore::new(pool))
}
