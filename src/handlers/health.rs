use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::db::migrations::latest_version;
use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "diary-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ready once the database answers and its schema matches this binary.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let schema_version = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
    )
    .fetch_one(&state.db)
    .await;

    let (status, database, schema) = match schema_version {
        Ok(version) if version == latest_version() => (StatusCode::OK, "ok", json!(version)),
        Ok(version) => (StatusCode::SERVICE_UNAVAILABLE, "ok", json!(version)),
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "failed", Value::Null)
        }
    };

    let readiness = if status == StatusCode::OK { "ready" } else { "not_ready" };

    (
        status,
        Json(json!({
            "status": readiness,
            "checks": {
                "database": database,
                "schema_version": schema,
                "expected_schema_version": latest_version(),
            },
        })),
    )
}
