use std::sync::Arc;

use crate::{main_lib::AppState, models::PollingStatus};
use axum::{extract::State, Json};

pub async fn healthz() -> &'static str {
    "ok"
}

/// Whether background polling has been started and how many assets it covers.
pub async fn polling_status(State(state): State<Arc<AppState>>) -> Json<PollingStatus> {
    Json(PollingStatus {
        polling: state.price_service.is_polling(),
        tracked_assets: state.price_service.list_assets().len(),
    })
}
