use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::PriceResponse,
};
use axum::{
    extract::{Query, State},
    Json,
};
use pricewatch_core::PriceLookup;
use pricewatch_market_data::AssetDescriptor;

#[derive(serde::Deserialize)]
pub struct PriceQuery {
    id: Option<String>,
}

/// Latest cached snapshot for one asset. Never waits on the upstream.
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PriceQuery>,
) -> ApiResult<Json<PriceResponse>> {
    let asset_id = query
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing 'id' query parameter".to_string()))?;

    match state.price_service.lookup(&asset_id) {
        PriceLookup::Ready(entry) => Ok(Json(PriceResponse::from_entry(
            &entry,
            state.stale_after,
        ))),
        PriceLookup::Pending => Err(ApiError::NotReady),
        PriceLookup::UnknownAsset => Err(ApiError::AssetNotFound),
    }
}

pub async fn list_assets(State(state): State<Arc<AppState>>) -> Json<Vec<AssetDescriptor>> {
    Json(state.price_service.list_assets())
}
