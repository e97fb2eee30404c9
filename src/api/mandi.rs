use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use super::{ApiResult, AppState, explained, json_response, required};
use crate::core::{
    BestMarketQuery, CropInfo, MspRate, best_market, mandi_prices, msp_rates, supported_crops,
};
use crate::explain_context;

const DEFAULT_TRANSPORT_COST_PER_KM: f64 = 50.0;
const DEFAULT_MAX_DISTANCE_KM: f64 = 100.0;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PricesPayload {
    crop: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct BestMarketPayload {
    crop: Option<String>,
    quantity_quintals: Option<f64>,
    /// Echoed in logs only; distances come from the mandi table.
    current_location: Option<String>,
    transport_cost_per_km: Option<f64>,
    max_distance_km: Option<f64>,
}

#[derive(Debug, Serialize)]
struct MspRatesResponse {
    msp_rates: Vec<MspRate>,
    season: &'static str,
    note: &'static str,
}

#[derive(Debug, Serialize)]
struct CropsResponse {
    crops: Vec<CropInfo>,
}

pub(super) async fn prices_handler(
    State(state): State<AppState>,
    Json(payload): Json<PricesPayload>,
) -> ApiResult {
    let crop = required(payload.crop, "crop")?;
    let report = mandi_prices(&crop, state.market_seed);
    tracing::info!(
        crop = %crop,
        mandis = report.prices.len(),
        trend = ?report.price_trend,
        "mandi prices served"
    );

    let context = explain_context! {
        "crop" => crop,
        "average_price" => report.average_price,
        "trend" => format!("{:?}", report.price_trend),
    };
    let prompt = format!(
        "Explain mandi prices for {crop}: Average price ₹{:.0} per quintal, Trend: {:?}. \
         Provide insights for farmers.",
        report.average_price, report.price_trend,
    );
    let ai_explanation = state.explainer.explain(&prompt, &context).await;
    Ok(explained(report, ai_explanation))
}

pub(super) async fn best_market_handler(
    State(state): State<AppState>,
    Json(payload): Json<BestMarketPayload>,
) -> ApiResult {
    let crop = required(payload.crop, "crop")?;
    let query = BestMarketQuery {
        crop: &crop,
        quantity_quintals: required(payload.quantity_quintals, "quantity_quintals")?,
        transport_cost_per_km: payload
            .transport_cost_per_km
            .unwrap_or(DEFAULT_TRANSPORT_COST_PER_KM),
        max_distance_km: payload.max_distance_km.unwrap_or(DEFAULT_MAX_DISTANCE_KM),
    };
    let report = best_market(&query)?;
    let best = &report.best_market;
    tracing::info!(
        crop = %crop,
        from = payload.current_location.as_deref().unwrap_or("unknown"),
        best = %best.mandi_name,
        net_revenue = best.net_revenue,
        "best market selected"
    );

    let context = explain_context! {
        "crop" => crop,
        "quantity" => query.quantity_quintals,
        "best_market" => best.mandi_name,
        "net_revenue" => best.net_revenue,
    };
    let prompt = format!(
        "Explain best market choice for {crop}: {} at ₹{:.0}/quintal, {:.1} km away, \
         Net revenue: ₹{:.0}",
        best.mandi_name, best.price_per_quintal, best.distance_km, best.net_revenue,
    );
    let ai_explanation = state.explainer.explain(&prompt, &context).await;
    Ok(explained(report, ai_explanation))
}

pub(super) async fn msp_rates_handler() -> Response {
    json_response(
        StatusCode::OK,
        MspRatesResponse {
            msp_rates: msp_rates(),
            season: "2023-24",
            note: "MSP rates are announced by Government of India",
        },
    )
}

pub(super) async fn crops_handler() -> Response {
    json_response(
        StatusCode::OK,
        CropsResponse {
            crops: supported_crops(),
        },
    )
}
