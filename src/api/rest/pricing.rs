use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::Deserialize;
use tracing::debug;

use crate::error::AppError;
use crate::models::pricing::{PriceQuote, PricingFactors};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/pricing/quote", post(quote))
}

/// Calendar fields arrive as plain integers so that any out-of-range value
/// is answered with 400 rather than a deserialization rejection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub base_price: f64,
    pub demand: f64,
    pub time_of_day: i64,
    pub day_of_week: i64,
    #[serde(default)]
    pub special_event: bool,
    #[serde(default)]
    pub competitor_prices: Vec<f64>,
    #[serde(default)]
    pub stock_level: Option<f64>,
}

async fn quote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<PriceQuote>, AppError> {
    let factors = into_factors(payload)?;

    let quote = state.pricing.quote(&factors);
    state.metrics.price_quotes_total.inc();

    debug!(
        base_price = factors.base_price,
        amount = quote.amount,
        competitor_clamped = quote.breakdown.competitor_clamped,
        "price quoted"
    );

    Ok(Json(quote))
}

// Range checks only cover the calendar fields; demand, stock and competitor
// values are passed through as given.
fn into_factors(request: QuoteRequest) -> Result<PricingFactors, AppError> {
    let time_of_day = u8::try_from(request.time_of_day)
        .ok()
        .filter(|hour| *hour <= 23)
        .ok_or_else(|| AppError::BadRequest("timeOfDay must be 0-23".to_string()))?;
    let day_of_week = u8::try_from(request.day_of_week)
        .ok()
        .filter(|day| *day <= 6)
        .ok_or_else(|| AppError::BadRequest("dayOfWeek must be 0-6".to_string()))?;

    let all_finite = request.base_price.is_finite()
        && request.demand.is_finite()
        && request.stock_level.is_none_or(f64::is_finite)
        && request.competitor_prices.iter().all(|price| price.is_finite());
    if !all_finite {
        return Err(AppError::BadRequest(
            "pricing factors must be finite numbers".to_string(),
        ));
    }

    Ok(PricingFactors {
        base_price: request.base_price,
        demand: request.demand,
        time_of_day,
        day_of_week,
        special_event: request.special_event,
        competitor_prices: request.competitor_prices,
        stock_level: request.stock_level,
    })
}
