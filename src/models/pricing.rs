use serde::{Deserialize, Serialize};

/// Live signals gathered by the order-history service for one quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingFactors {
    pub base_price: f64,
    pub demand: f64,
    pub time_of_day: u8,
    pub day_of_week: u8,
    #[serde(default)]
    pub special_event: bool,
    #[serde(default)]
    pub competitor_prices: Vec<f64>,
    #[serde(default)]
    pub stock_level: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub demand_multiplier: f64,
    pub time_multiplier: f64,
    pub weekend_multiplier: f64,
    pub event_multiplier: f64,
    pub stock_multiplier: f64,
    pub competitor_clamped: bool,
    pub unrounded: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub amount: f64,
    pub breakdown: PriceBreakdown,
}
