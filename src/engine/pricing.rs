use crate::models::pricing::{PriceBreakdown, PriceQuote, PricingFactors};

const DEMAND_FLOOR: f64 = 0.8;
const DEMAND_SPAN: f64 = 0.4;
const PEAK_MULTIPLIER: f64 = 1.10;
const OFF_PEAK_MULTIPLIER: f64 = 0.90;
const WEEKEND_MULTIPLIER: f64 = 1.15;
const EVENT_MULTIPLIER: f64 = 1.25;
const HIGH_STOCK_THRESHOLD: f64 = 80.0;
const HIGH_STOCK_MULTIPLIER: f64 = 0.80;
const COMPETITOR_CEILING: f64 = 1.2;
const COMPETITOR_TARGET: f64 = 1.15;

pub const DEFAULT_PEAK_HOURS: [u8; 6] = [11, 12, 13, 19, 20, 21];
pub const DEFAULT_CURRENCY_INCREMENT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    /// Smallest payable amount; quotes are rounded to a multiple of it.
    pub currency_increment: f64,
    pub peak_hours: Vec<u8>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency_increment: DEFAULT_CURRENCY_INCREMENT,
            peak_hours: DEFAULT_PEAK_HOURS.to_vec(),
        }
    }
}

/// Demand-aware price adjustment.
///
/// Multipliers are applied in a fixed order, then the competitor clamp, then
/// rounding. Inputs outside their documented ranges are not clamped.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn quote(&self, factors: &PricingFactors) -> PriceQuote {
        let demand_multiplier = DEMAND_FLOOR + (factors.demand / 100.0) * DEMAND_SPAN;
        let time_multiplier = if self.config.peak_hours.contains(&factors.time_of_day) {
            PEAK_MULTIPLIER
        } else {
            OFF_PEAK_MULTIPLIER
        };
        let weekend_multiplier = match factors.day_of_week {
            0 | 6 => WEEKEND_MULTIPLIER,
            _ => 1.0,
        };
        let event_multiplier = if factors.special_event {
            EVENT_MULTIPLIER
        } else {
            1.0
        };
        let stock_multiplier = match factors.stock_level {
            Some(level) if level > HIGH_STOCK_THRESHOLD => HIGH_STOCK_MULTIPLIER,
            _ => 1.0,
        };

        let mut price = factors.base_price;
        price *= demand_multiplier;
        price *= time_multiplier;
        price *= weekend_multiplier;
        price *= event_multiplier;
        price *= stock_multiplier;

        let mut competitor_clamped = false;
        if let Some(avg) = mean(&factors.competitor_prices) {
            if price > avg * COMPETITOR_CEILING {
                price = avg * COMPETITOR_TARGET;
                competitor_clamped = true;
            }
        }

        PriceQuote {
            amount: self.round_to_increment(price),
            breakdown: PriceBreakdown {
                demand_multiplier,
                time_multiplier,
                weekend_multiplier,
                event_multiplier,
                stock_multiplier,
                competitor_clamped,
                unrounded: price,
            },
        }
    }

    fn round_to_increment(&self, price: f64) -> f64 {
        let increment = self.config.currency_increment;
        if increment <= 0.0 {
            return price;
        }
        (price / increment).round() * increment
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
