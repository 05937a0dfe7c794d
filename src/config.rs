use std::env;

use crate::engine::optimizer::DEFAULT_STOP_OVERHEAD_MINUTES;
use crate::engine::pricing::{DEFAULT_CURRENCY_INCREMENT, DEFAULT_PEAK_HOURS, PricingConfig};
use crate::error::AppError;

const MAX_STOP_OVERHEAD_MINUTES: u32 = 240;
const MAX_JOB_RETENTION_SECS: u64 = 7 * 24 * 3_600;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub job_queue_size: usize,
    pub event_buffer_size: usize,
    pub currency_increment: f64,
    pub peak_hours: Vec<u8>,
    pub default_max_capacity: u32,
    pub stop_overhead_minutes: u32,
    pub dispatch_timeout_ms: u64,
    pub job_retention_secs: u64,
    pub job_sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            job_queue_size: 1024,
            event_buffer_size: 1024,
            currency_increment: DEFAULT_CURRENCY_INCREMENT,
            peak_hours: DEFAULT_PEAK_HOURS.to_vec(),
            default_max_capacity: 3,
            stop_overhead_minutes: DEFAULT_STOP_OVERHEAD_MINUTES,
            dispatch_timeout_ms: 2_000,
            job_retention_secs: 3_600,
            job_sweep_interval_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let config = Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            job_queue_size: parse_or_default("JOB_QUEUE_SIZE", defaults.job_queue_size)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            currency_increment: parse_or_default(
                "CURRENCY_INCREMENT",
                defaults.currency_increment,
            )?,
            peak_hours: match env::var("PEAK_HOURS") {
                Ok(raw) => parse_hours(&raw)?,
                Err(_) => defaults.peak_hours,
            },
            default_max_capacity: parse_or_default(
                "DEFAULT_MAX_CAPACITY",
                defaults.default_max_capacity,
            )?,
            stop_overhead_minutes: parse_or_default(
                "STOP_OVERHEAD_MINUTES",
                defaults.stop_overhead_minutes,
            )?,
            dispatch_timeout_ms: parse_or_default(
                "DISPATCH_TIMEOUT_MS",
                defaults.dispatch_timeout_ms,
            )?,
            job_retention_secs: parse_or_default(
                "JOB_RETENTION_SECS",
                defaults.job_retention_secs,
            )?,
            job_sweep_interval_secs: parse_or_default(
                "JOB_SWEEP_INTERVAL_SECS",
                defaults.job_sweep_interval_secs,
            )?,
        };

        config.check()?;
        Ok(config)
    }

    pub fn pricing(&self) -> PricingConfig {
        PricingConfig {
            currency_increment: self.currency_increment,
            peak_hours: self.peak_hours.clone(),
        }
    }

    fn check(&self) -> Result<(), AppError> {
        if !(self.currency_increment.is_finite() && self.currency_increment > 0.0) {
            return Err(AppError::Internal(
                "CURRENCY_INCREMENT must be a positive number".to_string(),
            ));
        }
        if self.default_max_capacity == 0 {
            return Err(AppError::Internal(
                "DEFAULT_MAX_CAPACITY must be > 0".to_string(),
            ));
        }
        if self.stop_overhead_minutes > MAX_STOP_OVERHEAD_MINUTES {
            return Err(AppError::Internal(format!(
                "STOP_OVERHEAD_MINUTES must be <= {MAX_STOP_OVERHEAD_MINUTES}"
            )));
        }
        if self.job_retention_secs > MAX_JOB_RETENTION_SECS {
            return Err(AppError::Internal(format!(
                "JOB_RETENTION_SECS must be <= {MAX_JOB_RETENTION_SECS}"
            )));
        }
        if self.job_sweep_interval_secs == 0 {
            return Err(AppError::Internal(
                "JOB_SWEEP_INTERVAL_SECS must be > 0".to_string(),
            ));
        }
        if self.job_queue_size == 0 || self.event_buffer_size == 0 {
            return Err(AppError::Internal(
                "queue and event buffer sizes must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_hours(raw: &str) -> Result<Vec<u8>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<u8>() {
            Ok(hour) if hour < 24 => Ok(hour),
            Ok(hour) => Err(AppError::Internal(format!(
                "invalid PEAK_HOURS: {hour} is not an hour of the day"
            ))),
            Err(err) => Err(AppError::Internal(format!("invalid PEAK_HOURS: {err}"))),
        })
        .collect()
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
