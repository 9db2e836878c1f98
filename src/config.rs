//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STOREFRONT_DELIVERY_FEE` - Flat surcharge for `Delivery` orders (default: 50)
//! - `STOREFRONT_ORDER_PREFIX` - Order number prefix (default: ORD)
//! - `STOREFRONT_ACTOR_BUFFER` - Request channel capacity per table actor (default: 32)
//! - `STOREFRONT_PLACEHOLDER_IMAGE` - Image shown for products without one (default: /placeholder.png)

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_DELIVERY_FEE: i64 = 50;
pub const DEFAULT_ORDER_PREFIX: &str = "ORD";
pub const DEFAULT_ACTOR_BUFFER: usize = 32;
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/placeholder.png";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    pub delivery_fee: Decimal,
    pub order_prefix: String,
    pub actor_buffer: usize,
    pub placeholder_image: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            delivery_fee: Decimal::from(DEFAULT_DELIVERY_FEE),
            order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
            actor_buffer: DEFAULT_ACTOR_BUFFER,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed or is
    /// out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same parsing as [`from_env`](Self::from_env) against an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let delivery_fee: Decimal = parse_or(&lookup, "STOREFRONT_DELIVERY_FEE", || {
            Decimal::from(DEFAULT_DELIVERY_FEE)
        })?;
        if delivery_fee < Decimal::ZERO {
            return Err(invalid("STOREFRONT_DELIVERY_FEE", "must not be negative"));
        }

        let order_prefix = get_or_default(&lookup, "STOREFRONT_ORDER_PREFIX", DEFAULT_ORDER_PREFIX);
        if order_prefix.trim().is_empty() {
            return Err(invalid("STOREFRONT_ORDER_PREFIX", "must not be blank"));
        }

        let actor_buffer: usize =
            parse_or(&lookup, "STOREFRONT_ACTOR_BUFFER", || DEFAULT_ACTOR_BUFFER)?;
        if actor_buffer == 0 {
            return Err(invalid("STOREFRONT_ACTOR_BUFFER", "must be at least 1"));
        }

        let placeholder_image = get_or_default(
            &lookup,
            "STOREFRONT_PLACEHOLDER_IMAGE",
            DEFAULT_PLACEHOLDER_IMAGE,
        );

        Ok(Self {
            delivery_fee,
            order_prefix: order_prefix.trim().to_string(),
            actor_buffer,
            placeholder_image,
        })
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.into())
}

fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: impl FnOnce() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| invalid(key, e.to_string())),
        None => Ok(default()),
    }
}
