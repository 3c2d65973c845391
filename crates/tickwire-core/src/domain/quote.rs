use serde::{Deserialize, Serialize};

use crate::{Ticker, ValidationError};

/// Top-of-book quote persisted by the relational store.
///
/// The ticker is the sole identity; every price/size field is independently
/// updatable on refresh. Nothing here is server-generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: Ticker,
    pub last_price: f64,
    pub bid_price: f64,
    pub bid_size: i64,
    pub ask_price: f64,
    pub ask_size: i64,
}

impl Quote {
    pub fn new(
        ticker: Ticker,
        last_price: f64,
        bid_price: f64,
        bid_size: i64,
        ask_price: f64,
        ask_size: i64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("last_price", last_price)?;
        validate_non_negative("bid_price", bid_price)?;
        validate_non_negative("ask_price", ask_price)?;
        validate_size("bid_size", bid_size)?;
        validate_size("ask_size", ask_size)?;

        Ok(Self {
            ticker,
            last_price,
            bid_price,
            bid_size,
            ask_price,
            ask_size,
        })
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_size(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
