//! Quote computation for intake
//!
//! The engine does not run the intake conversation, but the final-price math
//! lives here so the intake shell quotes exactly what the operator's order
//! card will show: the customer pays a configured fraction of the item total
//! plus tax, rounded to two decimals, and totals under the configured minimum
//! are rejected outright.

use crate::config::PricingConfig;
use crate::error::{DispatchError, Result};

/// A computed price quote
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Item total the customer entered
    pub item_total: f64,

    /// Tax amount the customer entered
    pub gst: f64,

    /// What the customer actually pays
    pub final_price: f64,
}

impl PricingConfig {
    /// Compute the final price for an item total and tax amount
    ///
    /// Fails with `BelowMinimum` when the item total is under the configured
    /// minimum, and with `InvalidOperation` for non-finite or negative
    /// amounts (unparseable input is the intake shell's problem; nonsense
    /// numbers are ours).
    ///
    /// # Examples
    ///
    /// ```
    /// use tiffin_dispatch_engine::prelude::*;
    ///
    /// let pricing = PricingConfig::default();
    /// let quote = pricing.quote(300.0, 24.0).unwrap();
    /// assert_eq!(quote.final_price, 174.0);
    ///
    /// assert!(matches!(
    ///     pricing.quote(100.0, 5.0),
    ///     Err(DispatchError::BelowMinimum(_, _))
    /// ));
    /// ```
    pub fn quote(&self, item_total: f64, gst: f64) -> Result<Quote> {
        if !item_total.is_finite() || !gst.is_finite() || gst < 0.0 {
            return Err(DispatchError::invalid_operation(
                "amounts must be finite and non-negative",
            ));
        }
        if item_total < self.min_item_total {
            return Err(DispatchError::BelowMinimum(item_total, self.min_item_total));
        }

        Ok(Quote {
            item_total,
            gst,
            final_price: round2(item_total * self.margin + gst),
        })
    }
}

/// Round to two decimal places, the precision quotes are shown at
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
