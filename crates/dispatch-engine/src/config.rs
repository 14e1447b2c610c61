use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::operator::types::PartyId;

/// Dispatch engine configuration
///
/// The main configuration structure covering all aspects of order dispatch,
/// from system limits to escalation timing and intake pricing.
///
/// # Configuration Sections
///
/// - [`general`](DispatchConfig::general): main operator identity and system limits
/// - [`escalation`](DispatchConfig::escalation): acceptance timeout driving automatic reassignment
/// - [`pricing`](DispatchConfig::pricing): quote margin and minimum order total for intake
///
/// # Examples
///
/// ```
/// use tiffin_dispatch_engine::prelude::*;
/// use std::time::Duration;
///
/// let mut config = DispatchConfig::default();
/// config.general.main_operator = PartyId(990001);
/// config.escalation.acceptance_timeout = Duration::from_secs(45);
///
/// config.validate().expect("configuration should be valid");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// General settings including the main operator id and system limits
    pub general: GeneralConfig,

    /// Escalation timing for unanswered assignments
    pub escalation: EscalationConfig,

    /// Quote computation settings offered to the intake layer
    pub pricing: PricingConfig,
}

/// General dispatch system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Identity of the main operator
    ///
    /// The main operator manages the roster and never receives order
    /// assignments. The registry is seeded with this id at engine startup.
    pub main_operator: PartyId,

    /// Maximum number of in-flight orders (pending plus accepted)
    ///
    /// When this limit is reached, new submissions are rejected before a
    /// token is allocated.
    pub max_open_orders: usize,
}

/// Escalation timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// How long an assigned operator has to accept before the order is
    /// reassigned to the next candidate. A fresh timer is armed after every
    /// reassignment, so a pending order keeps escalating until accepted.
    pub acceptance_timeout: Duration,
}

/// Quote computation configuration
///
/// The engine does not run intake conversations, but the quote math lives
/// here so the intake shell and the engine agree on it. See
/// [`PricingConfig::quote`](crate::pricing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Fraction of the item total the customer is charged before tax
    pub margin: f64,

    /// Minimum accepted item total; lower amounts are rejected at intake
    pub min_item_total: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            escalation: EscalationConfig::default(),
            pricing: PricingConfig::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            main_operator: PartyId(1),
            max_open_orders: 1000,
        }
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            acceptance_timeout: Duration::from_secs(60),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            margin: 0.5,
            min_item_total: 149.0,
        }
    }
}

impl DispatchConfig {
    /// Validate the configuration
    ///
    /// Returns `DispatchError::Configuration` describing the first invalid
    /// setting found.
    pub fn validate(&self) -> Result<()> {
        if self.general.max_open_orders == 0 {
            return Err(DispatchError::configuration(
                "max_open_orders must be greater than zero",
            ));
        }

        if self.escalation.acceptance_timeout.is_zero() {
            return Err(DispatchError::configuration(
                "acceptance_timeout must be greater than zero",
            ));
        }

        if !self.pricing.margin.is_finite() || self.pricing.margin <= 0.0 || self.pricing.margin > 1.0 {
            return Err(DispatchError::configuration(
                "pricing margin must be in (0, 1]",
            ));
        }

        if !self.pricing.min_item_total.is_finite() || self.pricing.min_item_total < 0.0 {
            return Err(DispatchError::configuration(
                "min_item_total must be non-negative",
            ));
        }

        Ok(())
    }
}
