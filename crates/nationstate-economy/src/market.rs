//! Selling stockpiled resources for gold at fixed rates.

use tracing::debug;

use nationstate_types::{Nation, Resource};

use crate::construction::ensure_available;
use crate::error::EconomyError;
use crate::tables::sell_rate;

/// A completed sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleReceipt {
    /// Resource sold.
    pub resource: Resource,
    /// Quantity sold.
    pub amount: u64,
    /// Gold received.
    pub gold: u64,
}

/// Sell `amount` of `resource` for gold.
pub fn sell(nation: &mut Nation, resource: Resource, amount: u64) -> Result<SaleReceipt, EconomyError> {
    let rate = sell_rate(resource).ok_or(EconomyError::NotSellable(resource))?;
    if amount == 0 {
        return Err(EconomyError::InvalidAmount);
    }
    ensure_available(nation, resource, amount)?;
    let gold = amount
        .checked_mul(rate)
        .ok_or_else(|| EconomyError::overflow("sale proceeds"))?;
    let new_gold = nation
        .resources
        .gold
        .checked_add(gold)
        .ok_or_else(|| EconomyError::overflow("gold after sale"))?;

    let stock = nation.resources.get_mut(resource);
    *stock = stock.saturating_sub(amount);
    nation.resources.gold = new_gold;
    debug!(nation = %nation.id, resource = %resource, amount, gold, "resources sold");

    Ok(SaleReceipt {
        resource,
        amount,
        gold,
    })
}
