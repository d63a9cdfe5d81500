//! Prize pool port and the city-fall transfer.
//!
//! Each nation has a token balance held by an external service. When a
//! city falls, the winner takes the loser's balance divided by the loser's
//! city count before the fall. The transfer runs after the attack has been
//! committed, and its failure is logged and swallowed: the game state never
//! depends on it.
//!
//! [`PrizePool`] abstracts the service. [`NoPrizePool`] is the disabled
//! port; [`LedgerPool`] keeps balances in memory for local play and tests.

use std::collections::BTreeMap;
use std::future::Future;

use rust_decimal::{Decimal, RoundingStrategy};
use tokio::sync::Mutex;
use tracing::{info, warn};

use nationstate_types::NationId;

use crate::config::PrizePoolSettings;

/// Decimal places kept on transferred amounts.
pub const AMOUNT_SCALE: u32 = 6;

/// Errors returned by a prize pool service.
#[derive(Debug, thiserror::Error)]
pub enum PrizePoolError {
    /// No pool is configured.
    #[error("prize pool unavailable")]
    Unavailable,

    /// The source pool cannot cover the transfer.
    #[error("insufficient {ticker} in pool {pool}: need {needed}, have {available}")]
    InsufficientBalance {
        /// The source pool.
        pool: NationId,
        /// Token ticker.
        ticker: String,
        /// Amount requested.
        needed: Decimal,
        /// Amount held.
        available: Decimal,
    },

    /// The service rejected or failed the request.
    #[error("prize pool service error: {message}")]
    Service {
        /// Description of the failure.
        message: String,
    },
}

/// A completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Service-assigned transaction hash.
    pub tx_hash: String,
    /// Amount moved.
    pub amount: Decimal,
}

/// Token balances held outside the game.
pub trait PrizePool {
    /// Balance of `ticker` in the pool of `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`PrizePoolError`] if the service cannot answer.
    fn balance(
        &self,
        pool: &NationId,
        ticker: &str,
    ) -> impl Future<Output = Result<Decimal, PrizePoolError>> + Send;

    /// Move `amount` of `ticker` from one pool to another.
    ///
    /// # Errors
    ///
    /// Returns [`PrizePoolError`] if the transfer does not complete.
    fn transfer(
        &self,
        from: &NationId,
        to: &NationId,
        ticker: &str,
        amount: Decimal,
    ) -> impl Future<Output = Result<TransferReceipt, PrizePoolError>> + Send;
}

/// A prize pool that is not there. Every call fails with
/// [`PrizePoolError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrizePool;

impl PrizePool for NoPrizePool {
    fn balance(
        &self,
        _pool: &NationId,
        _ticker: &str,
    ) -> impl Future<Output = Result<Decimal, PrizePoolError>> + Send {
        async { Err(PrizePoolError::Unavailable) }
    }

    fn transfer(
        &self,
        _from: &NationId,
        _to: &NationId,
        _ticker: &str,
        _amount: Decimal,
    ) -> impl Future<Output = Result<TransferReceipt, PrizePoolError>> + Send {
        async { Err(PrizePoolError::Unavailable) }
    }
}

#[derive(Debug, Default)]
struct Ledger {
    balances: BTreeMap<(NationId, String), Decimal>,
    transfers: u64,
}

/// In-memory balances keyed by nation and ticker.
#[derive(Debug, Default)]
pub struct LedgerPool {
    ledger: Mutex<Ledger>,
}

impl LedgerPool {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a pool's balance.
    pub async fn deposit(&self, pool: &NationId, ticker: &str, amount: Decimal) {
        let mut ledger = self.ledger.lock().await;
        let entry = ledger
            .balances
            .entry((pool.clone(), ticker.to_owned()))
            .or_insert(Decimal::ZERO);
        *entry = entry.saturating_add(amount);
    }
}

impl PrizePool for LedgerPool {
    fn balance(
        &self,
        pool: &NationId,
        ticker: &str,
    ) -> impl Future<Output = Result<Decimal, PrizePoolError>> + Send {
        let key = (pool.clone(), ticker.to_owned());
        async move {
            let ledger = self.ledger.lock().await;
            Ok(ledger.balances.get(&key).copied().unwrap_or(Decimal::ZERO))
        }
    }

    fn transfer(
        &self,
        from: &NationId,
        to: &NationId,
        ticker: &str,
        amount: Decimal,
    ) -> impl Future<Output = Result<TransferReceipt, PrizePoolError>> + Send {
        let from_key = (from.clone(), ticker.to_owned());
        let to_key = (to.clone(), ticker.to_owned());
        async move {
            let mut ledger = self.ledger.lock().await;
            let available = ledger.balances.get(&from_key).copied().unwrap_or(Decimal::ZERO);
            if available < amount {
                return Err(PrizePoolError::InsufficientBalance {
                    pool: from_key.0,
                    ticker: from_key.1,
                    needed: amount,
                    available,
                });
            }
            ledger
                .balances
                .insert(from_key, available.saturating_sub(amount));
            let target = ledger.balances.entry(to_key).or_insert(Decimal::ZERO);
            *target = target.saturating_add(amount);
            ledger.transfers = ledger.transfers.saturating_add(1);
            Ok(TransferReceipt {
                tx_hash: format!("{:#018x}", ledger.transfers),
                amount,
            })
        }
    }
}

/// The share of a pool balance lost with one of `cities_before` cities,
/// truncated to [`AMOUNT_SCALE`] places.
pub fn fall_share(balance: Decimal, cities_before: u64) -> Decimal {
    balance
        .checked_div(Decimal::from(cities_before.max(1)))
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToZero)
}

/// Move the loser's city-fall share to the winner.
///
/// Returns the receipt on success. Any failure is logged at `warn` and
/// returns `None`; nothing is retried.
pub async fn settle_city_fall<P: PrizePool>(
    pool: &P,
    settings: &PrizePoolSettings,
    winner: &NationId,
    loser: &NationId,
    cities_before: u64,
) -> Option<TransferReceipt> {
    if !settings.enabled {
        return None;
    }
    let ticker = settings.ticker.as_str();

    let balance = match pool.balance(loser, ticker).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!(nation = %loser, ticker, error = %e, "prize pool balance lookup failed");
            return None;
        }
    };
    let amount = fall_share(balance, cities_before);
    if amount <= Decimal::ZERO {
        return None;
    }

    match pool.transfer(loser, winner, ticker, amount).await {
        Ok(receipt) => {
            info!(
                from = %loser,
                to = %winner,
                ticker,
                amount = %receipt.amount,
                tx_hash = %receipt.tx_hash,
                "prize pool transfer complete"
            );
            Some(receipt)
        }
        Err(e) => {
            warn!(from = %loser, to = %winner, ticker, %amount, error = %e, "prize pool transfer failed");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn enabled() -> PrizePoolSettings {
        PrizePoolSettings {
            enabled: true,
            ticker: String::from("AVAX"),
        }
    }

    #[test]
    fn share_is_truncated_not_rounded() {
        assert_eq!(fall_share(dec!(10), 3), dec!(3.333333));
        assert_eq!(fall_share(dec!(2), 3), dec!(0.666666));
        assert_eq!(fall_share(dec!(7), 0), dec!(7));
    }

    #[tokio::test]
    async fn transfer_moves_share_to_winner() {
        let pool = LedgerPool::new();
        let (winner, loser) = (NationId::new("w"), NationId::new("l"));
        pool.deposit(&loser, "AVAX", dec!(9)).await;

        let receipt = settle_city_fall(&pool, &enabled(), &winner, &loser, 3)
            .await
            .unwrap();
        assert_eq!(receipt.amount, dec!(3));
        assert_eq!(pool.balance(&loser, "AVAX").await.unwrap(), dec!(6));
        assert_eq!(pool.balance(&winner, "AVAX").await.unwrap(), dec!(3));
    }

    #[tokio::test]
    async fn disabled_pool_does_nothing() {
        let pool = LedgerPool::new();
        let (winner, loser) = (NationId::new("w"), NationId::new("l"));
        pool.deposit(&loser, "AVAX", dec!(9)).await;

        let settings = PrizePoolSettings::default();
        assert!(settle_city_fall(&pool, &settings, &winner, &loser, 1).await.is_none());
        assert_eq!(pool.balance(&loser, "AVAX").await.unwrap(), dec!(9));
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let (winner, loser) = (NationId::new("w"), NationId::new("l"));
        assert!(
            settle_city_fall(&NoPrizePool, &enabled(), &winner, &loser, 2)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn empty_balance_skips_transfer() {
        let pool = LedgerPool::new();
        let (winner, loser) = (NationId::new("w"), NationId::new("l"));
        assert!(settle_city_fall(&pool, &enabled(), &winner, &loser, 1).await.is_none());
    }
}
