//! Mint intent - hand-off to the transaction layer
//!
//! Building and sending the transaction is the mint layer's job. This
//! module only assembles what it consumes: a fresh asset signer, the
//! configured accounts, and the countdown picture at preparation time.

use tracing::info;

use excavate_core::{ExcavateError, ExcavateResult, WallClock, WallTime};
use excavate_crypto::AssetSigner;
use excavate_tiers::{evaluate_all, TierCountdown};
use excavate_transport::RemoteClockSource;

use crate::{Estimator, MintAccounts};

/// Everything the mint layer needs for one excavation
#[derive(Debug)]
pub struct MintIntent {
    /// New asset identity, never reused
    pub asset: AssetSigner,
    pub accounts: MintAccounts,
    pub prepared_at: WallTime,
    /// Estimated slot at preparation, if a sample exists
    pub estimated_slot: Option<f64>,
    /// Per-tier countdowns at preparation
    pub countdowns: Vec<TierCountdown>,
}

impl MintIntent {
    /// Tiers whose countdown is within the imminent threshold
    pub fn imminent_tiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.countdowns
            .iter()
            .filter(|c| c.imminent)
            .map(|c| c.tier.name)
    }
}

impl<S: RemoteClockSource, C: WallClock> Estimator<S, C> {
    /// Assemble a mint intent against the current estimate
    pub fn prepare_mint(&self, accounts: MintAccounts) -> ExcavateResult<MintIntent> {
        if self.is_shut_down() {
            return Err(ExcavateError::ShutDown);
        }

        let prepared_at = self.now();
        let estimate = self.estimate();
        let countdowns = estimate
            .map(|state| evaluate_all(&state, self.config().imminent_threshold))
            .unwrap_or_default();

        let asset = AssetSigner::generate();
        info!(
            asset = %asset.address(),
            fingerprint = asset.fingerprint(),
            estimated_slot = estimate.map(|s| s.estimated_slot),
            "prepared mint intent"
        );

        Ok(MintIntent {
            asset,
            accounts,
            prepared_at,
            estimated_slot: estimate.map(|s| s.estimated_slot),
            countdowns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Arc;

    use excavate_core::WallTime;
    use excavate_transport::ClockReading;

    use crate::EstimatorConfig;

    struct Fixed;

    impl RemoteClockSource for Fixed {
        fn read(&self) -> impl Future<Output = ExcavateResult<ClockReading>> + Send {
            // 1020 sits 4 slots before a multiple of 1024
            async { Ok(ClockReading::new(1020, 432_000, 431_950)) }
        }
    }

    struct Frozen;

    impl WallClock for Frozen {
        fn now(&self) -> WallTime {
            WallTime::from_secs(1_700_000_000)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepare_mint_snapshots_countdowns() {
        let estimator =
            Estimator::start(Arc::new(Fixed), Arc::new(Frozen), EstimatorConfig::default()).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let a = estimator.prepare_mint(MintAccounts::default()).unwrap();
        let b = estimator.prepare_mint(MintAccounts::default()).unwrap();

        assert_ne!(a.asset.address(), b.asset.address());
        assert_eq!(a.estimated_slot, Some(1020.0));
        assert_eq!(a.prepared_at, WallTime::from_secs(1_700_000_000));

        let imminent: Vec<_> = a.imminent_tiers().collect();
        assert!(imminent.contains(&"Jade"));
        assert!(imminent.contains(&"Bronze"));
        assert!(!imminent.contains(&"Necrotic"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepare_mint_after_shutdown() {
        let estimator =
            Estimator::start(Arc::new(Fixed), Arc::new(Frozen), EstimatorConfig::default()).unwrap();
        estimator.shutdown();

        assert!(matches!(
            estimator.prepare_mint(MintAccounts::default()),
            Err(ExcavateError::ShutDown)
        ));
    }
}
