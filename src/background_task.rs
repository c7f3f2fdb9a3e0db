use tokio::time::{interval, Duration};

use crate::{auth::revocation::InMemoryRevocations, limiter::rate_limiter::SlidingWindowLimiter};

const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60 * 10);

/// Drops expired sign-out entries and idle rate-limit windows.
pub async fn start_housekeeping_task(
    revocations: Option<InMemoryRevocations>,
    limiter: SlidingWindowLimiter,
) {
    let mut interval = interval(HOUSEKEEPING_INTERVAL);

    loop {
        interval.tick().await;

        if let Some(revocations) = &revocations {
            let purged = revocations.purge_expired();
            if purged > 0 {
                tracing::info!("Purged {} expired token revocations", purged);
            }
        }

        let evicted = limiter.evict_idle();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle rate-limit windows", evicted);
        }
    }
}
