use chrono::{Duration, Utc};

use crate::domain::repository::OtpRepository;
use crate::error::IdentityServiceError;

/// Deletes codes that expired more than `retention` ago.
///
/// Expiry is enforced logically at verification time; this only bounds
/// table growth. The cutoff never lies after `now`, so an eligible record is
/// never deleted, even with a negative `retention`.
pub struct PurgeExpiredOtpsUseCase<O: OtpRepository> {
    pub otps: O,
    pub retention: Duration,
}

impl<O: OtpRepository> PurgeExpiredOtpsUseCase<O> {
    pub async fn execute(&self) -> Result<u64, IdentityServiceError> {
        let now = Utc::now();
        let cutoff = (now - self.retention).min(now);
        self.otps.purge_expired(cutoff).await
    }

    /// Run `execute` every `every` until the task is dropped.
    /// A zero period is raised to one second.
    pub async fn run(self, every: std::time::Duration) {
        let mut interval = tokio::time::interval(every.max(std::time::Duration::from_secs(1)));
        loop {
            interval.tick().await;
            match self.execute().await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "purged expired otp records"),
                Err(e) => tracing::warn!(error = ?e, "otp purge failed"),
            }
        }
    }
}
