//! Change sources feeding the poller.

use async_trait::async_trait;
use changewatch_models::ObservedChange;

use crate::error::Result;

/// Something that can report what changed since it was last asked.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Changes seen since the previous call.
    ///
    /// Implementations keep their own position (cursor, timestamp) so that
    /// repeated calls do not report the same event twice; the change log
    /// deduplicates anyway.
    async fn poll(&self) -> Result<Vec<ObservedChange>>;
}
