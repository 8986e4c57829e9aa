use async_trait::async_trait;
use std::time::Duration;

/// Port for back-off delays
///
/// Injected so retry loops can be exercised without real waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}
