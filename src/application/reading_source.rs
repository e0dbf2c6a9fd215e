// Port for the external realtime reading source
use crate::domain::reading::RawReading;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Failure reaching the realtime store. Never fatal: the feed keeps the
/// last good reading visible and the next refetch or auto-refresh tick
/// retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("realtime source unavailable: {0}")]
    Unavailable(String),
}

/// One delivery from the subscription. `Ok(None)` means the logical address
/// holds no payload yet, which is a valid state, not an error.
pub type SourceItem = Result<Option<RawReading>, SourceError>;

#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// One-shot pull of the current payload, bypassing the subscription.
    async fn fetch_current(&self) -> SourceItem;

    /// Open a standing subscription to the source's single logical
    /// address. The subscription ends when the receiver is dropped.
    async fn subscribe(&self) -> mpsc::Receiver<SourceItem>;
}
