// Live reading feed - owns the subscription and the derived history
use crate::application::reading_source::{ReadingSource, SourceError, SourceItem};
use crate::domain::history::HistoricalSet;
use crate::domain::reading::Reading;
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Snapshot of the feed, handed out by value. `loading` is true only while
/// the initial handshake or a refetch is in flight; a stale reading with an
/// error alongside it is the expected state after a failed refresh.
#[derive(Debug, Clone)]
pub struct FeedState {
    pub current: Option<Reading>,
    pub historical: HistoricalSet,
    pub loading: bool,
    pub error: Option<SourceError>,
}

impl FeedState {
    fn initial() -> Self {
        Self {
            current: None,
            historical: HistoricalSet::default(),
            loading: true,
            error: None,
        }
    }
}

enum FeedCommand {
    Refetch { ack: Option<oneshot::Sender<bool>> },
    Shutdown,
}

struct RefetchOutcome {
    result: SourceItem,
    ack: Option<oneshot::Sender<bool>>,
}

/// Actor handle for the live feed. A single task owns the state and applies
/// one event at a time (pushed readings, refetch results, commands), so
/// there is no locking around the reading or its derived series.
pub struct LiveFeed {
    commands: mpsc::Sender<FeedCommand>,
    state: watch::Receiver<FeedState>,
    task: JoinHandle<()>,
}

impl LiveFeed {
    pub fn spawn(source: Arc<dyn ReadingSource>) -> Self {
        Self::spawn_with_rng(source, StdRng::from_entropy())
    }

    /// Seedable entry point so tests can pin the synthetic history.
    pub fn spawn_with_rng(source: Arc<dyn ReadingSource>, rng: StdRng) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (state_tx, state_rx) = watch::channel(FeedState::initial());
        let task = tokio::spawn(run_feed(source, rng, command_rx, state_tx));
        Self {
            commands: command_tx,
            state: state_rx,
            task,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    /// One-shot pull from the source, bypassing the subscription. Returns
    /// whether the pull succeeded. Idempotent: overlapping calls queue
    /// additional pulls whose results are applied in arrival order.
    pub async fn refetch(&self) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        let command = FeedCommand::Refetch { ack: Some(ack_tx) };
        if self.commands.send(command).await.is_err() {
            return false;
        }
        ack_rx.await.unwrap_or(false)
    }

    /// Stop the feed. Readings arriving after teardown are dropped, not
    /// queued.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(FeedCommand::Shutdown).await;
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_feed(
    source: Arc<dyn ReadingSource>,
    mut rng: StdRng,
    mut commands: mpsc::Receiver<FeedCommand>,
    state_tx: watch::Sender<FeedState>,
) {
    let mut subscription = source.subscribe().await;
    let mut subscription_open = true;
    let (outcome_tx, mut outcomes) = mpsc::channel::<RefetchOutcome>(16);
    let mut state = FeedState::initial();
    let mut inflight: usize = 0;

    loop {
        tokio::select! {
            delivered = subscription.recv(), if subscription_open => match delivered {
                Some(item) => apply_source_item(&mut state, item, inflight, &mut rng),
                None => {
                    // Adapter closed the stream; pushed updates stop but
                    // manual refetch keeps working.
                    tracing::warn!("reading subscription ended");
                    subscription_open = false;
                    state.loading = inflight > 0;
                }
            },
            Some(outcome) = outcomes.recv() => {
                inflight = inflight.saturating_sub(1);
                let succeeded = outcome.result.is_ok();
                apply_source_item(&mut state, outcome.result, inflight, &mut rng);
                if let Some(ack) = outcome.ack {
                    let _ = ack.send(succeeded);
                }
            }
            command = commands.recv() => match command {
                Some(FeedCommand::Refetch { ack }) => {
                    inflight += 1;
                    state.loading = true;
                    let source = source.clone();
                    let outcome_tx = outcome_tx.clone();
                    // The pull runs off-loop and posts its result back as an
                    // event. Results land in arrival order with no sequence
                    // guard: a stale response can overwrite a fresher push.
                    tokio::spawn(async move {
                        let result = source.fetch_current().await;
                        let _ = outcome_tx.send(RefetchOutcome { result, ack }).await;
                    });
                }
                Some(FeedCommand::Shutdown) | None => break,
            },
        }

        if state_tx.send(state.clone()).is_err() {
            break;
        }
    }
    // Dropping the subscription receiver here is the teardown: late
    // deliveries fail at the sender and are silently discarded.
}

fn apply_source_item(
    state: &mut FeedState,
    item: SourceItem,
    inflight: usize,
    rng: &mut StdRng,
) {
    match item {
        Ok(Some(raw)) => {
            let now = Utc::now();
            let reading = raw.into_reading(now);
            tracing::debug!(
                ph = reading.ph,
                tds = reading.tds,
                temperature = reading.temperature,
                "applying reading"
            );
            state.historical = HistoricalSet::regenerate(Some(&reading), now, rng);
            state.current = Some(reading);
            state.error = None;
        }
        Ok(None) => {
            // The address holds no payload: a valid state, not an error.
            // Whatever was displayed before stays up.
            state.error = None;
        }
        Err(e) => {
            // Stale-but-available: never blank the display on a failure.
            tracing::warn!("reading source error: {e}");
            state.error = Some(e);
        }
    }
    state.loading = inflight > 0;
}
