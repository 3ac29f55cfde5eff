//! Periodic push loop with a cancellable wait phase
//!
//! The scheduler owns the push-enabled flag. At most one loop task is alive at
//! a time; a disable request is honored at the next one-second checkpoint of
//! the wait phase, and shutdown cancels the loop outright.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::constants::wait_poll_granularity;
use crate::core::pipeline::PushPipeline;

/// Externally visible scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Disabled,
    Running,
}

/// Handle to the live loop task
struct LoopHandle {
    id: u64,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

/// Slot holding the live loop. A loop only exits while holding this lock.
type LoopSlot = Arc<Mutex<Option<LoopHandle>>>;

pub struct AutoPushScheduler {
    pipeline: Arc<PushPipeline>,
    enabled: Arc<AtomicBool>,
    active: LoopSlot,
    next_id: AtomicU64,
    interval: Duration,
    retry_backoff: Duration,
}

impl AutoPushScheduler {
    pub fn new(pipeline: Arc<PushPipeline>, interval: Duration, retry_backoff: Duration) -> Self {
        Self {
            pipeline,
            enabled: Arc::new(AtomicBool::new(false)),
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
            interval,
            retry_backoff,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SchedulerState {
        if self.is_enabled() {
            SchedulerState::Running
        } else {
            SchedulerState::Disabled
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Set the flag and spawn the loop unless one is already alive.
    pub async fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        self.ensure_running().await;
    }

    /// Clear the flag. The loop exits at its next checkpoint.
    pub fn disable(&self) {
        if self.enabled.swap(false, Ordering::SeqCst) {
            info!("[PUSH] Auto push disabled");
        }
    }

    /// Flip the flag. Returns the new state.
    pub async fn toggle(&self) -> SchedulerState {
        if self.is_enabled() {
            self.disable();
        } else {
            self.enable().await;
        }
        self.state()
    }

    /// Whether a loop task is currently alive
    pub async fn is_looping(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.join.is_finished())
    }

    async fn ensure_running(&self) {
        let mut active = self.active.lock().await;
        if active.as_ref().is_some_and(|handle| !handle.join.is_finished()) {
            return;
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let cancel = CancellationToken::new();
        let join = tokio::spawn(push_loop(
            self.pipeline.clone(),
            self.enabled.clone(),
            self.active.clone(),
            id,
            cancel.clone(),
            self.interval,
            self.retry_backoff,
        ));
        *active = Some(LoopHandle { id, cancel, join });
    }

    /// Stop the loop unconditionally; an in-flight cycle is abandoned.
    pub async fn shutdown(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        // Release the slot before joining; the exiting loop locks it too
        let handle = self.active.lock().await.take();
        if let Some(handle) = handle {
            handle.cancel.cancel();
            if let Err(e) = handle.join.await {
                if !e.is_cancelled() {
                    error!(error = %e, "[PUSH] Auto push task ended abnormally");
                }
            }
        }
    }
}

async fn push_loop(
    pipeline: Arc<PushPipeline>,
    enabled: Arc<AtomicBool>,
    slot: LoopSlot,
    id: u64,
    cancel: CancellationToken,
    interval: Duration,
    retry_backoff: Duration,
) {
    info!(loop_id = id, interval_secs = interval.as_secs(), "[PUSH] Auto push loop started");

    loop {
        if !enabled.load(Ordering::SeqCst) && release_slot(&slot, &enabled, id).await {
            break;
        }

        // The cycle runs in its own task so a panic inside it is caught here
        let cycle = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.run_cycle().await }
        });
        let abort = cycle.abort_handle();

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                abort.abort();
                break;
            }
            outcome = cycle => outcome,
        };

        match outcome {
            Ok(true) => info!("[PUSH] Auto push successful"),
            Ok(false) => error!("[PUSH] Auto push failed"),
            Err(e) => {
                error!(error = %e, "[PUSH] Auto push cycle crashed, backing off");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(retry_backoff) => {}
                }
                continue;
            }
        }

        if !wait_for_next_cycle(&enabled, &cancel, interval).await {
            break;
        }
    }

    if cancel.is_cancelled() {
        warn!("[PUSH] Auto push loop cancelled");
    } else {
        info!("[PUSH] Auto push loop stopped");
    }
}

/// Decide whether loop `id` may exit, vacating its slot if so.
///
/// Runs under the slot lock, so a concurrent `enable` either sees the flag
/// already set here (the loop keeps going) or finds the slot empty and
/// spawns a fresh loop.
async fn release_slot(slot: &Mutex<Option<LoopHandle>>, enabled: &AtomicBool, id: u64) -> bool {
    let mut active = slot.lock().await;
    if enabled.load(Ordering::SeqCst) {
        return false;
    }
    if active.as_ref().is_some_and(|handle| handle.id == id) {
        *active = None;
    }
    true
}

/// Sleep up to `interval` in one-second steps, rechecking the flag each step.
///
/// Returns `false` when cancelled.
async fn wait_for_next_cycle(
    enabled: &AtomicBool,
    cancel: &CancellationToken,
    interval: Duration,
) -> bool {
    let step = wait_poll_granularity();
    let mut waited = Duration::ZERO;

    while waited < interval {
        if !enabled.load(Ordering::SeqCst) {
            return true;
        }
        let nap = step.min(interval - waited);
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(nap) => {}
        }
        waited += nap;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_utils::RecordingTransport;
    use crate::adapters::ChatId;
    use crate::config::SourcesConfig;
    use crate::core::sender::ChannelSender;
    use crate::sources::DataSource;
    use std::time::Instant;

    fn scheduler(transport: Arc<RecordingTransport>, interval: Duration) -> AutoPushScheduler {
        let sender = ChannelSender::new(
            transport,
            ChatId::parse("@alerts"),
            4096,
            Duration::from_millis(1),
        );
        let pipeline = PushPipeline::new(DataSource::new(SourcesConfig::default()), sender);
        AutoPushScheduler::new(Arc::new(pipeline), interval, Duration::from_millis(50))
    }

    async fn wait_until_sent(transport: &RecordingTransport, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while transport.attempts() < count && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_starts_disabled() {
        let scheduler = scheduler(Arc::new(RecordingTransport::new()), Duration::from_secs(60));
        assert_eq!(scheduler.state(), SchedulerState::Disabled);
        assert!(!scheduler.is_looping().await);
    }

    #[tokio::test]
    async fn test_enable_pushes_immediately() {
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = scheduler(transport.clone(), Duration::from_secs(3600));

        scheduler.enable().await;
        wait_until_sent(&transport, 1).await;

        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(transport.attempts(), 1);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_disable_exits_wait_phase_promptly() {
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = scheduler(transport.clone(), Duration::from_secs(3600));

        scheduler.enable().await;
        wait_until_sent(&transport, 1).await;

        let started = Instant::now();
        scheduler.disable();
        while scheduler.is_looping().await && started.elapsed() < Duration::from_secs(3) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(!scheduler.is_looping().await);
        assert!(started.elapsed() <= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_second_enable_reuses_live_loop() {
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = scheduler(transport.clone(), Duration::from_secs(3600));

        scheduler.enable().await;
        scheduler.enable().await;
        wait_until_sent(&transport, 1).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        // A second loop would have pushed a second report
        assert_eq!(transport.attempts(), 1);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_looping() {
        let transport = Arc::new(RecordingTransport::failing());
        let scheduler = scheduler(transport.clone(), Duration::from_secs(1));

        scheduler.enable().await;
        wait_until_sent(&transport, 2).await;

        assert!(transport.attempts() >= 2);
        assert!(scheduler.is_looping().await);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_reenable_around_wait_checkpoint_keeps_loop_alive() {
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = scheduler(transport.clone(), Duration::from_secs(3600));

        scheduler.enable().await;
        wait_until_sent(&transport, 1).await;

        // Re-enable on both sides of the loop's one-second checkpoint
        for offset_ms in [0u64, 940, 990, 1000, 1010, 1060] {
            scheduler.disable();
            tokio::time::sleep(Duration::from_millis(offset_ms)).await;
            scheduler.enable().await;
        }

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(scheduler.is_enabled());
        assert!(scheduler.is_looping().await);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_enable_after_loop_exit_spawns_fresh_loop() {
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = scheduler(transport.clone(), Duration::from_secs(3600));

        scheduler.enable().await;
        wait_until_sent(&transport, 1).await;
        scheduler.disable();
        while scheduler.is_looping().await {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        scheduler.enable().await;
        wait_until_sent(&transport, 2).await;

        assert_eq!(transport.attempts(), 2);
        assert!(scheduler.is_looping().await);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_toggle_flips_state() {
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = scheduler(transport, Duration::from_secs(3600));

        assert_eq!(scheduler.toggle().await, SchedulerState::Running);
        assert_eq!(scheduler.toggle().await, SchedulerState::Disabled);
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_cancels_loop() {
        let transport = Arc::new(RecordingTransport::new());
        let scheduler = scheduler(transport.clone(), Duration::from_secs(3600));

        scheduler.enable().await;
        wait_until_sent(&transport, 1).await;

        let started = Instant::now();
        scheduler.shutdown().await;
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(!scheduler.is_looping().await);
        assert!(!scheduler.is_enabled());
    }
}
