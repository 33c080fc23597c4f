use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::events::Tick;

/// Owner of the single recurring auto-advance timer.
///
/// Every start first stops whatever is running, so there is never more
/// than one tick task per widget. Each start bumps the generation; ticks
/// from an earlier generation that are still queued are refused by
/// [`AutoAdvanceTimer::accepts`].
#[derive(Debug)]
pub struct AutoAdvanceTimer {
    ticks: Sender<Tick>,
    generation: u64,
    running: Option<RunningTimer>,
}

#[derive(Debug)]
struct RunningTimer {
    period: Duration,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl AutoAdvanceTimer {
    pub fn new(ticks: Sender<Tick>) -> Self {
        Self {
            ticks,
            generation: 0,
            running: None,
        }
    }

    /// Start ticking every `period`, replacing any running timer.
    pub fn start(&mut self, period: Duration) {
        self.start_after(Duration::ZERO, period);
    }

    /// Like [`start`](Self::start), but the first tick lands at `delay + period`.
    pub fn start_after(&mut self, delay: Duration, period: Duration) {
        // tokio intervals panic on a zero period
        let period = period.max(Duration::from_millis(1));
        self.stop();
        self.generation += 1;
        let generation = self.generation;
        let cancel = CancellationToken::new();
        let task = tokio::spawn(tick_loop(
            generation,
            delay,
            period,
            self.ticks.clone(),
            cancel.clone(),
        ));
        debug!(
            generation,
            period_ms = period.as_millis() as u64,
            delay_ms = delay.as_millis() as u64,
            "auto-advance timer started"
        );
        self.running = Some(RunningTimer {
            period,
            cancel,
            task,
        });
    }

    /// Start only if nothing is running. Returns whether a timer was started.
    pub fn ensure_running(&mut self, period: Duration) -> bool {
        if self.running.is_some() {
            return false;
        }
        self.start(period);
        true
    }

    /// Cancel the running timer, if any. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };
        running.cancel.cancel();
        running.task.abort();
        debug!(generation = self.generation, "auto-advance timer stopped");
        true
    }

    pub fn reschedule(&mut self, period: Duration) {
        self.stop();
        self.start(period);
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.running.as_ref().map(|running| running.period)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when `tick` came from the timer that is running now.
    pub fn accepts(&self, tick: Tick) -> bool {
        self.running.is_some() && tick.generation == self.generation
    }
}

impl Drop for AutoAdvanceTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn tick_loop(
    generation: u64,
    delay: Duration,
    period: Duration,
    ticks: Sender<Tick>,
    cancel: CancellationToken,
) {
    let mut interval = interval_at(Instant::now() + delay + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                trace!(generation, "tick");
                if ticks.send(Tick { generation }).await.is_err() {
                    // Widget is gone.
                    break;
                }
            }
        }
    }
}
