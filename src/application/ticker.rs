// Periodic driver publishing a live window for one series family
use crate::application::step::SharedNoise;
use crate::application::window::{normalize_window, SeriesFamily, TICK_INTERVAL_MS};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerState {
    Stopped,
    Running,
}

/// Owns at most one timer task. The published window lives in a watch channel.
///
/// Every `stop` bumps `generation`; a timer only publishes while its run id is current.
pub struct Ticker<F: SeriesFamily> {
    window: Arc<watch::Sender<Vec<F::Point>>>,
    generation: Arc<AtomicU64>,
    baseline: Option<F::Baseline>,
    noise: SharedNoise,
    timer: Option<JoinHandle<()>>,
}

impl<F: SeriesFamily> Ticker<F> {
    pub fn new(noise: SharedNoise) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            window: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            baseline: None,
            noise,
            timer: None,
        }
    }

    pub fn state(&self) -> TickerState {
        if self.timer.is_some() {
            TickerState::Running
        } else {
            TickerState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == TickerState::Running
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<F::Point>> {
        self.window.subscribe()
    }

    pub fn window(&self) -> Vec<F::Point> {
        self.window.borrow().clone()
    }

    pub fn baseline(&self) -> Option<&F::Baseline> {
        self.baseline.as_ref()
    }

    /// Replace any running simulation with one seeded from `seed`.
    ///
    /// Must be called within a tokio runtime when `seed` is non-empty.
    pub fn start(&mut self, seed: Vec<F::Point>) {
        self.stop();
        let run = self.generation.load(Ordering::SeqCst);

        let baseline = F::compute_baseline(&seed);
        let initial = {
            let mut noise = self.noise.lock().unwrap_or_else(|e| e.into_inner());
            normalize_window::<F>(&seed, &baseline, &mut *noise)
        };
        self.baseline = Some(baseline.clone());
        let window_len = initial.len();
        self.window.send_replace(initial);

        if window_len == 0 {
            tracing::debug!("{} ticker idle: empty seed", F::NAME);
            return;
        }

        tracing::debug!(
            "{} ticker started: {} seed points, window {}",
            F::NAME,
            seed.len(),
            window_len
        );
        self.timer = Some(tokio::spawn(run_ticks::<F>(
            self.window.clone(),
            self.generation.clone(),
            run,
            baseline,
            self.noise.clone(),
        )));
    }

    /// Cancel the timer. Calling this while stopped is a no-op.
    pub fn stop(&mut self) {
        // a timer already past its await sees the new generation and discards its tick
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.timer.take() {
            handle.abort();
            tracing::debug!("{} ticker stopped", F::NAME);
        }
    }
}

impl<F: SeriesFamily> Drop for Ticker<F> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticks<F: SeriesFamily>(
    window: Arc<watch::Sender<Vec<F::Point>>>,
    generation: Arc<AtomicU64>,
    run: u64,
    baseline: F::Baseline,
    noise: SharedNoise,
) {
    let period = Duration::from_millis(TICK_INTERVAL_MS as u64);
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;
        if !advance_window::<F>(&window, &generation, run, &baseline, &noise) {
            tracing::debug!("{} tick discarded: run {} superseded", F::NAME, run);
            return;
        }
        tracing::trace!("{} tick", F::NAME);
    }
}

/// Shift the window by one generated point. Returns `false` once `run` is stale.
fn advance_window<F: SeriesFamily>(
    window: &watch::Sender<Vec<F::Point>>,
    generation: &AtomicU64,
    run: u64,
    baseline: &F::Baseline,
    noise: &SharedNoise,
) -> bool {
    let mut current_run = true;
    window.send_if_modified(|current| {
        // checked under the channel lock, which `start` needs for its `send_replace`
        if generation.load(Ordering::SeqCst) != run {
            current_run = false;
            return false;
        }
        let Some(last) = current.last() else {
            return false;
        };
        let next = {
            let mut noise = noise.lock().unwrap_or_else(|e| e.into_inner());
            F::next_point(last, baseline, &mut *noise)
        };

        current.push(next);
        if current.len() > F::WINDOW {
            let excess = current.len() - F::WINDOW;
            current.drain(..excess);
        }
        true
    });
    current_run
}
