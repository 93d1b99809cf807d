//! Cancellable periodic simulation loop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{ConfigError, SimError};

use super::engine::AutomationEngine;

/// Engine shared between the periodic task and direct command callers.
///
/// The mutex is the single exclusion point: a tick and a command never
/// interleave.
pub type SharedEngine = Arc<Mutex<AutomationEngine>>;

/// Locks a shared engine, recovering from a poisoned lock.
pub fn lock_engine(engine: &SharedEngine) -> MutexGuard<'_, AutomationEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running periodic task and its stop signal.
struct Running {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    interval: Duration,
}

/// Starts and pauses the periodic simulation of an [`AutomationEngine`].
///
/// Stopping is cooperative: the stop signal is checked between ticks, and
/// [`Simulator::pause_simulation`] waits for the task to finish, so once it
/// returns no further tick runs.
pub struct Simulator {
    engine: SharedEngine,
    running: Option<Running>,
}

impl Simulator {
    pub fn new(engine: AutomationEngine) -> Self {
        Self::from_shared(Arc::new(Mutex::new(engine)))
    }

    pub fn from_shared(engine: SharedEngine) -> Self {
        Self {
            engine,
            running: None,
        }
    }

    /// Handle to the shared engine.
    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.engine)
    }

    /// Runs `f` with exclusive access to the engine.
    ///
    /// Use this for presentation-layer commands (toggle, set brightness, ...).
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut AutomationEngine) -> R) -> R {
        f(&mut lock_engine(&self.engine))
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    /// Starts ticking every `interval`. The first tick runs immediately.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`SimError::Config`] if `interval` is zero
    /// - [`SimError::AlreadyRunning`] if a periodic task is already active
    pub fn run_periodic_simulation(&mut self, interval: Duration) -> Result<(), SimError> {
        if interval.is_zero() {
            return Err(ConfigError::new("simulation.interval_secs", "must be > 0").into());
        }
        if self.is_running() {
            return Err(SimError::AlreadyRunning);
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let engine = Arc::clone(&self.engine);
        let task = tokio::spawn(tick_loop(engine, interval, stop_rx));
        tracing::info!(
            interval_secs = interval.as_secs_f64(),
            "periodic simulation started"
        );

        self.running = Some(Running {
            stop_tx,
            task,
            interval,
        });
        Ok(())
    }

    /// Same as [`Simulator::run_periodic_simulation`] with the interval in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `interval_secs` is not a finite
    /// positive number, or [`SimError::AlreadyRunning`].
    pub fn run_periodic_simulation_secs(&mut self, interval_secs: f64) -> Result<(), SimError> {
        let interval = interval_from_secs(interval_secs)?;
        self.run_periodic_simulation(interval)
    }

    /// Waits until the engine has completed at least `ticks` ticks.
    ///
    /// Returns the tick count observed once the target is reached.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Stopped`] if no periodic task is running, or if
    /// the task exits before the target is reached.
    pub async fn wait_for_ticks(&self, ticks: u64) -> Result<u64, SimError> {
        let poll = self
            .running
            .as_ref()
            .map_or(Duration::from_millis(1), |running| {
                (running.interval / 4).max(Duration::from_millis(1))
            });
        loop {
            let done = lock_engine(&self.engine).ticks();
            if done >= ticks {
                return Ok(done);
            }
            if !self.is_running() {
                tracing::warn!(ticks = done, target = ticks, "periodic simulation stopped early");
                return Err(SimError::Stopped { ticks: done });
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// Stops the periodic task and waits for it to finish.
    ///
    /// At most the tick already in flight completes. Calling this while
    /// paused does nothing.
    pub async fn pause_simulation(&mut self) {
        let Some(Running { stop_tx, task, .. }) = self.running.take() else {
            return;
        };
        // A send error means the task already exited.
        let _ = stop_tx.send(true);
        if let Err(err) = task.await {
            tracing::warn!(error = %err, "periodic simulation task ended abnormally");
        }
        let ticks = lock_engine(&self.engine).ticks();
        tracing::info!(ticks, "periodic simulation paused");
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop_tx.send(true);
        }
    }
}

/// Converts a positive interval in seconds into a `Duration`.
///
/// # Errors
///
/// Returns a `ConfigError` for zero, negative, or non-finite values.
pub fn interval_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::new(
            "simulation.interval_secs",
            format!("must be a finite number > 0, got {secs}"),
        ));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| ConfigError::new("simulation.interval_secs", e.to_string()))
}

async fn tick_loop(engine: SharedEngine, interval: Duration, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                // Sender dropped or stop requested.
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                if *stop_rx.borrow() {
                    break;
                }
                lock_engine(&engine).tick();
            }
        }
    }
    tracing::debug!("tick loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::SmartLight;

    fn simulator() -> Simulator {
        let mut engine = AutomationEngine::new(1);
        engine.discover(SmartLight::new("Light")).unwrap();
        Simulator::new(engine)
    }

    #[test]
    fn interval_validation() {
        assert!(interval_from_secs(0.0).is_err());
        assert!(interval_from_secs(-1.0).is_err());
        assert!(interval_from_secs(f64::NAN).is_err());
        assert!(interval_from_secs(f64::INFINITY).is_err());
        assert_eq!(interval_from_secs(0.5).unwrap(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn zero_interval_is_a_config_error() {
        let mut sim = simulator();
        let err = sim.run_periodic_simulation(Duration::ZERO).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
        assert!(matches!(
            sim.run_periodic_simulation_secs(-5.0),
            Err(SimError::Config(_))
        ));
        assert!(!sim.is_running());
    }

    #[tokio::test]
    async fn first_tick_is_immediate_and_pause_stops_ticks() {
        let mut sim = simulator();
        sim.run_periodic_simulation(Duration::from_millis(10)).unwrap();
        assert!(sim.is_running());
        tokio::time::sleep(Duration::from_millis(60)).await;
        sim.pause_simulation().await;
        assert!(!sim.is_running());

        let after_pause = sim.with_engine(|e| e.ticks());
        assert!(after_pause >= 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sim.with_engine(|e| e.ticks()), after_pause);
    }

    #[tokio::test]
    async fn second_start_is_rejected_while_running() {
        let mut sim = simulator();
        sim.run_periodic_simulation(Duration::from_millis(20)).unwrap();
        assert!(matches!(
            sim.run_periodic_simulation(Duration::from_millis(20)),
            Err(SimError::AlreadyRunning)
        ));
        sim.pause_simulation().await;
        // Restart after pause is allowed.
        sim.run_periodic_simulation(Duration::from_millis(20)).unwrap();
        sim.pause_simulation().await;
    }

    #[tokio::test]
    async fn wait_for_ticks_reaches_target() {
        let mut sim = simulator();
        sim.run_periodic_simulation(Duration::from_millis(2)).unwrap();
        let reached = sim.wait_for_ticks(3).await.unwrap();
        assert!(reached >= 3);
        sim.pause_simulation().await;
    }

    #[tokio::test]
    async fn wait_for_ticks_fails_without_a_live_task() {
        let mut sim = simulator();
        assert!(matches!(
            sim.wait_for_ticks(1).await,
            Err(SimError::Stopped { ticks: 0 })
        ));

        sim.run_periodic_simulation(Duration::from_millis(2)).unwrap();
        if let Some(running) = &sim.running {
            running.task.abort();
        }
        let result = tokio::time::timeout(Duration::from_secs(5), sim.wait_for_ticks(u64::MAX))
            .await
            .expect("wait should return once the task is gone");
        assert!(matches!(result, Err(SimError::Stopped { .. })));
        sim.pause_simulation().await;
        assert!(!sim.is_running());
    }

    #[tokio::test]
    async fn pause_is_idempotent() {
        let mut sim = simulator();
        sim.pause_simulation().await;
        sim.run_periodic_simulation(Duration::from_millis(5)).unwrap();
        sim.pause_simulation().await;
        sim.pause_simulation().await;
        assert!(!sim.is_running());
    }
}
