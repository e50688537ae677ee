//! Decorative "analysis phase" animation shown while an upload is in flight.
//!
//! The backend reports nothing about its internal stages, so this is a
//! timer: every tick adds one percent until 100, and the active step is
//! derived from that percentage. It is independent of the real upload.

use crate::models::PhaseProgress;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const ANALYSIS_PHASES: [&str; 5] = [
    "Extracting text from document...",
    "Calculating similarity scores...",
    "Matching skills to requirements...",
    "Running ML predictions...",
    "Generating final results...",
];

pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Step index for a given percentage: `min(floor(pct / 100 * 5), 4)`
pub fn step_for(percent: u8) -> usize {
    (percent as usize * ANALYSIS_PHASES.len() / 100).min(ANALYSIS_PHASES.len() - 1)
}

/// Next animation frame. Saturates at 100.
pub fn advance(progress: PhaseProgress) -> PhaseProgress {
    let percent = progress.percent.saturating_add(1).min(100);
    PhaseProgress {
        percent,
        step: step_for(percent),
    }
}

pub fn phase_label(step: usize) -> &'static str {
    ANALYSIS_PHASES[step.min(ANALYSIS_PHASES.len() - 1)]
}

/// Reassurance line shown under the phase list
pub fn phase_hint(percent: u8) -> &'static str {
    match percent {
        0..=29 => "This may take a few moments...",
        30..=69 => "Almost there, analyzing your qualifications...",
        70..=94 => "Finalizing your results...",
        _ => "Ready to display your results!",
    }
}

/// Background task driving the phase animation.
///
/// Stops when it reaches 100, when [`PhaseTicker::stop`] is called, or when
/// the ticker is dropped.
pub struct PhaseTicker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PhaseTicker {
    /// Spawn on the current tokio runtime. `on_tick` gets every new frame.
    pub fn spawn<F>(interval: Duration, on_tick: F) -> Self
    where
        F: Fn(PhaseProgress) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            ticker.tick().await;

            let mut progress = PhaseProgress::default();
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        progress = advance(progress);
                        on_tick(progress);
                        if progress.percent >= 100 {
                            break;
                        }
                    }
                }
            }
            debug!("Phase ticker stopped at {}%", progress.percent);
        });

        Self { cancel, handle }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PhaseTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
