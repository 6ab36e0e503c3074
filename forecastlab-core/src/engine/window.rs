//! Trailing window selection.
//!
//! The window is inclusive at its lower edge: a forecast for exactly
//! `now - window` is kept. There is no upper edge; forecasts for future
//! periods are always kept.

use chrono::{DateTime, Duration, Utc};

use super::ReconcileError;
use crate::domain::ForecastObservation;

/// Default trailing window.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// A validated, strictly positive trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window(Duration);

impl Window {
    pub fn new(length: Duration) -> Result<Self, ReconcileError> {
        if length <= Duration::zero() {
            return Err(ReconcileError::InvalidWindow {
                window_secs: length.num_seconds(),
            });
        }
        Ok(Self(length))
    }

    pub fn length(&self) -> Duration {
        self.0
    }

    /// Earliest period inside the window.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.0)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn contains(&self, now: DateTime<Utc>, period: DateTime<Utc>) -> bool {
        period >= self.start(now)
    }

    /// Keep the observations whose period lies inside the window.
    pub fn select<I>(&self, observations: I, now: DateTime<Utc>) -> Vec<ForecastObservation>
    where
        I: IntoIterator<Item = ForecastObservation>,
    {
        let start = self.start(now);
        observations
            .into_iter()
            .filter(|obs| obs.period >= start)
            .collect()
    }
}

impl Default for Window {
    fn default() -> Self {
        Self(Duration::hours(DEFAULT_WINDOW_HOURS))
    }
}

/// Restrict forecasts to `period >= now - window`.
///
/// Fails with `InvalidWindow` when `window` is zero or negative.
pub fn select<I>(
    observations: I,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<Vec<ForecastObservation>, ReconcileError>
where
    I: IntoIterator<Item = ForecastObservation>,
{
    Ok(Window::new(window)?.select(observations, now))
}
