//! Time-bracket state machine.
//!
//! A [`TimeWindow`] tracks which two consecutive samples of the full time
//! axis bracket the simulation clock. Each step is resolved in two stages:
//! [`TimeWindow::plan`] classifies the request into a [`Transition`], then
//! the transition is applied.
//!
//! ```text
//!  status != NotUpdated ─────────────────────────────► Hold
//!  single-sample axis ───────────────────────────────► Pin
//!  no window ────────────────────────────────────────► Resync
//!  t' outside [lo, hi] or across a cycle edge ───────► Resync
//!  forward,  t' >= hi, ti < N-2 ─────────────────────► Advance
//!  backward, t' <= lo, ti > 0 ───────────────────────► Retreat
//!  otherwise ────────────────────────────────────────► Stay
//! ```
//!
//! `t'` is the query time re-based into the current cycle of a periodic
//! axis: `t' = time - periods * (time_full[N-1] - time_full[0])`.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use crate::error::{GridError, Result};

/// Integration direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Negative time steps integrate backward, everything else forward.
    pub fn from_signdt(signdt: f64) -> Self {
        if signdt < 0.0 {
            Self::Backward
        } else {
            Self::Forward
        }
    }

    pub fn signum(&self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }

    /// The "never crossed" time in this direction.
    pub fn unbounded(&self) -> f64 {
        match self {
            Self::Forward => f64::INFINITY,
            Self::Backward => f64::NEG_INFINITY,
        }
    }
}

/// Tells the interpolation layer whether cached coefficients are still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    /// Window unchanged since the last acknowledged update.
    #[default]
    NotUpdated,
    /// Window shifted by one sample in the integration direction.
    Updated,
    /// Window is new or jumped; everything must be reloaded.
    FirstUpdated,
}

impl UpdateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotUpdated => "not_updated",
            Self::Updated => "updated",
            Self::FirstUpdated => "first_updated",
        }
    }
}

impl std::fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a bracket lookup on the full time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLookup {
    /// Index of the last sample `<= t` (0 when `t` precedes the axis).
    pub index: usize,
    /// `t` lies outside `[time_full[0], time_full[N-1]]`.
    pub extrapolated: bool,
}

/// Find the sample bracketing `time` on a sorted axis.
pub fn bracket_lookup(time_full: &[f64], time: f64) -> TimeLookup {
    let index = time_full.partition_point(|&t| t <= time).saturating_sub(1);
    let extrapolated = match (time_full.first(), time_full.last()) {
        (Some(&first), Some(&last)) => time < first || time > last,
        _ => true,
    };
    TimeLookup {
        index,
        extrapolated,
    }
}

/// Time-handling collaborator borrowed from the owning field.
pub trait FieldTiming {
    fn allow_time_extrapolation(&self) -> bool;

    fn time_periodic(&self) -> bool;

    /// Bracket `time` (already re-based into the current cycle) on the axis.
    fn time_index(&self, time_full: &[f64], time: f64) -> TimeLookup {
        bracket_lookup(time_full, time)
    }
}

/// Plain pair of field time flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimePolicy {
    #[serde(default)]
    pub allow_time_extrapolation: bool,
    #[serde(default)]
    pub time_periodic: bool,
}

impl TimePolicy {
    pub fn new(allow_time_extrapolation: bool, time_periodic: bool) -> Self {
        Self {
            allow_time_extrapolation,
            time_periodic,
        }
    }
}

impl FieldTiming for TimePolicy {
    fn allow_time_extrapolation(&self) -> bool {
        self.allow_time_extrapolation
    }

    fn time_periodic(&self) -> bool {
        self.time_periodic
    }
}

/// Where a re-based query time falls relative to the active window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Outside `[lo, hi]`.
    OutsideWindow,
    /// Inside the window but on or past the cycle boundary for this direction.
    CycleEdge,
    /// On or above `hi`, moving forward.
    UpperEdge,
    /// On or below `lo`, moving backward.
    LowerEdge,
    Interior,
}

/// Action chosen for one step request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// An unacknowledged update is pending; nothing moves.
    Hold,
    /// Static single-sample axis.
    Pin,
    /// Window still brackets the clock.
    Stay,
    /// Shift the window one sample forward.
    Advance,
    /// Shift the window one sample backward.
    Retreat,
    /// Search the full axis for a new window.
    Resync,
}

/// Current two-sample bracket of a time axis, with periodic cycle count.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    time_full: Arc<[f64]>,
    ti: Option<usize>,
    periods: Arc<AtomicI32>,
    status: UpdateStatus,
}

impl TimeWindow {
    /// Create an inactive window over `time_full`.
    ///
    /// Samples must be finite and non-decreasing.
    pub fn new(time_full: Vec<f64>) -> Result<Self> {
        if time_full.is_empty() {
            return Err(GridError::invalid_time("time axis is empty"));
        }
        if let Some(i) = time_full.iter().position(|t| !t.is_finite()) {
            return Err(GridError::invalid_time(format!(
                "sample {} is not finite ({})",
                i, time_full[i]
            )));
        }
        if let Some(i) = time_full.windows(2).position(|w| w[1] < w[0]) {
            return Err(GridError::invalid_time(format!(
                "samples must be non-decreasing, found {} after {} at index {}",
                time_full[i + 1],
                time_full[i],
                i + 1
            )));
        }

        Ok(Self {
            time_full: time_full.into(),
            ti: None,
            periods: Arc::new(AtomicI32::new(0)),
            status: UpdateStatus::NotUpdated,
        })
    }

    pub fn time_full(&self) -> &[f64] {
        &self.time_full
    }

    pub fn shared_time_full(&self) -> Arc<[f64]> {
        Arc::clone(&self.time_full)
    }

    /// Lower index of the active window, `None` when a resync is due.
    pub fn ti(&self) -> Option<usize> {
        self.ti
    }

    pub fn is_active(&self) -> bool {
        self.ti.is_some()
    }

    /// Samples of the active window, or the full axis when inactive.
    pub fn window(&self) -> &[f64] {
        match self.ti {
            Some(ti) => {
                let end = (ti + 2).min(self.time_full.len());
                &self.time_full[ti..end]
            }
            None => &self.time_full,
        }
    }

    /// Number of time samples currently exposed.
    pub fn tdim(&self) -> usize {
        self.window().len()
    }

    pub fn periods(&self) -> i32 {
        self.periods.load(Ordering::Relaxed)
    }

    /// Live handle on the cycle count, shared with native views.
    pub fn shared_periods(&self) -> Arc<AtomicI32> {
        Arc::clone(&self.periods)
    }

    pub fn status(&self) -> UpdateStatus {
        self.status
    }

    /// Span of one cycle, `time_full[N-1] - time_full[0]`.
    pub fn cycle(&self) -> f64 {
        match (self.time_full.first(), self.time_full.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Mark the pending update as consumed by the field layer.
    pub fn acknowledge_update(&mut self) {
        self.status = UpdateStatus::NotUpdated;
    }

    /// Drop the active window; the next step resynchronizes.
    pub fn invalidate(&mut self) {
        self.ti = None;
    }

    fn rebase(&self, time: f64) -> f64 {
        time - self.periods() as f64 * self.cycle()
    }

    /// Locate a re-based time against the active window `[lo, hi]`.
    pub fn placement(&self, rebased: f64, direction: Direction, lo: f64, hi: f64) -> Placement {
        let first = self.time_full[0];
        let last = self.time_full[self.time_full.len() - 1];

        if rebased < lo || rebased > hi {
            return Placement::OutsideWindow;
        }
        let across_cycle = match direction {
            Direction::Forward => rebased < first || rebased >= last,
            Direction::Backward => rebased <= first || rebased > last,
        };
        if across_cycle {
            return Placement::CycleEdge;
        }
        match direction {
            Direction::Forward if rebased >= hi => Placement::UpperEdge,
            Direction::Backward if rebased <= lo => Placement::LowerEdge,
            _ => Placement::Interior,
        }
    }

    /// Decide what a step request at `time` would do, without applying it.
    pub fn plan(&self, time: f64, direction: Direction) -> Transition {
        if self.status != UpdateStatus::NotUpdated {
            return Transition::Hold;
        }
        let n = self.time_full.len();
        if n == 1 {
            return Transition::Pin;
        }
        let Some(ti) = self.ti else {
            return Transition::Resync;
        };

        let (lo, hi) = (self.time_full[ti], self.time_full[ti + 1]);
        match self.placement(self.rebase(time), direction, lo, hi) {
            Placement::OutsideWindow | Placement::CycleEdge => Transition::Resync,
            Placement::UpperEdge if ti < n - 2 => Transition::Advance,
            Placement::LowerEdge if ti > 0 => Transition::Retreat,
            Placement::UpperEdge | Placement::LowerEdge | Placement::Interior => Transition::Stay,
        }
    }

    /// Step the window to bracket `time` and return the time at which it
    /// stops being valid.
    ///
    /// The return value is `±inf` when the window can never be crossed in
    /// this direction (extrapolation allowed past the axis end, static axis,
    /// or a non-finite query).
    pub fn compute_time_chunk<F>(&mut self, time: f64, signdt: f64, timing: &F) -> f64
    where
        F: FieldTiming + ?Sized,
    {
        let direction = Direction::from_signdt(signdt);
        if !time.is_finite() {
            tracing::warn!(time, "Non-finite simulation time, time window left unchanged");
            return direction.unbounded();
        }

        let transition = self.plan(time, direction);
        match transition {
            Transition::Hold | Transition::Stay => {}
            Transition::Pin => {
                if self.ti.is_none() {
                    self.ti = Some(0);
                    self.status = UpdateStatus::FirstUpdated;
                }
                return direction.unbounded();
            }
            Transition::Advance => self.shift(1),
            Transition::Retreat => self.shift(-1),
            Transition::Resync => self.resync(time, direction, timing),
        }

        tracing::trace!(
            time,
            ?direction,
            ?transition,
            ti = ?self.ti,
            status = %self.status,
            "Time window step"
        );

        self.next_time(direction, timing)
    }

    fn shift(&mut self, step: isize) {
        if let Some(ti) = self.ti {
            self.ti = ti.checked_add_signed(step);
            self.status = UpdateStatus::Updated;
        }
    }

    fn resync<F>(&mut self, time: f64, direction: Direction, timing: &F)
    where
        F: FieldTiming + ?Sized,
    {
        let n = self.time_full.len();
        let first = self.time_full[0];
        let cycle = self.cycle();
        let previous = self.ti;
        let periodic = timing.time_periodic() && cycle > 0.0;

        let mut periods = if periodic {
            ((time - first) / cycle).floor() as i32
        } else {
            0
        };
        let mut rebased = time - periods as f64 * cycle;

        let lookup = timing.time_index(&self.time_full, rebased);
        if lookup.extrapolated && !timing.allow_time_extrapolation() {
            tracing::debug!(time, rebased, "Time outside the axis, window clamped to the edge");
        }
        let mut ti = lookup.index.min(n - 1);

        // backward integration owns the left-open interval (lo, hi]
        if direction == Direction::Backward && periodic && ti == 0 && rebased == first {
            ti = n - 1;
            periods -= 1;
            rebased = time - periods as f64 * cycle;
        }
        if direction == Direction::Backward && ti > 0 && self.time_full[ti] == rebased {
            ti -= 1;
        }
        ti = ti.min(n - 2);

        let status = match previous {
            None => UpdateStatus::FirstUpdated,
            Some(prev) if prev == ti => UpdateStatus::NotUpdated,
            Some(prev)
                if (direction == Direction::Forward && ti == prev + 1)
                    || (direction == Direction::Backward && ti + 1 == prev) =>
            {
                UpdateStatus::Updated
            }
            Some(_) => UpdateStatus::FirstUpdated,
        };

        if periods != self.periods() {
            tracing::debug!(
                from = self.periods(),
                to = periods,
                "Periodic time axis wrapped"
            );
        }
        self.periods.store(periods, Ordering::Relaxed);
        self.ti = Some(ti);
        self.status = status;
    }

    /// Time at which the active window stops bracketing the clock.
    pub fn next_time<F>(&self, direction: Direction, timing: &F) -> f64
    where
        F: FieldTiming + ?Sized,
    {
        let n = self.time_full.len();
        let Some(ti) = self.ti.filter(|_| n >= 2) else {
            return direction.unbounded();
        };

        let offset = self.periods() as f64 * self.cycle();
        let allow = timing.allow_time_extrapolation();
        match direction {
            Direction::Forward if ti < n - 2 || !allow => self.time_full[ti + 1] + offset,
            Direction::Backward if ti > 0 || !allow => self.time_full[ti] + offset,
            _ => direction.unbounded(),
        }
    }
}
