//! Per-manager tick statistics.
//!
//! Collected only with the `metrics` feature, and only while
//! [`COLLECT_METRICS`] is set:
//!
//! ```ignore
//! use ar_plugin::metrics::COLLECT_METRICS;
//!
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//! let avg = manager.metrics().avg_tick_timing_us();
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

/// Ticks kept in the timing window (~2 seconds at 60fps).
const TIMING_WINDOW: usize = 128;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// True when the feature is compiled in and the runtime toggle is on.
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Most recent tick durations in microseconds, oldest evicted first.
#[derive(Debug, Clone)]
pub struct TickTimings {
  buffer: VecDeque<u64>,
  capacity: usize,
}

impl Default for TickTimings {
  fn default() -> Self {
    Self::new(TIMING_WINDOW)
  }
}

impl TickTimings {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  pub fn push(&mut self, timing_us: u64) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(timing_us);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      return 0.0;
    }
    self.buffer.iter().sum::<u64>() as f64 / self.buffer.len() as f64
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = *self.buffer.iter().min()?;
    let max = *self.buffer.iter().max()?;
    Some((min, max))
  }
}

/// Per-manager statistics updated each reconciliation tick.
#[derive(Debug, Clone, Default)]
pub struct ManagerMetrics {
  // Last tick snapshot
  /// Trackables created or confirmed through the added list.
  pub last_added: u32,
  pub last_updated: u32,
  pub last_removed: u32,

  // Totals
  /// Live trackables after the last tick.
  pub live_trackables: u32,
  /// Trackables still awaiting provider confirmation.
  pub pending_trackables: u32,
  /// Ticks that ran against a provider.
  pub ticks_processed: u64,
  /// Ticks skipped (disabled manager, no provider, provider stopped).
  pub ticks_skipped: u64,
  /// Listener invocations that panicked.
  pub listener_panics: u64,

  pub tick_timings: TickTimings,
}

impl ManagerMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record one processed tick.
  pub fn record_tick(
    &mut self,
    added: usize,
    updated: usize,
    removed: usize,
    live: usize,
    pending: usize,
    timing_us: u64,
  ) {
    if !is_enabled() {
      return;
    }
    self.last_added = added as u32;
    self.last_updated = updated as u32;
    self.last_removed = removed as u32;
    self.live_trackables = live as u32;
    self.pending_trackables = pending as u32;
    self.ticks_processed += 1;
    self.tick_timings.push(timing_us);
  }

  pub fn record_skipped_tick(&mut self) {
    if is_enabled() {
      self.ticks_skipped += 1;
    }
  }

  pub fn record_listener_panic(&mut self) {
    if is_enabled() {
      self.listener_panics += 1;
    }
  }

  pub fn avg_tick_timing_us(&self) -> f64 {
    self.tick_timings.average()
  }

  /// Fastest and slowest tick in the window.
  pub fn tick_timing_range_us(&self) -> Option<(u64, u64)> {
    self.tick_timings.min_max()
  }
}
