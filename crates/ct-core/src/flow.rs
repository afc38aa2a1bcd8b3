//! Flow/idle classification of activity events.
//!
//! Converts discrete activity events into accumulated active time. Gaps
//! between consecutive events count as active when they fit inside the idle
//! timeout. While the caller is "in flow" (at least `flow_threshold` events in
//! the trailing minute) the timeout stretches to four times its base value,
//! so reading logs or waiting on a build between bursts still counts.
//!
//! The timeout applied to a gap is the one in effect *before* the event that
//! closes it: the window as it stood after the previous event.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Length of the sliding event window.
pub const FLOW_WINDOW_MS: i64 = 60_000;

/// Idle-timeout multiplier while in flow.
pub const FLOW_TIMEOUT_MULTIPLIER: i64 = 4;

/// Configuration for the flow/idle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    /// Longest gap credited outside flow. Default: 300000 (5 minutes).
    pub base_idle_timeout_ms: i64,

    /// Events per minute at which the caller counts as in flow. Default: 10.
    /// Zero means always in flow.
    pub flow_threshold: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_idle_timeout_ms: 300_000,
            flow_threshold: 10,
        }
    }
}

impl FlowConfig {
    #[allow(clippy::cast_possible_wrap)]
    pub const fn from_seconds(max_idle_timeout_secs: u64, flow_threshold: usize) -> Self {
        Self {
            base_idle_timeout_ms: max_idle_timeout_secs.saturating_mul(1000) as i64,
            flow_threshold,
        }
    }
}

/// Derived view of the engine at a point in time. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    pub is_in_flow: bool,
    pub event_rate: usize,
    pub idle_timeout_ms: i64,
    pub is_idle: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FlowEngine {
    config: FlowConfig,
    /// Event timestamps within the last minute of the latest event, oldest first.
    window: VecDeque<i64>,
    last_event_ms: Option<i64>,
    active_ms: i64,
}

impl FlowEngine {
    pub fn new(config: FlowConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub const fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Records one activity event at `timestamp_ms`.
    ///
    /// Events older than the latest one are treated as zero-length gaps and
    /// do not move the clock backwards.
    pub fn record_event(&mut self, timestamp_ms: i64) {
        if let Some(last) = self.last_event_ms {
            let gap = timestamp_ms - last;
            let timeout = self.timeout_for_rate(self.window.len());
            if gap > 0 && gap <= timeout {
                self.active_ms += gap;
            } else if gap > timeout {
                tracing::trace!(gap_ms = gap, timeout_ms = timeout, "idle gap not credited");
            }
        }

        let latest = self.last_event_ms.map_or(timestamp_ms, |last| last.max(timestamp_ms));
        let cutoff = latest - FLOW_WINDOW_MS;
        while self.window.front().is_some_and(|&ts| ts < cutoff) {
            self.window.pop_front();
        }
        if timestamp_ms >= cutoff {
            let pos = self.window.partition_point(|&ts| ts <= timestamp_ms);
            self.window.insert(pos, timestamp_ms);
        }
        self.last_event_ms = Some(latest);
    }

    /// Accumulated active time in seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn active_seconds(&self) -> f64 {
        self.active_ms as f64 / 1000.0
    }

    pub const fn active_ms(&self) -> i64 {
        self.active_ms
    }

    pub const fn last_event_ms(&self) -> Option<i64> {
        self.last_event_ms
    }

    /// Flow state as seen at `now_ms`.
    pub fn state_at(&self, now_ms: i64) -> FlowState {
        let cutoff = now_ms - FLOW_WINDOW_MS;
        let event_rate = self
            .window
            .iter()
            .filter(|&&ts| ts >= cutoff && ts <= now_ms)
            .count();
        let is_in_flow = self.is_flow_rate(event_rate);
        let idle_timeout_ms = self.timeout_for_rate(event_rate);
        let is_idle = self
            .last_event_ms
            .is_none_or(|last| now_ms - last > idle_timeout_ms);

        FlowState {
            is_in_flow,
            event_rate,
            idle_timeout_ms,
            is_idle,
        }
    }

    /// Flow state at the current wall-clock time.
    pub fn state(&self) -> FlowState {
        self.state_at(chrono::Utc::now().timestamp_millis())
    }

    /// Clears the window, the last event, and accumulated time.
    pub fn reset(&mut self) {
        self.window.clear();
        self.last_event_ms = None;
        self.active_ms = 0;
    }

    const fn is_flow_rate(&self, rate: usize) -> bool {
        rate >= self.config.flow_threshold
    }

    const fn timeout_for_rate(&self, rate: usize) -> i64 {
        if self.is_flow_rate(rate) {
            self.config.base_idle_timeout_ms * FLOW_TIMEOUT_MULTIPLIER
        } else {
            self.config.base_idle_timeout_ms
        }
    }
}
