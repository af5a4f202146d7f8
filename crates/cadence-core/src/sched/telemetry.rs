// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-second scheduler telemetry.

/// Read-only scheduler statistics, refreshed once per simulated second.
///
/// `timing_avg_ms` divides by the catch-up-inclusive total step count, not
/// the tick count, so a burst of cheap catch-up steps lowers the average.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    /// Refresh signals that ran at least one step during the second.
    pub steps_this_second: u64,
    /// Steps executed during the second, catch-up included.
    pub total_steps_this_second: u64,
    /// Highest `total_steps_this_second` observed in any second so far.
    pub max_steps_this_second: u64,
    /// True while the backlog sits above its high-water mark; the host
    /// should react (e.g. lower the target rate), the scheduler never will.
    pub overflow: bool,
    /// Cheapest step of the second, in milliseconds.
    pub timing_min_ms: f64,
    /// Mean step cost of the second, in milliseconds.
    pub timing_avg_ms: f64,
    /// Most expensive step of the second, in milliseconds.
    pub timing_max_ms: f64,
    /// Total step cost of the second, in milliseconds.
    pub timing_sum_ms: f64,
}

/// Accumulators for the one-second window currently in progress.
#[derive(Debug)]
pub(crate) struct SecondWindow {
    pub start_ms: u64,
    pub steps: u64,
    pub total_steps: u64,
    min_ms: u64,
    max_ms: u64,
    sum_ms: u64,
}

impl SecondWindow {
    pub fn new(start_ms: u64) -> Self {
        Self {
            start_ms,
            steps: 0,
            total_steps: 0,
            min_ms: u64::MAX,
            max_ms: 0,
            sum_ms: 0,
        }
    }

    /// Folds one step's elapsed time into the window.
    pub fn record_step(&mut self, elapsed_ms: u64) {
        self.min_ms = self.min_ms.min(elapsed_ms);
        self.max_ms = self.max_ms.max(elapsed_ms);
        self.sum_ms += elapsed_ms;
    }

    /// Closes the window into a snapshot.
    pub fn close(&self, overflow: bool, max_steps: u64) -> TelemetrySnapshot {
        let total = self.total_steps;
        TelemetrySnapshot {
            steps_this_second: self.steps,
            total_steps_this_second: total,
            max_steps_this_second: max_steps,
            overflow,
            timing_min_ms: if total > 0 { self.min_ms as f64 } else { 0.0 },
            timing_avg_ms: if total > 0 {
                self.sum_ms as f64 / total as f64
            } else {
                0.0
            },
            timing_max_ms: self.max_ms as f64,
            timing_sum_ms: self.sum_ms as f64,
        }
    }
}
