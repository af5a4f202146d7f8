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

//! Monotonic clock abstraction.

use crate::utils::Stopwatch;
use std::cell::Cell;

/// A monotonic, millisecond-resolution clock.
///
/// Readings must be non-decreasing; the scheduler derives virtual frame
/// counts and per-step timing exclusively from this.
pub trait Clock {
    /// Milliseconds elapsed since the clock's origin.
    fn now_ms(&self) -> u64;
}

/// Wall-clock implementation, backed by a [`Stopwatch`] started at creation.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    watch: Stopwatch,
}

impl SystemClock {
    /// Creates a clock whose origin is the moment of the call.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.watch.elapsed_ms()
    }
}

/// A clock advanced explicitly by the caller.
///
/// Deterministic stand-in for hosts that own their own time source, and the
/// workhorse of the scheduler tests. Attempts to move backwards are ignored
/// to preserve monotonicity.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    /// Creates a clock at 0 ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock to an absolute reading. Regressions are ignored.
    pub fn set(&self, ms: u64) {
        self.now.set(self.now.get().max(ms));
    }

    /// Advances the clock by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
