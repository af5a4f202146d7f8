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

//! The fixed-timestep scheduler with bounded catch-up.
//!
//! Each refresh signal converts elapsed wall time into a whole number of
//! owed virtual frames and runs at most `backlog_capacity` of them; the
//! remainder is carried as backlog to the next signal, clamped to a hard
//! ceiling so an arbitrarily long stall can never trigger an unbounded
//! catch-up burst.

use crate::event::{self, EventBus, EventData, StepInfo, TickInfo};
use crate::host::{Clock, RefreshSignal};
use crate::plugin::{Namespace, PluginHost, PluginHub};
use crate::sched::config::SchedulerConfig;
use crate::sched::telemetry::{SecondWindow, TelemetrySnapshot};
use std::cell::RefCell;
use std::rc::Rc;

/// Backlog size above which the overflow telemetry bit is raised.
const OVERFLOW_MARK: u64 = 30;
/// Hard ceiling on carried backlog, bounding worst-case catch-up.
const BACKLOG_CEILING: u64 = 50;
/// Length of the telemetry window in clock milliseconds.
const SECOND_MS: u64 = 1000;

/// Converts irregular refresh signals into fixed-rate simulation steps.
///
/// The scheduler owns an [`EventBus`] instance and a [`PluginHost`]; every
/// step re-synchronizes newly registered plugins and dispatches the `frame`
/// event, and once per simulated second it publishes a
/// [`TelemetrySnapshot`] through the `stats` event.
pub struct Scheduler {
    config: SchedulerConfig,
    bus: Rc<EventBus>,
    plugins: PluginHost,
    namespace: Rc<RefCell<Namespace>>,
    clock: Rc<dyn Clock>,
    running: bool,
    epoch_ms: u64,
    last_virtual_frame: u64,
    backlog: u64,
    overflow: bool,
    sim_frame: u64,
    window: SecondWindow,
    max_total_steps: u64,
    snapshot: TelemetrySnapshot,
}

impl Scheduler {
    /// Creates an idle scheduler.
    ///
    /// Out-of-range configuration fields degrade to defaults with a warning
    /// (see [`SchedulerConfig::sanitized`]); construction never fails.
    pub fn new(
        config: SchedulerConfig,
        bus: Rc<EventBus>,
        hub: PluginHub,
        namespace: Rc<RefCell<Namespace>>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            config: config.sanitized(),
            bus,
            plugins: PluginHost::new(hub),
            namespace,
            clock,
            running: false,
            epoch_ms: 0,
            last_virtual_frame: 0,
            backlog: 0,
            overflow: false,
            sim_frame: 0,
            window: SecondWindow::new(0),
            max_total_steps: 0,
            snapshot: TelemetrySnapshot::default(),
        }
    }

    /// Enters the running state.
    ///
    /// Records the current clock reading as the epoch, synchronizes plugins
    /// registered ahead of startup, and fires the one-shot `boot` and
    /// `ready` lifecycle events — late subscribers to either will observe
    /// them through immediate-fire.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        let now = self.clock.now_ms();
        self.epoch_ms = now;
        self.last_virtual_frame = 0;
        self.window = SecondWindow::new(now);
        self.running = true;
        log::info!(
            "Scheduler started: target {} Hz, catch-up capacity {} frames",
            self.config.target_rate,
            self.config.backlog_capacity
        );

        self.plugins.sync(&self.bus, &self.namespace);
        for ty in [event::BOOT, event::READY] {
            if let Err(e) = self.bus.dispatch(ty, &EventData::None) {
                log::error!("Lifecycle event '{ty}' failed: {e}");
            }
        }
    }

    /// Drives the scheduler from a refresh-signal source.
    ///
    /// Starts the scheduler if needed, then ticks once per signal until the
    /// source closes. Between ticks, control rests with the source; the
    /// host cancels simply by ceasing to deliver signals.
    pub fn run(&mut self, signals: &mut dyn RefreshSignal) {
        self.start();
        while signals.wait().is_some() {
            self.tick();
        }
        log::info!("Refresh signal source closed; scheduler going idle.");
    }

    /// Handles one refresh signal.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        let now = self.clock.now_ms();
        let elapsed = now.saturating_sub(self.epoch_ms);
        // floor((now - epoch) / (1000 / rate)), kept in integer arithmetic.
        let virtual_frame = elapsed * u64::from(self.config.target_rate) / 1000;
        let owed = virtual_frame.saturating_sub(self.last_virtual_frame) + self.backlog;
        if owed < 1 {
            return;
        }

        let capacity = self.config.backlog_capacity;
        let steps_to_run = if owed > capacity {
            // Capacity clamp first, then the overflow mark, then the hard
            // ceiling: later ticks depend on the backlog this order yields.
            self.backlog = owed - capacity;
            self.overflow = self.backlog > OVERFLOW_MARK;
            if self.backlog > BACKLOG_CEILING {
                log::warn!(
                    "Backlog {} clamped to ceiling {BACKLOG_CEILING}",
                    self.backlog
                );
                self.backlog = BACKLOG_CEILING;
            }
            capacity
        } else {
            self.backlog = 0;
            self.overflow = false;
            owed
        };

        for i in 0..steps_to_run {
            // Only the final step of a burst is eligible to render.
            let drawable = i + 1 == steps_to_run;
            self.plugins.sync(&self.bus, &self.namespace);
            self.sim_frame += 1;

            let begin = self.clock.now_ms();
            let step = EventData::Step(StepInfo {
                virtual_frame: self.sim_frame,
                drawable,
            });
            if let Err(e) = self.bus.dispatch(event::FRAME, &step) {
                log::error!("Frame dispatch failed: {e}");
            }
            let spent = self.clock.now_ms().saturating_sub(begin);
            self.window.record_step(spent);
        }

        self.window.steps += 1;
        self.window.total_steps += steps_to_run;
        self.last_virtual_frame = virtual_frame;

        if now.saturating_sub(self.window.start_ms) >= SECOND_MS {
            self.max_total_steps = self.max_total_steps.max(self.window.total_steps);
            let snapshot = self.window.close(self.overflow, self.max_total_steps);
            if let Err(e) = self.bus.dispatch(event::STATS, &EventData::Stats(snapshot.clone())) {
                log::error!("Stats dispatch failed: {e}");
            }
            self.snapshot = snapshot;
            self.window = SecondWindow::new(now);
        }

        let info = TickInfo {
            steps_this_second: self.window.steps,
            total_steps_this_second: self.window.total_steps,
        };
        if let Err(e) = self.bus.dispatch(event::TICK, &EventData::Tick(info)) {
            log::error!("Tick dispatch failed: {e}");
        }
    }

    /// The telemetry snapshot of the last completed second.
    pub fn telemetry(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    /// Virtual frames owed but not yet executed.
    pub fn backlog(&self) -> u64 {
        self.backlog
    }

    /// True while the backlog sits above its high-water mark.
    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    /// Total simulation steps executed since start.
    pub fn frames(&self) -> u64 {
        self.sim_frame
    }

    /// True once [`start`](Self::start) has run.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The event bus this scheduler dispatches through.
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// The namespace plugins install themselves into.
    pub fn namespace(&self) -> &Rc<RefCell<Namespace>> {
        &self.namespace
    }
}
