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

//! Event payloads delivered to listeners.

use crate::sched::TelemetrySnapshot;

/// The payload handed to every listener invocation.
///
/// Built-in runtime events use the structured variants; applications that
/// declare their own event types can carry arbitrary JSON through
/// [`EventData::Value`].
#[derive(Debug, Clone)]
pub enum EventData {
    /// No payload. Also the argument for immediate-fire invocations on
    /// already-satisfied one-shot types.
    None,
    /// One fixed-rate simulation step (the `frame` event).
    Step(StepInfo),
    /// Per-second scheduler telemetry (the `stats` event).
    Stats(TelemetrySnapshot),
    /// Refresh-signal counters (the `tick` event).
    Tick(TickInfo),
    /// Meta-event payload describing a completed dispatch.
    Report(DispatchReport),
    /// Plugin installation notice (`plugin-added` / `plugin-overwritten`).
    Plugin(PluginNotice),
    /// Application-defined payload for dynamically declared types.
    Value(serde_json::Value),
}

/// Describes one fixed-rate simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    /// Monotonic simulation frame counter, one per executed step.
    pub virtual_frame: u64,
    /// True only for the final step of a catch-up burst; render-facing
    /// work should run on drawable steps only.
    pub drawable: bool,
}

/// Counters carried by the `tick` event after a refresh signal ran steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// Refresh signals that ran at least one step in the current second.
    pub steps_this_second: u64,
    /// Steps executed in the current second, catch-up included.
    pub total_steps_this_second: u64,
}

/// Payload of the internal `dispatch` meta-event.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// The event type that was dispatched.
    pub event: String,
    /// The payload that was delivered.
    pub args: Box<EventData>,
    /// How many listeners were invoked.
    pub delivered: usize,
}

/// Payload of the plugin installation notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginNotice {
    /// The registered plugin key.
    pub plugin: String,
    /// The dotted namespace path the plugin was installed under.
    pub path: String,
}
