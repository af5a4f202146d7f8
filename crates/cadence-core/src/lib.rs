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

//! # Cadence Core
//!
//! A small runtime that decouples irregular, host-driven "frame available"
//! signals from a fixed-rate simulation clock. Three tightly coupled parts:
//!
//! - [`event::EventBus`] — named, dynamically extensible publish/subscribe;
//! - [`plugin::PluginHub`] / [`plugin::PluginHost`] — external behavior
//!   wired into the bus and installed onto a callable namespace;
//! - [`sched::Scheduler`] — the fixed-timestep loop with bounded catch-up
//!   that drives both and publishes per-second telemetry.
//!
//! The host supplies two collaborators: a monotonic [`host::Clock`] and a
//! [`host::RefreshSignal`] source. Everything runs cooperatively on one
//! thread; the only suspension point is the wait for the next signal.

#![warn(missing_docs)]

pub mod event;
pub mod host;
pub mod plugin;
pub mod sched;
pub mod utils;

pub use event::{
    BusError, Delivery, EventBus, EventData, EventTypeRegistry, RegisterOutcome,
};
pub use event::bus::callback;
pub use host::{ChannelSignal, Clock, ManualClock, RefreshSignal, SystemClock};
pub use plugin::{InstallSpec, Namespace, PluginHost, PluginHub, PluginOptions};
pub use sched::{Scheduler, SchedulerConfig, TelemetrySnapshot};
pub use utils::Stopwatch;
