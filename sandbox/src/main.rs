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

//! Demo host: drives the runtime from a background thread that plays the
//! role of a display, sending one refresh signal every ~16 ms.
//!
//! Pass a JSON config path as the first argument to override the default
//! 60 Hz / 30-frame scheduler settings.

use cadence_core::event;
use cadence_core::{
    callback, ChannelSignal, Clock, EventBus, EventData, EventTypeRegistry, InstallSpec,
    Namespace, PluginHub, PluginOptions, Scheduler, SchedulerConfig, SystemClock,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

const REFRESH_INTERVAL: Duration = Duration::from_millis(16);
const DEMO_SIGNALS: u32 = 180;

fn load_config() -> SchedulerConfig {
    match std::env::args().nth(1) {
        Some(path) => match SchedulerConfig::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded scheduler config from {path}");
                config
            }
            Err(e) => {
                log::warn!("Could not load config from {path}: {e}; using defaults");
                SchedulerConfig::default()
            }
        },
        None => SchedulerConfig::default(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let bus = Rc::new(EventBus::new(EventTypeRegistry::new()));
    let hub = PluginHub::new();
    let namespace = Rc::new(RefCell::new(Namespace::new()));

    // A plugin that both steps every frame and installs a callable.
    hub.register(
        callback(|data| {
            if let EventData::Step(step) = data {
                if step.virtual_frame % 60 == 0 {
                    log::info!("Heartbeat at frame {}", step.virtual_frame);
                }
            }
            Ok(())
        }),
        Some("heartbeat"),
        PluginOptions {
            event_types: vec![event::FRAME.to_string()],
            install: Some(InstallSpec {
                path: "tools.heartbeat".to_string(),
                overwrite: false,
            }),
        },
    );

    bus.register_named(event::STATS, "stats-log", |data| {
        if let EventData::Stats(snapshot) = data {
            log::info!(
                "Second elapsed: {} signals, {} steps, frame timing {:.2}/{:.2}/{:.2} ms",
                snapshot.steps_this_second,
                snapshot.total_steps_this_second,
                snapshot.timing_min_ms,
                snapshot.timing_avg_ms,
                snapshot.timing_max_ms,
            );
        }
        Ok(())
    })?;

    let clock: Rc<dyn Clock> = Rc::new(SystemClock::new());
    let mut scheduler = Scheduler::new(
        load_config(),
        Rc::clone(&bus),
        hub,
        Rc::clone(&namespace),
        clock,
    );

    // Fake display: one refresh signal per interval, then hang up.
    let (sender, mut signals) = ChannelSignal::pair();
    let pump = thread::spawn(move || {
        for _ in 0..DEMO_SIGNALS {
            if sender.send(()).is_err() {
                break;
            }
            thread::sleep(REFRESH_INTERVAL);
        }
    });

    scheduler.run(&mut signals);
    pump.join().expect("signal pump panicked");

    log::info!(
        "Done: {} simulation steps, backlog {}",
        scheduler.frames(),
        scheduler.backlog()
    );

    // The plugin's callable is reachable through the namespace.
    if let Some(heartbeat) = namespace.borrow().get("tools.heartbeat") {
        (heartbeat.borrow_mut())(&EventData::None)?;
    }

    Ok(())
}
