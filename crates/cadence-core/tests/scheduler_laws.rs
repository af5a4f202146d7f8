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

//! Catch-up and telemetry laws of the fixed-timestep scheduler, driven by a
//! manual clock for exact frame arithmetic.

use approx::assert_relative_eq;
use cadence_core::event;
use cadence_core::{
    Clock, EventBus, EventData, EventTypeRegistry, ManualClock, Namespace, PluginHub, Scheduler,
    SchedulerConfig, TelemetrySnapshot,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn rig() -> (Scheduler, Rc<ManualClock>, Rc<EventBus>) {
    let clock = Rc::new(ManualClock::new());
    let bus = Rc::new(EventBus::new(EventTypeRegistry::new()));
    let scheduler = Scheduler::new(
        SchedulerConfig::default(),
        Rc::clone(&bus),
        PluginHub::new(),
        Rc::new(RefCell::new(Namespace::new())),
        Rc::clone(&clock) as Rc<dyn Clock>,
    );
    (scheduler, clock, bus)
}

fn count_frames(bus: &EventBus) -> Rc<Cell<u64>> {
    let count = Rc::new(Cell::new(0u64));
    let c = Rc::clone(&count);
    bus.register_named(event::FRAME, "counter", move |_| {
        c.set(c.get() + 1);
        Ok(())
    })
    .unwrap();
    count
}

/// Millisecond timestamp of the i-th refresh signal at a steady 60 Hz,
/// rounded up so each signal owes exactly one virtual frame.
fn at_60hz(i: u64) -> u64 {
    (1000 * i).div_ceil(60)
}

#[test]
fn backlog_law_45_owed_frames() {
    let (mut scheduler, clock, bus) = rig();
    let frames = count_frames(&bus);
    scheduler.start();

    // 750 ms at 60 Hz is exactly 45 owed virtual frames.
    clock.set(750);
    scheduler.tick();

    assert_eq!(frames.get(), 30, "capacity bounds the steps per tick");
    assert_eq!(scheduler.backlog(), 15);
    assert!(!scheduler.overflowed());
}

#[test]
fn overflow_law_65_owed_frames() {
    let (mut scheduler, clock, bus) = rig();
    let frames = count_frames(&bus);
    scheduler.start();

    clock.set(1084); // 65 owed virtual frames
    scheduler.tick();

    assert_eq!(frames.get(), 30);
    assert_eq!(scheduler.backlog(), 35);
    assert!(scheduler.overflowed());
}

#[test]
fn ceiling_law_85_owed_frames() {
    let (mut scheduler, clock, bus) = rig();
    let frames = count_frames(&bus);
    scheduler.start();

    clock.set(1417); // 85 owed virtual frames
    scheduler.tick();

    assert_eq!(frames.get(), 30);
    assert_eq!(scheduler.backlog(), 50, "backlog is clamped to the ceiling");
    assert!(scheduler.overflowed());
}

#[test]
fn backlog_drains_across_subsequent_ticks() {
    let (mut scheduler, clock, bus) = rig();
    let frames = count_frames(&bus);
    scheduler.start();

    clock.set(1417);
    scheduler.tick();
    assert_eq!(scheduler.backlog(), 50);

    // No new wall time: the carried backlog alone feeds the next ticks.
    scheduler.tick();
    assert_eq!(frames.get(), 60);
    assert_eq!(scheduler.backlog(), 20);
    assert!(!scheduler.overflowed(), "20 is back under the high-water mark");

    scheduler.tick();
    assert_eq!(frames.get(), 80);
    assert_eq!(scheduler.backlog(), 0);
    assert!(!scheduler.overflowed());
}

#[test]
fn sub_frame_tick_runs_no_steps() {
    let (mut scheduler, clock, bus) = rig();
    let frames = count_frames(&bus);
    let ticks = Rc::new(Cell::new(0u64));
    let t = Rc::clone(&ticks);
    bus.register(event::TICK, move |_| {
        t.set(t.get() + 1);
        Ok(())
    })
    .unwrap();
    scheduler.start();

    clock.set(10); // less than one 60 Hz frame
    scheduler.tick();

    assert_eq!(frames.get(), 0);
    assert_eq!(ticks.get(), 0, "a stepless tick emits no tick event");
    assert_eq!(scheduler.frames(), 0);
}

#[test]
fn only_the_last_step_of_a_burst_is_drawable() {
    let (mut scheduler, clock, bus) = rig();
    let flags = Rc::new(RefCell::new(Vec::new()));
    let f = Rc::clone(&flags);
    bus.register(event::FRAME, move |data| {
        if let EventData::Step(step) = data {
            f.borrow_mut().push(step.drawable);
        }
        Ok(())
    })
    .unwrap();
    scheduler.start();

    clock.set(750); // 45 owed, 30 run
    scheduler.tick();

    let flags = flags.borrow();
    assert_eq!(flags.len(), 30);
    assert_eq!(flags.iter().filter(|d| **d).count(), 1);
    assert_eq!(flags.last(), Some(&true));
}

#[test]
fn steady_second_publishes_matching_telemetry() {
    let (mut scheduler, clock, bus) = rig();

    // Each step costs 2 ms of simulated work.
    let work_clock = Rc::clone(&clock);
    bus.register_named(event::FRAME, "work", move |_| {
        work_clock.advance(2);
        Ok(())
    })
    .unwrap();

    let published: Rc<RefCell<Vec<TelemetrySnapshot>>> = Rc::new(RefCell::new(Vec::new()));
    let p = Rc::clone(&published);
    bus.register(event::STATS, move |data| {
        if let EventData::Stats(snapshot) = data {
            p.borrow_mut().push(snapshot.clone());
        }
        Ok(())
    })
    .unwrap();

    scheduler.start();
    for i in 1..=60 {
        clock.set(at_60hz(i));
        scheduler.tick();
    }

    let published = published.borrow();
    assert_eq!(published.len(), 1, "exactly one second elapsed");
    let snapshot = &published[0];
    assert_eq!(snapshot.steps_this_second, 60);
    assert_eq!(snapshot.total_steps_this_second, 60);
    assert_eq!(snapshot.max_steps_this_second, 60);
    assert!(!snapshot.overflow);
    assert_eq!(snapshot.timing_min_ms, 2.0);
    assert_eq!(snapshot.timing_max_ms, 2.0);
    assert_relative_eq!(snapshot.timing_avg_ms, snapshot.timing_sum_ms / 60.0);

    // The read-only snapshot matches what was published.
    assert_eq!(scheduler.telemetry(), snapshot);
}

#[test]
fn start_fires_lifecycle_milestones_for_late_subscribers() {
    let (mut scheduler, _clock, bus) = rig();
    scheduler.start();

    let fired = Rc::new(Cell::new(0u32));
    for ty in [event::BOOT, event::READY] {
        let f = Rc::clone(&fired);
        let outcome = bus
            .register(ty, move |_| {
                f.set(f.get() + 1);
                Ok(())
            })
            .unwrap();
        assert_eq!(outcome, cadence_core::RegisterOutcome::AlreadySatisfied);
    }
    assert_eq!(fired.get(), 2);
}
