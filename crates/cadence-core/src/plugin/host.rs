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

//! Per-instance plugin synchronization.

use crate::event::{self, EventBus, EventData, PluginNotice, RegisterOutcome};
use crate::plugin::namespace::{InstallOutcome, Namespace};
use crate::plugin::registry::{PluginFn, PluginHub, PluginOptions};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

/// Binds the shared [`PluginHub`] to one runtime instance.
///
/// The scheduler calls [`sync`](Self::sync) every step; the hub revision
/// check makes the steady-state call a single integer comparison. Entries
/// registered since the last sync get their event subscriptions and
/// namespace installation applied exactly once per host.
pub struct PluginHost {
    hub: PluginHub,
    seen: RefCell<HashSet<String>>,
    synced_revision: Cell<u64>,
}

impl PluginHost {
    /// Creates a host that tracks the given hub.
    pub fn new(hub: PluginHub) -> Self {
        Self {
            hub,
            seen: RefCell::new(HashSet::new()),
            synced_revision: Cell::new(0),
        }
    }

    /// The hub this host synchronizes against.
    pub fn hub(&self) -> &PluginHub {
        &self.hub
    }

    /// Applies every not-yet-seen hub entry to this instance.
    pub fn sync(&self, bus: &EventBus, namespace: &Rc<RefCell<Namespace>>) {
        if self.synced_revision.get() == self.hub.revision() {
            return;
        }

        for (name, func, options) in self.hub.snapshot() {
            let unseen = self.seen.borrow_mut().insert(name.clone());
            if !unseen {
                continue;
            }
            self.subscribe(bus, &name, &func, &options);
            self.install(bus, namespace, &name, func, &options);
        }

        self.synced_revision.set(self.hub.revision());
    }

    fn subscribe(&self, bus: &EventBus, name: &str, func: &PluginFn, options: &PluginOptions) {
        let mut subscribed: HashSet<&str> = HashSet::new();
        for ty in &options.event_types {
            if !subscribed.insert(ty.as_str()) {
                log::warn!("Plugin '{name}' already subscribes to '{ty}'; skipping duplicate");
                continue;
            }
            let listener_name = format!("{name}@{ty}");
            match bus.register_callback(ty, Some(&listener_name), false, func.clone()) {
                Ok(RegisterOutcome::Registered(_)) => {}
                Ok(RegisterOutcome::AlreadySatisfied) => {
                    log::debug!("Plugin '{name}' caught the past one-shot event '{ty}'");
                }
                Err(e) => {
                    log::warn!("Plugin '{name}' subscription to '{ty}' failed: {e}");
                }
            }
        }
    }

    fn install(
        &self,
        bus: &EventBus,
        namespace: &Rc<RefCell<Namespace>>,
        name: &str,
        func: PluginFn,
        options: &PluginOptions,
    ) {
        let Some(spec) = &options.install else {
            return;
        };

        let outcome = namespace
            .borrow_mut()
            .install(&spec.path, func, spec.overwrite);
        let notice = EventData::Plugin(PluginNotice {
            plugin: name.to_string(),
            path: spec.path.clone(),
        });
        match outcome {
            InstallOutcome::Added => {
                if let Err(e) = bus.dispatch(event::PLUGIN_ADDED, &notice) {
                    log::error!("Plugin-added notification failed: {e}");
                }
            }
            InstallOutcome::Overwritten => {
                log::info!("Plugin '{name}' overwrote '{}'", spec.path);
                if let Err(e) = bus.dispatch(event::PLUGIN_OVERWRITTEN, &notice) {
                    log::error!("Plugin-overwritten notification failed: {e}");
                }
            }
            InstallOutcome::Occupied => {
                log::warn!(
                    "Install target '{}' is occupied; plugin '{name}' not installed",
                    spec.path
                );
            }
            InstallOutcome::InvalidPath => {
                log::warn!(
                    "Install path '{}' is invalid; plugin '{name}' not installed",
                    spec.path
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::bus::callback;
    use crate::event::EventTypeRegistry;
    use crate::plugin::registry::InstallSpec;

    fn rig() -> (EventBus, PluginHub, PluginHost, Rc<RefCell<Namespace>>) {
        let bus = EventBus::new(EventTypeRegistry::new());
        let hub = PluginHub::new();
        let host = PluginHost::new(hub.clone());
        let namespace = Rc::new(RefCell::new(Namespace::new()));
        (bus, hub, host, namespace)
    }

    #[test]
    fn sync_subscribes_declared_event_types() {
        let (bus, hub, host, ns) = rig();
        hub.register(
            callback(|_| Ok(())),
            Some("probe"),
            PluginOptions {
                event_types: vec![event::FRAME.to_string(), event::TICK.to_string()],
                install: None,
            },
        );

        host.sync(&bus, &ns);
        assert_eq!(bus.listener_names(event::FRAME).unwrap(), vec!["probe@frame"]);
        assert_eq!(bus.listener_names(event::TICK).unwrap(), vec!["probe@tick"]);
    }

    #[test]
    fn duplicate_subscription_is_skipped() {
        let (bus, hub, host, ns) = rig();
        hub.register(
            callback(|_| Ok(())),
            Some("probe"),
            PluginOptions {
                event_types: vec![event::FRAME.to_string(), event::FRAME.to_string()],
                install: None,
            },
        );

        host.sync(&bus, &ns);
        assert_eq!(
            bus.listener_names(event::FRAME).unwrap(),
            vec!["probe@frame"],
            "the duplicate type must subscribe only once"
        );
    }

    #[test]
    fn sync_is_idempotent_per_entry() {
        let (bus, hub, host, ns) = rig();
        hub.register(
            callback(|_| Ok(())),
            Some("probe"),
            PluginOptions {
                event_types: vec![event::FRAME.to_string()],
                install: None,
            },
        );

        host.sync(&bus, &ns);
        host.sync(&bus, &ns);
        assert_eq!(bus.listener_names(event::FRAME).unwrap().len(), 1);

        // A later registration only applies the new entry.
        hub.register(
            callback(|_| Ok(())),
            Some("late"),
            PluginOptions {
                event_types: vec![event::FRAME.to_string()],
                install: None,
            },
        );
        host.sync(&bus, &ns);
        assert_eq!(
            bus.listener_names(event::FRAME).unwrap(),
            vec!["probe@frame", "late@frame"]
        );
    }

    #[test]
    fn install_emits_added_notification() {
        let (bus, hub, host, ns) = rig();
        let notices = Rc::new(RefCell::new(Vec::new()));
        let n = Rc::clone(&notices);
        bus.register(event::PLUGIN_ADDED, move |data| {
            if let EventData::Plugin(notice) = data {
                n.borrow_mut().push(notice.clone());
            }
            Ok(())
        })
        .unwrap();

        hub.register(
            callback(|_| Ok(())),
            Some("shake"),
            PluginOptions {
                event_types: Vec::new(),
                install: Some(InstallSpec {
                    path: "tools.shake".to_string(),
                    overwrite: false,
                }),
            },
        );
        host.sync(&bus, &ns);

        assert!(ns.borrow().get("tools.shake").is_some());
        let notices = notices.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].plugin, "shake");
        assert_eq!(notices[0].path, "tools.shake");
    }

    #[test]
    fn unknown_subscription_type_degrades_to_a_warning() {
        let (bus, hub, host, ns) = rig();
        hub.register(
            callback(|_| Ok(())),
            Some("probe"),
            PluginOptions {
                event_types: vec!["no-such-type".to_string(), event::FRAME.to_string()],
                install: None,
            },
        );

        // The bad subscription is skipped; the good one still lands.
        host.sync(&bus, &ns);
        assert_eq!(bus.listener_names(event::FRAME).unwrap(), vec!["probe@frame"]);
    }
}
