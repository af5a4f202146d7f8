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

//! Error types for the event subsystem.

use std::fmt;

/// An error from an [`EventBus`](crate::event::EventBus) or
/// [`EventTypeRegistry`](crate::event::EventTypeRegistry) operation.
///
/// These are expected steady-state outcomes (probing before registering,
/// addressing a listener that was already removed), not faults; nothing in
/// the bus panics on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The event type is not declared in either namespace.
    UnknownType {
        /// The name that failed to resolve.
        name: String,
    },
    /// No listener with the given name is registered for the event type.
    UnknownListener {
        /// The event type that was addressed.
        event: String,
        /// The listener name that was not found.
        name: String,
    },
    /// A type with this name is already declared.
    TypeExists {
        /// The conflicting name.
        name: String,
    },
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::UnknownType { name } => {
                write!(f, "Unknown event type '{name}'")
            }
            BusError::UnknownListener { event, name } => {
                write!(f, "No listener '{name}' registered for event '{event}'")
            }
            BusError::TypeExists { name } => {
                write!(f, "Event type '{name}' is already declared")
            }
        }
    }
}

impl std::error::Error for BusError {}
