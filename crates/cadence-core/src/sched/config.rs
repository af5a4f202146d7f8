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

//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the fixed-timestep scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Target simulation rate in steps per second.
    pub target_rate: u32,
    /// Maximum steps executed per refresh signal; frames owed beyond this
    /// are carried as backlog.
    pub backlog_capacity: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_rate: 60,
            backlog_capacity: 30,
        }
    }
}

impl SchedulerConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Returns a copy with out-of-range fields replaced by defaults.
    ///
    /// A zero target rate or capacity would stall the scheduler entirely;
    /// both degrade to the defaults with a warning rather than an error.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        if config.target_rate == 0 {
            log::warn!("target_rate 0 is invalid; falling back to 60");
            config.target_rate = 60;
        }
        if config.backlog_capacity == 0 {
            log::warn!("backlog_capacity 0 is invalid; falling back to 30");
            config.backlog_capacity = 30;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_runtime_contract() {
        let config = SchedulerConfig::default();
        assert_eq!(config.target_rate, 60);
        assert_eq!(config.backlog_capacity, 30);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{ "target_rate": 120 }"#).expect("should deserialize");
        assert_eq!(config.target_rate, 120);
        assert_eq!(config.backlog_capacity, 30);
    }

    #[test]
    fn sanitized_replaces_zero_fields() {
        let config = SchedulerConfig {
            target_rate: 0,
            backlog_capacity: 0,
        };
        assert_eq!(config.sanitized(), SchedulerConfig::default());

        let valid = SchedulerConfig {
            target_rate: 30,
            backlog_capacity: 10,
        };
        assert_eq!(valid.sanitized(), valid);
    }

    #[test]
    fn round_trips_through_json() {
        let config = SchedulerConfig {
            target_rate: 144,
            backlog_capacity: 48,
        };
        let json = serde_json::to_string(&config).expect("should serialize");
        let back: SchedulerConfig = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back, config);
    }
}
