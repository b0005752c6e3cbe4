// Copyright 2025 Fernando Borretti
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

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;

/// The lowest target retention the scheduler accepts.
pub const MIN_RETENTION: f64 = 0.80;

/// The highest target retention the scheduler accepts.
pub const MAX_RETENTION: f64 = 0.97;

/// Session-wide scheduling configuration. Passed explicitly to every
/// scheduling call and never mutated by the engine.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSettings {
    /// Delays, in minutes, between the steps a card climbs while learning.
    pub learning_steps_minutes: Vec<u32>,
    /// Delays, in minutes, between the steps a lapsed card climbs while
    /// relearning.
    pub relearning_steps_minutes: Vec<u32>,
    /// Target recall probability at review time.
    pub desired_retention: f64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            learning_steps_minutes: vec![1, 10],
            relearning_steps_minutes: vec![10],
            desired_retention: 0.9,
        }
    }
}

impl SchedulerSettings {
    /// Reject configurations the scheduler cannot run with. An out-of-range
    /// retention is not an error; see `retention`.
    pub fn validate(&self) -> Fallible<()> {
        if self.learning_steps_minutes.is_empty() {
            return fail("learning steps must not be empty");
        }
        if self.relearning_steps_minutes.is_empty() {
            return fail("relearning steps must not be empty");
        }
        Ok(())
    }

    /// The target retention, clamped into the supported range.
    pub fn retention(&self) -> f64 {
        self.desired_retention.clamp(MIN_RETENTION, MAX_RETENTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        let settings = SchedulerSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.retention(), 0.9);
    }

    #[test]
    fn test_empty_steps_rejected() {
        let mut settings = SchedulerSettings::default();
        settings.learning_steps_minutes.clear();
        assert!(settings.validate().is_err());

        let mut settings = SchedulerSettings::default();
        settings.relearning_steps_minutes.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_retention_is_clamped() {
        let mut settings = SchedulerSettings::default();
        settings.desired_retention = 0.5;
        assert_eq!(settings.retention(), MIN_RETENTION);
        settings.desired_retention = 0.999;
        assert_eq!(settings.retention(), MAX_RETENTION);
    }
}
