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

use chrono::DateTime;
use chrono::Days;
use chrono::Duration;
use chrono::NaiveTime;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// Epoch milliseconds of 9999-12-31T23:59:59Z. Stored as the due time of
/// suspended cards so that due-ordered queries never surface them.
const FAR_FUTURE_MILLIS: i64 = 253_402_300_799_000;

/// An absolute instant. Persisted as epoch milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Build a timestamp from epoch milliseconds. Out-of-range values are
    /// clamped into the representable window rather than rejected.
    pub fn from_millis(millis: i64) -> Self {
        let millis = millis.clamp(0, FAR_FUTURE_MILLIS);
        match Utc.timestamp_millis_opt(millis).single() {
            Some(ts) => Self(ts),
            None => Self(Utc.timestamp_millis_opt(0).single().unwrap_or_default()),
        }
    }

    pub fn millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    /// The sentinel due time of suspended cards.
    pub fn far_future() -> Self {
        Self::from_millis(FAR_FUTURE_MILLIS)
    }

    pub fn is_far_future(self) -> bool {
        self.millis() >= FAR_FUTURE_MILLIS
    }

    /// Whole days from `earlier` to `self`, never negative.
    pub fn whole_days_since(self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).num_days().max(0)
    }

    /// Midnight (UTC) at the start of the calendar day after this instant.
    pub fn next_day_start(self) -> Self {
        let next = self.0.date_naive() + Days::new(1);
        Self(Utc.from_utc_datetime(&next.and_time(NaiveTime::MIN)))
    }

    pub fn add_days(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    pub fn add_minutes(self, minutes: i64) -> Self {
        Self(self.0 + Duration::minutes(minutes))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.millis())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        Ok(Timestamp::from_millis(millis))
    }
}
