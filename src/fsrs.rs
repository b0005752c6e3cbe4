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

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::settings::SchedulerSettings;
use crate::types::state::MemoryState;
use crate::types::timestamp::Timestamp;

pub type Stability = f64;
pub type Difficulty = f64;
pub type Retrievability = f64;

const FACTOR: f64 = 19.0 / 81.0;
const DECAY: f64 = -0.5;

/// The minimum review interval in days.
pub const MIN_INTERVAL: f64 = 1.0;

/// The maximum review interval in days.
pub const MAX_INTERVAL: f64 = 36500.0;

const W: [f64; 19] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

/// A recall outcome reported by the learner.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Parse the 1-4 integer encoding. Anything else is a caller error and
    /// fails loudly rather than defaulting.
    pub fn from_u8(n: u8) -> Fallible<Rating> {
        match n {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            _ => fail(format!("unrecognized rating: {}", n)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl TryFrom<&str> for Rating {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            _ => Err(ErrorReport::new(format!("unrecognized rating: {}", value))),
        }
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> f64 {
        match rating {
            Rating::Again => 1.0,
            Rating::Hard => 2.0,
            Rating::Good => 3.0,
            Rating::Easy => 4.0,
        }
    }
}

/// Probability of recall after `elapsed_days` at the given stability.
/// Callers must guard against zero stability.
pub fn retrievability(elapsed_days: f64, stability: Stability) -> Retrievability {
    (1.0 + FACTOR * (elapsed_days / stability)).powf(DECAY)
}

/// The interval, in days, after which retrievability decays to the target
/// retention.
pub fn interval(retention: f64, stability: Stability) -> f64 {
    (stability / FACTOR) * (retention.powf(1.0 / DECAY) - 1.0)
}

pub fn initial_stability(rating: Rating) -> Stability {
    match rating {
        Rating::Again => W[0],
        Rating::Hard => W[1],
        Rating::Good => W[2],
        Rating::Easy => W[3],
    }
}

pub fn initial_difficulty(rating: Rating) -> Difficulty {
    let g: f64 = rating.into();
    clamp_difficulty(W[4] - f64::exp(W[5] * (g - 1.0)) + 1.0)
}

fn clamp_difficulty(difficulty: Difficulty) -> Difficulty {
    difficulty.clamp(1.0, 10.0)
}

fn stability_on_success(
    difficulty: Difficulty,
    stability: Stability,
    retr: Retrievability,
    rating: Rating,
) -> Stability {
    let t_d = 11.0 - difficulty;
    let t_s = stability.powf(-W[9]);
    let t_r = f64::exp(W[10] * (1.0 - retr)) - 1.0;
    let hard_penalty = if rating == Rating::Hard { W[15] } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { W[16] } else { 1.0 };
    let alpha = 1.0 + t_d * t_s * t_r * hard_penalty * easy_bonus * f64::exp(W[8]);
    stability * alpha
}

fn stability_on_fail(
    difficulty: Difficulty,
    stability: Stability,
    retr: Retrievability,
) -> Stability {
    let d_f = difficulty.powf(-W[12]);
    let s_f = (stability + 1.0).powf(W[13]) - 1.0;
    let r_f = f64::exp(W[14] * (1.0 - retr));
    f64::min(d_f * s_f * r_f * W[11], stability)
}

pub fn new_stability(
    difficulty: Difficulty,
    stability: Stability,
    retr: Retrievability,
    rating: Rating,
) -> Stability {
    if rating == Rating::Again {
        stability_on_fail(difficulty, stability, retr)
    } else {
        stability_on_success(difficulty, stability, retr, rating)
    }
}

pub fn new_difficulty(difficulty: Difficulty, rating: Rating) -> Difficulty {
    let g: f64 = rating.into();
    let delta = -W[6] * (g - 3.0);
    let updated = difficulty + delta * ((10.0 - difficulty) / 9.0);
    // Mean reversion towards the initial easy difficulty.
    clamp_difficulty(W[7] * initial_difficulty(Rating::Easy) + (1.0 - W[7]) * updated)
}

/// The internal card representation the forgetting-curve model advances.
/// Built from a persisted `CardState` by the codec; has no suspended
/// concept.
#[derive(Clone, PartialEq, Debug)]
pub struct FsrsCard {
    pub due: Timestamp,
    pub stability: Stability,
    pub difficulty: Difficulty,
    /// Whole days since the previous review, at the time of the last
    /// advance.
    pub elapsed_days: i64,
    /// The interval the last advance scheduled, in whole days. Zero for
    /// sub-day learning steps.
    pub scheduled_days: i64,
    pub reps: u32,
    pub lapses: u32,
    pub state: MemoryState,
    pub learning_step: u32,
    pub last_review: Option<Timestamp>,
}

impl FsrsCard {
    /// A freshly created card, due immediately.
    pub fn init(now: Timestamp) -> Self {
        Self {
            due: now,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            state: MemoryState::New,
            learning_step: 0,
            last_review: None,
        }
    }

    /// Advance the card's memory state in response to a rating. Pure: the
    /// card itself is not mutated.
    pub fn advance(&self, rating: Rating, now: Timestamp, settings: &SchedulerSettings) -> Self {
        let elapsed = match self.last_review {
            Some(last) => now.whole_days_since(last),
            None => 0,
        };

        let mut next = self.clone();
        next.elapsed_days = elapsed;
        next.reps = self.reps + 1;
        next.last_review = Some(now);

        let (stability, difficulty) = if self.state == MemoryState::New || self.stability <= 0.0 {
            (initial_stability(rating), initial_difficulty(rating))
        } else {
            let retr = retrievability(elapsed as f64, self.stability);
            (
                new_stability(self.difficulty, self.stability, retr, rating),
                new_difficulty(self.difficulty, rating),
            )
        };
        next.stability = stability;
        next.difficulty = difficulty;

        let retention = settings.retention();
        match (self.state, rating) {
            (MemoryState::New, Rating::Again) | (MemoryState::New, Rating::Hard) => {
                place_on_step(
                    &mut next,
                    MemoryState::Learning,
                    &settings.learning_steps_minutes,
                    0,
                    retention,
                    now,
                );
            }
            (MemoryState::New, Rating::Good) => {
                place_on_step(
                    &mut next,
                    MemoryState::Learning,
                    &settings.learning_steps_minutes,
                    1,
                    retention,
                    now,
                );
            }
            (MemoryState::New, Rating::Easy) => graduate(&mut next, retention, now),
            (MemoryState::Learning, rating) | (MemoryState::Relearning, rating) => {
                let steps = match self.state {
                    MemoryState::Relearning => &settings.relearning_steps_minutes,
                    _ => &settings.learning_steps_minutes,
                };
                match rating {
                    Rating::Again => {
                        place_on_step(&mut next, self.state, steps, 0, retention, now)
                    }
                    Rating::Hard => place_on_step(
                        &mut next,
                        self.state,
                        steps,
                        self.learning_step as usize,
                        retention,
                        now,
                    ),
                    Rating::Good => place_on_step(
                        &mut next,
                        self.state,
                        steps,
                        self.learning_step as usize + 1,
                        retention,
                        now,
                    ),
                    Rating::Easy => graduate(&mut next, retention, now),
                }
            }
            (MemoryState::Review, Rating::Again) => {
                next.lapses = self.lapses + 1;
                place_on_step(
                    &mut next,
                    MemoryState::Relearning,
                    &settings.relearning_steps_minutes,
                    0,
                    retention,
                    now,
                );
            }
            (MemoryState::Review, _) => graduate(&mut next, retention, now),
        }
        next
    }
}

/// Put the card on the given step of a learning schedule, graduating to
/// review when the step walks past the end of the schedule.
fn place_on_step(
    card: &mut FsrsCard,
    state: MemoryState,
    steps: &[u32],
    step: usize,
    retention: f64,
    now: Timestamp,
) {
    match steps.get(step) {
        Some(&minutes) => {
            card.state = state;
            card.learning_step = step as u32;
            card.scheduled_days = 0;
            card.due = now.add_minutes(minutes as i64);
        }
        None => graduate(card, retention, now),
    }
}

fn graduate(card: &mut FsrsCard, retention: f64, now: Timestamp) {
    let days = interval(retention, card.stability)
        .round()
        .clamp(MIN_INTERVAL, MAX_INTERVAL) as i64;
    card.state = MemoryState::Review;
    card.learning_step = 0;
    card.scheduled_days = days;
    card.due = now.add_days(days);
}
