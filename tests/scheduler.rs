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

//! Walks a small deck through a whole scheduling session: eligibility
//! filtering, queue ordering, grading, and the lifecycle operations.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use vaultcards::fsrs::Rating;
use vaultcards::lifecycle::bury;
use vaultcards::lifecycle::reset;
use vaultcards::lifecycle::suspend;
use vaultcards::lifecycle::unsuspend;
use vaultcards::queue::DEFAULT_WINDOW_MS;
use vaultcards::queue::order_with;
use vaultcards::review::grade;
use vaultcards::scope::Scope;
use vaultcards::scope::StudyMode;
use vaultcards::scope::eligible;
use vaultcards::types::card::CardId;
use vaultcards::types::card::CardKind;
use vaultcards::types::card::CardRecord;
use vaultcards::types::settings::SchedulerSettings;
use vaultcards::types::state::CardState;
use vaultcards::types::state::Stage;
use vaultcards::types::timestamp::Timestamp;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn t0() -> Timestamp {
    Timestamp::from_millis(1_700_000_000_000)
}

/// An image occlusion note: one non-schedulable wrapper and ten masked
/// regions, plus some standalone basic cards from other notes.
fn build_deck() -> Vec<(CardRecord, CardState)> {
    let mut deck = Vec::new();

    let parent_id = CardId::new("occlusion-1");
    let mut wrapper = CardRecord::new(
        parent_id.clone(),
        CardKind::OcclusionParent,
        "anatomy/skull.md",
    );
    wrapper.groups = vec!["Medicine/Anatomy".to_string()];
    deck.push((wrapper, CardState::fresh(t0())));

    for i in 0..10 {
        let mut record = CardRecord::new(
            CardId::new(format!("occlusion-1-{}", i)),
            CardKind::Occlusion,
            "anatomy/skull.md",
        );
        record.groups = vec!["Medicine/Anatomy".to_string()];
        record.parent = Some(parent_id.clone());
        deck.push((record, CardState::fresh(t0().add_minutes(i))));
    }

    for i in 0..10 {
        let record = CardRecord::new(
            CardId::new(format!("basic-{}", i)),
            CardKind::Basic,
            format!("notes/note-{}.md", i),
        );
        deck.push((record, CardState::fresh(t0().add_minutes(i as i64))));
    }

    deck
}

#[test]
fn test_session_walkthrough() {
    init_logging();
    let settings = SchedulerSettings::default();
    settings.validate().unwrap();
    let deck = build_deck();
    let now = t0().add_minutes(30);

    // Everything is due, nothing is excluded, the wrapper never appears.
    let due = eligible(&deck, &Scope::Vault, &HashSet::new(), now, StudyMode::Due);
    assert_eq!(due.len(), 20);
    assert!(due.iter().all(|(record, _)| record.kind.is_schedulable()));

    // The queue is a permutation that keeps occlusion siblings apart.
    let mut rng = StdRng::seed_from_u64(99);
    let queue = order_with(due.to_vec(), DEFAULT_WINDOW_MS, &mut rng);
    assert_eq!(queue.len(), 20);
    for pair in queue.windows(2) {
        let adjacent_siblings =
            pair[0].0.parent.is_some() && pair[0].0.parent == pair[1].0.parent;
        assert!(!adjacent_siblings);
    }

    // Grade the whole queue and check the states that would be persisted.
    for (record, state) in &queue {
        let result = grade(state, Rating::Good, now, &settings);
        assert_eq!(result.next_state.reps, 1);
        assert_eq!(result.next_state.stage, Stage::Learning);
        assert!(result.next_due > now, "card {} not rescheduled", record.id);
        assert!(result.next_state.is_coherent());
    }
}

#[test]
fn test_card_lifetime() {
    init_logging();
    let settings = SchedulerSettings::default();
    let mut state = CardState::fresh(t0());
    let mut now = t0();

    // Learn the card: good through both learning steps.
    state = grade(&state, Rating::Good, now, &settings).next_state;
    assert_eq!(state.stage, Stage::Learning);
    now = now.add_minutes(10);
    state = grade(&state, Rating::Good, now, &settings).next_state;
    assert_eq!(state.stage, Stage::Review);
    assert!(state.scheduled_days >= 1);

    // Forget it at the review: the card lapses into relearning.
    now = now.add_days(state.scheduled_days as i64);
    let lapse = grade(&state, Rating::Again, now, &settings);
    assert_eq!(lapse.next_state.stage, Stage::Relearning);
    assert_eq!(lapse.next_state.lapses, 1);
    assert!(lapse.retrievability_before.is_some());
    state = lapse.next_state;

    // Recover, then suspend for a year and come back unchanged.
    now = now.add_minutes(10);
    state = grade(&state, Rating::Good, now, &settings).next_state;
    assert_eq!(state.stage, Stage::Review);
    let before_suspension = state.clone();
    state = suspend(&state, now);
    let frozen = grade(&state, Rating::Easy, now.add_days(100), &settings).next_state;
    assert_eq!(frozen, state);
    state = unsuspend(&state, now.add_days(365));
    assert_eq!(state.due, before_suspension.due);
    assert_eq!(state.stage, before_suspension.stage);

    // Bury it out of today, then wipe it entirely.
    let buried = bury(&state, now);
    assert!(buried.due >= now.next_day_start());
    let fresh = reset(&buried, now, &settings);
    assert_eq!(fresh.stage, Stage::New);
    assert_eq!(fresh.reps, 0);
    assert!(fresh.last_reviewed.is_none());
}

#[test]
fn test_practice_mode_and_folder_scope() {
    init_logging();
    let settings = SchedulerSettings::default();
    let deck = build_deck();
    let now = t0().add_minutes(30);

    // Push one basic card into the future by grading it, then ask for
    // practice material: only the not-yet-due card qualifies.
    let mut deck = deck;
    for (record, state) in &mut deck {
        if record.id.as_str() == "basic-0" {
            *state = grade(state, Rating::Easy, now, &settings).next_state;
        }
    }
    let practice = eligible(&deck, &Scope::Vault, &HashSet::new(), now, StudyMode::Practice);
    let ids: Vec<&str> = practice.iter().map(|(r, _)| r.id.as_str()).collect();
    assert_eq!(ids, vec!["basic-0"]);

    // Folder scope narrows to the anatomy note; group scope matches
    // case-insensitively at any depth.
    let folder = eligible(
        &deck,
        &Scope::Folder("anatomy".to_string()),
        &HashSet::new(),
        now,
        StudyMode::Due,
    );
    assert_eq!(folder.len(), 10);
    let group = eligible(
        &deck,
        &Scope::Group("medicine".to_string()),
        &HashSet::new(),
        now,
        StudyMode::Due,
    );
    assert_eq!(group.len(), 10);
}

#[test]
fn test_legacy_record_is_repaired_not_rejected() {
    init_logging();
    let settings = SchedulerSettings::default();
    // A record from storage predating the coherence invariants: new stage
    // with leftover review history.
    let json = r#"{"stage":"new","due":1700000000000,"lastReviewed":1699999999999,"reps":3}"#;
    let state: CardState = serde_json::from_str(json).unwrap();
    assert!(!state.is_coherent());
    let result = grade(&state, Rating::Good, t0(), &settings);
    // The incoherent history is dropped and the card graded as new.
    assert_eq!(result.next_state.reps, 1);
    assert_eq!(result.next_state.stage, Stage::Learning);
    assert!(result.next_state.is_coherent());
    assert!(result.retrievability_before.is_none());
}
