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

//! A spaced repetition scheduling engine for note-vault flashcards.
//!
//! The crate decides when a card should next be shown and in what memory
//! state it should be considered. It performs no I/O and exposes no UI:
//! a host supplies card records, card states, settings and the current
//! time, and persists whatever states come back.

pub mod codec;
pub mod error;
pub mod fsrs;
pub mod lifecycle;
pub mod queue;
pub mod review;
pub mod scope;
pub mod types;
