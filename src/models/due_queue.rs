//! Ordered queue of cards due for review plus the cursor into it.
//!
//! The queue is fetched once per session and afterwards only shrinks as cards
//! are reviewed. It is never resynchronized with the server mid-session, so it
//! may drift from server truth until the next session starts.

use super::{Card, CardId};
use std::collections::HashSet;
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DueQueue {
    cards: Vec<Card>,
    cursor: usize,
}

/// 1-based position of the active card, for "Card 2 of 5" style display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card {} of {}", self.position, self.total)
    }
}

impl DueQueue {
    /// Terminal queue with nothing to review.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replaces the queue and resets the cursor to the first card.
    /// Later duplicates of an id are dropped so every id appears once.
    pub fn load(cards: Vec<Card>) -> Self {
        let mut seen = HashSet::with_capacity(cards.len());
        let cards = cards
            .into_iter()
            .filter(|card| {
                let fresh = seen.insert(card.id);
                if !fresh {
                    warn!(card = %card.id, "dropping duplicate due card");
                }
                fresh
            })
            .collect();

        Self { cards, cursor: 0 }
    }

    pub fn current(&self) -> Option<&Card> {
        self.cards.get(self.cursor)
    }

    pub fn current_id(&self) -> Option<CardId> {
        self.current().map(|card| card.id)
    }

    /// Cursor into the queue; meaningless once the queue is complete.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Same as [`DueQueue::is_complete`]; provided alongside `len`.
    pub fn is_empty(&self) -> bool {
        self.is_complete()
    }

    /// Terminal state: every due card has been reviewed or none were due.
    pub fn is_complete(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn progress(&self) -> Option<Progress> {
        self.current().map(|_| Progress {
            position: self.cursor + 1,
            total: self.cards.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Removes the active card, keeping the relative order of the rest.
    ///
    /// The cursor keeps its index (now pointing at the card that followed)
    /// unless the removed card was last, in which case it is clamped to the new
    /// last card. The clamp happens before the emptiness check, so removing the
    /// only card leaves the queue complete rather than at an invalid index.
    pub fn remove_current_and_advance(&mut self) -> Option<Card> {
        if self.cursor >= self.cards.len() {
            return None;
        }

        let removed = self.cards.remove(self.cursor);

        if self.cursor >= self.cards.len() {
            self.cursor = self.cards.len().saturating_sub(1);
        }

        Some(removed)
    }
}
