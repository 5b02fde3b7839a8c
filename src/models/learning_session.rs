//! One study session: the due queue, what is on screen, and review submission.
//!
//! All transitions are plain method calls driven by UI events. The only I/O
//! is the review request between `begin_review` and `finish_review`, so the
//! state machine can be exercised without a network.

use super::{Card, CardId, DueQueue, Presentation, Quality};
use crate::api::{ApiError, StudyApi, Transport};
use crate::math::MathFormatter;
use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{error, info, warn};

pub const REVIEW_FAILED: &str = "Failed to submit review";
pub const NETWORK_ERROR: &str = "Network error";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Active,
    Complete,
    SignedOut,
}

/// A review waiting for the server's answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReviewRequest {
    pub card_id: CardId,
    pub quality: Quality,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Card removed; the next one is on screen.
    Advanced,
    /// Card removed and nothing is left.
    Completed,
    /// Server refused the review. Carries the message shown to the learner.
    Rejected(String),
    /// Outcome unknown (network or malformed reply).
    Failed,
    SignedOut,
    /// Reply for a card that is no longer active.
    Ignored,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewError {
    #[error("No card to review")]
    NoActiveCard,
    #[error("Review of card {0} is still in flight")]
    InFlight(CardId),
}

pub struct LearningSession {
    phase: Phase,
    queue: DueQueue,
    presentation: Presentation,
    formatter: Box<dyn MathFormatter + Send>,
    in_flight: Option<CardId>,
    notice: Option<String>,
    reviewed: usize,
    started_at: DateTime<Local>,
}

impl LearningSession {
    pub fn new(formatter: Box<dyn MathFormatter + Send>) -> Self {
        Self {
            phase: Phase::Loading,
            queue: DueQueue::empty(),
            presentation: Presentation::default(),
            formatter,
            in_flight: None,
            notice: None,
            reviewed: 0,
            started_at: Local::now(),
        }
    }

    /// Installs the result of the due-cards fetch.
    /// A failed fetch ends the session with nothing to review.
    pub fn load(&mut self, fetched: Result<Vec<Card>, ApiError>) {
        if self.phase == Phase::SignedOut {
            warn!("ignoring due cards for a signed-out session");
            return;
        }

        self.in_flight = None;
        self.notice = None;
        let queue = match fetched {
            Ok(cards) => DueQueue::load(cards),
            Err(ApiError::Unauthorized) => {
                self.sign_out();
                return;
            }
            Err(e) => {
                error!(error = %e, "failed to load due cards");
                DueQueue::empty()
            }
        };
        self.queue = queue;

        info!(due = self.queue.len(), "study session loaded");
        self.show_current();
    }

    /// Authentication failed: no further queue operations.
    pub fn sign_out(&mut self) {
        info!("session signed out");
        self.phase = Phase::SignedOut;
        self.in_flight = None;
        self.presentation.clear();
    }

    pub fn show_answer(&mut self) {
        if self.phase != Phase::Active {
            return;
        }
        if let Some(card) = self.queue.current() {
            self.presentation.show_answer(card, self.formatter.as_ref());
        }
    }

    /// Starts submitting a rating for the active card.
    /// Only one review may be in flight; a second one is refused.
    pub fn begin_review(&mut self, quality: Quality) -> Result<ReviewRequest, ReviewError> {
        if let Some(card_id) = self.in_flight {
            return Err(ReviewError::InFlight(card_id));
        }
        if self.phase != Phase::Active {
            return Err(ReviewError::NoActiveCard);
        }
        let card_id = self.queue.current_id().ok_or(ReviewError::NoActiveCard)?;

        self.in_flight = Some(card_id);
        Ok(ReviewRequest { card_id, quality })
    }

    /// Applies the server's reply. Any failure leaves queue, cursor and
    /// presentation exactly as they were so the learner can rate again.
    pub fn finish_review(
        &mut self,
        request: ReviewRequest,
        result: Result<(), ApiError>,
    ) -> ReviewOutcome {
        if self.in_flight != Some(request.card_id) {
            warn!(card = %request.card_id, "reply for a review that is not in flight");
            return ReviewOutcome::Ignored;
        }
        self.in_flight = None;

        if let Err(e) = result {
            return self.review_failed(request, e);
        }

        if self.phase != Phase::Active || self.queue.current_id() != Some(request.card_id) {
            warn!(card = %request.card_id, "reviewed card is no longer active");
            return ReviewOutcome::Ignored;
        }

        self.queue.remove_current_and_advance();
        self.reviewed += 1;
        self.notice = None;
        info!(
            card = %request.card_id,
            quality = request.quality.value(),
            remaining = self.queue.len(),
            "review recorded"
        );

        self.show_current();
        if self.phase == Phase::Complete {
            ReviewOutcome::Completed
        } else {
            ReviewOutcome::Advanced
        }
    }

    /// Rates the active card and waits for the server.
    pub fn submit<T: Transport>(
        &mut self,
        api: &StudyApi<T>,
        quality: Quality,
    ) -> Result<ReviewOutcome, ReviewError> {
        let request = self.begin_review(quality)?;
        let result = api.submit_review(request.card_id, request.quality);
        Ok(self.finish_review(request, result))
    }

    fn review_failed(&mut self, request: ReviewRequest, e: ApiError) -> ReviewOutcome {
        match e {
            ApiError::Unauthorized => {
                self.sign_out();
                ReviewOutcome::SignedOut
            }
            ApiError::Rejected { message, .. } => {
                let message = message.unwrap_or_else(|| REVIEW_FAILED.to_string());
                warn!(card = %request.card_id, %message, "review rejected");
                self.notice = Some(message.clone());
                ReviewOutcome::Rejected(message)
            }
            e => {
                error!(card = %request.card_id, error = %e, "review outcome unknown");
                self.notice = Some(NETWORK_ERROR.to_string());
                ReviewOutcome::Failed
            }
        }
    }

    fn show_current(&mut self) {
        match (self.queue.current(), self.queue.progress()) {
            (Some(card), Some(progress)) => {
                self.phase = Phase::Active;
                self.presentation
                    .card_changed(card, progress, self.formatter.as_ref());
            }
            _ => {
                info!(reviewed = self.reviewed, "no more due cards");
                self.phase = Phase::Complete;
                self.presentation.clear();
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queue(&self) -> &DueQueue {
        &self.queue
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn current_card(&self) -> Option<&Card> {
        match self.phase {
            Phase::Active => self.queue.current(),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn reviewed_count(&self) -> usize {
        self.reviewed
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }
}
