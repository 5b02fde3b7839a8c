//! Which side of the active card is visible, and the text published for it.

use super::{Card, CardId, Progress};
use crate::math::MathFormatter;
use tracing::warn;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Face {
    #[default]
    Hidden,
    Revealed,
}

/// Display fields for the active card. `answer` stays `None` until revealed.
#[derive(Clone, Debug, PartialEq)]
pub struct CardView {
    pub card_id: CardId,
    pub progress: Progress,
    pub question: String,
    pub answer: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Presentation {
    face: Face,
    view: Option<CardView>,
}

impl Presentation {
    pub fn face(&self) -> Face {
        self.face
    }

    pub fn view(&self) -> Option<&CardView> {
        self.view.as_ref()
    }

    /// Publishes a new active card with its answer hidden.
    pub fn card_changed(&mut self, card: &Card, progress: Progress, formatter: &dyn MathFormatter) {
        self.face = Face::Hidden;
        self.view = Some(CardView {
            card_id: card.id,
            progress,
            question: typeset(formatter, card.id, "question", &card.question),
            answer: None,
        });
    }

    /// Reveals the answer of the published card. Already revealed is a no-op.
    pub fn show_answer(&mut self, card: &Card, formatter: &dyn MathFormatter) {
        if self.face == Face::Revealed {
            return;
        }

        let Some(view) = self.view.as_mut().filter(|view| view.card_id == card.id) else {
            warn!(card = %card.id, "show answer for a card that is not displayed");
            return;
        };

        view.answer = Some(typeset(formatter, card.id, "answer", &card.answer));
        self.face = Face::Revealed;
    }

    /// Nothing left to show.
    pub fn clear(&mut self) {
        self.face = Face::Hidden;
        self.view = None;
    }
}

fn typeset(formatter: &dyn MathFormatter, card: CardId, field: &str, text: &str) -> String {
    formatter.format(text).unwrap_or_else(|err| {
        warn!(card = %card, field, error = %err, "math formatting failed, showing raw text");
        text.to_string()
    })
}
