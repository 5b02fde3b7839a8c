pub mod card;
pub mod due_queue;
pub mod learning_session;
pub mod presentation;
pub mod quality;

pub use card::{Card, CardId};
pub use due_queue::{DueQueue, Progress};
pub use learning_session::{LearningSession, Phase, ReviewError, ReviewOutcome, ReviewRequest};
pub use presentation::{CardView, Face, Presentation};
pub use quality::{InvalidQuality, Quality};
