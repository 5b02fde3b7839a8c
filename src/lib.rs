pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod math;
pub mod models;

pub use api::{HttpTransport, StudyApi};
pub use models::{Card, CardId, DueQueue, LearningSession, Presentation, Quality};
