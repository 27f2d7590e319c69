pub mod controller;
pub mod lifecycle;

pub use controller::AppController;
pub use lifecycle::{AttemptOutcome, TranscriptionManager};
