//! Domain model: records, session slots, and the pure rules around them.

pub mod entities;
pub mod phrase;
pub mod progress;
pub mod schedule;
pub mod session;

pub use entities::*;
pub use phrase::{normalize_phrase, sanitize_phrase, validate_phrase, PhraseValidation};
pub use progress::{StoryStage, StoryStatus};
pub use schedule::{format_time_remaining, SessionSchedule, SessionStatus, VotingSession};
pub use session::{Category, SessionKey, SessionSlot};
