//! Value objects exchanged between the engine and its collaborators

pub mod notification;
pub mod outcome;
pub mod snapshot;

pub use notification::{Notification, NotificationKind};
pub use outcome::{SendOutcome, SubmitOutcome, VerifyResponse};
pub use snapshot::ChallengeSnapshot;
