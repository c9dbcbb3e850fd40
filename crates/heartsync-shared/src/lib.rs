//! # heartsync-shared
//!
//! Domain types and the deterministic core of the HeartSync client: room-id
//! derivation, annual recurrence, countdown projection and event ordering.
//! Everything here is a pure function of its inputs; callers inject "now".

pub mod calendar;
pub mod constants;
pub mod countdown;
pub mod error;
pub mod ordering;
pub mod pairing;
pub mod recurrence;
pub mod room;
pub mod types;
pub mod validation;

pub use countdown::{Countdown, CountdownState};
pub use error::{PairingCodeError, ValidationError};
pub use ordering::{order_events, order_events_with, schedule_events, EventSchedule};
pub use pairing::PairingCode;
pub use recurrence::{next_occurrence, next_occurrence_with, LeapDayPolicy};
pub use room::derive_room_id;
pub use types::*;
