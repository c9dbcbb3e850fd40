//! Fixtures shared by the unit tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use heartsync_backend::memory::{ManualClock, MemoryBackend};
use heartsync_backend::Backend;

use crate::commands::auth::{sign_up, SignUpForm};
use crate::commands::pairing::connect_partner;
use crate::config::ClientConfig;
use crate::session::Session;
use crate::state::AppState;

pub(crate) struct Couple {
    pub memory: MemoryBackend,
    pub clock: Arc<ManualClock>,
    pub alice: Session,
    pub bob: Session,
}

pub(crate) async fn signed_up(state: &AppState, email: &str, name: &str) -> Session {
    let form = SignUpForm {
        email: email.to_string(),
        password: "secret1".to_string(),
        display_name: name.to_string(),
        ..SignUpForm::default()
    };
    sign_up(state, form).await.unwrap()
}

/// Alice and Bob, paired, sharing one in-memory backend and a manual clock.
pub(crate) async fn couple(now: DateTime<Utc>) -> Couple {
    let clock = Arc::new(ManualClock::new(now));
    let memory = MemoryBackend::with_clock(clock.clone());
    let state = AppState::new(Backend::from_memory(memory.clone()), ClientConfig::default())
        .with_clock(clock.clone());

    let mut alice = signed_up(&state, "alice@example.com", "Alice").await;
    let mut bob = signed_up(&state, "bob@example.com", "Bob").await;
    let code = bob.profile().pairing_code.to_string();
    connect_partner(&mut alice, &code).await.unwrap();
    bob.refresh_profile().await.unwrap();

    Couple {
        memory,
        clock,
        alice,
        bob,
    }
}
