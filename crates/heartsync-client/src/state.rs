//! Application state shared by every command.
//!
//! [`AppState`] is cheap to clone: the backend services, the clock and the
//! local database are all behind `Arc`s. The database mutex is never held
//! across an `.await`.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use heartsync_backend::{AuthUser, Backend};
use heartsync_shared::LeapDayPolicy;
use heartsync_store::{Database, PersistedSession, Preferences, StoreError};

use crate::config::ClientConfig;

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub config: ClientConfig,
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Local database. `None` runs without persistence.
    pub database: Option<Arc<Mutex<Database>>>,
}

impl AppState {
    /// State with the system clock and no local database.
    pub fn new(backend: Backend, config: ClientConfig) -> Self {
        Self {
            backend,
            config,
            clock: Arc::new(DefaultClock),
            database: None,
        }
    }

    /// Open the local database from `config`. A database that cannot be
    /// opened is logged and the client runs without persistence.
    pub fn open(backend: Backend, config: ClientConfig) -> Self {
        let database = match Database::new(config.data_dir.as_deref()) {
            Ok(db) => Some(db),
            Err(e) => {
                warn!(error = %e, "Local database unavailable, sessions will not persist");
                None
            }
        };
        let state = Self::new(backend, config);
        match database {
            Some(db) => state.with_database(db),
            None => state,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(Arc::new(Mutex::new(database)));
        self
    }

    /// Run `f` against the local database, if there is one.
    pub fn with_db<T>(
        &self,
        f: impl FnOnce(&Database) -> heartsync_store::Result<T>,
    ) -> Option<heartsync_store::Result<T>> {
        let db = self.database.as_ref()?;
        match db.lock() {
            Ok(guard) => Some(f(&guard)),
            Err(_) => Some(Err(StoreError::LockPoisoned)),
        }
    }

    /// Remember `user` for the next start. Best effort.
    pub fn persist_session(&self, user: &AuthUser) {
        let session = PersistedSession {
            user_id: user.user_id.clone(),
            email: user.email.clone(),
            token: user.token.clone(),
            signed_in_at: self.clock.utc(),
        };
        if let Some(Err(e)) = self.with_db(|db| db.save_session(&session)) {
            warn!(error = %e, user_id = %user.user_id, "Failed to persist session");
        }
    }

    /// Forget the stored session. Best effort.
    pub fn forget_session(&self) {
        if let Some(Err(e)) = self.with_db(Database::clear_session) {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }

    /// Device preferences, or the defaults when unavailable.
    pub fn preferences(&self) -> Preferences {
        match self.with_db(Database::load_preferences) {
            Some(Ok(prefs)) => prefs,
            Some(Err(e)) => {
                warn!(error = %e, "Failed to load preferences, using defaults");
                Preferences::default()
            }
            None => Preferences::default(),
        }
    }

    /// The device preference if set, otherwise the configured policy.
    pub fn leap_day_policy(&self) -> LeapDayPolicy {
        self.preferences()
            .leap_day_policy
            .unwrap_or(self.config.leap_day)
    }

    pub fn now(&self) -> chrono::DateTime<Utc> {
        self.clock.utc()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("persistent", &self.database.is_some())
            .finish_non_exhaustive()
    }
}
