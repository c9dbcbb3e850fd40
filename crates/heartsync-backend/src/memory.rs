//! In-process backend.
//!
//! [`MemoryBackend`] implements every port against state held in memory, with
//! the same observable contract as the hosted services: server-assigned ids
//! and timestamps, snapshot pushes on every change, and provider-style auth
//! errors. Faults can be injected to exercise the client's failure paths.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, Utc};
use mockable::{Clock, DefaultClock};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use heartsync_shared::constants::MIN_PASSWORD_LENGTH;
use heartsync_shared::{
    ChatMessage, EventDraft, EventId, EventRecord, MessageDraft, MessageId, MomentDraft, MomentId,
    MomentRecord, PairingCode, Room, RoomId, UserId, UserProfile,
};

use crate::error::{AuthError, BackendError, BackendResult};
use crate::ports::{AuthProvider, AuthUser, ImageHost, LocalImage, ProfilePatch, ProfileStore, RoomStore};
use crate::subscription::Subscription;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock_clock();
        *now += by;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

// ---------------------------------------------------------------------------
// Faults
// ---------------------------------------------------------------------------

/// A failure to inject into the next matching call(s).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Any `create_profile`.
    ProfileCreate,
    /// `update_profile` for this user.
    ProfileUpdate(UserId),
    /// Any room write (events, moments, messages, room document).
    RoomWrite,
    Upload,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct Listeners<T> {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<Vec<T>>>,
}

impl<T: Clone> Listeners<T> {
    fn add(&mut self, sender: mpsc::UnboundedSender<Vec<T>>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.senders.insert(id, sender);
        id
    }

    /// Push `snapshot` to every listener, forgetting the ones that hung up.
    fn publish(&mut self, snapshot: &[T]) {
        self.senders
            .retain(|_, sender| sender.send(snapshot.to_vec()).is_ok());
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            senders: HashMap::new(),
        }
    }
}

#[derive(Clone, Copy)]
enum Collection {
    Events,
    Moments,
    Messages,
}

#[derive(Default)]
struct RoomState {
    room: Option<Room>,
    events: Vec<EventRecord>,
    moments: Vec<MomentRecord>,
    messages: Vec<ChatMessage>,
    event_listeners: Listeners<EventRecord>,
    moment_listeners: Listeners<MomentRecord>,
    message_listeners: Listeners<ChatMessage>,
}

impl RoomState {
    fn listener_count(&self) -> usize {
        self.event_listeners.senders.len()
            + self.moment_listeners.senders.len()
            + self.message_listeners.senders.len()
    }

    fn remove_listener(&mut self, collection: Collection, id: u64) {
        match collection {
            Collection::Events => {
                self.event_listeners.senders.remove(&id);
            }
            Collection::Moments => {
                self.moment_listeners.senders.remove(&id);
            }
            Collection::Messages => {
                self.message_listeners.senders.remove(&id);
            }
        }
    }
}

struct Account {
    user_id: UserId,
    password: String,
}

#[derive(Default)]
struct Inner {
    /// Keyed by lower-cased email.
    accounts: HashMap<String, Account>,
    /// Issued session tokens.
    tokens: HashMap<String, (UserId, String)>,
    profiles: HashMap<UserId, UserProfile>,
    rooms: HashMap<RoomId, RoomState>,
    uploads: Vec<PathBuf>,
    faults: HashMap<Fault, FaultPlan>,
}

#[derive(Default)]
struct FaultPlan {
    /// Matching calls to let through first.
    skip: usize,
    /// Matching calls to fail after that.
    fail: usize,
}

impl Inner {
    /// Whether this call matching `fault` should fail.
    fn take_fault(&mut self, fault: &Fault) -> bool {
        let Some(plan) = self.faults.get_mut(fault) else {
            return false;
        };
        if plan.skip > 0 {
            plan.skip -= 1;
            false
        } else if plan.fail > 0 {
            plan.fail -= 1;
            true
        } else {
            false
        }
    }

    fn room_write(&mut self, room: &RoomId) -> BackendResult<&mut RoomState> {
        if self.take_fault(&Fault::RoomWrite) {
            return Err(BackendError::Unavailable(format!("injected write failure on {room}")));
        }
        Ok(self.rooms.entry(room.clone()).or_default())
    }

    fn issue_token(&mut self, user_id: &UserId, email: &str) -> AuthUser {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens
            .insert(token.clone(), (user_id.clone(), email.to_string()));
        AuthUser {
            user_id: user_id.clone(),
            email: email.to_string(),
            token,
        }
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// In-memory implementation of every backend port. Cheap to clone; clones
/// share state.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Use `clock` for server timestamps.
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            clock,
        }
    }

    /// Make the next `times` calls matching `fault` fail.
    pub fn inject(&self, fault: Fault, times: usize) {
        self.inject_after(fault, 0, times);
    }

    /// Let `skip` calls matching `fault` succeed, then fail `times` of them.
    pub fn inject_after(&self, fault: Fault, skip: usize, times: usize) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .faults
                .insert(fault, FaultPlan { skip, fail: times });
        }
    }

    /// Live snapshot listeners on a room, across all its collections.
    pub fn listener_count(&self, room: &RoomId) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.rooms.get(room).map_or(0, RoomState::listener_count))
            .unwrap_or(0)
    }

    /// Files handed to the image host so far.
    pub fn uploads(&self) -> Vec<PathBuf> {
        self.inner
            .lock()
            .map(|inner| inner.uploads.clone())
            .unwrap_or_default()
    }

    /// Read a profile without going through the async port.
    pub fn profile(&self, user_id: &UserId) -> Option<UserProfile> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.profiles.get(user_id).cloned())
    }

    fn lock(&self) -> BackendResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("state lock poisoned: {e}")))
    }

    fn auth_lock(&self) -> Result<MutexGuard<'_, Inner>, AuthError> {
        self.inner
            .lock()
            .map_err(|e| AuthError::Provider(format!("state lock poisoned: {e}")))
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn subscribe<T, F>(&self, room: &RoomId, collection: Collection, select: F) -> BackendResult<Subscription<T>>
    where
        T: Clone + Send + 'static,
        F: Fn(&mut RoomState) -> (&Vec<T>, &mut Listeners<T>),
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut inner = self.lock()?;
            let state = inner.rooms.entry(room.clone()).or_default();
            let (current, listeners) = select(state);
            // The first snapshot is the current contents.
            let initial = current.clone();
            let _ = tx.send(initial);
            listeners.add(tx)
        };

        debug!(room = %room, listener = id, "Snapshot listener added");

        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        let room = room.clone();
        Ok(Subscription::new(rx, move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut inner) = inner.lock() {
                    if let Some(state) = inner.rooms.get_mut(&room) {
                        state.remove_listener(collection, id);
                    }
                }
            }
            debug!(room = %room, listener = id, "Snapshot listener removed");
        }))
    }
}

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = email.trim();
        if !valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }

        let mut inner = self.auth_lock()?;
        let key = email.to_lowercase();
        if inner.accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let user_id = UserId(Uuid::new_v4().simple().to_string());
        inner.accounts.insert(
            key,
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
            },
        );
        Ok(inner.issue_token(&user_id, email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = email.trim();
        if !valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let mut inner = self.auth_lock()?;
        let user_id = match inner.accounts.get(&email.to_lowercase()) {
            None => return Err(AuthError::UserNotFound),
            Some(account) if account.password != password => return Err(AuthError::WrongPassword),
            Some(account) => account.user_id.clone(),
        };
        Ok(inner.issue_token(&user_id, email))
    }

    async fn refresh(&self, token: &str) -> Result<AuthUser, AuthError> {
        let inner = self.auth_lock()?;
        let (user_id, email) = inner.tokens.get(token).ok_or(AuthError::SessionExpired)?;
        Ok(AuthUser {
            user_id: user_id.clone(),
            email: email.clone(),
            token: token.to_string(),
        })
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        self.auth_lock()?.tokens.remove(token);
        Ok(())
    }

    async fn delete_account(&self, token: &str) -> Result<(), AuthError> {
        let mut inner = self.auth_lock()?;
        let (user_id, _) = inner.tokens.get(token).cloned().ok_or(AuthError::SessionExpired)?;
        inner.accounts.retain(|_, account| account.user_id != user_id);
        inner.tokens.retain(|_, (owner, _)| *owner != user_id);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryBackend {
    async fn create_profile(&self, profile: &UserProfile) -> BackendResult<()> {
        let mut inner = self.lock()?;
        if inner.take_fault(&Fault::ProfileCreate) {
            return Err(BackendError::Unavailable(format!(
                "injected create failure for {}",
                profile.user_id
            )));
        }
        if inner.profiles.contains_key(&profile.user_id) {
            return Err(BackendError::Rejected(format!(
                "profile {} already exists",
                profile.user_id
            )));
        }
        inner.profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn get_profile(&self, user_id: &UserId) -> BackendResult<Option<UserProfile>> {
        Ok(self.lock()?.profiles.get(user_id).cloned())
    }

    async fn find_by_pairing_code(&self, code: &PairingCode) -> BackendResult<Option<UserProfile>> {
        Ok(self
            .lock()?
            .profiles
            .values()
            .find(|p| &p.pairing_code == code)
            .cloned())
    }

    async fn update_profile(&self, user_id: &UserId, patch: &ProfilePatch) -> BackendResult<()> {
        let mut inner = self.lock()?;
        if inner.take_fault(&Fault::ProfileUpdate(user_id.clone())) {
            return Err(BackendError::Unavailable(format!(
                "injected update failure for {user_id}"
            )));
        }
        let profile = inner
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| BackendError::NotFound(format!("users/{user_id}")))?;
        patch.apply(profile);
        Ok(())
    }
}

#[async_trait]
impl RoomStore for MemoryBackend {
    async fn ensure_room(&self, room: &RoomId) -> BackendResult<Room> {
        let now = self.now();
        let mut inner = self.lock()?;
        let state = inner.room_write(room)?;
        let doc = state.room.get_or_insert_with(|| Room {
            room_id: room.clone(),
            created_at: now,
        });
        Ok(doc.clone())
    }

    async fn add_event(&self, room: &RoomId, draft: &EventDraft) -> BackendResult<EventId> {
        let now = self.now();
        let mut inner = self.lock()?;
        let state = inner.room_write(room)?;

        let id = EventId(Uuid::new_v4().simple().to_string());
        state.events.push(EventRecord {
            id: id.clone(),
            title: draft.title.clone(),
            date: draft.date,
            is_recurring: draft.is_recurring,
            color: Some(draft.color.clone()),
            created_at: now,
        });
        state.event_listeners.publish(&state.events);
        Ok(id)
    }

    async fn update_event(&self, room: &RoomId, id: &EventId, draft: &EventDraft) -> BackendResult<()> {
        let mut inner = self.lock()?;
        let state = inner.room_write(room)?;

        let event = state
            .events
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("rooms/{room}/events/{id}")))?;
        event.title = draft.title.clone();
        event.date = draft.date;
        event.is_recurring = draft.is_recurring;
        event.color = Some(draft.color.clone());

        state.event_listeners.publish(&state.events);
        Ok(())
    }

    async fn delete_event(&self, room: &RoomId, id: &EventId) -> BackendResult<()> {
        let mut inner = self.lock()?;
        let state = inner.room_write(room)?;

        let before = state.events.len();
        state.events.retain(|e| &e.id != id);
        if state.events.len() == before {
            return Err(BackendError::NotFound(format!("rooms/{room}/events/{id}")));
        }
        state.event_listeners.publish(&state.events);
        Ok(())
    }

    async fn add_moment(&self, room: &RoomId, draft: &MomentDraft) -> BackendResult<MomentId> {
        let now = self.now();
        let mut inner = self.lock()?;
        let state = inner.room_write(room)?;

        let id = MomentId(Uuid::new_v4().simple().to_string());
        state.moments.push(MomentRecord {
            id: id.clone(),
            date: draft.date,
            title: draft.title.clone(),
            description: draft.description.clone(),
            image_url: draft.image_url.clone(),
            created_at: now,
        });
        state.moment_listeners.publish(&state.moments);
        Ok(id)
    }

    async fn send_message(&self, room: &RoomId, draft: &MessageDraft) -> BackendResult<MessageId> {
        let now = self.now();
        let mut inner = self.lock()?;
        let state = inner.room_write(room)?;

        let id = MessageId(Uuid::new_v4().simple().to_string());
        state.messages.push(ChatMessage {
            id: id.clone(),
            sender_id: draft.sender_id.clone(),
            sender_name: draft.sender_name.clone(),
            text: draft.text.clone(),
            created_at: now,
        });
        // Stable, so equal timestamps keep arrival order.
        state.messages.sort_by_key(|m| m.created_at);
        state.message_listeners.publish(&state.messages);
        Ok(id)
    }

    fn subscribe_events(&self, room: &RoomId) -> BackendResult<Subscription<EventRecord>> {
        self.subscribe(room, Collection::Events, |s| (&s.events, &mut s.event_listeners))
    }

    fn subscribe_moments(&self, room: &RoomId) -> BackendResult<Subscription<MomentRecord>> {
        self.subscribe(room, Collection::Moments, |s| (&s.moments, &mut s.moment_listeners))
    }

    fn subscribe_messages(&self, room: &RoomId) -> BackendResult<Subscription<ChatMessage>> {
        self.subscribe(room, Collection::Messages, |s| (&s.messages, &mut s.message_listeners))
    }
}

#[async_trait]
impl ImageHost for MemoryBackend {
    async fn upload(&self, image: &LocalImage) -> BackendResult<String> {
        if self.lock()?.take_fault(&Fault::Upload) {
            return Err(BackendError::Upload("injected upload failure".to_string()));
        }

        // The file has to exist, as it would for a real upload.
        tokio::fs::metadata(image.path()).await?;

        let url = format!(
            "memory://images/{}/{}",
            Uuid::new_v4().simple(),
            image.file_name()
        );
        self.lock()?.uploads.push(image.path.clone());
        Ok(url)
    }
}
