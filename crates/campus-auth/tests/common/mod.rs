//! In-memory identity provider and profile store for manager tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use campus_auth::{
    AuthError, AuthEvent, IdentityProvider, ProfileStore, SignUpOutcome, SignUpRequest,
};
use campus_core::{Profile, ProfileUpdate, Role, Session, User};
use chrono::{TimeDelta, Utc};
use tokio::sync::{Semaphore, broadcast};

#[derive(Default)]
struct Inner {
    stored: Option<Session>,
    passwords: HashMap<String, (String, User)>,
    profiles: HashMap<String, Profile>,
    fail_profile_fetch: bool,
    fail_sign_out: bool,
    auto_confirm: bool,
}

pub struct FakeBackend {
    events: broadcast::Sender<AuthEvent>,
    inner: Mutex<Inner>,
    profile_gate: Mutex<Option<std::sync::Arc<Semaphore>>>,
    pub network_calls: AtomicUsize,
    pub sign_up_calls: AtomicUsize,
    pub profile_fetches_done: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            events,
            inner: Mutex::new(Inner::default()),
            profile_gate: Mutex::new(None),
            network_calls: AtomicUsize::new(0),
            sign_up_calls: AtomicUsize::new(0),
            profile_fetches_done: AtomicUsize::new(0),
        }
    }

    /// Register an account with a matching profile row.
    pub fn with_account(self, email: &str, password: &str, username: &str) -> Self {
        let user = User {
            id: format!("user-{username}"),
            email: Some(email.to_string()),
        };
        let profile = Profile {
            id: user.id.clone(),
            full_name: format!("{username} full name"),
            username: username.to_string(),
            email: email.to_string(),
            role: Role::Student,
            faculty: Some("Engineering".into()),
            programme: None,
        };
        {
            let mut inner = self.inner.lock().unwrap();
            inner.profiles.insert(user.id.clone(), profile);
            inner
                .passwords
                .insert(email.to_string(), (password.to_string(), user));
        }
        self
    }

    /// Register an account whose profile row is missing.
    pub fn with_account_without_profile(self, email: &str, password: &str) -> Self {
        let user = User {
            id: "user-orphan".into(),
            email: Some(email.to_string()),
        };
        self.inner
            .lock()
            .unwrap()
            .passwords
            .insert(email.to_string(), (password.to_string(), user));
        self
    }

    /// Pretend a previous run left a session behind.
    pub fn with_stored_session(self, email: &str) -> Self {
        let session = {
            let inner = self.inner.lock().unwrap();
            let (_, user) = inner.passwords.get(email).expect("known account");
            session_for(user.clone())
        };
        self.inner.lock().unwrap().stored = Some(session);
        self
    }

    pub fn fail_profile_fetch(&self, fail: bool) {
        self.inner.lock().unwrap().fail_profile_fetch = fail;
    }

    /// Sign-ups return a session right away instead of awaiting email
    /// confirmation.
    pub fn auto_confirm_sign_ups(&self, enabled: bool) {
        self.inner.lock().unwrap().auto_confirm = enabled;
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.inner.lock().unwrap().fail_sign_out = fail;
    }

    /// Block profile fetches until [`Self::release_profile_fetches`].
    pub fn hold_profile_fetches(&self) {
        *self.profile_gate.lock().unwrap() = Some(std::sync::Arc::new(Semaphore::new(0)));
    }

    pub fn release_profile_fetches(&self) {
        if let Some(gate) = self.profile_gate.lock().unwrap().take() {
            gate.add_permits(64);
        }
    }

    /// Change a profile row behind the manager's back.
    pub fn edit_profile(&self, user_id: &str, edit: impl FnOnce(&mut Profile)) {
        let mut inner = self.inner.lock().unwrap();
        edit(inner.profiles.get_mut(user_id).expect("known profile"));
    }

    /// Deliver a notification as if another client changed the session.
    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    pub fn session_for_email(&self, email: &str) -> Session {
        let inner = self.inner.lock().unwrap();
        let (_, user) = inner.passwords.get(email).expect("known account");
        session_for(user.clone())
    }

    pub fn network_calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn session_for(user: User) -> Session {
    Session {
        access_token: format!("access-{}", user.id),
        refresh_token: format!("refresh-{}", user.id),
        token_type: "bearer".into(),
        expires_at: Utc::now() + TimeDelta::hours(1),
        user,
    }
}

#[async_trait]
impl IdentityProvider for FakeBackend {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.inner.lock().unwrap().stored.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        self.count();
        let session = {
            let mut inner = self.inner.lock().unwrap();
            let user = match inner.passwords.get(email) {
                Some((expected, user)) if expected == password => user.clone(),
                _ => {
                    return Err(AuthError::Api {
                        status: 400,
                        message: "Invalid login credentials".into(),
                    });
                }
            };
            let session = session_for(user);
            inner.stored = Some(session.clone());
            session
        };
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError> {
        self.count();
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        let user = User {
            id: format!("user-{}", request.metadata.username),
            email: Some(request.email.clone()),
        };
        let session = {
            let mut inner = self.inner.lock().unwrap();
            inner.profiles.insert(
                user.id.clone(),
                Profile {
                    id: user.id.clone(),
                    full_name: request.metadata.full_name.clone(),
                    username: request.metadata.username.clone(),
                    email: request.email.clone(),
                    role: request.metadata.role,
                    faculty: None,
                    programme: None,
                },
            );
            inner.passwords.insert(
                request.email.clone(),
                (request.password.clone(), user.clone()),
            );
            if inner.auto_confirm {
                let session = session_for(user.clone());
                inner.stored = Some(session.clone());
                Some(session)
            } else {
                None
            }
        };
        if let Some(session) = &session {
            self.emit(AuthEvent::SignedIn(session.clone()));
        }
        Ok(SignUpOutcome { user, session })
    }

    async fn sign_out(&self, _session: Option<&Session>) -> Result<(), AuthError> {
        self.count();
        let fail = {
            let mut inner = self.inner.lock().unwrap();
            inner.stored = None;
            inner.fail_sign_out
        };
        self.emit(AuthEvent::SignedOut);
        if fail {
            return Err(AuthError::Api {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl ProfileStore for FakeBackend {
    async fn fetch_profile(&self, session: &Session) -> Result<Profile, AuthError> {
        self.count();
        let gate = self.profile_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate open").forget();
        }
        let result = {
            let inner = self.inner.lock().unwrap();
            if inner.fail_profile_fetch {
                Err(AuthError::Api {
                    status: 500,
                    message: "relation \"profiles\" is unavailable".into(),
                })
            } else {
                inner
                    .profiles
                    .get(session.user_id())
                    .cloned()
                    .ok_or_else(|| AuthError::ProfileNotFound(session.user_id().to_string()))
            }
        };
        self.profile_fetches_done.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        self.count();
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.values().any(|p| p.username == username))
    }

    async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<Profile, AuthError> {
        self.count();
        let mut inner = self.inner.lock().unwrap();
        let profile = inner
            .profiles
            .get_mut(session.user_id())
            .ok_or_else(|| AuthError::ProfileNotFound(session.user_id().to_string()))?;
        if let Some(full_name) = &update.full_name {
            profile.full_name = full_name.trim().to_string();
        }
        if let Some(username) = &update.username {
            // Stored lowercase, so the returned row differs from the request
            profile.username = username.to_lowercase();
        }
        if let Some(faculty) = &update.faculty {
            profile.faculty = Some(faculty.clone());
        }
        if let Some(programme) = &update.programme {
            profile.programme = Some(programme.clone());
        }
        Ok(profile.clone())
    }
}
