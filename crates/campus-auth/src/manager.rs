//! Process-wide session/profile state.
//!
//! [`SessionManager`] owns the current session, user, and profile. Those
//! fields change only in response to [`AuthEvent`]s from the identity
//! provider, with two exceptions: `sign_out` clears them immediately, and
//! `update_profile` installs the row the store returned.
//!
//! Every session change bumps an epoch. A profile load commits only if the
//! epoch it started under is still current, so a slow fetch cannot
//! repopulate state after a sign-out or a newer sign-in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use campus_core::{AuthPhase, AuthState, Profile, ProfileLoadFailed, ProfileUpdate, Session};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::error::AuthError;
use crate::events::AuthEvent;
use crate::form::SignUpForm;
use crate::provider::{IdentityProvider, ProfileStore, SignUpOutcome};

pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    state: watch::Sender<AuthState>,
    epoch: AtomicU64,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Subscribe to session changes, restore any stored session, and start
    /// following notifications.
    ///
    /// Returns once the restore attempt (and its profile load) has finished;
    /// `is_loading` is false from then on. A failed restore is logged and
    /// leaves the manager anonymous.
    pub async fn start(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Arc<Self> {
        let events = identity.subscribe();
        let (state, _) = watch::channel(AuthState::loading());
        let manager = Arc::new(Self {
            identity,
            profiles,
            state,
            epoch: AtomicU64::new(0),
            pump: Mutex::new(None),
        });

        match manager.identity.get_session().await {
            Ok(Some(session)) => {
                tracing::info!(user_id = %session.user_id(), "restored session");
                manager.apply_session(session).await;
            }
            Ok(None) => tracing::debug!("no stored session"),
            Err(error) => tracing::warn!(%error, "session restore failed; starting anonymous"),
        }
        manager.state.send_modify(|state| state.is_loading = false);

        let handle = tokio::spawn(run_pump(Arc::downgrade(&manager), events));
        if let Ok(mut pump) = manager.pump.lock() {
            *pump = Some(handle);
        }
        manager
    }

    /// Stop following session-change notifications.
    pub fn shutdown(&self) {
        if let Ok(mut pump) = self.pump.lock()
            && let Some(handle) = pump.take()
        {
            handle.abort();
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Wait until `predicate` holds for the current state and return it.
    pub async fn wait_for(&self, predicate: impl FnMut(&AuthState) -> bool) -> AuthState {
        let mut rx = self.state.subscribe();
        let seen = rx
            .wait_for(predicate)
            .await
            .map(|state| AuthState::clone(&state));
        seen.unwrap_or_else(|_| self.state())
    }

    /// Wait until no sign-in or profile load is in flight.
    pub async fn settled(&self) -> AuthState {
        self.wait_for(AuthState::is_settled).await
    }

    /// Wait until the session for `user_id` has been applied and settled.
    ///
    /// Use after a successful [`Self::sign_in`] or a sign-up that returned a
    /// session: the state only follows once the notification is handled, and
    /// an earlier session may still look settled until then.
    pub async fn settled_as(&self, user_id: &str) -> AuthState {
        self.wait_for(|state| {
            state.is_settled()
                && state
                    .session
                    .as_ref()
                    .is_some_and(|session| session.user_id() == user_id)
        })
        .await
    }

    /// Password sign-in.
    ///
    /// Only reports whether the request succeeded. User, session, and profile
    /// follow from the resulting [`AuthEvent::SignedIn`], so they may not be
    /// populated yet when this returns.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`AuthError`] for rejected credentials or
    /// transport failures.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.state.send_if_modified(|state| {
            if state.phase == AuthPhase::Anonymous {
                set_phase(state, AuthPhase::Authenticating);
                true
            } else {
                false
            }
        });

        let result = self.identity.sign_in_with_password(email, password).await;
        if let Err(error) = &result {
            tracing::info!(%error, "sign-in rejected");
            self.state.send_if_modified(|state| {
                if state.phase == AuthPhase::Authenticating {
                    set_phase(state, AuthPhase::Anonymous);
                    true
                } else {
                    false
                }
            });
        }
        result
    }

    /// Register a new account.
    ///
    /// The form is validated and the username pre-checked before the
    /// registration call. The pre-check is advisory; a conflict reported by
    /// the store during registration maps to the same error.
    ///
    /// # Errors
    ///
    /// [`AuthError::PasswordMismatch`] or [`AuthError::PasswordTooShort`]
    /// without any network call, [`AuthError::UsernameTaken`] without a
    /// registration call, or the provider's error.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpOutcome, AuthError> {
        form.validate()?;

        if self.profiles.username_exists(&form.username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let outcome = self
            .identity
            .sign_up(&form.to_request())
            .await
            .map_err(map_username_conflict)?;
        if outcome.session.is_none() {
            tracing::info!(user_id = %outcome.user.id, "registered; awaiting email confirmation");
        }
        Ok(outcome)
    }

    /// Clear local state, then end the session remotely.
    ///
    /// Local state is cleared even if the remote call fails.
    ///
    /// # Errors
    ///
    /// Returns the provider's error from the remote sign-out.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.current_session();
        self.bump(AuthState::clear);
        self.identity.sign_out(session.as_ref()).await
    }

    /// Apply a partial update to the current user's profile.
    ///
    /// The returned row replaces the local profile as-is and clears any
    /// earlier profile-load failure.
    ///
    /// # Errors
    ///
    /// [`AuthError::NoUser`] when nobody is signed in,
    /// [`AuthError::UsernameTaken`] on a username conflict, otherwise the
    /// store's error.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, AuthError> {
        let Some(session) = self.current_session() else {
            return Err(AuthError::NoUser);
        };

        let profile = self
            .profiles
            .update_profile(&session, update)
            .await
            .map_err(map_username_conflict)?;

        self.bump(|state| {
            if state.user.as_ref().is_some_and(|user| user.id == profile.id) {
                state.profile = Some(profile.clone());
                state.profile_error = None;
                if state.phase == AuthPhase::Authenticated {
                    set_phase(state, AuthPhase::ProfileLoading);
                }
                if state.phase == AuthPhase::ProfileLoading {
                    set_phase(state, AuthPhase::Ready);
                }
            }
        });
        Ok(profile)
    }

    /// Re-run the profile load for the current session. No-op when signed
    /// out. Failures land in `profile_error`.
    pub async fn refresh_profile(&self) {
        if let Some((epoch, session)) = self.begin_reload() {
            self.load_profile(epoch, &session).await;
        }
    }

    // --- Notification handling ---

    async fn handle_event(&self, event: AuthEvent) {
        tracing::debug!(event = event.name(), "auth event");
        match event {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                self.apply_session(session).await;
            }
            AuthEvent::SignedOut => {
                self.bump(AuthState::clear);
            }
        }
    }

    /// Re-read the provider's session after missing notifications.
    async fn resync(&self) {
        match self.identity.get_session().await {
            Ok(Some(session)) => self.apply_session(session).await,
            Ok(None) => {
                self.bump(AuthState::clear);
            }
            Err(error) => tracing::warn!(%error, "session resync failed"),
        }
    }

    async fn apply_session(&self, session: Session) {
        let epoch = self.bump(|state| {
            if state
                .user
                .as_ref()
                .is_some_and(|user| user.id != session.user.id)
            {
                state.profile = None;
            }
            state.user = Some(session.user.clone());
            state.session = Some(session.clone());
            state.profile_error = None;
            set_phase(state, AuthPhase::Authenticated);
            set_phase(state, AuthPhase::ProfileLoading);
        });
        self.load_profile(epoch, &session).await;
    }

    async fn load_profile(&self, epoch: u64, session: &Session) {
        let outcome = self
            .profiles
            .fetch_profile(session)
            .await
            .map_err(|error| {
                tracing::warn!(%error, user_id = %session.user_id(), "profile load failed");
                ProfileLoadFailed {
                    user_id: session.user_id().to_string(),
                    reason: error.to_string(),
                }
            });

        let committed = self.commit_if_current(epoch, |state| match outcome {
            Ok(profile) => {
                state.profile = Some(profile);
                state.profile_error = None;
                set_phase(state, AuthPhase::Ready);
            }
            Err(failure) => {
                state.profile = None;
                state.profile_error = Some(failure);
                set_phase(state, AuthPhase::Authenticated);
            }
        });
        if !committed {
            tracing::debug!(epoch, "discarding superseded profile load");
        }
    }

    // --- State helpers ---

    fn current_session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    /// Apply `modify` under a new epoch, invalidating in-flight loads.
    fn bump(&self, modify: impl FnOnce(&mut AuthState)) -> u64 {
        let mut epoch = 0;
        self.state.send_modify(|state| {
            epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            modify(state);
        });
        epoch
    }

    /// Start a profile load for the held session, if any.
    fn begin_reload(&self) -> Option<(u64, Session)> {
        let mut started = None;
        self.state.send_if_modified(|state| {
            let Some(session) = state.session.clone() else {
                return false;
            };
            let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            set_phase(state, AuthPhase::ProfileLoading);
            started = Some((epoch, session));
            true
        });
        started
    }

    /// Apply `modify` only if no session change happened since `epoch`.
    fn commit_if_current(&self, epoch: u64, modify: impl FnOnce(&mut AuthState)) -> bool {
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            modify(state);
            true
        })
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_pump(manager: Weak<SessionManager>, mut events: broadcast::Receiver<AuthEvent>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "auth events dropped; resyncing session");
                None
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        let Some(manager) = manager.upgrade() else {
            break;
        };
        match event {
            Some(event) => manager.handle_event(event).await,
            None => manager.resync().await,
        }
    }
}

fn set_phase(state: &mut AuthState, next: AuthPhase) {
    match state.phase.transition(next) {
        Ok(phase) => state.phase = phase,
        Err(error) => tracing::warn!(%error, "ignoring invalid phase transition"),
    }
}

/// Storage-layer unique-constraint violations on `username`.
fn map_username_conflict(error: AuthError) -> AuthError {
    match error {
        AuthError::Api { status, ref message }
            if (status == 409 || message.contains("23505") || message.contains("duplicate"))
                && message.contains("username") =>
        {
            AuthError::UsernameTaken
        }
        other => other,
    }
}
