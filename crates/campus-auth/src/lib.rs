//! # campus-auth
//!
//! Session and profile management for campus clients.
//!
//! - [`SessionManager`]: authoritative session/profile state driven by
//!   [`AuthEvent`] notifications, published through a `watch` channel
//! - [`IdentityProvider`] / [`ProfileStore`]: collaborator seams
//! - [`SupabaseClient`]: hosted implementation of both seams
//! - [`SessionStore`]: keyring-first session persistence with file fallback
//!
//! ```no_run
//! # async fn demo() -> Result<(), campus_auth::AuthError> {
//! use std::sync::Arc;
//!
//! use campus_auth::{SessionManager, SessionStore, SupabaseClient};
//! use campus_config::CampusConfig;
//!
//! # let config = CampusConfig::load_with_dotenv()
//! #     .map_err(|e| campus_auth::AuthError::Other(e.to_string()))?;
//! let store = SessionStore::from_config(&config.session)?;
//! let client = Arc::new(SupabaseClient::new(&config.supabase, store)?);
//! let manager = SessionManager::start(client.clone(), client).await;
//!
//! manager.sign_in("ada@uni.example", "secret1").await?;
//! let state = manager.settled().await;
//! println!("{:?}", state.profile);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod form;
mod http;
pub mod manager;
pub mod provider;
pub mod session_store;
pub mod supabase;

pub use error::AuthError;
pub use events::AuthEvent;
pub use form::{MIN_PASSWORD_LEN, SignUpForm};
pub use manager::SessionManager;
pub use provider::{IdentityProvider, ProfileStore, SignUpMetadata, SignUpOutcome, SignUpRequest};
pub use session_store::SessionStore;
pub use supabase::SupabaseClient;
