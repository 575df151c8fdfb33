//! Typed client for the TakeNotes HTTP API.
//!
//! Sign-in and sign-up store a JWT access/refresh pair plus the email in a
//! pluggable [`SessionStore`]; every API call goes through the [`Gateway`],
//! which attaches the bearer token and transparently performs a single
//! refresh-and-retry when the server answers 401. Request failures are
//! surfaced to the UI through a [`takenotes_notify::Relay`].

pub mod auth;
pub mod categories;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notes;
pub mod session;

pub use auth::CurrentUser;
pub use config::ClientConfig;
pub use error::ApiError;
pub use gateway::Gateway;
pub use notes::NoteFilter;
pub use session::{Credentials, FileBackend, MemoryBackend, SessionBackend, SessionStore};

use takenotes_notify::Relay;

/// One TakeNotes session against a single API base.
///
/// The persistence backend and the notification relay are injected at
/// construction time, so tests can run fully in memory. There is no ambient
/// global state.
pub struct TakeNotesClient {
    gateway: Gateway,
}

impl TakeNotesClient {
    pub fn new(config: ClientConfig, backend: impl SessionBackend + 'static, relay: Relay) -> Self {
        Self {
            gateway: Gateway::new(config, SessionStore::new(backend), relay),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        self.gateway.session()
    }

    pub fn relay(&self) -> &Relay {
        self.gateway.relay()
    }
}
