//! Dialogue session orchestration
//!
//! [`DialogueSession`] ties the stores and the remote client together: it
//! makes sure a registered user identifier exists (registering once, on first
//! ever use), decrypts it for each outgoing turn, and drives the
//! request/response cycle of a conversation. It owns neither store; both are
//! shared process-wide and injected at construction.
//!
//! Failures stay quiet by design: a failed registration or turn produces no
//! user-visible error, the app keeps working and the next foreground check
//! simply tries again.

use crate::api::{Dialogue, DialogueApi, DialogueRequest};
use crate::config::Config;
use crate::identity::IdentityStore;
use crate::vault::KeyVault;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Registration lifecycle of one app run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No identifier stored yet
    Unregistered,
    /// Registration chain in flight
    Registering,
    /// Identifier stored; turns can be exchanged
    Ready,
    /// Registration failed; re-attempted on the next check
    RegistrationFailed,
    /// Stored identifier can no longer be decrypted (key pair lost).
    /// Fatal: only a reset (or reinstall) leaves this state.
    IdentityLost,
}

/// One completed exchange with the dialogue service
///
/// Ephemeral: held in the conversation view state, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueTurn {
    /// What was sent
    pub request: DialogueRequest,
    /// What came back
    pub reply: Dialogue,
}

/// Session identity and conversation orchestrator
pub struct DialogueSession<C: DialogueApi, V: KeyVault> {
    client: C,
    vault: Arc<V>,
    identity: Arc<IdentityStore>,
    config: Config,
    state: SessionState,
}

impl<C: DialogueApi, V: KeyVault> DialogueSession<C, V> {
    /// Create a session over shared stores and a dialogue client
    pub fn new(client: C, vault: Arc<V>, identity: Arc<IdentityStore>, config: Config) -> Self {
        Self {
            client,
            vault,
            identity,
            config,
            state: SessionState::Unregistered,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Make sure a registered identifier exists
    ///
    /// Called on app start and on every foreground/resume. If the store
    /// already holds an identifier this never re-registers; otherwise it runs
    /// register -> encrypt -> persist and ends in `Ready` or
    /// `RegistrationFailed`. There is no backoff timer; the next call is the
    /// retry.
    pub async fn ensure_registered(&mut self) -> SessionState {
        match self.identity.get() {
            Ok(Some(_)) => {
                debug!("Identifier already stored, skipping registration");
                self.state = SessionState::Ready;
            }
            Ok(None) => {
                self.state = SessionState::Registering;
                self.state = self.register_chain().await;
            }
            Err(e) => {
                warn!("Identity store unreadable, registration deferred: {}", e);
                self.state = SessionState::RegistrationFailed;
            }
        }

        self.state
    }

    async fn register_chain(&self) -> SessionState {
        let Some(user_id) = self.client.register(&self.config.bot_id).await else {
            // Transport failure already logged at the client boundary
            return SessionState::RegistrationFailed;
        };

        match self.protect_and_store(&user_id) {
            Ok(()) => {
                info!("Registration complete, identifier stored encrypted");
                SessionState::Ready
            }
            Err(e) => {
                warn!("Registration aborted, identifier not stored: {}", e);
                SessionState::RegistrationFailed
            }
        }
    }

    fn protect_and_store(&self, user_id: &str) -> Result<()> {
        let blob = self.vault.encrypt(user_id)?;
        self.identity.set(&blob)
    }

    /// Open a conversation with the initial utterance and scenario
    ///
    /// Returns `None` (and leaves the view untouched) on any failure.
    pub async fn start_conversation(&mut self) -> Option<DialogueTurn> {
        let user_id = self.decrypted_user_id()?;
        let request = DialogueRequest::for_start(user_id, &self.config);
        self.exchange(request).await
    }

    /// Send one free-text utterance on an open conversation
    pub async fn send_text(&mut self, body: &str) -> Option<DialogueTurn> {
        let user_id = self.decrypted_user_id()?;
        let request = DialogueRequest::for_talk(user_id, &self.config, body);
        self.exchange(request).await
    }

    async fn exchange(&self, request: DialogueRequest) -> Option<DialogueTurn> {
        let reply = self.client.dialogue(&request).await?;
        Some(DialogueTurn { request, reply })
    }

    /// Clear both stores and return to `Unregistered`
    pub fn reset(&mut self) -> Result<()> {
        self.identity.clear()?;
        self.vault.clear()?;
        self.state = SessionState::Unregistered;
        Ok(())
    }

    /// Read and decrypt the stored identifier for an outgoing request
    ///
    /// A turn is never attempted without a valid plaintext identifier. An
    /// undecryptable blob moves the session to `IdentityLost` rather than
    /// silently re-registering: the old identifier (and the server-side
    /// conversation history behind it) is gone for good, which is a product
    /// decision, not a transient error.
    fn decrypted_user_id(&mut self) -> Option<String> {
        if self.state != SessionState::Ready {
            debug!("Turn skipped, session not ready ({:?})", self.state);
            return None;
        }

        let stored = match self.identity.get() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("Identifier missing, turn skipped");
                self.state = SessionState::Unregistered;
                return None;
            }
            Err(e) => {
                warn!("Identity store unreadable, turn skipped: {}", e);
                return None;
            }
        };

        match self.vault.decrypt(&stored) {
            Ok(user_id) => Some(user_id),
            Err(e @ (Error::KeyUnavailable | Error::DecryptionFailed(_))) => {
                error!("Stored identifier is undecryptable, identity lost: {}", e);
                self.state = SessionState::IdentityLost;
                None
            }
            Err(e) => {
                warn!("Decrypt failed, turn skipped: {}", e);
                None
            }
        }
    }
}
