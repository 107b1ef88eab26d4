//! Process-wide application context
//!
//! One explicitly constructed [`AppContext`] replaces hidden global
//! singletons: it owns the secure key store, the identity store, the two
//! remote clients and the worker pool, all created once at startup and
//! shared by reference from then on. Sessions are built from it and borrow
//! the stores through `Arc`s.

use crate::api::{RandomUserClient, ReplClient};
use crate::config::Config;
use crate::identity::IdentityStore;
use crate::session::DialogueSession;
use crate::task::TaskPool;
use crate::vault::SecureKeyStore;
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Identity file name inside the data directory
const IDENTITY_FILE: &str = "identity.json";

/// Process-wide dependency container
#[derive(Debug)]
pub struct AppContext {
    config: Config,
    vault: Arc<SecureKeyStore>,
    identity: Arc<IdentityStore>,
    repl: ReplClient,
    profiles: RandomUserClient,
    tasks: TaskPool,
}

impl AppContext {
    /// Build the context from configuration and a writable data directory
    ///
    /// # Errors
    /// Fails if the platform secure store or an HTTP client cannot be set
    /// up; both are fatal for the identity subsystem.
    pub fn new<P: AsRef<Path>>(config: Config, data_dir: P) -> Result<Self> {
        let vault = Arc::new(SecureKeyStore::new()?);
        let identity = Arc::new(IdentityStore::new(data_dir.as_ref().join(IDENTITY_FILE)));
        let repl = ReplClient::new(&config)?;
        let profiles = RandomUserClient::new(&config)?;

        Ok(Self {
            config,
            vault,
            identity,
            repl,
            profiles,
            tasks: TaskPool::new(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared secure key store
    pub fn vault(&self) -> &Arc<SecureKeyStore> {
        &self.vault
    }

    /// Shared identity store
    pub fn identity(&self) -> &Arc<IdentityStore> {
        &self.identity
    }

    /// Profile-list client for the user list screen
    pub fn profiles(&self) -> &RandomUserClient {
        &self.profiles
    }

    /// Worker pool for network and cryptographic work
    pub fn tasks(&self) -> &TaskPool {
        &self.tasks
    }

    /// Build a dialogue session over the shared stores
    pub fn session(&self) -> DialogueSession<ReplClient, SecureKeyStore> {
        DialogueSession::new(
            self.repl.clone(),
            Arc::clone(&self.vault),
            Arc::clone(&self.identity),
            self.config.clone(),
        )
    }
}
