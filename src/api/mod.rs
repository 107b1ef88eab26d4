//! Remote API module
//!
//! Thin HTTP/JSON clients for the two services the app talks to:
//! - `repl` - the dialogue (chat-bot) service: registration and dialogue turns
//! - `random_user` - the paginated profile-list service backing the user list
//!
//! Both clients are fire-and-handle-error: transport and decoding failures
//! are logged and converted to "no result" at this boundary, so callers skip
//! the turn instead of propagating an error into the presentation layer.

pub mod random_user;
pub mod repl;

pub use random_user::{RandomUserClient, UserProfile};
pub use repl::{Dialogue, DialogueApi, DialogueRequest, ReplClient, SystemText};

use crate::{Error, Result};
use std::time::Duration;

/// Build the shared HTTP client
///
/// Connect timeout must stay below the request timeout so a dead host fails
/// fast while a slow response still gets its full read window.
pub(crate) fn http_client(connect_timeout: Duration, request_timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))
}
