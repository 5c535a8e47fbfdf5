//! Identity handshake against an external signer.
//!
//! The signer (a wallet extension or equivalent) is only asked to approve a
//! random challenge; no signature ever reaches this engine, and a session is
//! nothing more than a trusted username.

use crate::rpc::reader::ChainReader;
use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use tracing::{info, warn};

/// External signing collaborator: given a username and a challenge string,
/// asynchronously reports whether the user approved.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn request_approval(&self, username: &str, challenge: &str) -> anyhow::Result<bool>;
}

#[derive(Debug, Default)]
pub struct Session {
    username: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    /// Attempts a login: the account must exist on chain, and the signer
    /// must approve a fresh challenge. Any error or non-approval discards
    /// the attempted identity.
    pub async fn login(
        &mut self,
        reader: &ChainReader,
        signer: &dyn Signer,
        username: &str,
    ) -> bool {
        self.username = None;

        if let Err(e) = reader.get_account(username).await {
            warn!("login rejected for {username}: {e}");
            return false;
        }

        let challenge = format!("Login verification for Hive Pulse: {}", nonce());
        match signer.request_approval(username, &challenge).await {
            Ok(true) => {
                info!("{username} authenticated");
                self.username = Some(username.to_string());
                true
            }
            Ok(false) => {
                warn!("login declined for {username}");
                false
            }
            Err(e) => {
                warn!("signer error for {username}: {e:#}");
                false
            }
        }
    }

    pub fn logout(&mut self) {
        self.username = None;
    }
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}
