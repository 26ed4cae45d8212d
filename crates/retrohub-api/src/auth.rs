//! Authentication state
//!
//! Two sources can authenticate a user: an external identity provider
//! (client side only) and a static API token from the deployment
//! configuration. [`AuthState`] combines them into one answer for
//! "is someone signed in, and how".

use crate::config::ApiConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Path of the sign-in page
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Where the auth state is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthContext {
    /// Rendering on the server; only the static token counts
    Server,
    /// Running for a user; the identity provider is consulted first
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Identity,
    Token,
    None,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Token => "token",
            Self::None => "none",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User profile reported by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Snapshot published by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityStatus {
    pub signed_in: bool,
    pub user: Option<IdentityUser>,
}

/// Combined view over identity provider and static token
#[derive(Debug)]
pub struct AuthState {
    context: AuthContext,
    identity_configured: bool,
    has_static_token: bool,
    identity: RwLock<IdentityStatus>,
}

impl AuthState {
    pub fn new(context: AuthContext, identity_configured: bool, has_static_token: bool) -> Self {
        Self {
            context,
            identity_configured,
            has_static_token,
            identity: RwLock::new(IdentityStatus::default()),
        }
    }

    pub fn from_config(config: &ApiConfig, context: AuthContext, identity_configured: bool) -> Self {
        Self::new(context, identity_configured, config.has_token())
    }

    pub fn identity_configured(&self) -> bool {
        self.identity_configured
    }

    pub fn has_static_token(&self) -> bool {
        self.has_static_token
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.read().signed_in
    }

    pub fn user(&self) -> Option<IdentityUser> {
        self.identity.read().user.clone()
    }

    /// Replace the identity snapshot
    pub fn update(&self, status: IdentityStatus) {
        *self.identity.write() = status;
    }

    /// Follow an identity provider's status channel
    ///
    /// The current value is applied immediately. Nothing is attached on the
    /// server or when no identity provider is configured.
    pub fn attach(self: &Arc<Self>, mut status: watch::Receiver<IdentityStatus>) -> Option<JoinHandle<()>> {
        if self.context == AuthContext::Server || !self.identity_configured {
            return None;
        }

        self.update(status.borrow_and_update().clone());
        let state = Arc::clone(self);
        Some(tokio::spawn(async move {
            while status.changed().await.is_ok() {
                let snapshot = status.borrow_and_update().clone();
                tracing::debug!(signed_in = snapshot.signed_in, "identity status changed");
                state.update(snapshot);
            }
        }))
    }

    pub fn is_authenticated(&self) -> bool {
        match self.context {
            AuthContext::Server => self.has_static_token,
            AuthContext::Client => self.is_signed_in() || self.has_static_token,
        }
    }

    pub fn auth_method(&self) -> AuthMethod {
        if self.is_signed_in() {
            AuthMethod::Identity
        } else if self.has_static_token {
            AuthMethod::Token
        } else {
            AuthMethod::None
        }
    }

    /// Name to show for the current user
    pub fn display_name(&self) -> String {
        let identity = self.identity.read();
        if let Some(user) = &identity.user {
            if let Some(name) = user.full_name.as_deref().filter(|n| !n.is_empty()) {
                return name.to_string();
            }
            if let Some(email) = user.email.as_deref().filter(|e| !e.is_empty()) {
                return email.to_string();
            }
        }
        if self.has_static_token {
            "Developer mode".to_string()
        } else {
            "Signed out".to_string()
        }
    }

    /// Sign-in redirect for a protected route, if one is needed
    ///
    /// Routes are only guarded on the client and only when an identity
    /// provider is configured.
    pub fn guard_route(&self, full_path: &str) -> Option<String> {
        if self.context == AuthContext::Client && self.identity_configured && !self.is_signed_in() {
            Some(sign_in_redirect(full_path))
        } else {
            None
        }
    }
}

/// Sign-in page URL that returns to `redirect_to` afterwards
pub fn sign_in_redirect(redirect_to: &str) -> String {
    let redirect_to = if redirect_to.is_empty() { "/" } else { redirect_to };
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("redirectTo", redirect_to)
        .finish();
    format!("{SIGN_IN_PATH}?{query}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(full_name: Option<&str>, email: Option<&str>) -> IdentityStatus {
        IdentityStatus {
            signed_in: true,
            user: Some(IdentityUser {
                id: Some("user_1".to_string()),
                email: email.map(str::to_string),
                full_name: full_name.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_server_only_trusts_token() {
        let state = AuthState::new(AuthContext::Server, true, false);
        state.update(user(Some("Ada"), None));
        assert!(!state.is_authenticated());

        let state = AuthState::new(AuthContext::Server, true, true);
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_client_accepts_either_source() {
        let state = AuthState::new(AuthContext::Client, true, false);
        assert!(!state.is_authenticated());
        assert_eq!(state.auth_method(), AuthMethod::None);

        state.update(user(None, Some("ada@example.com")));
        assert!(state.is_authenticated());
        assert_eq!(state.auth_method(), AuthMethod::Identity);

        let state = AuthState::new(AuthContext::Client, false, true);
        assert!(state.is_authenticated());
        assert_eq!(state.auth_method(), AuthMethod::Token);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let state = AuthState::new(AuthContext::Client, true, true);
        assert_eq!(state.display_name(), "Developer mode");

        state.update(user(None, Some("ada@example.com")));
        assert_eq!(state.display_name(), "ada@example.com");

        state.update(user(Some("Ada Lovelace"), Some("ada@example.com")));
        assert_eq!(state.display_name(), "Ada Lovelace");

        let state = AuthState::new(AuthContext::Client, true, false);
        assert_eq!(state.display_name(), "Signed out");
    }

    #[test]
    fn test_guard_route() {
        let state = AuthState::new(AuthContext::Client, true, false);
        assert_eq!(
            state.guard_route("/game/12?tab=saves").as_deref(),
            Some("/sign-in?redirectTo=%2Fgame%2F12%3Ftab%3Dsaves")
        );
        state.update(user(Some("Ada"), None));
        assert_eq!(state.guard_route("/game/12"), None);

        let unguarded = AuthState::new(AuthContext::Client, false, false);
        assert_eq!(unguarded.guard_route("/favorites"), None);
        assert_eq!(sign_in_redirect(""), "/sign-in?redirectTo=%2F");
    }

    #[tokio::test]
    async fn test_attach_follows_provider() {
        let state = Arc::new(AuthState::new(AuthContext::Client, true, false));
        let (tx, rx) = watch::channel(user(Some("Ada"), None));

        let task = state.attach(rx).unwrap();
        assert!(state.is_signed_in());

        tx.send(IdentityStatus::default()).unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(!state.is_signed_in());
        assert_eq!(state.user(), None);
    }

    #[test]
    fn test_attach_is_noop_on_server() {
        let state = Arc::new(AuthState::new(AuthContext::Server, true, true));
        let (_tx, rx) = watch::channel(IdentityStatus::default());
        assert!(state.attach(rx).is_none());
    }
}
