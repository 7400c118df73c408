//! Session credential access.
//!
//! The login/cookie flow is owned by the host application. The core only
//! needs to know whether a session exists and what cookie string to attach;
//! it receives this capability at construction instead of reading a shared
//! global store.

#[cfg(feature = "mock")]
use mockall::automock;

/// Read-only view of the current platform session.
#[cfg_attr(feature = "mock", automock)]
pub trait CredentialsProvider: Send + Sync {
    /// The session cookie string, when the user is logged in.
    fn cookie(&self) -> Option<String>;

    /// Whether an authenticated session is available.
    fn is_authenticated(&self) -> bool {
        self.cookie().is_some()
    }
}

/// Provider for anonymous sessions; useful in tests and for content that
/// does not require login.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousCredentials;

impl CredentialsProvider for AnonymousCredentials {
    fn cookie(&self) -> Option<String> {
        None
    }
}
