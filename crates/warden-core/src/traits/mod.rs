//! Collaborator traits defined in `warden-core` and implemented by other
//! crates or by the host application.

pub mod cache;
pub mod notifier;
pub mod principal;
pub mod provider;
pub mod session;

pub use cache::CacheProvider;
pub use notifier::ResetNotifier;
pub use principal::{CanResetPassword, IdOf, Principal, TwoFactorPrincipal};
pub use provider::{RecoveryCodeStore, UserProvider};
pub use session::{Cookie, CookieJar, SessionStore, TokenSource};
