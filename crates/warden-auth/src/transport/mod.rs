//! In-process implementations of the session, cookie, and request-token
//! contracts, for embedding hosts without their own and for tests.

pub mod cookies;
pub mod session;
pub mod token;

pub use self::cookies::MemoryCookieJar;
pub use self::session::MemorySession;
pub use self::token::StaticTokenSource;
