//! Password reset: token storage, the broker, and expired-token pruning.

pub mod broker;
pub mod cache_repository;
pub mod memory_repository;
pub mod pruner;
pub mod repository;

pub use self::broker::{PasswordBroker, ResetLinkStatus, ResetStatus};
pub use self::cache_repository::CacheTokenRepository;
pub use self::memory_repository::MemoryTokenRepository;
pub use self::pruner::ResetTokenPruner;
pub use self::repository::{ResetTokenRecord, TokenLifetime, TokenRepository};
