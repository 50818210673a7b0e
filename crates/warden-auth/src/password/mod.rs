//! Password policy enforcement.

pub mod validator;

pub use self::validator::PasswordValidator;
