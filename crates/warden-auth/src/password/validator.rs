//! Strength rules for new passwords.

use zxcvbn::Score;

use warden_core::config::PasswordPolicyConfig;
use warden_core::{AppError, AppResult};

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    min_score: u8,
}

impl PasswordValidator {
    /// Creates a validator from the reset policy configuration.
    pub fn new(config: &PasswordPolicyConfig) -> Self {
        Self {
            min_length: config.min_length,
            min_score: config.min_score,
        }
    }

    /// Returns the first violated rule as a validation error.
    pub fn validate(&self, password: &str) -> AppResult<()> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(char::is_alphabetic) {
            return Err(AppError::validation(
                "Password must contain at least one letter",
            ));
        }

        let estimate = zxcvbn::zxcvbn(password, &[]);
        if estimate.score() < self.required_score() {
            return Err(AppError::validation(
                "Password is too weak. Please use a stronger password with more entropy.",
            ));
        }

        Ok(())
    }

    fn required_score(&self) -> Score {
        match self.min_score {
            0 => Score::Zero,
            1 => Score::One,
            2 => Score::Two,
            3 => Score::Three,
            _ => Score::Four,
        }
    }

    /// Rejects reusing the current password.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> AppResult<()> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}
