//! The remember-me cookie payload, `"{id}|{token}"`.

/// A parsed remember-me cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recaller {
    /// Principal identifier, in display form.
    pub id: String,
    /// Plaintext remember token.
    pub token: String,
}

impl Recaller {
    /// Parses a cookie value, splitting on the first `|`. Both halves must
    /// be non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (id, token) = raw.split_once('|')?;
        if id.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self {
            id: id.to_string(),
            token: token.to_string(),
        })
    }

    /// Cookie value for an identifier and token.
    pub fn encode(id: &impl std::fmt::Display, token: &str) -> String {
        format!("{id}|{token}")
    }
}
