//! Normalized e-mail address value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A trimmed, lower-cased e-mail address.
///
/// Every lookup and comparison in the engine goes through this type, so
/// `" Alice@Example.COM "` and `"alice@example.com"` are the same invitee.
///
/// # Example
///
/// ```
/// use rally_domain::Email;
///
/// let email = Email::parse("  Alice@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "alice@example.com");
/// assert!(Email::parse("not-an-address").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalize and validate a raw address.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();

        let valid = match normalized.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !normalized.chars().any(char::is_whitespace)
            }
            None => false,
        };

        if valid {
            Ok(Self(normalized))
        } else {
            Err(DomainError::InvalidEmail(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the `@`, used as a fallback display name.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::str::FromStr for Email {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Email::parse(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let email = Email::parse("\tBob@Example.org  ").unwrap();
        assert_eq!(email.as_str(), "bob@example.org");
        assert_eq!(email, Email::parse("bob@EXAMPLE.org").unwrap());
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in ["", "   ", "bob", "@example.org", "bob@", "bo b@example.org", "a@b@c"] {
            assert!(Email::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_local_part() {
        assert_eq!(Email::parse("carol@x.io").unwrap().local_part(), "carol");
    }

    #[test]
    fn test_serde_normalizes_on_read() {
        let email: Email = serde_json::from_str("\"Dan@X.io\"").unwrap();
        assert_eq!(email.as_str(), "dan@x.io");
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }
}
