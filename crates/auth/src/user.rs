//! Registered users.

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, UserId};

/// Maximum password length in bytes (argon2 input bound kept compatible with bcrypt-era clients).
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Stored user account.
///
/// Never serialized: the password hash must not leave the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl NewUser {
    pub fn validate(&self) -> DomainResult<()> {
        if self.username.trim().is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        if self.password.len() > PASSWORD_MAX_BYTES {
            return Err(DomainError::validation(format!(
                "Password cannot be longer than {PASSWORD_MAX_BYTES} bytes"
            )));
        }
        if !looks_like_email(&self.email) {
            return Err(DomainError::validation("value is not a valid email address"));
        }
        Ok(())
    }
}

/// Shape check only: `local@domain.tld`, no whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> NewUser {
        NewUser {
            username: "manuela".to_string(),
            password: "secret123".to_string(),
            email: "manuela@example.com".to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(user().validate().is_ok());
    }

    #[test]
    fn password_over_72_bytes_is_rejected() {
        // 37 two-byte chars = 74 bytes, well under 72 chars
        let input = NewUser {
            password: "é".repeat(37),
            ..user()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.detail(), "Password cannot be longer than 72 bytes");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "no-at-sign", "@example.com", "a@b", "a@@b.com", "a b@c.com", "a@.com"] {
            let input = NewUser {
                email: email.to_string(),
                ..user()
            };
            assert!(input.validate().is_err(), "{email:?} should be rejected");
        }
    }

    #[test]
    fn profile_excludes_hash() {
        let stored = User {
            id: UserId::new(1),
            username: "manuela".to_string(),
            email: "manuela@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
        };
        let json = serde_json::to_value(stored.profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["id"], 1);
    }
}
