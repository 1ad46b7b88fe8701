//! `stockroom-auth`: authentication boundary for tokens, passwords, users.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod token;
pub mod user;

pub use claims::{AccessClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use token::{Hs256Jwt, JwtValidator, TokenError};
pub use user::{NewUser, PASSWORD_MAX_BYTES, User, UserProfile};
