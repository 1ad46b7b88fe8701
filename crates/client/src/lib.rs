//! Stockroom client: REST adapter, session, local product state and CLI view.

pub mod adapter;
pub mod auth_flow;
pub mod cli;
pub mod collection;
pub mod config;
pub mod session;
pub mod view;

pub use adapter::{ClientError, Operation, RestAdapter, TokenResponse};
pub use auth_flow::{AuthError, AuthFlow, AuthState};
pub use collection::{CollectionError, CollectionState, ProductCollection, SyncMode};
pub use config::ClientConfig;
pub use session::{FileTokenStore, MemoryTokenStore, Session, SessionError, TokenStore};
