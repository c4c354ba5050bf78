//! Authentication module
//!
//! Implements the OAuth2 authorization-code flow against the provider and
//! owns credential storage. The session manager is the only path from a
//! session ID to an authenticated client.

pub mod oauth;
pub mod session;
pub mod tokens;

pub use oauth::{authorize_url, complete_login};
pub use session::SessionManager;
pub use tokens::{CredentialRecord, FileTokenStore, MemoryTokenStore, TokenStore};
