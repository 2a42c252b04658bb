//! Google Docs destination
//!
//! - [`api`]: Docs/Drive REST client behind the [`DocsApi`] trait
//! - [`auth`]: OAuth sessions and client secrets
//! - [`token_store`]: the token cache
//! - [`login`]: the interactive installed-app login
//! - [`memory`]: an in-memory [`DocsApi`] for tests
//! - [`exporter`]: the [`CloudDocExporter`]

pub mod api;
pub mod auth;
pub mod exporter;
pub mod login;
pub mod memory;
pub mod token_store;

pub use api::{DocsApi, DocsHttpClient};
pub use auth::{ClientSecrets, OAuthSessionProvider, Session, SessionProvider, TOKEN_KEY};
pub use exporter::CloudDocExporter;
pub use memory::InMemoryDocsApi;
pub use token_store::{FileTokenStore, MemoryTokenStore, StoredToken, TokenStore};
