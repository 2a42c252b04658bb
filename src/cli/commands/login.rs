//! Login command implementation
//!
//! Runs the browser sign-in for Google Docs and stores the resulting token
//! where `export` looks for it.

use crate::adapters::clouddoc::api::build_http_client;
use crate::adapters::clouddoc::login::login;
use crate::adapters::clouddoc::{ClientSecrets, FileTokenStore};
use crate::config::Md2NoteConfig;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the login command
#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// OAuth client secrets file (default: clouddoc.credentials_path)
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Token cache file (default: clouddoc.token_store_path)
    #[arg(long)]
    pub token_store: Option<PathBuf>,
}

impl LoginArgs {
    /// Execute the login command
    pub async fn execute(&self, config: &Md2NoteConfig) -> anyhow::Result<i32> {
        let credentials_path = self
            .credentials
            .clone()
            .unwrap_or_else(|| config.clouddoc.credentials_path.clone());
        let token_store_path = self
            .token_store
            .clone()
            .unwrap_or_else(|| config.clouddoc.resolved_token_store_path());

        tracing::info!(
            credentials = %credentials_path.display(),
            token_store = %token_store_path.display(),
            "Starting Google sign-in"
        );

        let secrets = match ClientSecrets::load(&credentials_path) {
            Ok(secrets) => secrets,
            Err(e) => {
                eprintln!("Cannot load client secrets: {e}");
                return Ok(4); // Authentication setup exit code
            }
        };

        let http = match build_http_client(config.clouddoc.timeout_seconds) {
            Ok(http) => http,
            Err(e) => {
                eprintln!("Cannot create HTTP client: {e}");
                return Ok(5);
            }
        };

        let store = FileTokenStore::new(token_store_path);
        let result = login(&secrets, &store, &http, |url| {
            println!("Open this URL in your browser to authorize MD2Note:");
            println!();
            println!("  {url}");
            println!();
            println!("Waiting for authorization...");
        })
        .await;

        match result {
            Ok(_) => {
                println!("Signed in. Token saved to {}", store.path().display());
                Ok(0)
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Google sign-in failed");
                eprintln!("Sign-in failed: {e}");
                Ok(4)
            }
        }
    }
}
