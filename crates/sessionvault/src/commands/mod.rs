//! CLI command implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use sessionvault::config::Config;
use sessionvault::session::{SessionResolver, UserCredentials};
use sessionvault::store::file::FileSessionStore;

pub mod inspect;

/// Build a resolver over the sessions file named by the config at `config_path`.
pub async fn open_resolver(
    config_path: &str,
    store_override: Option<&Path>,
) -> Result<SessionResolver> {
    let config = Config::load(config_path).await?;
    let sessions_path = match store_override {
        Some(path) => path.to_path_buf(),
        None => config.sessions_path(Path::new(config_path)),
    };
    debug!(path = %sessions_path.display(), ttl = ?config.cache.ttl(), "Opening session store");

    let store = Arc::new(FileSessionStore::new(sessions_path));
    Ok(SessionResolver::with_ttl(store, config.cache.ttl()))
}

/// Credentials from `--email`/`--password`, if both were given.
pub fn credentials(email: Option<String>, password: Option<String>) -> Option<UserCredentials> {
    match (email, password) {
        (Some(email), Some(password)) => Some(UserCredentials::new(email, password)),
        _ => None,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
