//! `sessionvault stats|users|latest|all|marketinout|status` - inspect stored sessions.

use anyhow::{Result, bail};

use sessionvault::session::{Resolution, SessionResolver, UserCredentials};

use super::print_json;

pub async fn stats(resolver: &SessionResolver) -> Result<()> {
    print_json(&resolver.get_session_stats().await)
}

pub async fn users(resolver: &SessionResolver) -> Result<()> {
    print_json(&resolver.get_available_users().await)
}

/// Print the latest session for `platform`.
///
/// Unlike the library's fail-soft getters, a store outage is reported as an error.
pub async fn latest(
    resolver: &SessionResolver,
    platform: &str,
    credentials: Option<&UserCredentials>,
) -> Result<()> {
    match resolver.resolve_latest(platform, credentials).await {
        Resolution::Found(info) => print_json(&info),
        Resolution::Empty => bail!("no usable session for platform '{platform}'"),
        Resolution::StoreError(e) => bail!("session store unavailable: {e}"),
    }
}

pub async fn all(
    resolver: &SessionResolver,
    platform: &str,
    credentials: Option<&UserCredentials>,
) -> Result<()> {
    match resolver.resolve_all(platform, credentials).await {
        Resolution::Found(sessions) => print_json(&sessions),
        Resolution::Empty => print_json(&Vec::<()>::new()),
        Resolution::StoreError(e) => bail!("session store unavailable: {e}"),
    }
}

pub async fn marketinout(
    resolver: &SessionResolver,
    credentials: Option<&UserCredentials>,
) -> Result<()> {
    match resolver.get_marketinout_session(credentials).await {
        Some(info) => print_json(&info),
        None => bail!("no MarketInOut session with a cookie field"),
    }
}

pub async fn status(resolver: &SessionResolver) -> Result<()> {
    // Warm the cache so the status reflects one load.
    resolver.cache().get_snapshot().await;
    print_json(&resolver.cache_status())
}
