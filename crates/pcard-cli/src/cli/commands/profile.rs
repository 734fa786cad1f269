//! Profile command handler.

use anyhow::{Context, Result};
use pcard_core::config::OAuthConfig;
use pcard_core::profile::ProfileClient;
use pcard_core::view::ProfileCard;

pub async fn show(oauth: &OAuthConfig, token: &str, json: bool) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Access token cannot be empty");
    }

    let client = ProfileClient::new(oauth).context("create profile client")?;
    if json {
        let raw = client.fetch_raw(token).await.context("fetch profile")?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
    } else {
        let profile = client.fetch(token).await.context("fetch profile")?;
        print!("{}", ProfileCard::from_profile(&profile).to_text());
    }
    Ok(())
}
