use pcard_core::profile::ProfileClient;

use crate::events::UiEvent;

/// Re-fetches the profile for `token`.
pub async fn refresh_profile(client: ProfileClient, token: String) -> UiEvent {
    let result = client.fetch(&token).await;
    UiEvent::ProfileRefreshed { token, result }
}
