use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::{
    config::{Instance, ProbeConfig},
    error::ProbeError,
    fallback::first_success,
    invidious::{
        api::search_channels,
        structs::SearchResult,
        utils::{ChannelId, ChannelInput, normalize_input},
    },
};

/// A channel ID, plus whatever the search told us about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub id: ChannelId,
    pub name: Option<String>,
    pub subscribers: Option<u64>,
    /// Instance that answered the search. `None` if the input already was an ID.
    pub instance: Option<Instance>,
}

impl ResolvedChannel {
    const fn from_id(id: ChannelId) -> Self {
        Self {
            id,
            name: None,
            subscribers: None,
            instance: None,
        }
    }
}

/// First `channel` typed record carrying a well-formed channel ID
#[must_use]
pub fn pick_channel(results: &[SearchResult]) -> Option<ResolvedChannel> {
    results.iter().filter(|r| r.is_channel()).find_map(|r| {
        let id = ChannelId::parse(r.author_id()?)?;
        Some(ResolvedChannel {
            id,
            name: r.author().map(ToString::to_string),
            subscribers: r.sub_count,
            instance: None,
        })
    })
}

/// Turns a handle / channel URL / channel ID into a channel ID
///
/// Channel IDs are returned as-is without touching the network.
/// Returns `Ok(None)` when no instance knows the handle.
///
/// # Errors
/// Errors only when no handle can be extracted from `input`
#[instrument(skip(client, config))]
pub async fn resolve_channel(
    client: &Client,
    config: &ProbeConfig,
    input: &str,
) -> Result<Option<ResolvedChannel>, ProbeError> {
    match normalize_input(input)? {
        ChannelInput::Id(id) => {
            info!("{id} is already a channel ID, skipping resolution");
            Ok(Some(ResolvedChannel::from_id(id)))
        }
        ChannelInput::Handle(handle) => Ok(resolve_handle(client, config, &handle).await),
    }
}

/// Searches `@handle` on the configured instances until one of them returns a channel
pub async fn resolve_handle(
    client: &Client,
    config: &ProbeConfig,
    handle: &str,
) -> Option<ResolvedChannel> {
    info!("Resolving channel handle @{handle}");

    let found = first_success(config.strategy, &config.instances, |instance| async move {
        let results = search_channels(client, instance, handle).await?;
        pick_channel(&results).ok_or(ProbeError::NotFound("channel"))
    })
    .await;

    let Some((instance, mut channel)) = found else {
        warn!("Could not resolve @{handle} on any instance");
        return None;
    };

    info!(
        "Found {} ({}) via {instance}",
        channel.name.as_deref().unwrap_or("unknown name"),
        channel.id
    );
    channel.instance = Some(instance.clone());
    Some(channel)
}
