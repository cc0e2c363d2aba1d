//! Twitch embed provider
//!
//! Builds Twitch player URLs for each tile and tracks which containers
//! currently hold an embed.

use std::collections::HashMap;

use reqwest::Url;
use tracing::debug;

use crate::config::embed::PLAYER_URL;
use crate::error::{AppError, Result};

use super::traits::EmbedProvider;
use super::types::{EmbedHandle, EmbedOptions};

/// Embeds tiles with the Twitch web player
#[derive(Debug, Default)]
pub struct TwitchEmbedProvider {
    /// Live embeds by container id
    live: HashMap<String, EmbedHandle>,
}

impl TwitchEmbedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of containers currently holding an embed
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn get(&self, container_id: &str) -> Option<&EmbedHandle> {
        self.live.get(container_id)
    }
}

/// Twitch logins are 1-25 ASCII letters, digits or underscores
fn is_valid_channel(channel: &str) -> bool {
    (1..=25).contains(&channel.len())
        && channel
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Player URL for a channel
pub fn player_url(channel: &str, options: &EmbedOptions) -> Result<Url> {
    let mut params: Vec<(&str, &str)> = vec![("channel", channel)];
    params.extend(options.parent_domains.iter().map(|d| ("parent", d.as_str())));
    params.push(("muted", if options.muted { "true" } else { "false" }));

    Url::parse_with_params(PLAYER_URL, &params)
        .map_err(|e| AppError::Embed(format!("Cannot build player URL for {channel}: {e}")))
}

impl EmbedProvider for TwitchEmbedProvider {
    fn name(&self) -> &'static str {
        "Twitch"
    }

    fn create(
        &mut self,
        container_id: &str,
        channel: &str,
        options: &EmbedOptions,
    ) -> Result<EmbedHandle> {
        if !is_valid_channel(channel) {
            return Err(AppError::Embed(format!("Invalid Twitch channel name: {channel:?}")));
        }
        if options.parent_domains.is_empty() {
            return Err(AppError::Embed(
                "Twitch embeds need at least one parent domain".to_string(),
            ));
        }

        let handle = EmbedHandle {
            container_id: container_id.to_string(),
            channel: channel.to_string(),
            url: player_url(channel, options)?.to_string(),
        };
        debug!(container = container_id, url = %handle.url, "Embed created");
        self.live.insert(container_id.to_string(), handle.clone());
        Ok(handle)
    }

    fn destroy(&mut self, handle: &EmbedHandle) {
        if self.live.remove(&handle.container_id).is_some() {
            debug!(container = %handle.container_id, "Embed destroyed");
        }
    }
}
