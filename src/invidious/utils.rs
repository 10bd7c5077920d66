use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::error::ProbeError;

pub static CHANNEL_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UC[A-Za-z0-9_-]{22}$").unwrap());

pub static HANDLE_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/@([^/?#\s]+)").unwrap());

pub static CHANNEL_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/channel/(UC[A-Za-z0-9_-]{22})(?:[/?#\s]|$)").unwrap());

pub static VIDEO_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

pub static VIDEO_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[?&]v=|youtu\.be/|/live/|/shorts/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)").unwrap()
});

/// Canonical 24 character channel identifier, e.g. `UCJ0Y3WUgX0eqgQ76mz1PaFA`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    /// Returns `None` if `id` is not shaped like a channel ID
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        CHANNEL_ID_REGEX.is_match(id).then(|| Self(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn channel_url(&self) -> String {
        format!("https://youtube.com/channel/{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a user typed, once classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelInput {
    Id(ChannelId),
    /// Bare handle, without the leading `@`
    Handle(String),
}

/// Classifies a user-inputted handle / URL / channel ID
///
/// Accepts `@handle`, `handle`, `https://youtube.com/@handle/...`,
/// `https://youtube.com/channel/UC...` and a bare `UC...` channel ID.
///
/// # Errors
/// Errors when the input is empty or no handle is left after stripping
pub fn normalize_input(input: &str) -> Result<ChannelInput, ProbeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ProbeError::InvalidInput("empty channel input".to_string()));
    }

    let handle = if let Some(handle) = input.strip_prefix('@') {
        handle
    } else if input.contains("/@") {
        HANDLE_URL_REGEX
            .captures(input)
            .and_then(|c| c.get(1))
            .map_or("", |m| m.as_str())
    } else if let Some(c) = CHANNEL_URL_REGEX.captures(input) {
        let id = c.get(1).map_or("", |m| m.as_str());
        return Ok(ChannelInput::Id(ChannelId(id.to_string())));
    } else if let Some(id) = ChannelId::parse(input) {
        return Ok(ChannelInput::Id(id));
    } else {
        input
    };

    if handle.is_empty() {
        return Err(ProbeError::InvalidInput(format!(
            "unable to extract a channel handle from `{input}`"
        )));
    }

    Ok(ChannelInput::Handle(handle.to_string()))
}

/// Extracts a video ID out from a user-inputted URL string
///
/// # Errors
/// Errors when no video ID can be found
pub fn extract_video_id(input: &str) -> Result<String, ProbeError> {
    let input = input.trim();
    if VIDEO_ID_REGEX.is_match(input) {
        return Ok(input.to_string());
    }

    VIDEO_URL_REGEX
        .captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ProbeError::InvalidInput(format!("unable to parse video URL / ID `{input}`")))
}
