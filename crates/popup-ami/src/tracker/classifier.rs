//! Internal/external channel classification.

use popup_core::config::ami::AmiConfig;

/// Table-driven classifier deciding whether a channel is an internal
/// extension.
///
/// Rules, first match wins:
/// 1. name contains an external-trunk marker: external
/// 2. name starts with the local-routing prefix: not internal
/// 3. name starts with an extension-technology prefix: internal
/// 4. anything else: not internal
#[derive(Debug, Clone, Default)]
pub struct ChannelClassifier {
    external_markers: Vec<String>,
    local_prefix: Option<String>,
    internal_prefixes: Vec<String>,
}

impl ChannelClassifier {
    /// Builds a classifier. Empty markers and prefixes are dropped since
    /// they would match every channel.
    pub fn new(
        external_markers: impl IntoIterator<Item = String>,
        local_prefix: impl Into<String>,
        internal_prefixes: impl IntoIterator<Item = String>,
    ) -> Self {
        let local_prefix = local_prefix.into();
        Self {
            external_markers: external_markers
                .into_iter()
                .filter(|m| !m.is_empty())
                .collect(),
            local_prefix: (!local_prefix.is_empty()).then_some(local_prefix),
            internal_prefixes: internal_prefixes
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Builds a classifier from the `[ami]` configuration section.
    pub fn from_config(config: &AmiConfig) -> Self {
        Self::new(
            config.external_trunks.iter().cloned(),
            config.local_prefix.clone(),
            config.internal_prefixes.iter().cloned(),
        )
    }

    /// Classifies a channel name.
    pub fn is_internal(&self, channel_name: &str) -> bool {
        if self
            .external_markers
            .iter()
            .any(|marker| channel_name.contains(marker.as_str()))
        {
            return false;
        }
        if let Some(local) = &self.local_prefix {
            if channel_name.starts_with(local.as_str()) {
                return false;
            }
        }
        self.internal_prefixes
            .iter()
            .any(|prefix| channel_name.starts_with(prefix.as_str()))
    }
}
