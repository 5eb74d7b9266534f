//! Channel configuration for outcome reporting

/// Channel buffer configuration for outcome reporting (workers -> aggregator)
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Status code channel buffer size
    pub status_buffer: usize,

    /// Error channel buffer size
    pub error_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            status_buffer: 10_000,
            error_buffer: 1_000,
        }
    }
}

impl ChannelConfig {
    /// Set the status channel buffer size
    pub fn with_status_buffer(mut self, size: usize) -> Self {
        self.status_buffer = size;
        self
    }

    /// Set the error channel buffer size
    pub fn with_error_buffer(mut self, size: usize) -> Self {
        self.error_buffer = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_config_default() {
        let config = ChannelConfig::default();
        assert_eq!(config.status_buffer, 10_000);
        assert_eq!(config.error_buffer, 1_000);
    }

    #[test]
    fn test_channel_config_builder() {
        let config = ChannelConfig::default()
            .with_status_buffer(5000)
            .with_error_buffer(8);
        assert_eq!(config.status_buffer, 5000);
        assert_eq!(config.error_buffer, 8);
    }
}
