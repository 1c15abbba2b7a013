//! Queue configuration

/// Queue configuration options
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Number of groups of pictures to retain for late joiners
    pub max_gop_count: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { max_gop_count: 2 }
    }
}

impl QueueConfig {
    /// Set the retention target in GOPs
    pub fn max_gop_count(mut self, n: usize) -> Self {
        self.max_gop_count = n;
        self
    }
}
