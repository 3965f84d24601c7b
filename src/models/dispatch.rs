use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl DispatchConfig {
    /// A zero batch size is clamped to one.
    pub fn new(batch_size: usize, batch_delay_ms: u64) -> Self {
        Self {
            batch_size: batch_size.max(1),
            batch_delay: Duration::from_millis(batch_delay_ms),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_BATCH_DELAY_MS)
    }
}
