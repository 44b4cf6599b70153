/// Producer-level configuration. Kept as an explicit record rather than a
/// grab-bag of constructor arguments, in the style of the rest of the
/// workspace's `*Config` types.
#[derive(Debug, Clone, Copy)]
pub struct ProducerConfig {
    /// How long to let a pending batch accumulate sends before flushing it.
    /// A value of zero means "flush on the next tick": the batch still
    /// coalesces whatever arrived in the current scheduling slice, but
    /// never waits beyond that for more.
    pub batch_delay_ms: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self { batch_delay_ms: 10 }
    }
}
