/// Destination for drained click deltas.
#[async_trait::async_trait]
pub trait ClickSink: Send + Sync {
    /// Apply staged per-id deltas to the authoritative totals in one bulk
    /// operation. Returns the number of records updated.
    async fn flush_clicks(&self, updates: Vec<(String, u64)>) -> anyhow::Result<u64>;
}
