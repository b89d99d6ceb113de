use tokio::sync::Mutex;

use crate::metrics::TELEMETRY_RECORDS;
use crate::models::TelemetryRecord;

/// Append-only, in-memory record list shared by all handlers.
///
/// Unbounded; only [`clear`](Self::clear) frees memory.
#[derive(Default)]
pub struct TelemetryStore {
    records: Mutex<Vec<TelemetryRecord>>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, record: TelemetryRecord) {
        let mut records = self.records.lock().await;
        records.push(record);
        TELEMETRY_RECORDS.set(records.len() as f64);
    }

    // Snapshot in ingestion order
    pub async fn all(&self) -> Vec<TelemetryRecord> {
        self.records.lock().await.clone()
    }

    pub async fn clear(&self) -> usize {
        let mut records = self.records.lock().await;
        let removed = records.len();
        records.clear();
        TELEMETRY_RECORDS.set(0.0);
        removed
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
