//! Loading the participant table from its sources.

use moka::future::Cache;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::csv_io::write_snapshot;
use super::model::ParticipantRecord;
use super::normalizer::normalize;
use crate::google::{GoogleApiError, SheetSource};

/// Reads a sheet, normalizes it and refreshes the snapshot file.
/// A snapshot write failure is only logged.
pub async fn load_from_sheet(
    source: &dyn SheetSource,
    sheet_id: &str,
    snapshot: &Path,
) -> Result<Vec<ParticipantRecord>, GoogleApiError> {
    let table = source.fetch_table(sheet_id).await?;
    let records = normalize(&table);
    log::info!("Normalized {} participants from sheet {}", records.len(), sheet_id);

    match write_snapshot(snapshot, &records) {
        Ok(()) => log::debug!("Participant snapshot written to {}", snapshot.display()),
        Err(e) => log::warn!(
            "Could not write participant snapshot {}: {}",
            snapshot.display(),
            e
        ),
    }
    Ok(records)
}

/// Short-lived cache of normalized sheets for the signing kiosk.
#[derive(Clone)]
pub struct SheetCache {
    entries: Cache<String, Arc<Vec<ParticipantRecord>>>,
}

impl SheetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(64)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get_or_load(
        &self,
        source: &dyn SheetSource,
        sheet_id: &str,
        snapshot: &Path,
    ) -> Result<Arc<Vec<ParticipantRecord>>, GoogleApiError> {
        if let Some(records) = self.entries.get(sheet_id).await {
            log::debug!("Sheet cache hit for {}", sheet_id);
            return Ok(records);
        }

        let records = Arc::new(load_from_sheet(source, sheet_id, snapshot).await?);
        self.entries
            .insert(sheet_id.to_string(), records.clone())
            .await;
        Ok(records)
    }

    pub async fn invalidate(&self, sheet_id: &str) {
        self.entries.invalidate(sheet_id).await;
    }
}
