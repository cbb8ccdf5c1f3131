use crate::core::export::{ExportArtifact, ExportFormat, Exporter};
use crate::core::speech::parse_spoken_command;
use crate::core::{MarksSnapshot, MarksStore, MarksUpdate, Storage, UpdateOutcome};
use crate::utils::error::Result;
use std::sync::Arc;

/// Ties the store, the aggregation rule and the exporter together. This is
/// what request handlers talk to.
pub struct MarksEngine<S: Storage> {
    store: Arc<dyn MarksStore>,
    exporter: Exporter<S>,
}

impl<S: Storage> MarksEngine<S> {
    pub fn new(store: Arc<dyn MarksStore>, exporter: Exporter<S>) -> Self {
        Self { store, exporter }
    }

    pub fn store(&self) -> &Arc<dyn MarksStore> {
        &self.store
    }

    pub async fn update(&self, update: MarksUpdate) -> Result<UpdateOutcome> {
        let (record, marks_data) = self.store.apply(&update).await?;
        let total = record.total();

        tracing::info!(
            "✏️ Roll {} {} = {} (total {})",
            update.roll_number,
            update.question,
            update.marks.value(),
            total
        );

        Ok(UpdateOutcome {
            success: true,
            marks_data,
            total,
        })
    }

    pub async fn update_from_speech(&self, transcript: &str) -> Result<UpdateOutcome> {
        let update = parse_spoken_command(transcript)?;
        self.update(update).await
    }

    pub async fn marks(&self) -> Result<MarksSnapshot> {
        self.store.snapshot().await
    }

    pub async fn export(&self, format: ExportFormat) -> Result<ExportArtifact> {
        let snapshot = self.store.snapshot().await?;
        tracing::info!(
            "📊 Exporting {} students as {}",
            snapshot.len(),
            format.extension()
        );
        self.exporter.export(&snapshot, format).await
    }
}
