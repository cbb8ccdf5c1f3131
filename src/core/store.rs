use crate::core::{MarksSnapshot, MarksStore, MarksUpdate, StudentRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-lifetime store. Cloning shares the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarksStore {
    records: Arc<RwLock<MarksSnapshot>>,
}

impl InMemoryMarksStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarksStore for InMemoryMarksStore {
    async fn apply(&self, update: &MarksUpdate) -> Result<(StudentRecord, MarksSnapshot)> {
        let mut records = self.records.write().await;

        let record = records.entry(update.roll_number.clone()).or_insert_with(|| {
            tracing::debug!("Creating record for roll number {}", update.roll_number);
            StudentRecord::default()
        });
        record.set(update.question, update.marks);
        let record = record.clone();

        Ok((record, records.clone()))
    }

    async fn snapshot(&self) -> Result<MarksSnapshot> {
        Ok(self.records.read().await.clone())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Marks, Question};

    #[tokio::test]
    async fn test_apply_creates_record_lazily() {
        let store = InMemoryMarksStore::new();
        assert_eq!(store.len().await.unwrap(), 0);

        let update = MarksUpdate::new("101", 1, 8).unwrap();
        let (record, snapshot) = store.apply(&update).await.unwrap();

        assert_eq!(record.q1, Some(Marks::new(8).unwrap()));
        assert_eq!(record.q2, None);
        assert_eq!(snapshot.len(), 1);
        let stored = store.snapshot().await.unwrap();
        assert_eq!(stored.get("101"), Some(&record));
        assert_eq!(stored.get("102"), None);
    }

    #[tokio::test]
    async fn test_last_write_wins_per_slot() {
        let store = InMemoryMarksStore::new();
        for marks in [3, 9, 4] {
            store
                .apply(&MarksUpdate::new("7", 3, marks).unwrap())
                .await
                .unwrap();
        }
        store.apply(&MarksUpdate::new("7", 1, 2).unwrap()).await.unwrap();

        let record = store.snapshot().await.unwrap()["7"].clone();
        assert_eq!(record.get(Question::Q3).map(Marks::value), Some(4));
        assert_eq!(record.get(Question::Q1).map(Marks::value), Some(2));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryMarksStore::new();
        let other = store.clone();
        store.apply(&MarksUpdate::new("1", 2, 5).unwrap()).await.unwrap();

        assert_eq!(other.snapshot().await.unwrap(), store.snapshot().await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_updates_to_distinct_slots_all_land() {
        let store = InMemoryMarksStore::new();
        let mut handles = Vec::new();
        for question in 1..=4 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .apply(&MarksUpdate::new("55", question, question).unwrap())
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = store.snapshot().await.unwrap()["55"].clone();
        for question in Question::ALL {
            assert_eq!(
                record.get(question).map(Marks::value),
                Some(question.index())
            );
        }
    }
}
