use crate::domain::model::{MarksSnapshot, MarksUpdate, StudentRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// File names (not paths) directly under the storage root. A missing root
    /// is an empty listing.
    fn list_files(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Where `path` lives once written, for logging and responses.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn downloads_dir(&self) -> &str;
    fn keep_latest(&self) -> Option<usize>;
    fn json_logs(&self) -> bool;
    fn log_level(&self) -> &str;

    fn bind_address(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }
}

/// Holder of every student's marks. Handlers only see this trait, so a
/// persistent backend can replace the in-memory one without touching them.
#[async_trait]
pub trait MarksStore: Send + Sync {
    /// Writes one slot, creating the record if needed. Returns the record as
    /// it is after the write together with the whole store.
    async fn apply(&self, update: &MarksUpdate) -> Result<(StudentRecord, MarksSnapshot)>;
    async fn snapshot(&self) -> Result<MarksSnapshot>;
    async fn len(&self) -> Result<usize>;
}
