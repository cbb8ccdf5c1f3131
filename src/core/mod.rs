pub mod aggregation;
pub mod engine;
pub mod export;
pub mod speech;
pub mod store;

pub use crate::domain::model::{
    ExportRow, Marks, MarksSnapshot, MarksUpdate, Question, StudentRecord, UpdateOutcome,
};
pub use crate::domain::ports::{ConfigProvider, MarksStore, Storage};
pub use crate::utils::error::Result;
