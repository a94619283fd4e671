pub mod batch;
pub mod runner;

pub use batch::JournalBatch;
pub use runner::{CollectorState, JournalCollector};
