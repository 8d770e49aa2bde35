pub mod engine;
pub mod scan;

pub use engine::{search_records, SearchReport, SkippedRecord};
pub use scan::{scan_records, SearchHit};
