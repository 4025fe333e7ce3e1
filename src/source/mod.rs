pub mod discover;
pub mod reader;
pub mod record;

pub use reader::{FileStats, LogFileReader};
pub use record::{LogRecord, RowParseError, METRIC_COUNT};
