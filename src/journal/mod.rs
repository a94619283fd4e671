pub mod cursor;
pub mod detector;
pub mod events;
pub mod reader;
pub mod unit;

pub use cursor::{split_cursor, Cursor, CursorStore, SplitOutput, CURSOR_MARKER_PREFIX};
pub use detector::ServiceDetector;
pub use events::{EventSink, TracingEventSink};
pub use reader::{JournalRead, JournalReader, ReadError};
pub use unit::Unit;
