use tracing::warn;

/// Fire-and-forget sink for diagnostic events raised while collecting.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, fields: &[(&str, &str)]);
}

/// Emits events as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

fn field<'a>(fields: &[(&str, &'a str)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: &str, fields: &[(&str, &str)]) {
        let extra = fields
            .iter()
            .filter(|(key, _)| !matches!(*key, "unit" | "cursor_line"))
            .map(|(key, value)| format!("{}={:?}", key, value))
            .collect::<Vec<_>>()
            .join(" ");

        warn!(
            event = %event,
            unit = field(fields, "unit"),
            cursor_line = field(fields, "cursor_line"),
            extra = %extra,
            "Collector diagnostic event"
        );
    }
}
