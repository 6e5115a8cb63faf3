use serde::Serialize;

/// Structured trace events emitted across all zweb crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionCreated {
        /// First eight characters of the session id only.
        session_prefix: String,
        sessions: usize,
    },
    ConditionReported {
        kind: String,
        detail: String,
    },
    DiagnosticsEnabled {
        verbose: bool,
    },
    ReplySent {
        seq: u64,
        status: u16,
        media_type: String,
        len: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "zw_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let ev = TraceEvent::ReplySent {
            seq: 7,
            status: 200,
            media_type: "text/html".into(),
            len: 12,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "ReplySent");
        assert_eq!(json["seq"], 7);
    }
}
