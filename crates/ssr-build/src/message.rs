//! Line protocol spoken by the server build.
//!
//! The worker writes newline-delimited JSON objects to stdout. An object
//! with a `VUE_SSR_BUNDLE` key reports a finished server build; `null`
//! means the build produced no bundle. Anything else is build output.

use serde_json::{json, Value};

/// Key carrying the serialized server bundle.
pub const BUNDLE_KEY: &str = "VUE_SSR_BUNDLE";

/// One line read from a worker.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    /// A server bundle was built.
    Bundle(Value),
    /// The build finished without a bundle.
    EmptyBundle,
    /// A JSON message meant for someone else.
    Other(Value),
    /// Plain build output.
    Output(String),
}

impl WorkerMessage {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('{') {
            return Self::Output(line.to_string());
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(mut map)) => match map.remove(BUNDLE_KEY) {
                Some(Value::Null) => Self::EmptyBundle,
                Some(bundle) => Self::Bundle(bundle),
                None => Self::Other(Value::Object(map)),
            },
            _ => Self::Output(line.to_string()),
        }
    }

    /// Line a worker writes to report a build.
    pub fn bundle_line(bundle: Option<Value>) -> String {
        json!({ BUNDLE_KEY: bundle }).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_message() {
        let line = WorkerMessage::bundle_line(Some(json!({"entry": "main.js"})));

        assert_eq!(
            WorkerMessage::parse(&line),
            WorkerMessage::Bundle(json!({"entry": "main.js"}))
        );
    }

    #[test]
    fn test_null_bundle() {
        assert_eq!(
            WorkerMessage::parse(&WorkerMessage::bundle_line(None)),
            WorkerMessage::EmptyBundle
        );
    }

    #[test]
    fn test_foreign_messages() {
        assert_eq!(
            WorkerMessage::parse(r#"{"progress": 50}"#),
            WorkerMessage::Other(json!({"progress": 50}))
        );
        assert_eq!(
            WorkerMessage::parse("Compiled successfully in 812ms"),
            WorkerMessage::Output("Compiled successfully in 812ms".into())
        );
        assert_eq!(
            WorkerMessage::parse("{ not json"),
            WorkerMessage::Output("{ not json".into())
        );
    }
}
