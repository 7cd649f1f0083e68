//! Wire protocol for scene synchronization
//!
//! Messages are JSON with a lowercase `type` tag and a `data` payload:
//! `{"type": "add", "data": {...}}`. Unknown tags and malformed frames are
//! distinguished so the channel can skip the former and report the latter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scene::object::ObjectRecord;
use crate::sync::channel::SyncError;

/// Message from the server to the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Full scene snapshot; replaces all synchronized objects
    Sync(Vec<ObjectRecord>),
    /// Insert or replace one record
    Add(ObjectRecord),
    /// Remove the object with this id
    Remove(String),
    /// Make the object with this id visible
    Show(String),
    /// Hide the object with this id
    Hide(String),
}

impl ServerMessage {
    /// Decode one frame of text from the server.
    ///
    /// A frame that is valid JSON with an unrecognized `type` tag yields
    /// [`SyncError::UnknownMessage`]; anything else that fails to decode
    /// yields [`SyncError::InvalidFrame`].
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SyncError::InvalidFrame(e.to_string()))?;

        match serde_json::from_value(value.clone()) {
            Ok(message) => Ok(message),
            Err(e) => match value.get("type").and_then(Value::as_str) {
                Some(tag) if !KNOWN_TAGS.contains(&tag) => {
                    Err(SyncError::UnknownMessage(tag.to_string()))
                }
                _ => Err(SyncError::InvalidFrame(e.to_string())),
            },
        }
    }
}

const KNOWN_TAGS: [&str; 5] = ["sync", "add", "remove", "show", "hide"];

/// Request from the viewer to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientRequest {
    /// Ask for a full scene snapshot
    Sync,
}

impl ClientRequest {
    /// Encode as one frame of text
    pub fn encode(&self) -> String {
        // Serializing a unit-variant tagged enum cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_sync_with_record_list() {
        let frame = json!({
            "type": "sync",
            "data": [
                { "id": "a", "kind": "PointCloud", "name": "cloud",
                  "payload": { "points": [[0.0, 0.0, 0.0]] } },
                { "id": "b", "kind": "DefaultCube" },
            ],
        })
        .to_string();

        let ServerMessage::Sync(records) = ServerMessage::parse(&frame).unwrap() else {
            panic!("expected sync");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        // Absent name falls back to the default label.
        assert_eq!(records[1].name, "unnamed");
    }

    #[test]
    fn decodes_id_addressed_messages() {
        for (tag, expected) in [
            ("remove", ServerMessage::Remove("x".to_string())),
            ("show", ServerMessage::Show("x".to_string())),
            ("hide", ServerMessage::Hide("x".to_string())),
        ] {
            let frame = json!({ "type": tag, "data": "x" }).to_string();
            assert_eq!(ServerMessage::parse(&frame).unwrap(), expected);
        }
    }

    #[test]
    fn unknown_tag_is_distinguished_from_invalid_frame() {
        let frame = json!({ "type": "teleport", "data": "x" }).to_string();
        assert!(matches!(
            ServerMessage::parse(&frame),
            Err(SyncError::UnknownMessage(tag)) if tag == "teleport"
        ));

        assert!(matches!(
            ServerMessage::parse("not json"),
            Err(SyncError::InvalidFrame(_))
        ));

        // Known tag with the wrong data shape is invalid, not unknown.
        let frame = json!({ "type": "remove", "data": 7 }).to_string();
        assert!(matches!(
            ServerMessage::parse(&frame),
            Err(SyncError::InvalidFrame(_))
        ));
    }

    #[test]
    fn sync_request_encodes_with_type_tag() {
        let encoded = ClientRequest::Sync.encode();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["type"], "sync");
    }
}
