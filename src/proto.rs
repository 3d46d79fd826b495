//! Wire-level request/response shapes for the three exposed tools.
//!
//! These mirror the JSON-RPC-like envelope the surrounding server
//! speaks; `serde` gives us the (de)serialization.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::DiffError;

/// `openDiff` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenDiffRequest {
    /// Path to the file being diffed.
    pub old_file_path: PathBuf,
    /// Path the proposed content would be written to. Equal to
    /// `old_file_path` for every case except a rename, which this
    /// subsystem does not perform -- kept only because the wire
    /// contract names it separately.
    pub new_file_path: PathBuf,
    /// Proposed replacement content.
    pub new_file_contents: String,
    /// Unique name identifying this diff tab.
    pub tab_name: String,
}

/// `closeTab` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseTabRequest {
    /// The tab to close.
    pub tab_name: String,
}

/// One block of a tool reply's `content` array.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContentBlock {
    /// Always `"text"` for this subsystem's replies.
    #[serde(rename = "type")]
    pub kind: String,
    /// The block's text payload.
    pub text: String,
}

impl ContentBlock {
    fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// A successful tool reply: an ordered list of content blocks.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolReply {
    /// The reply's content blocks, in order.
    pub content: Vec<ContentBlock>,
}

impl ToolReply {
    /// `openDiff`'s accept reply: `FILE_SAVED` followed by final content.
    pub fn file_saved(final_contents: String) -> Self {
        Self {
            content: vec![
                ContentBlock::text("FILE_SAVED"),
                ContentBlock::text(final_contents),
            ],
        }
    }

    /// `openDiff`'s reject reply: `DIFF_REJECTED` followed by tab name.
    pub fn diff_rejected(tab_name: String) -> Self {
        Self {
            content: vec![
                ContentBlock::text("DIFF_REJECTED"),
                ContentBlock::text(tab_name),
            ],
        }
    }

    /// `closeTab`'s reply: a bare success marker.
    pub fn tab_closed() -> Self {
        Self {
            content: vec![ContentBlock::text("TAB_CLOSED")],
        }
    }

    /// `closeAllDiffTabs`'s reply: `CLOSED_<N>_DIFF_TABS`.
    pub fn closed_n_diff_tabs(n: usize) -> Self {
        Self {
            content: vec![ContentBlock::text(format!("CLOSED_{n}_DIFF_TABS"))],
        }
    }
}

/// The error envelope every tool can reply with instead of a `ToolReply`:
/// `{ code, message, data? }`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// Numeric error code, stable per `DiffError` variant.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional extra diagnostic payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl From<&DiffError> for ErrorEnvelope {
    fn from(err: &DiffError) -> Self {
        let code = match err {
            DiffError::UnsavedChanges { .. } => 1,
            DiffError::NoSuitableWindow => 2,
            DiffError::BufferCreationFailed { .. } => 3,
            DiffError::InternalError => 4,
            DiffError::SetupFailed { .. } => 5,
            DiffError::AlreadyRegistered { .. } => 6,
            DiffError::NotPending { .. } => 7,
            DiffError::NotFound { .. } => 8,
        };
        Self {
            code,
            message: err.to_string(),
            data: None,
        }
    }
}

impl From<DiffError> for ErrorEnvelope {
    fn from(err: DiffError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_saved_has_expected_blocks() {
        let reply = ToolReply::file_saved("hi".to_string());
        assert_eq!(reply.content[0].text, "FILE_SAVED");
        assert_eq!(reply.content[1].text, "hi");
    }

    #[test]
    fn closed_n_diff_tabs_formats_count() {
        let reply = ToolReply::closed_n_diff_tabs(3);
        assert_eq!(reply.content[0].text, "CLOSED_3_DIFF_TABS");
    }

    #[test]
    fn error_envelope_carries_stable_code() {
        let err = DiffError::NoSuitableWindow;
        let envelope = ErrorEnvelope::from(&err);
        assert_eq!(envelope.code, 2);
    }

    #[test]
    fn open_diff_request_deserializes_from_wire_json() {
        let json = r#"{
            "old_file_path": "/t/a.txt",
            "new_file_path": "/t/a.txt",
            "new_file_contents": "two\n",
            "tab_name": "tab1"
        }"#;
        let request: OpenDiffRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.tab_name, "tab1");
    }

    #[test]
    fn tool_reply_serializes_to_the_documented_content_array_shape() {
        let reply = ToolReply::tab_closed();
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "TAB_CLOSED");
    }

    #[test]
    fn error_envelope_omits_absent_data_field() {
        let envelope = ErrorEnvelope::from(&DiffError::NoSuitableWindow);
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("data").is_none());
    }
}
