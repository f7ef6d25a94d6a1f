//! Training-record message types.
//!
//! These match the TypeScript extension's wire format for records
//! (camelCase keys, OpenAI-style tool calls with JSON-encoded arguments),
//! so a record produced here round-trips byte-compatibly through the
//! storage and export layers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Tool names
// ─────────────────────────────────────────────────────────────────────────────

/// The closed set of tool names a record may contain.
///
/// Deserialization fails on any other name — records are binary
/// valid/invalid, so an unknown tool is a schema error, not a passthrough.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolName {
    /// Read one file from the repository.
    #[serde(rename = "repo.readFile")]
    RepoReadFile,
    /// Search repository contents.
    #[serde(rename = "repo.search")]
    RepoSearch,
    /// List a directory tree.
    #[serde(rename = "repo.listTree")]
    RepoListTree,
    /// Run an allowlisted shell command.
    #[serde(rename = "run_cmd")]
    RunCmd,
    /// Apply the session's compiled patch set.
    #[serde(rename = "apply_patch")]
    ApplyPatch,
}

/// All tool names, for iteration in tests and docs.
pub const ALL_TOOL_NAMES: [ToolName; 5] = [
    ToolName::RepoReadFile,
    ToolName::RepoSearch,
    ToolName::RepoListTree,
    ToolName::RunCmd,
    ToolName::ApplyPatch,
];

impl ToolName {
    /// Wire string for this tool name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RepoReadFile => "repo.readFile",
            Self::RepoSearch => "repo.search",
            Self::RepoListTree => "repo.listTree",
            Self::RunCmd => "run_cmd",
            Self::ApplyPatch => "apply_patch",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool calls
// ─────────────────────────────────────────────────────────────────────────────

/// The function half of a tool call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool being invoked.
    pub name: ToolName,
    /// JSON-encoded arguments (a string containing JSON, not a nested object).
    pub arguments: String,
}

/// One tool call inside an assistant message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID, unique within a record.
    pub id: String,
    /// Always "function".
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function being called.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Build a tool call, JSON-encoding `arguments` into the wire string.
    #[must_use]
    pub fn new(id: impl Into<String>, name: ToolName, arguments: &Value) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name,
                arguments: arguments.to_string(),
            },
        }
    }

    /// Decode the JSON-encoded arguments string.
    pub fn arguments_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.function.arguments)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Why a wire message failed to decode into a [`Message`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MessageShapeError {
    /// Role string outside {system, user, assistant, tool}.
    #[error("unknown role: {0}")]
    UnknownRole(String),
    /// Required `content` field missing for this role.
    #[error("{0} message missing content")]
    MissingContent(&'static str),
    /// Assistant message carries both `content` and `toolCalls`.
    #[error("assistant message carries both content and toolCalls")]
    AmbiguousAssistant,
    /// Assistant `toolCalls` array present but empty.
    #[error("assistant toolCalls must be non-empty")]
    EmptyToolCalls,
    /// `toolCalls` on a role that cannot carry them.
    #[error("{0} message carries toolCalls")]
    UnexpectedToolCalls(&'static str),
    /// `toolCallId` on a role that cannot carry it.
    #[error("{0} message carries toolCallId")]
    UnexpectedToolCallId(&'static str),
    /// Tool message missing its `toolCallId`.
    #[error("tool message missing toolCallId")]
    MissingToolCallId,
}

/// One message in a training record.
///
/// The variants are disjoint by construction: an assistant message is either
/// prose or tool calls, never both. The wire shape (see [`WireMessage`]) is a
/// single role-tagged object; decoding enforces the per-role field rules and
/// fails with [`MessageShapeError`] on violations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireMessage", into = "WireMessage")]
pub enum Message {
    /// Capture preamble.
    System(String),
    /// The task statement.
    User(String),
    /// Assistant prose.
    AssistantText(String),
    /// Assistant tool calls (non-empty).
    AssistantToolCalls(Vec<ToolCall>),
    /// Output for an earlier tool call.
    ToolResult {
        /// ID of the call this result answers.
        tool_call_id: String,
        /// Captured output, already capped and redacted.
        content: String,
    },
}

impl Message {
    /// Wire role string for this message.
    #[must_use]
    pub fn role(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::User(_) => "user",
            Self::AssistantText(_) | Self::AssistantToolCalls(_) => "assistant",
            Self::ToolResult { .. } => "tool",
        }
    }

    /// Tool calls carried by this message, if any.
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::AssistantToolCalls(calls) => calls,
            _ => &[],
        }
    }
}

/// Flat wire shape shared by all message roles.
///
/// `{role, content?, toolCalls?, toolCallId?}` — which fields are required
/// or forbidden depends on the role; [`Message`]'s `TryFrom` enforces that.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    /// Message role: system, user, assistant, or tool.
    pub role: String,
    /// Text content (required except for tool-call assistant messages).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls (assistant only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Referenced call ID (tool role only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl TryFrom<WireMessage> for Message {
    type Error = MessageShapeError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let WireMessage {
            role,
            content,
            tool_calls,
            tool_call_id,
        } = wire;
        match role.as_str() {
            "system" | "user" => {
                let name: &'static str = if role == "system" { "system" } else { "user" };
                if tool_calls.is_some() {
                    return Err(MessageShapeError::UnexpectedToolCalls(name));
                }
                if tool_call_id.is_some() {
                    return Err(MessageShapeError::UnexpectedToolCallId(name));
                }
                let text = content.ok_or(MessageShapeError::MissingContent(name))?;
                if name == "system" {
                    Ok(Self::System(text))
                } else {
                    Ok(Self::User(text))
                }
            }
            "assistant" => {
                if tool_call_id.is_some() {
                    return Err(MessageShapeError::UnexpectedToolCallId("assistant"));
                }
                match (content, tool_calls) {
                    (Some(_), Some(_)) => Err(MessageShapeError::AmbiguousAssistant),
                    (Some(text), None) => Ok(Self::AssistantText(text)),
                    (None, Some(calls)) => {
                        if calls.is_empty() {
                            Err(MessageShapeError::EmptyToolCalls)
                        } else {
                            Ok(Self::AssistantToolCalls(calls))
                        }
                    }
                    (None, None) => Err(MessageShapeError::MissingContent("assistant")),
                }
            }
            "tool" => {
                if tool_calls.is_some() {
                    return Err(MessageShapeError::UnexpectedToolCalls("tool"));
                }
                let tool_call_id = tool_call_id.ok_or(MessageShapeError::MissingToolCallId)?;
                let content = content.ok_or(MessageShapeError::MissingContent("tool"))?;
                Ok(Self::ToolResult {
                    tool_call_id,
                    content,
                })
            }
            other => Err(MessageShapeError::UnknownRole(other.to_string())),
        }
    }
}

impl From<Message> for WireMessage {
    fn from(msg: Message) -> Self {
        match msg {
            Message::System(text) => Self {
                role: "system".to_string(),
                content: Some(text),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::User(text) => Self {
                role: "user".to_string(),
                content: Some(text),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::AssistantText(text) => Self {
                role: "assistant".to_string(),
                content: Some(text),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::AssistantToolCalls(calls) => Self {
                role: "assistant".to_string(),
                content: None,
                tool_calls: Some(calls),
                tool_call_id: None,
            },
            Message::ToolResult {
                tool_call_id,
                content,
            } => Self {
                role: "tool".to_string(),
                content: Some(content),
                tool_calls: None,
                tool_call_id: Some(tool_call_id),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records and status
// ─────────────────────────────────────────────────────────────────────────────

/// An ordered message sequence forming one training example.
///
/// Construction does not validate — the record validator owns the
/// structural invariants (id uniqueness, result ordering, apply_patch
/// cardinality) and is re-run before storage and after import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Ordered messages.
    pub messages: Vec<Message>,
}

impl TrainingRecord {
    /// Wrap a message sequence.
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Iterate all tool calls in message order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.messages.iter().flat_map(|m| m.tool_calls().iter())
    }
}

/// Session quality classification, derived from record contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Patch missing, or never checked by a lint/test/build run.
    Draft,
    /// Patch present and checked by a lint/test/build run.
    Ready,
}

impl SessionStatus {
    /// Wire string for this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
