//! Shared test fixtures for validation and persistence tests.

use reel_core::message::{Message, ToolCall, ToolName, TrainingRecord};
use serde_json::json;

/// System preamble + user task, the minimum viable record head.
pub fn seed_messages() -> Vec<Message> {
    vec![
        Message::System("You are recording an editing session.".to_string()),
        Message::User("Fix the lint failures in src/.".to_string()),
    ]
}

/// A record starting with the seed messages.
pub fn record_with(tail: Vec<Message>) -> TrainingRecord {
    let mut messages = seed_messages();
    messages.extend(tail);
    TrainingRecord::new(messages)
}

/// A `repo.readFile` call.
pub fn read_call(id: &str, path: &str) -> ToolCall {
    ToolCall::new(id, ToolName::RepoReadFile, &json!({"path": path}))
}

/// A `run_cmd` call invoking `pnpm args...`.
pub fn run_cmd_call(id: &str, args: &[&str]) -> ToolCall {
    ToolCall::new(id, ToolName::RunCmd, &json!({"cmd": "pnpm", "args": args}))
}

/// An `apply_patch` call carrying one well-formed update operation.
pub fn apply_patch_call(id: &str) -> ToolCall {
    ToolCall::new(
        id,
        ToolName::ApplyPatch,
        &json!({"data": {"action": {"operations": [
            {"type": "update_file", "path": "src/a.ts", "diff": "@@ -1,1 +1,1 @@\n-old\n+new\n"}
        ]}}}),
    )
}

/// A tool result answering `id`.
pub fn result_for(id: &str, content: &str) -> Message {
    Message::ToolResult {
        tool_call_id: id.to_string(),
        content: content.to_string(),
    }
}
