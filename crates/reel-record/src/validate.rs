//! Record-wide invariant checking.
//!
//! One ordered scan over the message sequence carries the whole state: the
//! set of seen tool-call ids, whether an `apply_patch` call appeared, and
//! whether any recorded command was a lint/test/build run. The scan is
//! fail-fast — a record is binary valid/invalid, and the first violation
//! carries enough context (call id, path, argument) to reproduce it.

use std::collections::HashSet;

use metrics::counter;
use reel_core::command::{ALLOWED_PROGRAM, CommandInvocation, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS};
use reel_core::message::{Message, SessionStatus, ToolName, TrainingRecord};
use reel_core::patch::PatchOperation;
use reel_grammar::{AllowedCommand, GrammarError, parse};
use serde_json::Value;

/// The first invariant a record broke.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Records need a preamble and a task statement at minimum.
    #[error("record has {count} messages, need at least 2")]
    TooFewMessages {
        /// Observed message count.
        count: usize,
    },
    /// Two tool calls share an id.
    #[error("duplicate tool call id {id:?}")]
    DuplicateToolCallId {
        /// The repeated id.
        id: String,
    },
    /// A tool result references an id no earlier call declared.
    #[error("tool result references unknown call id {id:?}")]
    OrphanToolResult {
        /// The dangling id.
        id: String,
    },
    /// More than one `apply_patch` call in one record.
    #[error("second apply_patch call {second:?} after {first:?}")]
    MultipleApplyPatch {
        /// Id of the call that was allowed.
        first: String,
        /// Id of the call that broke the limit.
        second: String,
    },
    /// A call's `arguments` string is not valid JSON.
    #[error("call {id:?}: arguments are not valid JSON: {detail}")]
    MalformedArguments {
        /// Offending call id.
        id: String,
        /// Underlying parse error text.
        detail: String,
    },
    /// A `run_cmd` argument vector outside the allowlist grammar.
    #[error("call {id:?}: {error}")]
    MalformedGrammar {
        /// Offending call id.
        id: String,
        /// Which grammar branch almost matched.
        error: GrammarError,
    },
    /// A patch operation or argument shape invariant broken.
    #[error("call {id:?}: {detail}")]
    SchemaViolation {
        /// Offending call id.
        id: String,
        /// What was wrong, naming the offending path or field.
        detail: String,
    },
    /// Declared status disagrees with the derivation.
    #[error("declared status {declared} but derivation yields {derived}")]
    StatusMismatch {
        /// Status the caller asserted.
        declared: SessionStatus,
        /// Status the record actually derives to.
        derived: SessionStatus,
    },
}

/// Facts the scan collects alongside validity, feeding status derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanOutcome {
    /// An `apply_patch` call was present.
    pub apply_patch: bool,
    /// Some `run_cmd` parsed to Lint, Test, or Build.
    pub check_run: bool,
}

/// Check every record invariant, failing on the first violation.
pub fn validate(record: &TrainingRecord) -> Result<(), Violation> {
    match scan(record) {
        Ok(_) => {
            counter!("records_validated_total", "outcome" => "valid").increment(1);
            Ok(())
        }
        Err(violation) => {
            counter!("records_validated_total", "outcome" => "invalid").increment(1);
            Err(violation)
        }
    }
}

/// The ordered scan shared by [`validate`] and status derivation.
pub(crate) fn scan(record: &TrainingRecord) -> Result<ScanOutcome, Violation> {
    if record.messages.len() < 2 {
        return Err(Violation::TooFewMessages {
            count: record.messages.len(),
        });
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut apply_patch_id: Option<&str> = None;
    let mut check_run = false;

    for message in &record.messages {
        match message {
            Message::AssistantToolCalls(calls) => {
                for call in calls {
                    if !seen.insert(&call.id) {
                        return Err(Violation::DuplicateToolCallId {
                            id: call.id.clone(),
                        });
                    }
                    let args = call.arguments_value().map_err(|err| {
                        Violation::MalformedArguments {
                            id: call.id.clone(),
                            detail: err.to_string(),
                        }
                    })?;
                    match call.function.name {
                        ToolName::ApplyPatch => {
                            if let Some(first) = apply_patch_id {
                                return Err(Violation::MultipleApplyPatch {
                                    first: first.to_string(),
                                    second: call.id.clone(),
                                });
                            }
                            check_apply_patch_args(&call.id, &args)?;
                            apply_patch_id = Some(&call.id);
                        }
                        ToolName::RunCmd => {
                            let command = check_run_cmd_args(&call.id, &args)?;
                            check_run |= command.is_check_run();
                        }
                        ToolName::RepoReadFile | ToolName::RepoSearch | ToolName::RepoListTree => {}
                    }
                }
            }
            Message::ToolResult { tool_call_id, .. } => {
                if !seen.contains(tool_call_id.as_str()) {
                    return Err(Violation::OrphanToolResult {
                        id: tool_call_id.clone(),
                    });
                }
            }
            Message::System(_) | Message::User(_) | Message::AssistantText(_) => {}
        }
    }

    Ok(ScanOutcome {
        apply_patch: apply_patch_id.is_some(),
        check_run,
    })
}

/// `apply_patch` arguments: `{data: {action: {operations: [...≥1]}}}`,
/// every operation shape-checked.
fn check_apply_patch_args(id: &str, args: &Value) -> Result<(), Violation> {
    let operations = args
        .get("data")
        .and_then(|data| data.get("action"))
        .and_then(|action| action.get("operations"))
        .and_then(Value::as_array)
        .ok_or_else(|| schema(id, "apply_patch arguments missing data.action.operations"))?;
    if operations.is_empty() {
        return Err(schema(id, "apply_patch operations must be non-empty"));
    }
    for operation in operations {
        let _ = PatchOperation::from_wire(operation).map_err(|err| schema(id, err.to_string()))?;
    }
    Ok(())
}

/// `run_cmd` arguments: invocation shape first, then the grammar.
fn check_run_cmd_args(id: &str, args: &Value) -> Result<AllowedCommand, Violation> {
    let invocation: CommandInvocation = serde_json::from_value(args.clone())
        .map_err(|err| schema(id, format!("run_cmd arguments malformed: {err}")))?;
    if invocation.cmd != ALLOWED_PROGRAM {
        return Err(schema(
            id,
            format!("program {:?} is not {ALLOWED_PROGRAM:?}", invocation.cmd),
        ));
    }
    if invocation.args.is_empty() {
        return Err(schema(id, "run_cmd args must be non-empty"));
    }
    if !invocation.timeout_in_range() {
        let ms = invocation.timeout_ms.unwrap_or_default();
        return Err(schema(
            id,
            format!("timeoutMs {ms} outside {MIN_TIMEOUT_MS}..={MAX_TIMEOUT_MS}"),
        ));
    }
    parse(&invocation.args).map_err(|error| Violation::MalformedGrammar {
        id: id.to_string(),
        error,
    })
}

fn schema(id: &str, detail: impl Into<String>) -> Violation {
    Violation::SchemaViolation {
        id: id.to_string(),
        detail: detail.into(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        apply_patch_call, read_call, record_with, result_for, run_cmd_call, seed_messages,
    };
    use assert_matches::assert_matches;
    use reel_core::message::ToolCall;
    use serde_json::json;

    #[test]
    fn minimal_record_is_valid() {
        let record = record_with(vec![]);
        assert_eq!(validate(&record), Ok(()));
    }

    #[test]
    fn single_message_record_rejected() {
        let record = TrainingRecord::new(vec![Message::System("s".to_string())]);
        assert_matches!(
            validate(&record),
            Err(Violation::TooFewMessages { count: 1 })
        );
    }

    #[test]
    fn full_session_shape_is_valid() {
        let record = record_with(vec![
            Message::AssistantToolCalls(vec![read_call("call_1", "src/a.ts")]),
            result_for("call_1", "const x = 1;"),
            Message::AssistantToolCalls(vec![apply_patch_call("call_2")]),
            result_for("call_2", "patch applied"),
            Message::AssistantToolCalls(vec![run_cmd_call("call_3", &["lint"])]),
            result_for("call_3", "lint passed"),
        ]);
        assert_eq!(validate(&record), Ok(()));
    }

    #[test]
    fn duplicate_id_rejected() {
        let record = record_with(vec![
            Message::AssistantToolCalls(vec![read_call("call_1", "a.ts")]),
            Message::AssistantToolCalls(vec![read_call("call_1", "b.ts")]),
        ]);
        assert_matches!(
            validate(&record),
            Err(Violation::DuplicateToolCallId { id }) if id == "call_1"
        );
    }

    #[test]
    fn duplicate_id_within_one_message_rejected() {
        let record = record_with(vec![Message::AssistantToolCalls(vec![
            read_call("call_1", "a.ts"),
            read_call("call_1", "b.ts"),
        ])]);
        assert_matches!(validate(&record), Err(Violation::DuplicateToolCallId { .. }));
    }

    #[test]
    fn orphan_result_rejected() {
        let record = record_with(vec![result_for("call_9", "output")]);
        assert_matches!(
            validate(&record),
            Err(Violation::OrphanToolResult { id }) if id == "call_9"
        );
    }

    #[test]
    fn result_before_its_call_rejected() {
        let record = record_with(vec![
            result_for("call_1", "early"),
            Message::AssistantToolCalls(vec![read_call("call_1", "a.ts")]),
        ]);
        assert_matches!(validate(&record), Err(Violation::OrphanToolResult { .. }));
    }

    #[test]
    fn second_apply_patch_rejected() {
        let record = record_with(vec![
            Message::AssistantToolCalls(vec![apply_patch_call("call_1")]),
            Message::AssistantToolCalls(vec![apply_patch_call("call_2")]),
        ]);
        assert_matches!(
            validate(&record),
            Err(Violation::MultipleApplyPatch { first, second })
                if first == "call_1" && second == "call_2"
        );
    }

    #[test]
    fn malformed_arguments_fail_the_call() {
        let mut call = read_call("call_1", "a.ts");
        call.function.arguments = "{not json".to_string();
        let record = record_with(vec![Message::AssistantToolCalls(vec![call])]);
        assert_matches!(
            validate(&record),
            Err(Violation::MalformedArguments { id, .. }) if id == "call_1"
        );
    }

    #[test]
    fn apply_patch_missing_operations_rejected() {
        let call = ToolCall::new("call_1", ToolName::ApplyPatch, &json!({"data": {}}));
        let record = record_with(vec![Message::AssistantToolCalls(vec![call])]);
        assert_matches!(
            validate(&record),
            Err(Violation::SchemaViolation { detail, .. })
                if detail.contains("data.action.operations")
        );
    }

    #[test]
    fn apply_patch_empty_operations_rejected() {
        let call = ToolCall::new(
            "call_1",
            ToolName::ApplyPatch,
            &json!({"data": {"action": {"operations": []}}}),
        );
        let record = record_with(vec![Message::AssistantToolCalls(vec![call])]);
        assert_matches!(
            validate(&record),
            Err(Violation::SchemaViolation { detail, .. }) if detail.contains("non-empty")
        );
    }

    #[test]
    fn apply_patch_bad_operation_shape_rejected() {
        // update without a hunk marker in its diff
        let call = ToolCall::new(
            "call_1",
            ToolName::ApplyPatch,
            &json!({"data": {"action": {"operations": [
                {"type": "update_file", "path": "a.ts", "diff": "-x\n+y\n"}
            ]}}}),
        );
        let record = record_with(vec![Message::AssistantToolCalls(vec![call])]);
        assert_matches!(
            validate(&record),
            Err(Violation::SchemaViolation { detail, .. }) if detail.contains("hunk marker")
        );
    }

    #[test]
    fn run_cmd_with_foreign_program_rejected() {
        let call = ToolCall::new(
            "call_1",
            ToolName::RunCmd,
            &json!({"cmd": "npm", "args": ["lint"]}),
        );
        let record = record_with(vec![Message::AssistantToolCalls(vec![call])]);
        assert_matches!(
            validate(&record),
            Err(Violation::SchemaViolation { detail, .. }) if detail.contains("npm")
        );
    }

    #[test]
    fn run_cmd_timeout_out_of_range_rejected() {
        let call = ToolCall::new(
            "call_1",
            ToolName::RunCmd,
            &json!({"cmd": "pnpm", "args": ["lint"], "timeoutMs": 0}),
        );
        let record = record_with(vec![Message::AssistantToolCalls(vec![call])]);
        assert_matches!(
            validate(&record),
            Err(Violation::SchemaViolation { detail, .. }) if detail.contains("timeoutMs")
        );
    }

    #[test]
    fn run_cmd_outside_grammar_rejected() {
        let record = record_with(vec![Message::AssistantToolCalls(vec![run_cmd_call(
            "call_1",
            &["publish"],
        )])]);
        assert_matches!(
            validate(&record),
            Err(Violation::MalformedGrammar { id, error: GrammarError::UnknownCommand(_) })
                if id == "call_1"
        );
    }

    #[test]
    fn run_cmd_mutually_exclusive_flags_rejected() {
        let record = record_with(vec![Message::AssistantToolCalls(vec![run_cmd_call(
            "call_1",
            &["--filter", "x", "-r"],
        )])]);
        assert_matches!(
            validate(&record),
            Err(Violation::MalformedGrammar {
                error: GrammarError::MutuallyExclusiveFlags,
                ..
            })
        );
    }

    #[test]
    fn first_violation_wins() {
        // duplicate id appears before the orphan result
        let record = record_with(vec![
            Message::AssistantToolCalls(vec![read_call("call_1", "a.ts")]),
            Message::AssistantToolCalls(vec![read_call("call_1", "b.ts")]),
            result_for("call_404", "orphaned"),
        ]);
        assert_matches!(validate(&record), Err(Violation::DuplicateToolCallId { .. }));
    }

    #[test]
    fn seed_messages_alone_validate() {
        let record = TrainingRecord::new(seed_messages());
        assert_eq!(validate(&record), Ok(()));
    }
}
