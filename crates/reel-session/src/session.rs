//! The capture state machine.
//!
//! A [`Session`] is the Recording state made concrete: `start` seeds the
//! record, `observe_*` append tool-call/result pairs as the agent works, and
//! `finalize` compiles the workspace delta into the closing apply_patch
//! exchange before validating the whole record. Finalized and Discarded are
//! terminal — both consume the session, so the type system rules out
//! observing into a closed capture.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use metrics::counter;
use reel_core::command::{ALLOWED_PROGRAM, CommandInvocation};
use reel_core::message::{Message, SessionStatus, ToolCall, ToolName, TrainingRecord};
use reel_core::patch::PatchOperation;
use reel_core::text::cap_output;
use reel_diff::{
    FilterError, PathFilter, SkippedPath, TreeError, TreeSource, compile, parse_name_status,
};
use reel_grammar::{GrammarError, parse};
use reel_record::{RecordEnvelope, Violation, derive_status, validate};
use reel_redact::{redact_text, redact_value};
use reel_settings::ReelSettings;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result content recorded when a baseline read-back cannot be recovered.
pub const BASELINE_UNAVAILABLE: &str = "[content unavailable at baseline]";

/// System preamble seeding every record.
const CAPTURE_PREAMBLE: &str = "You are a coding agent working in a pnpm monorepo. \
Read files, run allowed pnpm commands, and apply one patch that completes the task.";

/// Errors from the session lifecycle.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Path filter globs in settings failed to compile.
    #[error("invalid path filter: {0}")]
    Filter(#[from] FilterError),
    /// Command used a program other than the allowed one.
    #[error("command uses program {0:?}, only \"pnpm\" is recordable")]
    WrongProgram(String),
    /// Command timeout outside the accepted range.
    #[error("timeoutMs {0} outside 1..=3600000")]
    TimeoutOutOfRange(u64),
    /// Command arguments were rejected by the grammar; nothing was recorded.
    #[error("command rejected: {0}")]
    CommandRejected(#[from] GrammarError),
    /// The tree source could not produce the change summary.
    #[error("tree source failed: {0}")]
    Tree(#[from] TreeError),
    /// Recorded arguments failed to encode.
    #[error("arguments failed to encode: {0}")]
    Encode(#[from] serde_json::Error),
    /// The finalized record failed validation.
    #[error("finalized record failed validation: {0}")]
    Invalid(#[from] Violation),
}

/// A recording capture session.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    workspace_root: PathBuf,
    base_ref: String,
    started_at: DateTime<Utc>,
    settings: ReelSettings,
    filter: PathFilter,
    messages: Vec<Message>,
    next_call: u64,
}

impl Session {
    /// Opens a session and seeds the record with the capture preamble and
    /// the caller's task statement.
    pub fn start(
        workspace_root: impl Into<PathBuf>,
        base_ref: impl Into<String>,
        task: &str,
        settings: ReelSettings,
    ) -> Result<Self, SessionError> {
        let workspace_root = workspace_root.into();
        let base_ref = base_ref.into();
        let filter = PathFilter::new(
            &settings.capture.path_filter.include,
            &settings.capture.path_filter.exclude,
        )?;
        let id = Uuid::now_v7();
        let preamble = format!(
            "{CAPTURE_PREAMBLE}\nworkspace: {}\nbase: {base_ref}",
            workspace_root.display()
        );
        let messages = vec![Message::System(preamble), Message::User(task.to_string())];

        info!(session_id = %id, base = %base_ref, "session started");
        counter!("sessions_started_total").increment(1);
        Ok(Self {
            id,
            workspace_root,
            base_ref,
            started_at: Utc::now(),
            settings,
            filter,
            messages,
            next_call: 0,
        })
    }

    /// Session id, assigned at start.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the capture started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Workspace the session records against.
    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Baseline git ref the final patch is computed from.
    #[must_use]
    pub fn base_ref(&self) -> &str {
        &self.base_ref
    }

    /// Messages recorded so far, seed included.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Records a `repo.readFile` call and its capped, redacted result.
    pub fn observe_read(&mut self, path: &str, output: &str) {
        let content = self.scrub(output);
        let call = ToolCall::new(
            self.next_id(),
            ToolName::RepoReadFile,
            &json!({"path": path}),
        );
        self.push_pair(call, content);
    }

    /// Records a `repo.search` call and its capped, redacted result.
    pub fn observe_search(&mut self, query: &str, output: &str) {
        let content = self.scrub(output);
        let call = ToolCall::new(
            self.next_id(),
            ToolName::RepoSearch,
            &json!({"query": query}),
        );
        self.push_pair(call, content);
    }

    /// Records a `repo.listTree` call and its capped, redacted result.
    pub fn observe_list(&mut self, path: &str, output: &str) {
        let content = self.scrub(output);
        let call = ToolCall::new(
            self.next_id(),
            ToolName::RepoListTree,
            &json!({"path": path}),
        );
        self.push_pair(call, content);
    }

    /// Records a `run_cmd` call with canonical arguments, or rejects it.
    ///
    /// The invocation is parsed through the command grammar first; on any
    /// rejection the error is returned and nothing enters the record. Env
    /// values pass through the redaction filter like captured output does.
    pub fn observe_command(
        &mut self,
        invocation: &CommandInvocation,
        captured_output: &str,
    ) -> Result<(), SessionError> {
        if invocation.cmd != ALLOWED_PROGRAM {
            counter!("session_commands_rejected_total", "reason" => "program").increment(1);
            return Err(SessionError::WrongProgram(invocation.cmd.clone()));
        }
        if let Some(timeout) = invocation.timeout_ms {
            if !invocation.timeout_in_range() {
                counter!("session_commands_rejected_total", "reason" => "timeout").increment(1);
                return Err(SessionError::TimeoutOutOfRange(timeout));
            }
        }
        let command = match parse(&invocation.args) {
            Ok(command) => command,
            Err(err) => {
                warn!(session_id = %self.id, %err, "command rejected, not recorded");
                counter!("session_commands_rejected_total", "reason" => "grammar").increment(1);
                return Err(SessionError::CommandRejected(err));
            }
        };
        counter!("session_commands_recorded_total", "verb" => command.verb()).increment(1);

        let recorded = CommandInvocation {
            cmd: invocation.cmd.clone(),
            args: command.canonical_args(),
            cwd: invocation.cwd.clone(),
            timeout_ms: invocation.timeout_ms,
            env: invocation.env.clone(),
        };
        let mut args = serde_json::to_value(&recorded)?;
        if self.settings.redaction.enabled {
            redact_value(&mut args);
        }

        let content = self.scrub(captured_output);
        let call = ToolCall::new(self.next_id(), ToolName::RunCmd, &args);
        self.push_pair(call, content);
        Ok(())
    }

    /// Closes the session: compiles the workspace delta, appends baseline
    /// read-backs and the apply_patch exchange, validates, derives status.
    ///
    /// A session whose delta compiles to zero operations finalizes without
    /// an apply_patch call and is necessarily a draft.
    pub fn finalize(mut self, tree: &dyn TreeSource) -> Result<FinalizedSession, SessionError> {
        let summary = tree.name_status()?;
        let changes = parse_name_status(&summary, &self.filter);
        let report = compile(&changes, tree);

        // Baseline read-backs for every path the patch deletes or rewrites,
        // so the pre-change content is part of the transcript.
        for operation in &report.operations {
            let path = match operation {
                PatchOperation::DeleteFile { path } | PatchOperation::UpdateFile { path, .. } => {
                    path.clone()
                }
                PatchOperation::CreateFile { .. } => continue,
            };
            let content = match tree.baseline_content(&path) {
                Ok(bytes) => self.scrub(&String::from_utf8_lossy(&bytes)),
                Err(err) => {
                    debug!(path, %err, "baseline content unavailable");
                    BASELINE_UNAVAILABLE.to_string()
                }
            };
            let call = ToolCall::new(
                self.next_id(),
                ToolName::RepoReadFile,
                &json!({"path": path}),
            );
            self.push_pair(call, content);
        }

        if !report.operations.is_empty() {
            let wire = json!({"data": {"action": {"operations": &report.operations}}});
            let content = format!(
                "applied {} operations ({} files changed)",
                report.operations.len(),
                report.file_changes
            );
            let call = ToolCall::new(self.next_id(), ToolName::ApplyPatch, &wire);
            self.push_pair(call, content);
        }

        let record = TrainingRecord::new(self.messages);
        validate(&record)?;
        let status = derive_status(&record)?;
        let finished_at = Utc::now();

        counter!("sessions_finalized_total", "status" => status.as_str()).increment(1);
        info!(
            session_id = %self.id,
            %status,
            file_changes = report.file_changes,
            skipped = report.skipped.len(),
            "session finalized"
        );
        Ok(FinalizedSession {
            session_id: self.id,
            status,
            started_at: self.started_at,
            finished_at,
            file_changes: report.file_changes,
            skipped: report.skipped,
            record,
        })
    }

    /// Abandons the capture; nothing is kept.
    pub fn discard(self) {
        info!(session_id = %self.id, messages = self.messages.len(), "session discarded");
        counter!("sessions_discarded_total").increment(1);
    }

    fn next_id(&mut self) -> String {
        self.next_call += 1;
        format!("call_{}", self.next_call)
    }

    fn push_pair(&mut self, call: ToolCall, content: String) {
        let tool_call_id = call.id.clone();
        self.messages.push(Message::AssistantToolCalls(vec![call]));
        self.messages.push(Message::ToolResult {
            tool_call_id,
            content,
        });
    }

    fn scrub(&self, output: &str) -> String {
        let capped = cap_output(output, self.settings.capture.output_cap_bytes);
        if self.settings.redaction.enabled {
            redact_text(&capped)
        } else {
            capped
        }
    }
}

/// The immutable product of a finalized session.
#[derive(Clone, Debug)]
pub struct FinalizedSession {
    /// Session id assigned at start.
    pub session_id: Uuid,
    /// Derived status.
    pub status: SessionStatus,
    /// When the capture started.
    pub started_at: DateTime<Utc>,
    /// When finalization completed.
    pub finished_at: DateTime<Utc>,
    /// Logical files changed by the compiled patch.
    pub file_changes: usize,
    /// Paths the compiler skipped, with reasons.
    pub skipped: Vec<SkippedPath>,
    /// The validated training record.
    pub record: TrainingRecord,
}

impl FinalizedSession {
    /// Store envelope for this session.
    #[must_use]
    pub fn envelope(&self) -> RecordEnvelope {
        RecordEnvelope {
            session_id: self.session_id,
            status: self.status,
            started_at: self.started_at,
            finished_at: self.finished_at,
            file_changes: self.file_changes,
            record: self.record.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
