//! End-to-end capture pipeline: live session through store and export.

use reel_core::command::CommandInvocation;
use reel_core::message::{Message, SessionStatus, ToolName};
use reel_diff::{CapturedTree, FsTree};
use reel_record::{RecordStore, export_records, import_records};
use reel_session::Session;
use reel_settings::ReelSettings;

fn pnpm(args: &[&str]) -> CommandInvocation {
    CommandInvocation::pnpm(args.iter().map(ToString::to_string).collect())
}

/// One modified file and one added test file, as an editor would capture it.
fn workspace_tree() -> CapturedTree {
    CapturedTree::new("M\tsrc/math.ts\nA\tsrc/math.test.ts\n")
        .with_diff(
            "src/math.ts",
            concat!(
                "diff --git a/src/math.ts b/src/math.ts\n",
                "@@ -1,3 +1,3 @@\n",
                " export function add(a: number, b: number) {\n",
                "-  return a - b;\n",
                "+  return a + b;\n",
                " }\n",
            ),
        )
        .with_baseline(
            "src/math.ts",
            "export function add(a: number, b: number) {\n  return a - b;\n}\n",
        )
        .with_current("src/math.test.ts", "import { add } from './math';\n")
}

fn result_contents(messages: &[Message]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::ToolResult { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn session_to_store_to_export_round_trips() {
    let mut session = Session::start(
        "/work/acme",
        "main",
        "Fix add() and cover it with a test.",
        ReelSettings::default(),
    )
    .unwrap();
    session.observe_read("src/math.ts", "export function add(a, b) { return a - b; }\n");
    session.observe_search("add(", "src/math.ts:1: export function add\n");
    session
        .observe_command(&pnpm(&["--filter", "web", "test"]), "2 passed\n")
        .unwrap();

    let finalized = session.finalize(&workspace_tree()).unwrap();
    assert_eq!(finalized.status, SessionStatus::Ready);
    assert_eq!(finalized.file_changes, 2);
    assert!(finalized.skipped.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path());
    store.append(&finalized.envelope()).unwrap();

    let stored = store.load_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].session_id, finalized.session_id);
    assert_eq!(stored[0].status, SessionStatus::Ready);
    assert_eq!(stored[0].record, finalized.record);

    let ndjson = export_records(stored.iter().map(|e| &e.record)).unwrap();
    let back = import_records(&ndjson).unwrap();
    assert_eq!(back, vec![finalized.record]);
}

#[test]
fn on_disk_capture_records_baseline_content_and_ordered_operations() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base");
    let tree = dir.path().join("tree");
    std::fs::create_dir_all(base.join("src")).unwrap();
    std::fs::create_dir_all(tree.join("src")).unwrap();
    std::fs::write(base.join("src/a.ts"), "const a = 1;\n").unwrap();
    std::fs::write(tree.join("src/a.ts"), "const a = 2;\n").unwrap();
    std::fs::write(base.join("src/old.ts"), "legacy\n").unwrap();

    let source =
        FsTree::new("M\tsrc/a.ts\nD\tsrc/old.ts\n", &tree).with_baseline_root(&base);
    let session =
        Session::start(&tree, "HEAD", "Clean up src.", ReelSettings::default()).unwrap();
    let finalized = session.finalize(&source).unwrap();

    // No check run was observed, so this capture is a draft.
    assert_eq!(finalized.status, SessionStatus::Draft);
    assert_eq!(finalized.file_changes, 2);

    // Baseline read-backs precede the patch, in operation order.
    let contents = result_contents(&finalized.record.messages);
    assert_eq!(contents[0], "legacy\n");
    assert_eq!(contents[1], "const a = 1;\n");

    let patch = finalized
        .record
        .tool_calls()
        .find(|c| c.function.name == ToolName::ApplyPatch)
        .unwrap();
    let args = patch.arguments_value().unwrap();
    let operations = args["data"]["action"]["operations"].as_array().unwrap();
    assert_eq!(operations.len(), 2);
    assert_eq!(operations[0]["type"], "delete_file");
    assert_eq!(operations[0]["path"], "src/old.ts");
    assert_eq!(operations[1]["type"], "update_file");
    assert!(
        operations[1]["diff"]
            .as_str()
            .unwrap()
            .contains("-const a = 1;")
    );
}

#[test]
fn rejected_commands_leave_no_trace_in_the_final_record() {
    let mut session = Session::start(
        "/work/acme",
        "main",
        "Run the checks.",
        ReelSettings::default(),
    )
    .unwrap();
    assert!(
        session
            .observe_command(&pnpm(&["--filter", "web", "-r", "lint"]), "never ran")
            .is_err()
    );
    session.observe_command(&pnpm(&["lint"]), "clean\n").unwrap();

    let finalized = session.finalize(&workspace_tree()).unwrap();
    assert_eq!(finalized.status, SessionStatus::Ready);

    let commands: Vec<_> = finalized
        .record
        .tool_calls()
        .filter(|c| c.function.name == ToolName::RunCmd)
        .collect();
    assert_eq!(commands.len(), 1);
    assert_eq!(
        commands[0].arguments_value().unwrap()["args"],
        serde_json::json!(["lint"])
    );
}

#[test]
fn secrets_and_oversize_output_never_reach_the_store_file() {
    let mut settings = ReelSettings::default();
    settings.capture.output_cap_bytes = 128;
    let mut session =
        Session::start("/work/acme", "main", "Inspect the registry config.", settings).unwrap();
    session.observe_read(
        ".npmrc",
        "//registry.npmjs.org/:_authToken=deadbeefcafe0123\n",
    );
    session.observe_read("build.log", &"x".repeat(4096));

    let finalized = session.finalize(&CapturedTree::new("")).unwrap();
    assert_eq!(finalized.status, SessionStatus::Draft);

    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path());
    store.append(&finalized.envelope()).unwrap();

    let raw = std::fs::read_to_string(store.records_path()).unwrap();
    assert!(!raw.contains("deadbeefcafe0123"));
    assert!(raw.contains("[REDACTED]"));
    assert!(raw.contains("[output truncated]"));
}
