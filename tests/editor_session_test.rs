// ==========================================
// 编辑会话集成测试
// ==========================================
// 测试目标: 导入合并模式、过期导入、保存失败保留工作副本
// ==========================================


use device_stock::api::{ApiError, EditorSession, ImportOutcome};
use device_stock::config::ReconcileSettings;
use device_stock::domain::{Component, ConflictRule, MergePolicy, Tool};
use device_stock::repository::ToolStore;
use test_helpers::{component_sheet, write_temp_xlsx, MockToolStore};

fn saved_tool() -> Tool {
    Tool {
        id: Some("mock-existing".to_string()),
        name: "Kompresor".to_string(),
        image: Some("https://example.com/kompresor.png".to_string()),
        components: vec![Component::new("A", 1, 1), Component::new("B", 2, 2)],
    }
}

fn names(tool: &Tool) -> Vec<&str> {
    tool.components.iter().map(|c| c.display_name()).collect()
}

#[test]
fn test_existing_tool_import_appends_duplicates() {
    let mut session = EditorSession::edit_existing(&saved_tool(), ReconcileSettings::default())
        .unwrap();

    let outcome = session
        .import_bytes(&component_sheet(&[("B", 1.0, 1.0), ("C", 3.0, 1.0)]))
        .unwrap();

    assert!(matches!(outcome, ImportOutcome::Applied(summary) if summary.appended == 2));
    assert_eq!(names(session.tool()), vec!["A", "B", "B", "C"]);
    assert!(!session.is_eligible());
}

#[test]
fn test_draft_import_replaces_previous_import() {
    let mut session = EditorSession::new_draft("Genset", ReconcileSettings::default());

    session
        .import_bytes(&component_sheet(&[("X", 1.0, 1.0)]))
        .unwrap();
    session
        .import_bytes(&component_sheet(&[("Y", 1.0, 1.0), ("Z", 2.0, 2.0)]))
        .unwrap();

    assert_eq!(names(session.tool()), vec!["Y", "Z"]);
    assert!(session.is_eligible());
}

#[test]
fn test_merge_by_name_last_write_wins() {
    let settings = ReconcileSettings {
        edit_merge_policy: MergePolicy::MergeByName(ConflictRule::LastWriteWins),
        ..Default::default()
    };
    let mut session = EditorSession::edit_existing(&saved_tool(), settings).unwrap();

    session
        .import_bytes(&component_sheet(&[(" B ", 9.0, 4.0), ("C", 1.0, 1.0)]))
        .unwrap();

    let tool = session.tool();
    assert_eq!(names(tool), vec!["A", "B", "C"]);
    assert_eq!(tool.components[1].quantity, Some(9));
    assert_eq!(tool.components[1].stock, Some(4));
}

#[test]
fn test_superseded_file_selection_is_discarded() {
    let mut session = EditorSession::edit_existing(&saved_tool(), ReconcileSettings::default())
        .unwrap();

    let slow = session.begin_import();
    let fast = session.begin_import();

    let applied = session
        .apply_import(fast, &component_sheet(&[("Fast", 1.0, 1.0)]))
        .unwrap();
    let dropped = session
        .apply_import(slow, &component_sheet(&[("Slow", 1.0, 1.0)]))
        .unwrap();

    assert!(matches!(applied, ImportOutcome::Applied(_)));
    assert!(matches!(dropped, ImportOutcome::Stale { .. }));
    assert_eq!(names(session.tool()), vec!["A", "B", "Fast"]);
}

#[test]
fn test_malformed_file_is_a_no_op() {
    let mut session = EditorSession::edit_existing(&saved_tool(), ReconcileSettings::default())
        .unwrap();

    let err = session.import_bytes(b"\x00\x01\x02 not a spreadsheet").unwrap_err();

    assert!(matches!(err, ApiError::MalformedFile(_)));
    assert_eq!(session.tool(), &saved_tool());
}

#[tokio::test]
async fn test_import_file_from_disk() {
    let file = write_temp_xlsx(&component_sheet(&[("Fan", 2.0, 1.0)])).unwrap();
    let mut session = EditorSession::new_draft("Kipas", ReconcileSettings::default());

    session.import_file(file.path()).await.unwrap();

    assert_eq!(session.tool().components, vec![Component::new("Fan", 2, 1)]);
}

#[tokio::test]
async fn test_missing_file_keeps_working_copy() {
    let mut session = EditorSession::edit_existing(&saved_tool(), ReconcileSettings::default())
        .unwrap();

    let err = session
        .import_file("/nonexistent/komponen.xlsx")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::FileReadError(_)));
    assert!(!session.has_pending_import());
    assert_eq!(session.tool(), &saved_tool());
}

#[tokio::test]
async fn test_failed_save_returns_unchanged_session() {
    let store = MockToolStore::with_tools(vec![saved_tool()]);
    store.set_fail_writes(true);

    let mut session = EditorSession::edit_existing(&saved_tool(), ReconcileSettings::default())
        .unwrap();
    session.add_blank_row();
    session.set_stock_by_name("A", 10).unwrap();
    let edited = session.tool().clone();

    let failure = session.commit(&store).await.unwrap_err();

    assert!(matches!(failure.error, ApiError::Persistence(ref msg) if msg.contains("server unavailable")));
    assert_eq!(failure.session.tool(), &edited);
    assert_eq!(store.snapshot(), vec![saved_tool()]);

    // 恢复后用交还的会话重试
    store.set_fail_writes(false);
    let saved = failure.session.commit(&store).await.unwrap();

    assert_eq!(saved.components, edited.components);
    assert_eq!(store.find_by_id("mock-existing").await.unwrap(), Some(saved));
}

#[tokio::test]
async fn test_draft_commit_assigns_id() {
    let store = MockToolStore::new();
    let mut session = EditorSession::new_draft("Pompa", ReconcileSettings::default());
    session.import_bytes(&component_sheet(&[("Seal", 2.0, 2.0)])).unwrap();

    let saved = session.commit(&store).await.unwrap();

    assert_eq!(saved.id.as_deref(), Some("mock-1"));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_leaves_store_untouched() {
    let store = MockToolStore::with_tools(vec![saved_tool()]);
    let mut session = EditorSession::edit_existing(&saved_tool(), ReconcileSettings::default())
        .unwrap();
    session.delete_row(0).unwrap();

    session.cancel();

    assert_eq!(store.snapshot(), vec![saved_tool()]);
}

#[test]
fn test_empty_tool_eligibility_both_settings() {
    let mut open = EditorSession::new_draft("Kosong", ReconcileSettings::default());
    let mut strict = EditorSession::new_draft(
        "Kosong",
        ReconcileSettings {
            empty_tool_eligible: false,
            ..Default::default()
        },
    );

    assert!(open.is_eligible());
    assert!(!strict.is_eligible());

    open.add_blank_row();
    strict.add_blank_row();
    assert!(open.is_eligible());
    assert!(strict.is_eligible());
}
