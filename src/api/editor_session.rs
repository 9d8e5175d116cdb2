// ==========================================
// 设备组件库存核对系统 - 编辑会话
// ==========================================
// 职责: 持有设备工作副本,承接行操作/文件导入/保存/取消
// 红线: 所有修改只作用于工作副本；保存失败时工作副本原样交还
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ReconcileSettings;
use crate::domain::{Component, ComponentField, MergePolicy, StockStatus, Tool};
use crate::engine::{
    ComponentMerger, ComponentRows, MergeSummary, ReadinessGate, StockStatusCore,
    ToolReadiness,
};
use crate::importer::{read_import_file, ComponentImporter};
use crate::repository::ToolStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, error, info, warn};

// ==========================================
// SessionKind - 会话类型
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    /// 尚未保存的新设备
    Draft,
    /// 已有设备的完整克隆
    Existing { tool_id: String },
}

// ==========================================
// ImportTicket / ImportOutcome - 代次标记的文件导入
// ==========================================
/// 一次文件选择对应的导入凭证
///
/// 只有与会话最新待处理代次一致的凭证才会被应用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket {
    generation: u64,
}

impl ImportTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportOutcome {
    Applied(MergeSummary),
    /// 已被更新的文件选择取代,结果被丢弃
    Stale { ticket: u64, latest: u64 },
}

// ==========================================
// SessionView - 展示层视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRowView {
    pub position: usize,
    pub component: Component,
    pub adequate: bool,
    pub status: StockStatus,
    pub label: String,
    pub background_color: String,
    pub text_color: String,
}

/// 工作副本 + 每行状态 + 设备级门禁,每次读取时重新派生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub tool: Tool,
    pub rows: Vec<ComponentRowView>,
    pub readiness: ToolReadiness,
}

// ==========================================
// EditorSession
// ==========================================
pub struct EditorSession {
    kind: SessionKind,
    working: Tool,
    settings: ReconcileSettings,
    importer: ComponentImporter,
    /// 已发出的最新导入代次
    latest_generation: u64,
    /// 等待结果的导入代次；None 表示没有进行中的导入
    pending_generation: Option<u64>,
}

impl EditorSession {
    /// 新建草稿会话
    ///
    /// # 参数
    /// - name: 设备名称（可为空,保存前可修改）
    /// - settings: 核对配置
    pub fn new_draft(name: &str, settings: ReconcileSettings) -> Self {
        info!(tool_name = name, "新建设备草稿");
        Self::with_parts(SessionKind::Draft, Tool::draft(name), settings)
    }

    /// 编辑已有设备（工作副本为完整克隆）
    ///
    /// # 返回
    /// - Err(InvalidInput): 设备没有 id
    pub fn edit_existing(tool: &Tool, settings: ReconcileSettings) -> ApiResult<Self> {
        let tool_id = tool
            .id
            .clone()
            .ok_or_else(|| ApiError::InvalidInput("设备尚未保存,无法进入编辑".to_string()))?;

        info!(
            tool_id = %tool_id,
            components = tool.components.len(),
            policy = %settings.edit_merge_policy,
            "打开设备编辑会话"
        );
        Ok(Self::with_parts(
            SessionKind::Existing { tool_id },
            tool.clone(),
            settings,
        ))
    }

    fn with_parts(kind: SessionKind, working: Tool, settings: ReconcileSettings) -> Self {
        Self {
            kind,
            working,
            settings,
            importer: ComponentImporter::default(),
            latest_generation: 0,
            pending_generation: None,
        }
    }

    /// 替换导入器（自定义解析器/映射器）
    pub fn with_importer(mut self, importer: ComponentImporter) -> Self {
        self.importer = importer;
        self
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn kind(&self) -> &SessionKind {
        &self.kind
    }

    pub fn is_draft(&self) -> bool {
        matches!(self.kind, SessionKind::Draft)
    }

    pub fn tool(&self) -> &Tool {
        &self.working
    }

    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    /// 本会话导入时使用的合并策略
    ///
    /// 草稿固定为整体替换,已有设备使用配置项（已保存的组件从不整体替换）
    pub fn import_policy(&self) -> MergePolicy {
        match (&self.kind, self.settings.edit_merge_policy) {
            (SessionKind::Draft, _) => MergePolicy::ReplaceAll,
            (SessionKind::Existing { .. }, MergePolicy::ReplaceAll) => MergePolicy::AppendAll,
            (SessionKind::Existing { .. }, policy) => policy,
        }
    }

    pub fn has_pending_import(&self) -> bool {
        self.pending_generation.is_some()
    }

    fn gate(&self) -> ReadinessGate {
        ReadinessGate::new(self.settings.empty_tool_eligible)
    }

    // ==========================================
    // 设备属性
    // ==========================================

    pub fn set_name(&mut self, name: &str) {
        self.working.name = name.to_string();
    }

    pub fn set_image(&mut self, image: Option<String>) {
        self.working.image = image;
    }

    // ==========================================
    // 行操作
    // ==========================================

    /// 修改第 index 行的单个字段
    pub fn edit_field(&mut self, index: usize, field: ComponentField, value: &str) -> ApiResult<()> {
        ComponentRows::edit_field(&mut self.working.components, index, field, value)?;
        Ok(())
    }

    /// 追加空白行,返回新行位置
    pub fn add_blank_row(&mut self) -> usize {
        let index = ComponentRows::append_blank(&mut self.working.components);
        debug!(index, "追加空白组件行");
        index
    }

    /// 删除第 index 行
    ///
    /// # 返回
    /// - Ok(Component): 被删除的行
    /// - Err(IndexOutOfRange): 越界,列表不变
    pub fn delete_row(&mut self, index: usize) -> ApiResult<Component> {
        Ok(ComponentRows::delete(&mut self.working.components, index)?)
    }

    /// 按名称设置库存
    ///
    /// # 返回
    /// - Ok(usize): 被修改的行数
    /// - Err(ComponentNotFound): 没有同名行
    pub fn set_stock_by_name(&mut self, name: &str, stock: u32) -> ApiResult<usize> {
        let touched = ComponentRows::set_stock_by_name(&mut self.working.components, name, stock)?;
        debug!(component = name, stock, touched, "按名称更新库存");
        Ok(touched)
    }

    // ==========================================
    // 文件导入
    // ==========================================

    /// 登记一次新的文件选择
    ///
    /// 之前发出但尚未应用的凭证随之失效
    pub fn begin_import(&mut self) -> ImportTicket {
        self.latest_generation += 1;
        self.pending_generation = Some(self.latest_generation);
        debug!(generation = self.latest_generation, "登记文件导入");
        ImportTicket {
            generation: self.latest_generation,
        }
    }

    /// 应用一次文件读取的结果
    ///
    /// # 参数
    /// - ticket: begin_import 返回的凭证
    /// - bytes: 文件完整内容
    ///
    /// # 返回
    /// - Ok(Applied): 已按会话策略并入工作副本
    /// - Ok(Stale): 凭证已过期,工作副本不变
    /// - Err(MalformedFile): 文件无法解析,工作副本不变
    pub fn apply_import(&mut self, ticket: ImportTicket, bytes: &[u8]) -> ApiResult<ImportOutcome> {
        if self.pending_generation != Some(ticket.generation) {
            warn!(
                ticket = ticket.generation,
                latest = self.latest_generation,
                "导入结果已过期,丢弃"
            );
            return Ok(ImportOutcome::Stale {
                ticket: ticket.generation,
                latest: self.latest_generation,
            });
        }

        self.pending_generation = None;
        let incoming = self.importer.normalize(bytes)?;

        let policy = self.import_policy();
        let summary = ComponentMerger::merge(&mut self.working.components, incoming, policy);

        info!(
            generation = ticket.generation,
            policy = %policy,
            appended = summary.appended,
            updated = summary.updated,
            replaced = summary.replaced,
            "导入已应用"
        );
        Ok(ImportOutcome::Applied(summary))
    }

    /// 导入内存中的文件内容（登记 + 应用）
    pub fn import_bytes(&mut self, bytes: &[u8]) -> ApiResult<ImportOutcome> {
        let ticket = self.begin_import();
        self.apply_import(ticket, bytes)
    }

    /// 读取文件并导入
    ///
    /// 读取失败时待处理代次被清除,工作副本不变
    pub async fn import_file<P: AsRef<Path>>(&mut self, file_path: P) -> ApiResult<ImportOutcome> {
        let ticket = self.begin_import();
        match read_import_file(file_path).await {
            Ok(bytes) => self.apply_import(ticket, &bytes),
            Err(e) => {
                if self.pending_generation == Some(ticket.generation) {
                    self.pending_generation = None;
                }
                Err(e.into())
            }
        }
    }

    // ==========================================
    // 派生视图（每次读取重新计算）
    // ==========================================

    pub fn readiness(&self) -> ToolReadiness {
        self.gate().evaluate(&self.working.components)
    }

    pub fn is_eligible(&self) -> bool {
        self.readiness().eligible
    }

    pub fn view(&self) -> SessionView {
        let rows = self
            .working
            .components
            .iter()
            .enumerate()
            .map(|(position, component)| {
                let status = StockStatusCore::status(component);
                ComponentRowView {
                    position,
                    component: component.clone(),
                    adequate: status == StockStatus::Adequate,
                    status,
                    label: crate::i18n::t(status.label_key()),
                    background_color: status.background_color().to_string(),
                    text_color: status.text_color().to_string(),
                }
            })
            .collect();

        SessionView {
            tool: self.working.clone(),
            rows,
            readiness: self.readiness(),
        }
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 保存工作副本
    ///
    /// - 草稿: create,由存储分配 id
    /// - 已有设备: update（整体替换）
    ///
    /// # 返回
    /// - Ok(Tool): 存储返回的设备
    /// - Err(SaveFailure): 存储拒绝；会话原样交还,可重试或取消
    pub async fn commit(self, store: &dyn ToolStore) -> Result<Tool, SaveFailure> {
        let result = match &self.kind {
            SessionKind::Draft => store.create(&self.working).await,
            SessionKind::Existing { tool_id } => store.update(tool_id, &self.working).await,
        };

        match result {
            Ok(saved) => {
                info!(
                    tool_id = saved.id.as_deref().unwrap_or_default(),
                    components = saved.components.len(),
                    "设备已保存"
                );
                Ok(saved)
            }
            Err(e) => {
                let error = ApiError::from(e);
                error!(error = %error, "设备保存失败,保留工作副本");
                Err(SaveFailure {
                    session: self,
                    error,
                })
            }
        }
    }

    /// 放弃工作副本
    pub fn cancel(self) {
        info!(tool_name = %self.working.name, "编辑会话已取消");
    }
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("kind", &self.kind)
            .field("working", &self.working)
            .field("settings", &self.settings)
            .field("latest_generation", &self.latest_generation)
            .field("pending_generation", &self.pending_generation)
            .finish()
    }
}

// ==========================================
// SaveFailure - 保存失败（交还会话）
// ==========================================
#[derive(Debug)]
pub struct SaveFailure {
    pub session: EditorSession,
    pub error: ApiError,
}

impl SaveFailure {
    pub fn into_parts(self) -> (EditorSession, ApiError) {
        (self.session, self.error)
    }
}

impl fmt::Display for SaveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for SaveFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConflictRule;
    use crate::importer::{FileParser, ImportError, ImportResult, RawRow};
    use std::collections::HashMap;

    // 以 "名称,数量,库存" 文本行模拟表格内容,绕开真实工作簿解码
    struct LinesParser;

    impl FileParser for LinesParser {
        fn parse_to_raw_records(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| ImportError::MalformedFile(e.to_string()))?;
            Ok(text
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|line| {
                    let cells: Vec<&str> = line.split(',').collect();
                    let mut row = HashMap::new();
                    row.insert("Nama Komponen".to_string(), cells[0].to_string());
                    row.insert("Quantity".to_string(), cells[1].to_string());
                    row.insert("Stock".to_string(), cells[2].to_string());
                    row
                })
                .collect())
        }
    }

    fn session_with_lines(session: EditorSession) -> EditorSession {
        session.with_importer(ComponentImporter::new(
            Box::new(LinesParser),
            Box::new(crate::importer::ComponentFieldMapper),
        ))
    }

    fn existing_tool() -> Tool {
        Tool {
            id: Some("tool-1".to_string()),
            name: "Drill".to_string(),
            image: None,
            components: vec![Component::new("A", 1, 1), Component::new("B", 2, 2)],
        }
    }

    fn names(session: &EditorSession) -> Vec<String> {
        session
            .tool()
            .components
            .iter()
            .map(|c| c.display_name().to_string())
            .collect()
    }

    #[test]
    fn test_existing_session_appends() {
        let mut session = session_with_lines(
            EditorSession::edit_existing(&existing_tool(), ReconcileSettings::default()).unwrap(),
        );

        let outcome = session.import_bytes(b"C,1,1\nD,1,0").unwrap();

        assert!(matches!(outcome, ImportOutcome::Applied(s) if s.appended == 2));
        assert_eq!(names(&session), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_draft_session_replaces() {
        let mut session =
            session_with_lines(EditorSession::new_draft("Saw", ReconcileSettings::default()));
        session.import_bytes(b"X,1,1").unwrap();
        session.import_bytes(b"Y,1,1\nZ,1,1").unwrap();

        assert_eq!(session.import_policy(), MergePolicy::ReplaceAll);
        assert_eq!(names(&session), vec!["Y", "Z"]);
    }

    #[test]
    fn test_existing_session_never_replaces_saved_rows() {
        let settings = ReconcileSettings {
            edit_merge_policy: MergePolicy::ReplaceAll,
            ..Default::default()
        };
        let mut session =
            session_with_lines(EditorSession::edit_existing(&existing_tool(), settings).unwrap());

        session.import_bytes(b"C,1,1").unwrap();

        assert_eq!(session.import_policy(), MergePolicy::AppendAll);
        assert_eq!(names(&session), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_configured_merge_policy_applies_to_existing() {
        let settings = ReconcileSettings {
            edit_merge_policy: MergePolicy::MergeByName(ConflictRule::SumQuantities),
            ..Default::default()
        };
        let mut session =
            session_with_lines(EditorSession::edit_existing(&existing_tool(), settings).unwrap());

        session.import_bytes(b"B,1,3").unwrap();

        assert_eq!(names(&session), vec!["A", "B"]);
        assert_eq!(session.tool().components[1].quantity, Some(3));
        assert_eq!(session.tool().components[1].stock, Some(5));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut session = session_with_lines(
            EditorSession::edit_existing(&existing_tool(), ReconcileSettings::default()).unwrap(),
        );

        let first = session.begin_import();
        let second = session.begin_import();

        let late = session.apply_import(second, b"NEW,1,1").unwrap();
        assert!(matches!(late, ImportOutcome::Applied(_)));

        let early = session.apply_import(first, b"OLD,1,1").unwrap();
        assert_eq!(early, ImportOutcome::Stale { ticket: 1, latest: 2 });
        assert_eq!(names(&session), vec!["A", "B", "NEW"]);
    }

    #[test]
    fn test_ticket_cannot_be_applied_twice() {
        let mut session =
            session_with_lines(EditorSession::new_draft("Saw", ReconcileSettings::default()));
        let ticket = session.begin_import();

        session.apply_import(ticket, b"X,1,1").unwrap();
        let again = session.apply_import(ticket, b"Y,1,1").unwrap();

        assert!(matches!(again, ImportOutcome::Stale { .. }));
        assert_eq!(names(&session), vec!["X"]);
    }

    #[test]
    fn test_malformed_import_leaves_copy_untouched() {
        let mut session = EditorSession::edit_existing(&existing_tool(), ReconcileSettings::default())
            .unwrap();

        let err = session.import_bytes(b"not a workbook").unwrap_err();

        assert!(matches!(err, ApiError::MalformedFile(_)));
        assert_eq!(session.tool(), &existing_tool());
        assert!(!session.has_pending_import());
    }

    #[test]
    fn test_row_operations_rederive_readiness() {
        let tool = Tool {
            id: Some("t".to_string()),
            name: "Press".to_string(),
            image: None,
            components: vec![Component::new("A", 1, 1), Component::new("B", 2, 1)],
        };
        let mut session = EditorSession::edit_existing(&tool, ReconcileSettings::default()).unwrap();
        assert!(!session.is_eligible());

        session.edit_field(1, ComponentField::Stock, "2").unwrap();
        assert!(session.is_eligible());

        let index = session.add_blank_row();
        assert_eq!(index, 2);
        // 空白行 0/0 视为齐套
        assert!(session.is_eligible());

        session.edit_field(2, ComponentField::Quantity, "abc").unwrap();
        assert!(!session.is_eligible());

        session.delete_row(2).unwrap();
        assert!(session.is_eligible());
        assert!(matches!(
            session.delete_row(9),
            Err(ApiError::IndexOutOfRange { index: 9, len: 2 })
        ));
    }

    #[test]
    fn test_view_reports_row_status() {
        let tool = Tool {
            id: Some("t".to_string()),
            name: "Press".to_string(),
            image: None,
            components: vec![Component::new("A", 5, 5), Component::new("B", 5, 4)],
        };
        let session = EditorSession::edit_existing(&tool, ReconcileSettings::default()).unwrap();

        let view = session.view();

        assert_eq!(view.rows.len(), 2);
        assert!(view.rows[0].adequate);
        assert_eq!(view.rows[1].status, StockStatus::Shortage);
        assert_eq!(view.rows[1].background_color, "#F8D7DA");
        assert!(!view.readiness.eligible);
        assert_eq!(view, session.view());
    }

    #[test]
    fn test_empty_draft_eligibility_follows_setting() {
        let allowed = EditorSession::new_draft("Empty", ReconcileSettings::default());
        assert!(allowed.is_eligible());

        let blocked = EditorSession::new_draft(
            "Empty",
            ReconcileSettings {
                empty_tool_eligible: false,
                ..Default::default()
            },
        );
        assert!(!blocked.is_eligible());
    }

    #[test]
    fn test_edit_existing_requires_id() {
        let err = EditorSession::edit_existing(&Tool::draft("x"), ReconcileSettings::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }
}
