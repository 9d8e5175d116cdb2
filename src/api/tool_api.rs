// ==========================================
// 设备组件库存核对系统 - 设备目录API
// ==========================================
// 职责: 设备查询/删除、打开编辑会话、保存会话
// ==========================================

use crate::api::editor_session::{EditorSession, SaveFailure};
use crate::api::error::{ApiError, ApiResult};
use crate::config::{ReconcileConfigReader, ReconcileSettings};
use crate::domain::Tool;
use crate::engine::{ReadinessGate, StockReport, ToolReadiness};
use crate::repository::ToolStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// 设备列表项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub component_count: usize,
    pub readiness: ToolReadiness,
}

/// 设备目录API
pub struct ToolApi {
    store: Arc<dyn ToolStore>,
    config: Arc<dyn ReconcileConfigReader>,
}

impl ToolApi {
    pub fn new(store: Arc<dyn ToolStore>, config: Arc<dyn ReconcileConfigReader>) -> Self {
        Self { store, config }
    }

    /// 读取当前核对配置
    pub async fn settings(&self) -> ApiResult<ReconcileSettings> {
        self.config
            .load_settings()
            .await
            .map_err(|e| ApiError::InternalError(format!("读取配置失败: {}", e)))
    }

    /// 查询全部设备及其齐套状态
    pub async fn list_tools(&self) -> ApiResult<Vec<ToolSummary>> {
        let gate = ReadinessGate::new(self.settings().await?.empty_tool_eligible);
        let tools = self.store.list().await?;

        Ok(tools
            .into_iter()
            .map(|tool| ToolSummary {
                readiness: gate.evaluate(&tool.components),
                component_count: tool.components.len(),
                id: tool.id.unwrap_or_default(),
                name: tool.name,
                image: tool.image,
            })
            .collect())
    }

    /// 按 id 查询设备
    ///
    /// # 返回
    /// - Err(NotFound): 不存在
    pub async fn get_tool(&self, id: &str) -> ApiResult<Tool> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Tool(id={})", id)))
    }

    /// 按名称查询（返回第一个名称完全一致的设备）
    pub async fn find_tool_by_name(&self, name: &str) -> ApiResult<Option<Tool>> {
        let tools = self.store.list().await?;
        Ok(tools.into_iter().find(|t| t.name == name))
    }

    /// 按 id 或名称定位设备
    ///
    /// 先按 id 查找,未命中时按名称查找
    pub async fn resolve_tool(&self, key: &str) -> ApiResult<Tool> {
        if let Some(tool) = self.store.find_by_id(key).await? {
            return Ok(tool);
        }
        self.find_tool_by_name(key)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Tool({})", key)))
    }

    /// 已保存设备的库存报表（只读,不打开编辑会话）
    pub async fn stock_report(&self, key: &str) -> ApiResult<StockReport> {
        let tool = self.resolve_tool(key).await?;
        let gate = ReadinessGate::new(self.settings().await?.empty_tool_eligible);
        Ok(StockReport::build(&tool, &gate))
    }

    /// 新建草稿会话
    pub async fn new_draft(&self, name: &str) -> ApiResult<EditorSession> {
        Ok(EditorSession::new_draft(name, self.settings().await?))
    }

    /// 打开已有设备的编辑会话
    pub async fn open_editor(&self, key: &str) -> ApiResult<EditorSession> {
        let tool = self.resolve_tool(key).await?;
        EditorSession::edit_existing(&tool, self.settings().await?)
    }

    /// 保存会话
    pub async fn save(&self, session: EditorSession) -> Result<Tool, SaveFailure> {
        session.commit(self.store.as_ref()).await
    }

    /// 删除设备
    pub async fn delete_tool(&self, key: &str) -> ApiResult<Tool> {
        let tool = self.resolve_tool(key).await?;
        let id = tool.id.clone().unwrap_or_default();

        if let Err(e) = self.store.delete(&id).await {
            error!(tool_id = %id, error = %e, "设备删除失败");
            return Err(e.into());
        }

        info!(tool_id = %id, tool_name = %tool.name, "设备已删除");
        Ok(tool)
    }
}
