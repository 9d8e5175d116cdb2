// ==========================================
// 设备组件库存核对系统 - 设备存储 Trait
// ==========================================
// 职责: 定义设备持久化接口（不包含实现）
// 红线: Repository 不含业务规则,只做整文档 CRUD
// ==========================================

use crate::domain::Tool;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ToolStore Trait
// ==========================================
// 用途: 设备目录的外部存储边界
// 实现者: SqliteToolRepository（rusqlite）
#[async_trait]
pub trait ToolStore: Send + Sync {
    /// 查询全部设备
    async fn list(&self) -> RepositoryResult<Vec<Tool>>;

    /// 按 id 查询
    ///
    /// # 返回
    /// - Ok(None): 不存在
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Tool>>;

    /// 新建设备,由存储分配 id
    ///
    /// # 返回
    /// - Ok(Tool): 带 id 的已保存设备
    async fn create(&self, tool: &Tool) -> RepositoryResult<Tool>;

    /// 整体替换设备（含完整组件列表）
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    async fn update(&self, id: &str, tool: &Tool) -> RepositoryResult<Tool>;

    /// 删除设备
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}
