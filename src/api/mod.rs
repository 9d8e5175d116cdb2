// ==========================================
// 设备组件库存核对系统 - API层
// ==========================================
// 职责: 编辑会话（工作副本）、设备目录、错误映射
// 红线: 展示层只通过本层修改设备
// ==========================================

pub mod editor_session;
pub mod error;
pub mod tool_api;

// 重导出
pub use editor_session::{
    ComponentRowView, EditorSession, ImportOutcome, ImportTicket, SaveFailure, SessionKind,
    SessionView,
};
pub use error::{ApiError, ApiResult};
pub use tool_api::{ToolApi, ToolSummary};
