// ==========================================
// 设备组件库存核对系统 - 引擎层
// ==========================================
// 职责: 组件合并、行操作、齐套判定、核对报表
// 红线: 无 I/O；判定结果为派生值,不缓存
// ==========================================

pub mod component_merge;
pub mod error;
pub mod stock_report;
pub mod stock_status;

// 重导出核心引擎
pub use component_merge::{ComponentMerger, ComponentRows, MergeSummary};
pub use error::{EngineError, EngineResult};
pub use stock_report::{StockReport, StockReportRow, REPORT_HEADERS};
pub use stock_status::{ReadinessGate, StockStatusCore, ToolReadiness};
