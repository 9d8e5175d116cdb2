// ==========================================
// 设备组件库存核对系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod tool;
pub mod types;

// 重导出核心类型
pub use tool::{Component, ComponentField, Tool};
pub use types::{ConflictRule, MergePolicy, StockStatus};
