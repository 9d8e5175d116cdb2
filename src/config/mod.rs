// ==========================================
// 设备组件库存核对系统 - 配置层
// ==========================================
// 职责: 核对行为配置（合并策略、空设备门禁、语言）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod reconcile_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use reconcile_config_trait::{ReconcileConfigReader, ReconcileSettings};
