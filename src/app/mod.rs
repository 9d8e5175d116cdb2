// ==========================================
// 设备组件库存核对系统 - 应用层
// ==========================================
// 职责: 组装共享连接、配置与API,供命令行入口使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
