// ==========================================
// 设备组件库存核对系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// 行位置越界（前置条件违反,不应由合法的界面操作触发）
    #[error("行位置越界: index={index}, len={len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("组件不存在: {0}")]
    ComponentNotFound(String),

    #[error("报表写出失败: {0}")]
    ReportWrite(String),
}

// 实现 From<csv::Error>
impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::ReportWrite(err.to_string())
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ReportWrite(err.to_string())
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
