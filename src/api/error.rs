// ==========================================
// 设备组件库存核对系统 - API层错误类型
// ==========================================
// 职责: 汇总导入/引擎/仓储错误,转换为面向操作员的消息
// ==========================================

use crate::engine::EngineError;
use crate::i18n::t_with_args;
use crate::importer::ImportError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// API层错误类型
///
/// 每个错误只终止触发它的那一次操作,不影响会话中的工作副本
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 导入错误
    // ==========================================
    /// 文件无法按表格解码；导入为空操作
    #[error("表格文件无法解析: {0}")]
    MalformedFile(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ==========================================
    // 行操作错误（前置条件违反）
    // ==========================================
    #[error("行位置越界: index={index}, len={len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("组件不存在: {0}")]
    ComponentNotFound(String),

    // ==========================================
    // 持久化错误
    // ==========================================
    /// 外部存储拒绝 create/update/delete；消息原样透传
    #[error("{0}")]
    Persistence(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 按当前语言生成操作员可读的消息
    pub fn user_message(&self) -> String {
        match self {
            ApiError::MalformedFile(detail) => {
                t_with_args("error.malformed_file", &[("detail", detail)])
            }
            ApiError::FileReadError(detail) => t_with_args("error.file_read", &[("detail", detail)]),
            ApiError::IndexOutOfRange { index, .. } => {
                t_with_args("error.index_out_of_range", &[("index", &index.to_string())])
            }
            ApiError::ComponentNotFound(detail) => {
                t_with_args("error.component_not_found", &[("detail", detail)])
            }
            ApiError::Persistence(detail) => t_with_args("error.persistence", &[("detail", detail)]),
            ApiError::NotFound(detail) => t_with_args("error.not_found", &[("detail", detail)]),
            ApiError::InvalidInput(detail) => {
                t_with_args("error.invalid_input", &[("detail", detail)])
            }
            ApiError::InternalError(detail) => t_with_args("error.internal", &[("detail", detail)]),
            ApiError::Other(err) => t_with_args("error.internal", &[("detail", &err.to_string())]),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MalformedFile(msg) => ApiError::MalformedFile(msg),
            ImportError::FileNotFound(path) => {
                ApiError::FileReadError(t_with_args("import.file_not_found", &[("path", &path)]))
            }
            ImportError::FileRead(msg) => ApiError::FileReadError(msg),
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::IndexOutOfRange { index, len } => ApiError::IndexOutOfRange { index, len },
            EngineError::ComponentNotFound(name) => ApiError::ComponentNotFound(name),
            EngineError::ReportWrite(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 存储侧的任何拒绝都作为持久化失败透传给操作员
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::Persistence(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
