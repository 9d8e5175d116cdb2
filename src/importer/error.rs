// ==========================================
// 设备组件库存核对系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
///
/// 缺列不是错误：字段降级为 None,由齐套判定视为不足
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileRead(String),

    // ===== 格式错误 =====
    /// 无法按表格文件解码（xlsx/xls/xlsb/ods 均失败,或无工作表）
    #[error("表格文件无法解析: {0}")]
    MalformedFile(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为文件格式错误
    pub fn is_malformed(&self) -> bool {
        matches!(self, ImportError::MalformedFile(_))
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(err.to_string()),
            _ => ImportError::FileRead(err.to_string()),
        }
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::MalformedFile(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
