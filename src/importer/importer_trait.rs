// ==========================================
// 设备组件库存核对系统 - 导入管道 Trait
// ==========================================
// 职责: 定义导入各阶段接口（不包含实现）
// 红线: 导入管道不修改任何设备状态,只产出记录
// ==========================================

use crate::domain::Component;
use crate::importer::error::ImportResult;
use std::collections::HashMap;

/// 原始行记录（列名 → 单元格文本）
pub type RawRow = HashMap<String, String>;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 字节缓冲 → 原始行记录（阶段 0）
// 实现者: WorkbookParser
pub trait FileParser: Send + Sync {
    /// 解析首个工作表为原始行记录
    ///
    /// # 参数
    /// - bytes: 文件完整内容
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 行记录,保持工作表行顺序
    /// - Err(ImportError::MalformedFile): 无法解码
    fn parse_to_raw_records(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 原始行 → Component（阶段 1）
// 实现者: ComponentFieldMapper
pub trait FieldMapper: Send + Sync {
    /// 将原始行映射为组件记录
    ///
    /// # 参数
    /// - row: 原始行记录
    /// - row_number: 工作表行号（1 起,含表头）,仅用于日志
    ///
    /// # 说明
    /// - 不补默认值,不拒绝行；缺列/非法值 → None
    fn map_to_component(&self, row: &RawRow, row_number: usize) -> Component;
}
