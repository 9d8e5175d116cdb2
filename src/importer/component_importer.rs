// ==========================================
// 设备组件库存核对系统 - 组件导入器
// ==========================================
// 职责: 字节缓冲 → 有序组件记录
// 流程: 阶段 0 文件解析 → 阶段 1 字段映射
// 红线: 无副作用；失败时不返回部分结果
// ==========================================

use crate::domain::Component;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::ComponentFieldMapper;
use crate::importer::file_parser::{read_import_file, WorkbookParser};
use crate::importer::importer_trait::{FieldMapper, FileParser};
use std::path::Path;

// ==========================================
// ComponentImporter
// ==========================================
pub struct ComponentImporter {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
}

impl ComponentImporter {
    /// 使用自定义解析器/映射器创建
    pub fn new(file_parser: Box<dyn FileParser>, field_mapper: Box<dyn FieldMapper>) -> Self {
        Self {
            file_parser,
            field_mapper,
        }
    }

    /// 将表格文件内容规范化为组件记录
    ///
    /// # 参数
    /// - bytes: 文件完整内容
    ///
    /// # 返回
    /// - Ok(Vec<Component>): 与工作表行顺序一致
    /// - Err(ImportError::MalformedFile): 无法解码
    pub fn normalize(&self, bytes: &[u8]) -> ImportResult<Vec<Component>> {
        let raw_records = self.file_parser.parse_to_raw_records(bytes)?;

        let components: Vec<Component> = raw_records
            .iter()
            .enumerate()
            // 行号从 2 开始（第 1 行为表头）
            .map(|(idx, row)| self.field_mapper.map_to_component(row, idx + 2))
            .collect();

        tracing::info!(count = components.len(), "组件记录规范化完成");
        Ok(components)
    }

    /// 读取文件并规范化
    pub async fn normalize_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<Component>> {
        let bytes = read_import_file(file_path).await?;
        self.normalize(&bytes)
    }
}

impl Default for ComponentImporter {
    fn default() -> Self {
        Self::new(Box::new(WorkbookParser), Box::new(ComponentFieldMapper))
    }
}
