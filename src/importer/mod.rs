// ==========================================
// 设备组件库存核对系统 - 导入层
// ==========================================
// 职责: 外部表格文件 → 组件记录
// 支持: xlsx / xls / xlsb / ods（仅首个工作表）
// ==========================================

// 模块声明
pub mod component_importer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;

// 重导出核心类型
pub use component_importer::ComponentImporter;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{
    parse_count_text, ComponentFieldMapper, COLUMN_DESCRIPTION, COLUMN_NAME, COLUMN_QUANTITY,
    COLUMN_STOCK,
};
pub use file_parser::{read_import_file, WorkbookParser};

// 重导出 Trait 接口
pub use importer_trait::{FieldMapper, FileParser, RawRow};
