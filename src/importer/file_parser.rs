// ==========================================
// 设备组件库存核对系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: xlsx / xls / xlsb / ods（按内容自动识别,不看扩展名/MIME）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, RawRow};
use calamine::{open_workbook_auto_from_rs, Reader};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

// ==========================================
// 文件读取（唯一的异步边界）
// ==========================================

/// 读取用户选择的文件内容
///
/// # 返回
/// - Ok(Vec<u8>): 文件完整字节
/// - Err(ImportError::FileNotFound / FileRead): I/O 失败
pub async fn read_import_file<P: AsRef<Path>>(file_path: P) -> ImportResult<Vec<u8>> {
    let path = file_path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ImportError::FileNotFound(path.display().to_string()),
        _ => ImportError::FileRead(format!("{}: {}", path.display(), e)),
    })?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "导入文件读取完成");
    Ok(bytes)
}

// ==========================================
// WorkbookParser 实现
// ==========================================
pub struct WorkbookParser;

impl FileParser for WorkbookParser {
    fn parse_to_raw_records(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        // 打开工作簿（自动识别格式）
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        // 只读第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::MalformedFile("工作簿中没有工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）；空表返回空结果
        let mut rows = range.rows();
        let header_row = match rows.next() {
            Some(row) => row,
            None => {
                tracing::debug!(sheet = %sheet_name, "工作表为空");
                return Ok(Vec::new());
            }
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行
        let mut records = Vec::new();
        for data_row in rows {
            let mut row_map = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if header.is_empty() {
                        continue;
                    }
                    row_map.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(row_map);
        }

        tracing::debug!(sheet = %sheet_name, rows = records.len(), "工作表解析完成");
        Ok(records)
    }
}
