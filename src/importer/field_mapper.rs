// ==========================================
// 设备组件库存核对系统 - 字段映射器实现
// ==========================================
// 职责: 源列 → 组件字段映射 + 数值转换
// 列名契约（精确匹配,区分大小写）:
//   Nama Komponen → name
//   Quantity      → quantity
//   Stock         → stock
//   Deskripsi     → description
// ==========================================

use crate::domain::Component;
use crate::importer::importer_trait::{FieldMapper as FieldMapperTrait, RawRow};

pub const COLUMN_NAME: &str = "Nama Komponen";
pub const COLUMN_QUANTITY: &str = "Quantity";
pub const COLUMN_STOCK: &str = "Stock";
pub const COLUMN_DESCRIPTION: &str = "Deskripsi";

pub struct ComponentFieldMapper;

impl FieldMapperTrait for ComponentFieldMapper {
    fn map_to_component(&self, row: &RawRow, row_number: usize) -> Component {
        Component {
            name: self.get_string(row, COLUMN_NAME),
            quantity: self.parse_count(row, COLUMN_QUANTITY, row_number),
            stock: self.parse_count(row, COLUMN_STOCK, row_number),
            description: self.get_string(row, COLUMN_DESCRIPTION),
        }
    }
}

impl ComponentFieldMapper {
    /// 提取字符串字段（缺列/空白 → None）
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        row.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    /// 解析非负整数计数
    ///
    /// 非法值不报错,降级为 None
    fn parse_count(&self, row: &RawRow, key: &str, row_number: usize) -> Option<u32> {
        let value = self.get_string(row, key)?;
        let parsed = parse_count_text(&value);
        if parsed.is_none() {
            tracing::debug!(row = row_number, field = key, value = %value, "数值无法识别,按缺失处理");
        }
        parsed
    }
}

/// 文本 → 非负整数
///
/// - "5" / " 5 " → Some(5)
/// - "5.0"（表格数值单元格）→ Some(5)
/// - "2.5" / "-1" / "abc" / "" → None
pub fn parse_count_text(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<u32>() {
        return Some(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
            Some(f as u32)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
    }

    #[test]
    fn test_field_mapper_basic() {
        let raw = row(&[
            ("Nama Komponen", "Fan"),
            ("Quantity", "5"),
            ("Stock", "3"),
            ("Deskripsi", "cooling"),
        ]);

        let component = ComponentFieldMapper.map_to_component(&raw, 2);

        assert_eq!(component.name, Some("Fan".to_string()));
        assert_eq!(component.quantity, Some(5));
        assert_eq!(component.stock, Some(3));
        assert_eq!(component.description, Some("cooling".to_string()));
    }

    #[test]
    fn test_field_mapper_missing_column_is_none() {
        let raw = row(&[("Nama Komponen", "Fan"), ("Quantity", "5")]);

        let component = ComponentFieldMapper.map_to_component(&raw, 2);

        assert_eq!(component.stock, None);
        assert_eq!(component.description, None);
    }

    #[test]
    fn test_field_mapper_column_names_are_case_sensitive() {
        let raw = row(&[("nama komponen", "Fan"), ("quantity", "5"), ("STOCK", "3")]);

        let component = ComponentFieldMapper.map_to_component(&raw, 2);

        assert_eq!(component, Component::default());
    }

    #[test]
    fn test_field_mapper_trim_whitespace() {
        let raw = row(&[("Nama Komponen", "  Sensor Suhu  "), ("Stock", " 7 ")]);

        let component = ComponentFieldMapper.map_to_component(&raw, 2);

        assert_eq!(component.name, Some("Sensor Suhu".to_string()));
        assert_eq!(component.stock, Some(7));
    }

    #[test]
    fn test_parse_count_text() {
        assert_eq!(parse_count_text("5"), Some(5));
        assert_eq!(parse_count_text("5.0"), Some(5));
        assert_eq!(parse_count_text("0"), Some(0));
        assert_eq!(parse_count_text("2.5"), None);
        assert_eq!(parse_count_text("-1"), None);
        assert_eq!(parse_count_text("lima"), None);
        assert_eq!(parse_count_text(""), None);
    }
}
