// ==========================================
// 设备组件库存核对系统 - 库存核对报表
// ==========================================
// 职责: 按行汇总缺口 + CSV 输出
// ==========================================

use crate::domain::{StockStatus, Tool};
use crate::engine::error::EngineResult;
use crate::engine::stock_status::{ReadinessGate, StockStatusCore, ToolReadiness};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// 报表表头（与导入列名保持同一语言）
pub const REPORT_HEADERS: [&str; 5] = ["Nama Komponen", "Quantity", "Stock", "Kekurangan", "Status"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReportRow {
    pub position: usize,
    pub name: String,
    pub quantity: Option<u32>,
    pub stock: Option<u32>,
    /// 缺口；数值未知时为 None
    pub shortage: Option<u32>,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReport {
    pub tool_name: String,
    pub rows: Vec<StockReportRow>,
    pub readiness: ToolReadiness,
}

impl StockReport {
    /// 由设备当前组件生成报表
    pub fn build(tool: &Tool, gate: &ReadinessGate) -> Self {
        let rows = tool
            .components
            .iter()
            .enumerate()
            .map(|(position, component)| StockReportRow {
                position,
                name: component.display_name().to_string(),
                quantity: component.quantity,
                stock: component.stock,
                shortage: StockStatusCore::shortage(component),
                status: StockStatusCore::status(component),
            })
            .collect();

        Self {
            tool_name: tool.name.clone(),
            rows,
            readiness: gate.evaluate(&tool.components),
        }
    }

    /// 缺口合计（仅统计数值已知的行）
    pub fn total_shortage(&self) -> u64 {
        self.rows
            .iter()
            .filter_map(|r| r.shortage)
            .map(u64::from)
            .sum()
    }

    /// 写出 CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> EngineResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(REPORT_HEADERS)?;

        for row in &self.rows {
            csv_writer.write_record([
                row.name.clone(),
                opt_to_string(row.quantity),
                opt_to_string(row.stock),
                opt_to_string(row.shortage),
                row.status.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn opt_to_string(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
