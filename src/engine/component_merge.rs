// ==========================================
// 设备组件库存核对系统 - 组件合并与行操作
// ==========================================
// 职责: 导入记录并入组件列表 + 手工行编辑
// 红线: 所有操作只作用于调用方传入的列表；越界不允许静默跳过
// ==========================================

use crate::domain::{Component, ComponentField, ConflictRule, MergePolicy};
use crate::engine::error::{EngineError, EngineResult};
use crate::importer::parse_count_text;
use serde::{Deserialize, Serialize};

// ==========================================
// MergeSummary - 合并结果统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub policy: Option<MergePolicy>,
    /// 追加到末尾的行数
    pub appended: usize,
    /// 按名称合并到已有行的行数
    pub updated: usize,
    /// 被整体替换掉的旧行数
    pub replaced: usize,
}

// ==========================================
// ComponentMerger - 导入合并
// ==========================================
pub struct ComponentMerger;

impl ComponentMerger {
    /// 将导入记录并入组件列表
    ///
    /// # 策略
    /// - AppendAll: 追加到末尾,同名行保留为独立行
    /// - ReplaceAll: 导入记录成为完整列表
    /// - MergeByName: 同名（去首尾空白后相等）合并到第一条已有行,其余追加
    pub fn merge(
        rows: &mut Vec<Component>,
        incoming: Vec<Component>,
        policy: MergePolicy,
    ) -> MergeSummary {
        let mut summary = MergeSummary {
            policy: Some(policy),
            ..Default::default()
        };

        match policy {
            MergePolicy::AppendAll => {
                summary.appended = incoming.len();
                rows.extend(incoming);
            }
            MergePolicy::ReplaceAll => {
                summary.replaced = rows.len();
                summary.appended = incoming.len();
                *rows = incoming;
            }
            MergePolicy::MergeByName(rule) => {
                for record in incoming {
                    match Self::find_by_name(rows, &record) {
                        Some(position) => {
                            Self::apply_conflict_rule(&mut rows[position], record, rule);
                            summary.updated += 1;
                        }
                        None => {
                            rows.push(record);
                            summary.appended += 1;
                        }
                    }
                }
            }
        }

        tracing::debug!(
            policy = %policy,
            appended = summary.appended,
            updated = summary.updated,
            replaced = summary.replaced,
            "组件合并完成"
        );
        summary
    }

    /// 查找第一条同名行（无名记录不参与匹配）
    fn find_by_name(rows: &[Component], record: &Component) -> Option<usize> {
        let key = record.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        rows.iter()
            .position(|row| row.name.as_deref().map(str::trim) == Some(key))
    }

    fn apply_conflict_rule(existing: &mut Component, incoming: Component, rule: ConflictRule) {
        match rule {
            ConflictRule::LastWriteWins => {
                // 导入记录中缺失的字段保留原值
                if incoming.name.is_some() {
                    existing.name = incoming.name;
                }
                if incoming.quantity.is_some() {
                    existing.quantity = incoming.quantity;
                }
                if incoming.stock.is_some() {
                    existing.stock = incoming.stock;
                }
                if incoming.description.is_some() {
                    existing.description = incoming.description;
                }
            }
            ConflictRule::SumQuantities => {
                existing.quantity = sum_counts(existing.quantity, incoming.quantity);
                existing.stock = sum_counts(existing.stock, incoming.stock);
                if incoming.description.is_some() {
                    existing.description = incoming.description;
                }
            }
        }
    }
}

fn sum_counts(left: Option<u32>, right: Option<u32>) -> Option<u32> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

// ==========================================
// ComponentRows - 手工行操作
// ==========================================
pub struct ComponentRows;

impl ComponentRows {
    /// 修改指定行的一个字段
    ///
    /// # 参数
    /// - index: 行位置
    /// - field: 字段
    /// - value: 用户输入的原始文本；数值字段无法识别时存为 None
    ///
    /// # 返回
    /// - Err(IndexOutOfRange): 越界,列表不变
    pub fn edit_field(
        rows: &mut [Component],
        index: usize,
        field: ComponentField,
        value: &str,
    ) -> EngineResult<()> {
        let len = rows.len();
        let row = rows
            .get_mut(index)
            .ok_or(EngineError::IndexOutOfRange { index, len })?;

        match field {
            ComponentField::Name => row.name = Some(value.to_string()),
            ComponentField::Description => row.description = Some(value.to_string()),
            ComponentField::Quantity => row.quantity = parse_count_text(value),
            ComponentField::Stock => row.stock = parse_count_text(value),
        }

        tracing::debug!(index, field = %field, "组件字段已修改");
        Ok(())
    }

    /// 末尾追加空白行,返回新行位置
    pub fn append_blank(rows: &mut Vec<Component>) -> usize {
        rows.push(Component::blank());
        rows.len() - 1
    }

    /// 删除指定行,后续行前移一位
    ///
    /// # 返回
    /// - Ok(Component): 被删除的行
    /// - Err(IndexOutOfRange): 越界,列表不变
    pub fn delete(rows: &mut Vec<Component>, index: usize) -> EngineResult<Component> {
        if index >= rows.len() {
            return Err(EngineError::IndexOutOfRange {
                index,
                len: rows.len(),
            });
        }
        let removed = rows.remove(index);
        tracing::debug!(index, name = removed.display_name(), "组件行已删除");
        Ok(removed)
    }

    /// 按名称设置库存（所有同名行）
    ///
    /// # 返回
    /// - Ok(usize): 修改的行数
    /// - Err(ComponentNotFound): 没有同名行
    pub fn set_stock_by_name(rows: &mut [Component], name: &str, stock: u32) -> EngineResult<usize> {
        let key = name.trim();
        let mut touched = 0;
        for row in rows
            .iter_mut()
            .filter(|row| row.name.as_deref().map(str::trim) == Some(key))
        {
            row.stock = Some(stock);
            touched += 1;
        }

        if touched == 0 {
            return Err(EngineError::ComponentNotFound(name.to_string()));
        }
        Ok(touched)
    }
}
