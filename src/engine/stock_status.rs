// ==========================================
// 设备组件库存核对系统 - 库存齐套判定
// ==========================================
// 职责: 单组件齐套判定 + 设备级组装门禁
// 红线: 无状态、无副作用、无 I/O；结果不缓存,每次读取重算
// ==========================================

use crate::domain::{Component, StockStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// StockStatusCore - 纯函数工具类
// ==========================================
pub struct StockStatusCore;

impl StockStatusCore {
    /// 组件是否齐套
    ///
    /// # 规则
    /// - stock >= quantity → true
    /// - quantity 或 stock 缺失/非法 → false（不报错）
    pub fn is_adequate(component: &Component) -> bool {
        match (component.stock, component.quantity) {
            (Some(stock), Some(quantity)) => stock >= quantity,
            _ => false,
        }
    }

    /// 展示状态
    pub fn status(component: &Component) -> StockStatus {
        StockStatus::from_adequate(Self::is_adequate(component))
    }

    /// 缺口数量 = max(0, quantity - stock)
    ///
    /// # 返回
    /// - None: quantity 或 stock 未知
    pub fn shortage(component: &Component) -> Option<u32> {
        match (component.stock, component.quantity) {
            (Some(stock), Some(quantity)) => Some(quantity.saturating_sub(stock)),
            _ => None,
        }
    }

    /// 数量/库存是否可判定
    pub fn is_determinable(component: &Component) -> bool {
        component.stock.is_some() && component.quantity.is_some()
    }
}

// ==========================================
// ToolReadiness - 设备齐套汇总
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReadiness {
    /// 是否允许"组装/保存"
    pub eligible: bool,
    pub total: usize,
    pub adequate: usize,
    /// 数值已知但库存不足
    pub short: usize,
    /// 数量或库存缺失
    pub unknown: usize,
}

// ==========================================
// ReadinessGate - 组装门禁
// ==========================================
/// 设备级门禁: 全部组件齐套才放行
///
/// 空组件列表的结果由 empty_tool_eligible 决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessGate {
    empty_tool_eligible: bool,
}

impl ReadinessGate {
    pub fn new(empty_tool_eligible: bool) -> Self {
        Self {
            empty_tool_eligible,
        }
    }

    pub fn empty_tool_eligible(&self) -> bool {
        self.empty_tool_eligible
    }

    /// 判定组件列表
    pub fn evaluate(&self, components: &[Component]) -> ToolReadiness {
        let mut adequate = 0;
        let mut short = 0;
        let mut unknown = 0;

        for component in components {
            if !StockStatusCore::is_determinable(component) {
                unknown += 1;
            } else if StockStatusCore::is_adequate(component) {
                adequate += 1;
            } else {
                short += 1;
            }
        }

        let total = components.len();
        let eligible = if total == 0 {
            self.empty_tool_eligible
        } else {
            adequate == total
        };

        ToolReadiness {
            eligible,
            total,
            adequate,
            short,
            unknown,
        }
    }

    /// 仅返回是否放行
    pub fn is_eligible(&self, components: &[Component]) -> bool {
        self.evaluate(components).eligible
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(quantity: u32, stock: u32) -> Component {
        Component {
            name: None,
            quantity: Some(quantity),
            stock: Some(stock),
            description: None,
        }
    }

    #[test]
    fn test_adequacy_threshold() {
        assert!(StockStatusCore::is_adequate(&counts(5, 5)));
        assert!(!StockStatusCore::is_adequate(&counts(5, 4)));
        assert!(StockStatusCore::is_adequate(&counts(0, 0)));
        assert!(StockStatusCore::is_adequate(&counts(1, 9)));
    }

    #[test]
    fn test_missing_values_are_never_adequate() {
        let mut missing_quantity = counts(0, 10);
        missing_quantity.quantity = None;
        let mut missing_stock = counts(0, 0);
        missing_stock.stock = None;

        assert!(!StockStatusCore::is_adequate(&missing_quantity));
        assert!(!StockStatusCore::is_adequate(&missing_stock));
        assert!(!StockStatusCore::is_adequate(&Component::default()));
        assert_eq!(StockStatusCore::status(&missing_stock), StockStatus::Shortage);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let component = counts(3, 2);
        let first = StockStatusCore::status(&component);
        let second = StockStatusCore::status(&component);

        assert_eq!(first, second);
        assert_eq!(component, counts(3, 2));
    }

    #[test]
    fn test_shortage() {
        assert_eq!(StockStatusCore::shortage(&counts(5, 3)), Some(2));
        assert_eq!(StockStatusCore::shortage(&counts(2, 9)), Some(0));
        assert_eq!(StockStatusCore::shortage(&Component::default()), None);
    }

    #[test]
    fn test_gate_requires_every_component() {
        let gate = ReadinessGate::default();
        let mut components = vec![counts(1, 1), counts(2, 1)];

        let readiness = gate.evaluate(&components);
        assert!(!readiness.eligible);
        assert_eq!(readiness.adequate, 1);
        assert_eq!(readiness.short, 1);

        let mut removed = components.clone();
        removed.remove(1);
        assert!(gate.is_eligible(&removed));

        components[1].stock = Some(2);
        assert!(gate.is_eligible(&components));
    }

    #[test]
    fn test_gate_empty_tool_follows_flag() {
        assert!(ReadinessGate::new(true).is_eligible(&[]));
        assert!(!ReadinessGate::new(false).is_eligible(&[]));
    }

    #[test]
    fn test_gate_counts_unknown() {
        let readiness = ReadinessGate::default().evaluate(&[counts(1, 1), Component::default()]);

        assert!(!readiness.eligible);
        assert_eq!(readiness.unknown, 1);
        assert_eq!(readiness.total, 2);
    }
}
