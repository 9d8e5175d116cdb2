// ==========================================
// 设备组件库存核对系统 - 领域类型定义
// ==========================================
// 职责: 库存状态、合并策略等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与 config_kv 存储值一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 库存状态 (Stock Status)
// ==========================================
// 红线: 派生值,每次读取时由 stock/quantity 重新计算,不落库不缓存
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Adequate, // 库存满足需求
    Shortage, // 库存不足,或数量/库存缺失无法判定
}

impl StockStatus {
    /// 由齐套判定结果得到状态
    pub fn from_adequate(adequate: bool) -> Self {
        if adequate {
            StockStatus::Adequate
        } else {
            StockStatus::Shortage
        }
    }

    /// 国际化标签 key（见 locales/*.yml）
    pub fn label_key(&self) -> &'static str {
        match self {
            StockStatus::Adequate => "status.adequate",
            StockStatus::Shortage => "status.shortage",
        }
    }

    /// 行背景色
    pub fn background_color(&self) -> &'static str {
        match self {
            StockStatus::Adequate => "#D4EDDA",
            StockStatus::Shortage => "#F8D7DA",
        }
    }

    /// 行文字色
    pub fn text_color(&self) -> &'static str {
        match self {
            StockStatus::Adequate => "#155724",
            StockStatus::Shortage => "#721C24",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::Adequate => write!(f, "ADEQUATE"),
            StockStatus::Shortage => write!(f, "SHORTAGE"),
        }
    }
}

// ==========================================
// 同名冲突规则 (Conflict Rule)
// ==========================================
// 仅在 MergeByName 策略下生效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictRule {
    LastWriteWins, // 导入行覆盖已有行
    SumQuantities, // 数量与库存相加
}

impl fmt::Display for ConflictRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictRule::LastWriteWins => write!(f, "LAST_WRITE_WINS"),
            ConflictRule::SumQuantities => write!(f, "SUM_QUANTITIES"),
        }
    }
}

// ==========================================
// 导入合并策略 (Merge Policy)
// ==========================================
// 编辑已有设备: 由配置 edit_merge_policy 决定（默认 AppendAll）
// 新建草稿: 固定 ReplaceAll,不可配置（已保存的组件不得被整体覆盖）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergePolicy {
    AppendAll,                 // 追加到末尾,不按名称去重
    ReplaceAll,                // 整体替换组件列表
    MergeByName(ConflictRule), // 按名称合并,未匹配的追加
}

impl MergePolicy {
    /// 解析 edit_merge_policy 配置值
    ///
    /// # 返回
    /// - Some(MergePolicy): 合法取值
    /// - None: 无法识别,或为 REPLACE_ALL（仅草稿使用）
    pub fn from_config_value(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "APPEND_ALL" => Some(MergePolicy::AppendAll),
            "MERGE_LAST_WRITE_WINS" => Some(MergePolicy::MergeByName(ConflictRule::LastWriteWins)),
            "MERGE_SUM_QUANTITIES" => Some(MergePolicy::MergeByName(ConflictRule::SumQuantities)),
            _ => None,
        }
    }

    /// 配置存储值
    pub fn to_config_value(&self) -> &'static str {
        match self {
            MergePolicy::AppendAll => "APPEND_ALL",
            MergePolicy::ReplaceAll => "REPLACE_ALL",
            MergePolicy::MergeByName(ConflictRule::LastWriteWins) => "MERGE_LAST_WRITE_WINS",
            MergePolicy::MergeByName(ConflictRule::SumQuantities) => "MERGE_SUM_QUANTITIES",
        }
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        MergePolicy::AppendAll
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_config_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_policy_config_value_parsing() {
        assert_eq!(
            MergePolicy::from_config_value("append_all"),
            Some(MergePolicy::AppendAll)
        );
        assert_eq!(
            MergePolicy::from_config_value(" MERGE_SUM_QUANTITIES "),
            Some(MergePolicy::MergeByName(ConflictRule::SumQuantities))
        );
        assert_eq!(MergePolicy::from_config_value("dedupe"), None);
        assert_eq!(MergePolicy::from_config_value("replace_all"), None);
    }

    #[test]
    fn test_editable_policies_round_trip_through_config() {
        for policy in [
            MergePolicy::AppendAll,
            MergePolicy::MergeByName(ConflictRule::LastWriteWins),
            MergePolicy::MergeByName(ConflictRule::SumQuantities),
        ] {
            assert_eq!(MergePolicy::from_config_value(policy.to_config_value()), Some(policy));
        }
    }

    #[test]
    fn test_stock_status_colors() {
        assert_eq!(StockStatus::from_adequate(true).background_color(), "#D4EDDA");
        assert_eq!(StockStatus::from_adequate(false).text_color(), "#721C24");
    }
}
