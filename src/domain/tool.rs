// ==========================================
// 设备组件库存核对系统 - 设备与组件实体
// ==========================================
// 职责: Tool / Component 数据结构
// 红线: 不含数据访问逻辑,不含合并/判定逻辑
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Component - 组件
// ==========================================
/// 组装一台设备所需的一种组件
///
/// 导入时缺列或非法数值统一表示为 None,由判定逻辑视为"不足"
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Component {
    pub fn new(name: &str, quantity: u32, stock: u32) -> Self {
        Self {
            name: Some(name.to_string()),
            quantity: Some(quantity),
            stock: Some(stock),
            description: None,
        }
    }

    /// 空白行（手工"新增组件"）
    pub fn blank() -> Self {
        Self {
            name: Some(String::new()),
            quantity: Some(0),
            stock: Some(0),
            description: Some(String::new()),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// 名称（缺失时为空串）
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

// ==========================================
// ComponentField - 可编辑字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentField {
    Name,
    Quantity,
    Stock,
    Description,
}

impl fmt::Display for ComponentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentField::Name => write!(f, "name"),
            ComponentField::Quantity => write!(f, "quantity"),
            ComponentField::Stock => write!(f, "stock"),
            ComponentField::Description => write!(f, "description"),
        }
    }
}

// ==========================================
// Tool - 设备
// ==========================================
/// 设备定义
///
/// - id: 持久化后由存储分配；草稿为 None
/// - components: 有序,顺序即展示顺序
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Tool {
    /// 新建草稿（无 id）
    pub fn draft(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            image: None,
            components: Vec::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
