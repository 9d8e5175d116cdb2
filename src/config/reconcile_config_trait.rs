// ==========================================
// 设备组件库存核对系统 - 核对配置读取 Trait
// ==========================================
// 职责: 定义会话/引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::MergePolicy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// ReconcileSettings - 已解析的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    /// 编辑已有设备时的导入合并策略
    pub edit_merge_policy: MergePolicy,
    /// 无组件设备是否允许组装
    pub empty_tool_eligible: bool,
    /// 界面语言
    pub locale: String,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            edit_merge_policy: MergePolicy::AppendAll,
            empty_tool_eligible: true,
            locale: "en".to_string(),
        }
    }
}

// ==========================================
// ReconcileConfigReader Trait
// ==========================================
// 用途: 核对配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ReconcileConfigReader: Send + Sync {
    /// 获取编辑已有设备时的导入合并策略
    ///
    /// # 默认值
    /// - APPEND_ALL
    ///
    /// # 说明
    /// - 新建草稿固定使用 REPLACE_ALL,不受此配置影响
    async fn get_edit_merge_policy(&self) -> Result<MergePolicy, Box<dyn Error>>;

    /// 无组件设备是否允许组装
    ///
    /// # 默认值
    /// - true
    async fn get_empty_tool_eligible(&self) -> Result<bool, Box<dyn Error>>;

    /// 获取界面语言（en / id）
    ///
    /// # 默认值
    /// - en
    async fn get_locale(&self) -> Result<String, Box<dyn Error>>;

    /// 一次读取全部配置
    async fn load_settings(&self) -> Result<ReconcileSettings, Box<dyn Error>> {
        let edit_merge_policy = self.get_edit_merge_policy().await?;
        let empty_tool_eligible = self.get_empty_tool_eligible().await?;
        let locale = self.get_locale().await?;

        Ok(ReconcileSettings {
            edit_merge_policy,
            empty_tool_eligible,
            locale,
        })
    }
}
