// ==========================================
// 设备组件库存核对系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::reconcile_config_trait::ReconcileConfigReader;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::MergePolicy;
use crate::i18n::{normalize_locale, DEFAULT_LOCALE};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致,会对传入连接再次应用统一 PRAGMA 并建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值,带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 校验并写入核对配置项（值按规范形式保存）
    ///
    /// # 返回
    /// - Err: 未知配置键,或取值无法识别
    pub fn set_reconcile_setting(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let normalized = match key {
            config_keys::EDIT_MERGE_POLICY => {
                MergePolicy::from_config_value(value).map(|p| p.to_config_value().to_string())
            }
            config_keys::EMPTY_TOOL_ELIGIBLE => parse_bool(value).map(|b| b.to_string()),
            config_keys::LOCALE => normalize_locale(value).map(str::to_string),
            _ => return Err(format!("未知配置键: {}", key).into()),
        };

        let normalized = normalized.ok_or_else(|| format!("配置值无法识别: {}={}", key, value))?;
        self.set_config_value(key, &normalized)
    }

    /// 读取全部 global 配置
    pub fn list_config_values(&self) -> Result<HashMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }
}

// ==========================================
// ReconcileConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ReconcileConfigReader for ConfigManager {
    async fn get_edit_merge_policy(&self) -> Result<MergePolicy, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::EDIT_MERGE_POLICY, "APPEND_ALL")?;
        match MergePolicy::from_config_value(&value) {
            Some(policy) => Ok(policy),
            None => {
                tracing::warn!(
                    config_key = config_keys::EDIT_MERGE_POLICY,
                    raw_value = %value,
                    "合并策略配置无法识别,使用 APPEND_ALL"
                );
                Ok(MergePolicy::AppendAll)
            }
        }
    }

    async fn get_empty_tool_eligible(&self) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::EMPTY_TOOL_ELIGIBLE, "true")?;
        match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => {
                tracing::warn!(
                    config_key = config_keys::EMPTY_TOOL_ELIGIBLE,
                    raw_value = %value,
                    "布尔配置无法识别,使用 true"
                );
                Ok(true)
            }
        }
    }

    async fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)?;
        match normalize_locale(&value) {
            Some(locale) => Ok(locale.to_string()),
            None => {
                tracing::warn!(config_key = config_keys::LOCALE, raw_value = %value, "语言配置不支持,使用默认语言");
                Ok(DEFAULT_LOCALE.to_string())
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入合并
    pub const EDIT_MERGE_POLICY: &str = "edit_merge_policy";

    // 组装门禁
    pub const EMPTY_TOOL_ELIGIBLE: &str = "empty_tool_eligible";

    // 界面
    pub const LOCALE: &str = "locale";
}
