// ==========================================
// 设备组件库存核对系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::ToolApi;
use crate::config::{ConfigManager, ReconcileConfigReader, ReconcileSettings};
use crate::db::open_sqlite_connection;
use crate::repository::SqliteToolRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "DEVICE_STOCK_DB";

/// 应用状态
///
/// 设备仓储与配置管理器共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 设备目录API
    pub tool_api: Arc<ToolApi>,

    /// 配置管理器（config 命令直接读写）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState,数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（测试使用内存库）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        let tool_repo = SqliteToolRepository::from_connection(conn.clone())
            .map_err(|e| format!("无法初始化设备仓储: {}", e))?;
        let config_manager = ConfigManager::from_connection(conn)
            .map_err(|e| format!("无法初始化配置管理器: {}", e))?;
        let config_manager = Arc::new(config_manager);

        let tool_api = Arc::new(ToolApi::new(
            Arc::new(tool_repo),
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            tool_api,
            config_manager,
        })
    }

    /// 读取配置并应用界面语言
    pub async fn apply_locale(&self, override_locale: Option<&str>) -> ReconcileSettings {
        let settings = match self.config_manager.load_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("读取配置失败,使用默认配置: {}", e);
                ReconcileSettings::default()
            }
        };

        let locale = override_locale.unwrap_or(settings.locale.as_str());
        let applied = crate::i18n::set_locale(locale);
        tracing::debug!(locale = applied, "界面语言已设置");
        settings
    }
}

/// 获取默认数据库路径
///
/// 优先使用 DEVICE_STOCK_DB 环境变量,其次为用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./device_stock.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("device-stock");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("device_stock.db");
        }
    }

    path.to_string_lossy().to_string()
}
