// ==========================================
// 设备组件库存核对系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + calamine
// 系统定位: 设备组件库存核对（导入、合并、齐套判定）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 合并与判定
pub mod engine;

// 导入层 - 外部表格
pub mod importer;

// 配置层 - 核对配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 编辑会话与设备目录
pub mod api;

// 应用层 - 共享状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{Component, ComponentField, ConflictRule, MergePolicy, StockStatus, Tool};

// 导入
pub use importer::{ComponentImporter, ImportError};

// 引擎
pub use engine::{
    ComponentMerger, ComponentRows, MergeSummary, ReadinessGate, StockReport, StockStatusCore,
    ToolReadiness,
};

// 仓储
pub use repository::{SqliteToolRepository, ToolStore};

// API
pub use api::{ApiError, EditorSession, ImportOutcome, SaveFailure, ToolApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "device-stock";
