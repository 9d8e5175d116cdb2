// ==========================================
// 设备组件库存核对系统 - 设备数据仓储
// ==========================================
// 职责: 管理 tool 表的 CRUD 操作
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::{Component, Tool};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::tool_store::ToolStore;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteToolRepository - 设备仓储
// ==========================================
pub struct SqliteToolRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteToolRepository {
    /// 创建新的 SqliteToolRepository 实例（自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    ///
    /// 说明：会再次应用统一 PRAGMA 并建表（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            ensure_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部设备（按创建顺序）
    pub fn list_tools(&self) -> RepositoryResult<Vec<Tool>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT tool_id, name, image, components_json
            FROM tool
            ORDER BY created_at ASC, rowid ASC
            "#,
        )?;

        let raw_rows = stmt
            .query_map([], map_tool_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw_rows.into_iter().map(RawToolRow::into_tool).collect()
    }

    /// 按 id 查询
    pub fn find_tool(&self, id: &str) -> RepositoryResult<Option<Tool>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT tool_id, name, image, components_json
                FROM tool
                WHERE tool_id = ?1
                "#,
                params![id],
                map_tool_row,
            )
            .optional()?;

        raw.map(RawToolRow::into_tool).transpose()
    }

    /// 插入新设备
    pub fn insert_tool(&self, tool: &Tool) -> RepositoryResult<Tool> {
        validate_tool(tool)?;

        let tool_id = uuid::Uuid::new_v4().to_string();
        let components_json = serde_json::to_string(&tool.components)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO tool (tool_id, name, image, components_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![tool_id, tool.name, tool.image, components_json, now],
        )?;

        tracing::info!(tool_id = %tool_id, name = %tool.name, components = tool.components.len(), "设备已创建");

        let mut saved = tool.clone();
        saved.id = Some(tool_id);
        Ok(saved)
    }

    /// 整体替换设备
    pub fn replace_tool(&self, id: &str, tool: &Tool) -> RepositoryResult<Tool> {
        validate_tool(tool)?;

        let components_json = serde_json::to_string(&tool.components)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE tool
            SET name = ?2, image = ?3, components_json = ?4, updated_at = ?5
            WHERE tool_id = ?1
            "#,
            params![id, tool.name, tool.image, components_json, now],
        )?;

        if affected == 0 {
            return Err(not_found(id));
        }

        tracing::info!(tool_id = %id, components = tool.components.len(), "设备已更新");

        let mut saved = tool.clone();
        saved.id = Some(id.to_string());
        Ok(saved)
    }

    /// 删除设备
    pub fn delete_tool(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM tool WHERE tool_id = ?1", params![id])?;

        if affected == 0 {
            return Err(not_found(id));
        }

        tracing::info!(tool_id = %id, "设备已删除");
        Ok(())
    }
}

// ==========================================
// ToolStore Trait 实现
// ==========================================
#[async_trait]
impl ToolStore for SqliteToolRepository {
    async fn list(&self) -> RepositoryResult<Vec<Tool>> {
        self.list_tools()
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Tool>> {
        self.find_tool(id)
    }

    async fn create(&self, tool: &Tool) -> RepositoryResult<Tool> {
        self.insert_tool(tool)
    }

    async fn update(&self, id: &str, tool: &Tool) -> RepositoryResult<Tool> {
        self.replace_tool(id, tool)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.delete_tool(id)
    }
}

// ==========================================
// 行映射辅助
// ==========================================

struct RawToolRow {
    tool_id: String,
    name: String,
    image: Option<String>,
    components_json: String,
}

impl RawToolRow {
    fn into_tool(self) -> RepositoryResult<Tool> {
        let components: Vec<Component> =
            serde_json::from_str(&self.components_json).map_err(|e| {
                RepositoryError::CorruptComponents {
                    tool_id: self.tool_id.clone(),
                    message: e.to_string(),
                }
            })?;
        Ok(Tool {
            id: Some(self.tool_id),
            name: self.name,
            image: self.image,
            components,
        })
    }
}

fn map_tool_row(row: &Row<'_>) -> rusqlite::Result<RawToolRow> {
    Ok(RawToolRow {
        tool_id: row.get(0)?,
        name: row.get(1)?,
        image: row.get(2)?,
        components_json: row.get(3)?,
    })
}

fn validate_tool(tool: &Tool) -> RepositoryResult<()> {
    if tool.name.trim().is_empty() {
        return Err(RepositoryError::ValidationError(
            "设备名称不能为空".to_string(),
        ));
    }
    Ok(())
}

fn not_found(id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Tool".to_string(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_repo() -> SqliteToolRepository {
        let conn = Connection::open_in_memory().unwrap();
        SqliteToolRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn sample_tool() -> Tool {
        let mut tool = Tool::draft("Habibi Grow");
        tool.image = Some("https://example.com/grow.png".to_string());
        tool.components = vec![
            Component::new("Sensor Suhu", 1, 5),
            Component::new("Microcontroller", 1, 2).with_description("ESP32"),
            Component::default(),
        ];
        tool
    }

    #[test]
    fn test_insert_assigns_id_and_round_trips_components() {
        let repo = in_memory_repo();
        let saved = repo.insert_tool(&sample_tool()).unwrap();

        let id = saved.id.clone().unwrap();
        let loaded = repo.find_tool(&id).unwrap().unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(loaded.components[1].display_name(), "Microcontroller");
        assert_eq!(loaded.components[2], Component::default());
    }

    #[test]
    fn test_replace_unknown_id_is_not_found() {
        let repo = in_memory_repo();
        let result = repo.replace_tool("missing", &sample_tool());

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let repo = in_memory_repo();
        let result = repo.insert_tool(&Tool::draft("   "));

        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
        assert!(repo.list_tools().unwrap().is_empty());
    }

    #[test]
    fn test_delete_twice() {
        let repo = in_memory_repo();
        let saved = repo.insert_tool(&sample_tool()).unwrap();
        let id = saved.id.unwrap();

        repo.delete_tool(&id).unwrap();
        assert!(repo.delete_tool(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_corrupt_component_document_names_the_tool() {
        let repo = in_memory_repo();
        let saved = repo.insert_tool(&sample_tool()).unwrap();
        let id = saved.id.unwrap();

        repo.get_conn()
            .unwrap()
            .execute(
                "UPDATE tool SET components_json = '{not json' WHERE tool_id = ?1",
                params![id],
            )
            .unwrap();

        match repo.find_tool(&id) {
            Err(RepositoryError::CorruptComponents { tool_id, .. }) => assert_eq!(tool_id, id),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
