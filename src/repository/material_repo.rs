// ==========================================
// 3D打印耗材管理系统 - 材料目录仓储
// ==========================================
// 职责: 管理 material_catalog 表
// 说明: 目录随系统预置常见材料, 用户可增删
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// 预置材料（首次启动时种入目录）
pub const DEFAULT_MATERIALS: [&str; 5] = ["PLA", "ABS", "PETG", "Nylon", "TPU"];

// ==========================================
// MaterialRepository - 材料目录仓储
// ==========================================
pub struct MaterialRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaterialRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 种入预置材料（幂等, 应用启动时调用）
    pub fn seed_defaults(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        for name in DEFAULT_MATERIALS {
            conn.execute(
                "INSERT OR IGNORE INTO material_catalog (name) VALUES (?1)",
                params![name],
            )?;
        }
        Ok(())
    }

    /// 查询全部材料名
    pub fn list_all(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT name FROM material_catalog ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(names)
    }

    /// 材料是否已在目录中
    pub fn exists(&self, name: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM material_catalog WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 新增材料（幂等）
    pub fn insert(&self, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO material_catalog (name) VALUES (?1)",
            params![name],
        )?;
        Ok(())
    }

    /// 删除材料
    pub fn delete(&self, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM material_catalog WHERE name = ?1",
            params![name],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Material".to_string(),
                id: name.to_string(),
            });
        }
        Ok(())
    }
}
