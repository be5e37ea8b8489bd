// ==========================================
// 3D打印耗材管理系统 - 空轴皮重仓储
// ==========================================
// 职责: 管理 empty_spool 表的 CRUD 操作
// 红线: 仅经由自身 CRUD 面修改; 任务控制器从不写入
// ==========================================

use crate::domain::spool::EmptySpool;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::spool_repo::parse_utc;
use chrono::Utc;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// EmptySpoolRepository - 空轴皮重仓储
// ==========================================
pub struct EmptySpoolRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EmptySpoolRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入皮重记录
    pub fn create(&self, spool: &EmptySpool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO empty_spool (empty_spool_id, brand, package, weight_g, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                spool.empty_spool_id,
                spool.brand,
                spool.package,
                spool.weight_g,
                spool.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按主键查询（线轴建档时的皮重查找入口）
    pub fn find_by_id(&self, empty_spool_id: &str) -> RepositoryResult<Option<EmptySpool>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT empty_spool_id, brand, package, weight_g, created_at
            FROM empty_spool
            WHERE empty_spool_id = ?1
            "#,
        )?;

        let result = stmt.query_row(params![empty_spool_id], map_empty_spool_row);
        match result {
            Ok(spool) => Ok(Some(spool)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部皮重记录
    pub fn list_all(&self) -> RepositoryResult<Vec<EmptySpool>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT empty_spool_id, brand, package, weight_g, created_at
            FROM empty_spool
            ORDER BY brand ASC, package ASC
            "#,
        )?;

        let spools = stmt
            .query_map([], map_empty_spool_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(spools)
    }

    /// 更新皮重记录
    pub fn update(
        &self,
        empty_spool_id: &str,
        brand: &str,
        package: &str,
        weight_g: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE empty_spool
            SET brand = ?2, package = ?3, weight_g = ?4
            WHERE empty_spool_id = ?1
            "#,
            params![empty_spool_id, brand, package, weight_g],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "EmptySpool".to_string(),
                id: empty_spool_id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除皮重记录
    pub fn delete(&self, empty_spool_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM empty_spool WHERE empty_spool_id = ?1",
            params![empty_spool_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "EmptySpool".to_string(),
                id: empty_spool_id.to_string(),
            });
        }
        Ok(())
    }
}

/// empty_spool 表行映射
fn map_empty_spool_row(row: &Row<'_>) -> rusqlite::Result<EmptySpool> {
    Ok(EmptySpool {
        empty_spool_id: row.get(0)?,
        brand: row.get(1)?,
        package: row.get(2)?,
        weight_g: row.get(3)?,
        created_at: row
            .get::<_, Option<String>>(4)?
            .and_then(|s| parse_utc(&s))
            .unwrap_or_else(Utc::now),
    })
}
