// ==========================================
// 3D打印耗材管理系统 - 历史台账仓储
// ==========================================
// 职责: 管理 history_entry / history_spool_usage 表
// 红线: 只追加 — 本仓储不提供 update/delete
// ==========================================

use crate::domain::history::{HistoryEntry, HistoryQuery, SpoolUsage};
use crate::domain::types::JobStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::spool_repo::parse_utc;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// HistoryRepository - 历史台账仓储
// ==========================================
pub struct HistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HistoryRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加台账条目（条目 + 全部线轴耗量在同一事务内落库）
    pub fn append(&self, entry: &HistoryEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO history_entry (job_id, job_name, status, start_time, end_time)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                entry.job_id,
                entry.job_name,
                entry.status.to_db_str(),
                entry.start_time.to_rfc3339(),
                entry.end_time.to_rfc3339(),
            ],
        )?;

        for usage in &entry.spools {
            tx.execute(
                r#"
                INSERT INTO history_spool_usage (
                    job_id, spool_id, label,
                    start_weight_g, estimated_weight_g, end_weight_g, grams_used_g
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    entry.job_id,
                    usage.spool_id,
                    usage.label,
                    usage.start_weight_g,
                    usage.estimated_weight_g,
                    usage.end_weight_g,
                    usage.grams_used_g,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 最近 n 条（按开始时间倒序）— 默认视图入口
    pub fn list_recent(&self, limit: u32) -> RepositoryResult<Vec<HistoryEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT job_id, job_name, status, start_time, end_time
            FROM history_entry
            ORDER BY start_time DESC
            LIMIT ?1
            "#,
        )?;

        let mut entries = stmt
            .query_map(params![limit], map_entry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        self.load_usages(&conn, &mut entries)?;
        Ok(entries)
    }

    /// 条件过滤（所有给出的谓词须同时满足, 不加隐式条数上限）
    ///
    /// # 谓词
    /// - start_date: 开始时间 >= 当日 00:00
    /// - end_date: 开始时间 < 次日 00:00 (含当日整天)
    /// - spool_label_substring: 任一线轴标签含该子串
    pub fn filter(&self, query: &HistoryQuery) -> RepositoryResult<Vec<HistoryEntry>> {
        let mut sql = String::from(
            r#"
            SELECT e.job_id, e.job_name, e.status, e.start_time, e.end_time
            FROM history_entry e
            WHERE 1=1
            "#,
        );
        let mut binds: Vec<Value> = Vec::new();

        if let Some(start) = query.start_date {
            binds.push(Value::Text(format!("{} 00:00:00", start)));
            sql.push_str(&format!(
                " AND datetime(e.start_time) >= datetime(?{})",
                binds.len()
            ));
        }
        if let Some(end) = query.end_date {
            // 终止日期含当日整天: 比较次日零点的开区间
            let next = end.succ_opt().ok_or_else(|| {
                RepositoryError::ValidationError(format!("终止日期超出范围: {}", end))
            })?;
            binds.push(Value::Text(format!("{} 00:00:00", next)));
            sql.push_str(&format!(
                " AND datetime(e.start_time) < datetime(?{})",
                binds.len()
            ));
        }
        if let Some(sub) = query
            .spool_label_substring
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            binds.push(Value::Text(format!("%{}%", sub)));
            sql.push_str(&format!(
                r#" AND EXISTS (
                        SELECT 1 FROM history_spool_usage u
                        WHERE u.job_id = e.job_id AND u.label LIKE ?{}
                    )"#,
                binds.len()
            ));
        }

        sql.push_str(" ORDER BY e.start_time DESC");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut entries = stmt
            .query_map(params_from_iter(binds), map_entry_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        self.load_usages(&conn, &mut entries)?;
        Ok(entries)
    }

    /// 台账总条数（测试与看板用）
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM history_entry", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 为条目加载线轴耗量明细
    fn load_usages(
        &self,
        conn: &Connection,
        entries: &mut [HistoryEntry],
    ) -> RepositoryResult<()> {
        let mut stmt = conn.prepare(
            r#"
            SELECT spool_id, label, start_weight_g, estimated_weight_g, end_weight_g, grams_used_g
            FROM history_spool_usage
            WHERE job_id = ?1
            ORDER BY spool_id ASC
            "#,
        )?;

        for entry in entries.iter_mut() {
            let usages = stmt
                .query_map(params![entry.job_id], |row| {
                    Ok(SpoolUsage {
                        spool_id: row.get(0)?,
                        label: row.get(1)?,
                        start_weight_g: row.get(2)?,
                        estimated_weight_g: row.get(3)?,
                        end_weight_g: row.get(4)?,
                        grams_used_g: row.get(5)?,
                    })
                })?
                .collect::<SqliteResult<Vec<_>>>()?;
            entry.spools = usages;
        }
        Ok(())
    }
}

/// history_entry 表行映射（spools 由 load_usages 补齐）
fn map_entry_row(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        job_id: row.get(0)?,
        job_name: row.get(1)?,
        status: JobStatus::from_str(&row.get::<_, String>(2)?),
        start_time: row
            .get::<_, Option<String>>(3)?
            .and_then(|s| parse_utc(&s))
            .unwrap_or_else(Utc::now),
        end_time: row
            .get::<_, Option<String>>(4)?
            .and_then(|s| parse_utc(&s))
            .unwrap_or_else(Utc::now),
        spools: Vec::new(),
    })
}
