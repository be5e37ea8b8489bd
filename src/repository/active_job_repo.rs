// ==========================================
// 3D打印耗材管理系统 - 进行中任务仓储
// ==========================================
// 职责: 管理 active_job / active_job_spool 单行瞬态记录
// 红线: slot 恒为 1 — 表结构保证全局至多一个进行中任务
// ==========================================

use crate::domain::history::HistoryEntry;
use crate::domain::job::{ActivePrintJob, JobSpoolEntry};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::spool_repo::parse_utc;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// 单行表的固定槽位
const JOB_SLOT: i64 = 1;

// ==========================================
// ActiveJobRepository - 进行中任务仓储
// ==========================================
pub struct ActiveJobRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActiveJobRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 持久化进行中任务（任务头 + 线轴条目同一事务）
    ///
    /// 槽位已被占用时返回唯一约束错误 — 由上层翻译为状态错误
    pub fn store(&self, job: &ActivePrintJob) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO active_job (slot, job_id, job_name, start_time)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                JOB_SLOT,
                job.job_id,
                job.job_name,
                job.start_time.to_rfc3339(),
            ],
        )?;

        for entry in &job.spools {
            tx.execute(
                r#"
                INSERT INTO active_job_spool (slot, spool_id, label, start_weight_g, estimated_weight_g)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    JOB_SLOT,
                    entry.spool_id,
                    entry.label,
                    entry.start_weight_g,
                    entry.estimated_weight_g,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 读取进行中任务（进程重启后的恢复入口）
    pub fn load(&self) -> RepositoryResult<Option<ActivePrintJob>> {
        let conn = self.get_conn()?;

        let head: Option<(String, String, String)> = conn
            .query_row(
                "SELECT job_id, job_name, start_time FROM active_job WHERE slot = ?1",
                params![JOB_SLOT],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (job_id, job_name, start_time) = match head {
            Some(h) => h,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT spool_id, label, start_weight_g, estimated_weight_g
            FROM active_job_spool
            WHERE slot = ?1
            ORDER BY spool_id ASC
            "#,
        )?;
        let spools = stmt
            .query_map(params![JOB_SLOT], |row| {
                Ok(JobSpoolEntry {
                    spool_id: row.get(0)?,
                    label: row.get(1)?,
                    start_weight_g: row.get(2)?,
                    estimated_weight_g: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(Some(ActivePrintJob {
            job_id,
            job_name,
            start_time: parse_utc(&start_time).unwrap_or_else(Utc::now),
            spools,
        }))
    }

    /// 关闭任务的事务提交: 线轴剩余量更新 + 台账追加 + 瞬态记录清除
    ///
    /// 不变量: 要么全部落库, 要么全不落库 — 多线轴关闭不存在部分写入
    ///
    /// # 参数
    /// - entry: 已完成终重解算的台账条目（含每线轴 end_weight_g/grams_used_g）
    pub fn commit_close(&self, entry: &HistoryEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        for usage in &entry.spools {
            let affected = tx.execute(
                "UPDATE spool SET weight_g = ?2 WHERE spool_id = ?1",
                params![usage.spool_id, usage.end_weight_g],
            )?;
            if affected == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "Spool".to_string(),
                    id: usage.spool_id.clone(),
                });
            }
        }

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

        tx.execute("DELETE FROM active_job_spool WHERE slot = ?1", params![JOB_SLOT])?;
        tx.execute("DELETE FROM active_job WHERE slot = ?1", params![JOB_SLOT])?;

        tx.commit()?;
        Ok(())
    }

    /// 清除进行中任务（cancel 与恢复路径共用; 无任务时为空操作）
    pub fn clear(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM active_job_spool WHERE slot = ?1", params![JOB_SLOT])?;
        tx.execute("DELETE FROM active_job WHERE slot = ?1", params![JOB_SLOT])?;
        tx.commit()?;
        Ok(())
    }
}
