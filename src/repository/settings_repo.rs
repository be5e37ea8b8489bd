// ==========================================
// 3D打印耗材管理系统 - 用户设置仓储
// ==========================================
// 职责: settings 表 (key-value) 的读写
// 存储: 低耗材阈值等单值设置
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 低耗材阈值设置键
pub const KEY_LOW_FILAMENT_THRESHOLD: &str = "low_filament_threshold_g";

/// 阈值缺省值（克）
pub const DEFAULT_LOW_FILAMENT_THRESHOLD_G: f64 = 200.0;

// ==========================================
// SettingsRepository - 用户设置仓储
// ==========================================
pub struct SettingsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取设置值
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入设置值（upsert）
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取低耗材阈值（克）; 未设置时返回缺省值
    pub fn get_low_filament_threshold(&self) -> RepositoryResult<f64> {
        match self.get_value(KEY_LOW_FILAMENT_THRESHOLD)? {
            Some(raw) => raw.parse::<f64>().map_err(|e| {
                RepositoryError::ValidationError(format!(
                    "阈值设置损坏 ({}={}): {}",
                    KEY_LOW_FILAMENT_THRESHOLD, raw, e
                ))
            }),
            None => Ok(DEFAULT_LOW_FILAMENT_THRESHOLD_G),
        }
    }

    /// 写入低耗材阈值（克）
    pub fn set_low_filament_threshold(&self, threshold_g: f64) -> RepositoryResult<()> {
        self.set_value(KEY_LOW_FILAMENT_THRESHOLD, &threshold_g.to_string())
    }
}
