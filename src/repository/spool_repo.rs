// ==========================================
// 3D打印耗材管理系统 - 线轴数据仓储
// ==========================================
// 职责: 管理 spool 表的 CRUD 操作
// 红线: 不含业务逻辑，只负责数据访问
// ==========================================

use crate::domain::spool::{ColorAttributes, Spool};
use crate::domain::types::{ColorType, SpoolStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// spool 表查询列（所有 SELECT 共用，保证行映射一致）
const SPOOL_COLUMNS: &str = r#"
    spool_id, brand, color,
    color_type, base_colors, sheen, glow, texture,
    material, length_m, weight_g,
    full_spool_weight_g, empty_spool_id,
    status, retired_reason, retired_at, created_at
"#;

// ==========================================
// SpoolRepository - 线轴仓储
// ==========================================
pub struct SpoolRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SpoolRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入新线轴
    pub fn create(&self, spool: &Spool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let (color_type, base_colors, sheen, glow, texture) = split_color_attrs(&spool.color_attrs)?;
        conn.execute(
            r#"
            INSERT INTO spool (
                spool_id, brand, color,
                color_type, base_colors, sheen, glow, texture,
                material, length_m, weight_g,
                full_spool_weight_g, empty_spool_id,
                status, retired_reason, retired_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                spool.spool_id,
                spool.brand,
                spool.color,
                color_type,
                base_colors,
                sheen,
                glow,
                texture,
                spool.material,
                spool.length_m,
                spool.weight_g,
                spool.full_spool_weight_g,
                spool.empty_spool_id,
                spool.status.to_db_str(),
                spool.retired_reason,
                spool.retired_at.map(|t| t.to_rfc3339()),
                spool.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按主键查询
    ///
    /// # 返回
    /// - Ok(Some(Spool)): 找到线轴
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, spool_id: &str) -> RepositoryResult<Option<Spool>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM spool WHERE spool_id = ?1", SPOOL_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let result = stmt.query_row(params![spool_id], map_spool_row);
        match result {
            Ok(spool) => Ok(Some(spool)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按状态过滤查询（活跃列表 / 退役列表共用）
    pub fn list_by_status(&self, status: SpoolStatus) -> RepositoryResult<Vec<Spool>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM spool WHERE status = ?1 ORDER BY created_at ASC, spool_id ASC",
            SPOOL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let spools = stmt
            .query_map(params![status.to_db_str()], map_spool_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(spools)
    }

    /// 行内编辑: 更新基础字段（建档后的 brand/color/material/length/weight 修正）
    ///
    /// 注意: 任务内的剩余量变更不走这里 — 由 ActiveJobRepository::commit_close
    /// 在关闭事务中统一写入
    pub fn update_fields(
        &self,
        spool_id: &str,
        brand: &str,
        color: &str,
        material: &str,
        length_m: Option<f64>,
        weight_g: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE spool
            SET brand = ?2, color = ?3, material = ?4, length_m = ?5, weight_g = ?6
            WHERE spool_id = ?1
            "#,
            params![spool_id, brand, color, material, length_m, weight_g],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Spool".to_string(),
                id: spool_id.to_string(),
            });
        }
        Ok(())
    }

    /// 退役线轴（状态、原因与时间戳一并落库）
    ///
    /// 仅作用于 ACTIVE 状态的行; 返回是否有行被更新
    pub fn mark_retired(
        &self,
        spool_id: &str,
        reason: Option<&str>,
        retired_at: DateTime<Utc>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE spool
            SET status = ?2, retired_reason = ?3, retired_at = ?4
            WHERE spool_id = ?1 AND status = ?5
            "#,
            params![
                spool_id,
                SpoolStatus::Retired.to_db_str(),
                reason,
                retired_at.to_rfc3339(),
                SpoolStatus::Active.to_db_str(),
            ],
        )?;
        Ok(affected > 0)
    }

    /// 取消退役（清除原因与时间戳）
    pub fn mark_unretired(&self, spool_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE spool
            SET status = ?2, retired_reason = NULL, retired_at = NULL
            WHERE spool_id = ?1 AND status = ?3
            "#,
            params![
                spool_id,
                SpoolStatus::Active.to_db_str(),
                SpoolStatus::Retired.to_db_str(),
            ],
        )?;
        Ok(affected > 0)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 将颜色属性组拆为表列（base_colors 序列化为 JSON 数组）
fn split_color_attrs(
    attrs: &Option<ColorAttributes>,
) -> RepositoryResult<(
    Option<String>,
    Option<String>,
    Option<String>,
    bool,
    Option<String>,
)> {
    match attrs {
        Some(a) => {
            let base_colors = serde_json::to_string(&a.base_colors)
                .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
            Ok((
                Some(a.color_type.to_db_str().to_string()),
                Some(base_colors),
                a.sheen.clone(),
                a.glow,
                a.texture.clone(),
            ))
        }
        None => Ok((None, None, None, false, None)),
    }
}

/// spool 表行映射（列顺序与 SPOOL_COLUMNS 对齐）
fn map_spool_row(row: &Row<'_>) -> rusqlite::Result<Spool> {
    let color_type: Option<String> = row.get(3)?;
    let base_colors_raw: Option<String> = row.get(4)?;
    let color_attrs = color_type.map(|ct| ColorAttributes {
        color_type: ColorType::from_str(&ct),
        base_colors: base_colors_raw
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default(),
        sheen: row.get(5).ok().flatten(),
        glow: row.get::<_, Option<bool>>(6).ok().flatten().unwrap_or(false),
        texture: row.get(7).ok().flatten(),
    });

    Ok(Spool {
        spool_id: row.get(0)?,
        brand: row.get(1)?,
        color: row.get(2)?,
        color_attrs,
        material: row.get(8)?,
        length_m: row.get(9)?,
        weight_g: row.get(10)?,
        full_spool_weight_g: row.get(11)?,
        empty_spool_id: row.get(12)?,
        status: SpoolStatus::from_str(&row.get::<_, String>(13)?),
        retired_reason: row.get(14)?,
        retired_at: row
            .get::<_, Option<String>>(15)?
            .and_then(|s| parse_utc(&s)),
        created_at: row
            .get::<_, Option<String>>(16)?
            .and_then(|s| parse_utc(&s))
            .unwrap_or_else(Utc::now),
    })
}

/// 解析 RFC3339 / SQLite datetime 字符串为 UTC 时间
pub(crate) fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|t| t.and_utc())
        })
}
