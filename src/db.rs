// ==========================================
// 3D打印耗材管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表语句集中于此，启动时幂等执行
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// # 表结构
/// - spool: 线轴主数据（weight_g 为任务控制器唯一可变量）
/// - empty_spool: 空轴皮重目录
/// - material_catalog: 用户可编辑的材料目录
/// - active_job / active_job_spool: 瞬态进行中任务（单行, slot=1）
/// - history_entry / history_spool_usage: 只追加的历史台账
/// - settings: 按键值存储的用户设置（低耗材阈值）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS spool (
            spool_id            TEXT PRIMARY KEY,
            brand               TEXT NOT NULL,
            color               TEXT NOT NULL,
            color_type          TEXT,
            base_colors         TEXT,               -- JSON 数组
            sheen               TEXT,
            glow                INTEGER NOT NULL DEFAULT 0,
            texture             TEXT,
            material            TEXT NOT NULL,
            length_m            REAL,
            weight_g            REAL NOT NULL,
            full_spool_weight_g REAL,
            empty_spool_id      TEXT,
            status              TEXT NOT NULL DEFAULT 'ACTIVE',
            retired_reason      TEXT,
            retired_at          TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS empty_spool (
            empty_spool_id TEXT PRIMARY KEY,
            brand          TEXT NOT NULL,
            package        TEXT NOT NULL,
            weight_g       REAL NOT NULL,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS material_catalog (
            name       TEXT PRIMARY KEY,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 单行表: slot 恒为 1, 结构性保证"至多一个进行中任务"
        CREATE TABLE IF NOT EXISTS active_job (
            slot       INTEGER PRIMARY KEY CHECK (slot = 1),
            job_id     TEXT NOT NULL,
            job_name   TEXT NOT NULL,
            start_time TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS active_job_spool (
            slot               INTEGER NOT NULL REFERENCES active_job(slot) ON DELETE CASCADE,
            spool_id           TEXT NOT NULL,
            label              TEXT NOT NULL,
            start_weight_g     REAL NOT NULL,
            estimated_weight_g REAL,
            PRIMARY KEY (slot, spool_id)
        );

        CREATE TABLE IF NOT EXISTS history_entry (
            job_id     TEXT PRIMARY KEY,
            job_name   TEXT NOT NULL,
            status     TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS history_spool_usage (
            job_id             TEXT NOT NULL REFERENCES history_entry(job_id),
            spool_id           TEXT NOT NULL,
            label              TEXT NOT NULL,
            start_weight_g     REAL NOT NULL,
            estimated_weight_g REAL,
            end_weight_g       REAL NOT NULL,
            grams_used_g       REAL NOT NULL,
            PRIMARY KEY (job_id, spool_id)
        );

        CREATE TABLE IF NOT EXISTS settings (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 台账按开始时间倒序展示; 保持查询路径快
        CREATE INDEX IF NOT EXISTS idx_history_start_time ON history_entry(start_time);
        CREATE INDEX IF NOT EXISTS idx_spool_status ON spool(status);
        "#,
    )?;
    Ok(())
}

/// 打开连接并确保 schema 就绪（应用启动与测试共用入口）
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}
