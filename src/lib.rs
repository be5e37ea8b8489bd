// ==========================================
// 3D打印耗材管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 线轴库存与打印任务耗量核算（单用户本地系统）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AlertTier, ColorType, JobStatus, SpoolStatus};

// 领域实体
pub use domain::{
    ActivePrintJob, ColorAttributes, EmptySpool, HistoryEntry, HistoryQuery, JobSpoolEntry,
    NewSpool, Spool, SpoolPatch, SpoolUsage,
};

// 引擎
pub use engine::{JobController, JobError, LowFilamentReport};

// API
pub use api::{
    AlertApi, ApiError, EmptySpoolApi, HistoryApi, JobApi, MaterialApi, SettingsApi, SpoolApi,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "3D打印耗材管理系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
