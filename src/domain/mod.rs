// ==========================================
// 3D打印耗材管理系统 - 领域层
// ==========================================
// 职责: 实体与类型定义, 不含数据访问与业务流程
// ==========================================

pub mod history;
pub mod job;
pub mod spool;
pub mod types;

pub use history::{HistoryEntry, HistoryQuery, SpoolUsage};
pub use job::{ActivePrintJob, JobSpoolEntry};
pub use spool::{ColorAttributes, EmptySpool, NewSpool, Spool, SpoolPatch};
pub use types::{AlertTier, ColorType, JobStatus, SpoolStatus};
