// ==========================================
// 3D打印耗材管理系统 - 引擎层
// ==========================================
// 职责: 业务规则 — 任务状态机与派生计算
// ==========================================

pub mod job_controller;
pub mod low_filament;

pub use job_controller::{JobController, JobError, JobResult, FAILED_JOB_PREFIX};
pub use low_filament::{evaluate as evaluate_low_filament, LowFilamentAlert, LowFilamentReport};
