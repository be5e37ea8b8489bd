// ==========================================
// 3D打印耗材管理系统 - API 层
// ==========================================
// 职责: 面向调用方的操作入口; 输入校验与错误翻译
// 说明: 展示层(外部协作方)只收集输入、渲染输出, 不含业务判定
// ==========================================

pub mod alert_api;
pub mod empty_spool_api;
pub mod error;
pub mod history_api;
pub mod job_api;
pub mod material_api;
pub mod settings_api;
pub mod spool_api;

pub use alert_api::AlertApi;
pub use empty_spool_api::EmptySpoolApi;
pub use error::{ApiError, ApiResult};
pub use history_api::{HistoryApi, DEFAULT_RECENT_LIMIT};
pub use job_api::JobApi;
pub use material_api::MaterialApi;
pub use settings_api::SettingsApi;
pub use spool_api::SpoolApi;
