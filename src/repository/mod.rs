// ==========================================
// 3D打印耗材管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑, 只负责数据访问
// 连接: 各仓储共享 Arc<Mutex<Connection>>
// ==========================================

pub mod active_job_repo;
pub mod empty_spool_repo;
pub mod error;
pub mod history_repo;
pub mod material_repo;
pub mod settings_repo;
pub mod spool_repo;

pub use active_job_repo::ActiveJobRepository;
pub use empty_spool_repo::EmptySpoolRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use history_repo::HistoryRepository;
pub use material_repo::MaterialRepository;
pub use settings_repo::SettingsRepository;
pub use spool_repo::SpoolRepository;
