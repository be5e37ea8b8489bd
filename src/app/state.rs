// ==========================================
// 3D打印耗材管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 红线: 无模块级可变全局 — 所有共享状态显式归属 AppState
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{
    AlertApi, EmptySpoolApi, HistoryApi, JobApi, MaterialApi, SettingsApi, SpoolApi,
};
use crate::engine::job_controller::JobController;
use crate::repository::{
    ActiveJobRepository, EmptySpoolRepository, HistoryRepository, MaterialRepository,
    SettingsRepository, SpoolRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源; 作为嵌入宿主(桌面壳/服务进程)的全局状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 线轴库存API
    pub spool_api: Arc<SpoolApi>,

    /// 打印任务API
    pub job_api: Arc<JobApi>,

    /// 历史台账API
    pub history_api: Arc<HistoryApi>,

    /// 低耗材告警API
    pub alert_api: Arc<AlertApi>,

    /// 空轴皮重API
    pub empty_spool_api: Arc<EmptySpoolApi>,

    /// 材料目录API
    pub material_api: Arc<MaterialApi>,

    /// 用户设置API
    pub settings_api: Arc<SettingsApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库连接并初始化 schema（幂等）
    /// 2. 种入预置材料目录
    /// 3. 初始化所有Repository与引擎（含进行中任务恢复）
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_and_init(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn: Arc<Mutex<Connection>> = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================

        let spool_repo = Arc::new(SpoolRepository::from_connection(conn.clone()));
        let empty_spool_repo = Arc::new(EmptySpoolRepository::from_connection(conn.clone()));
        let material_repo = Arc::new(MaterialRepository::from_connection(conn.clone()));
        let history_repo = Arc::new(HistoryRepository::from_connection(conn.clone()));
        let active_job_repo = Arc::new(ActiveJobRepository::from_connection(conn.clone()));
        let settings_repo = Arc::new(SettingsRepository::from_connection(conn.clone()));

        material_repo
            .seed_defaults()
            .map_err(|e| format!("材料目录预置失败: {}", e))?;

        // ==========================================
        // 初始化引擎层
        // ==========================================

        // 任务控制器（进程重启后从瞬态表恢复进行中任务）
        let job_controller = Arc::new(
            JobController::new(spool_repo.clone(), active_job_repo)
                .map_err(|e| format!("无法创建JobController: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================

        let spool_api = Arc::new(SpoolApi::new(
            spool_repo.clone(),
            empty_spool_repo.clone(),
            material_repo.clone(),
        ));
        let job_api = Arc::new(JobApi::new(job_controller));
        let history_api = Arc::new(HistoryApi::new(history_repo));
        let alert_api = Arc::new(AlertApi::new(spool_repo, settings_repo.clone()));
        let empty_spool_api = Arc::new(EmptySpoolApi::new(empty_spool_repo));
        let material_api = Arc::new(MaterialApi::new(material_repo));
        let settings_api = Arc::new(SettingsApi::new(settings_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            spool_api,
            job_api,
            history_api,
            alert_api,
            empty_spool_api,
            material_api,
            settings_api,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 开发环境: 用户数据目录/filament-aps-dev/filament_aps.db
/// - 生产环境: 用户数据目录/filament-aps/filament_aps.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("FILAMENT_APS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值，后续如果能拿到 data_dir 再覆盖。
    let mut path = PathBuf::from("./filament_aps.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("filament-aps-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("filament-aps");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("filament_aps.db");
    }

    path.to_string_lossy().to_string()
}
