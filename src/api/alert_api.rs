// ==========================================
// 3D打印耗材管理系统 - 低耗材告警 API
// ==========================================
// 职责: 组合活跃线轴与阈值设置, 按需产出监测结果
// 红线: 只读视图 — 库存或阈值变化后重新调用即可
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::types::SpoolStatus;
use crate::engine::low_filament::{self, LowFilamentReport};
use crate::repository::settings_repo::SettingsRepository;
use crate::repository::spool_repo::SpoolRepository;

// ==========================================
// AlertApi - 低耗材告警 API
// ==========================================
pub struct AlertApi {
    spool_repo: Arc<SpoolRepository>,
    settings_repo: Arc<SettingsRepository>,
}

impl AlertApi {
    /// 创建新的 AlertApi 实例
    pub fn new(spool_repo: Arc<SpoolRepository>, settings_repo: Arc<SettingsRepository>) -> Self {
        Self {
            spool_repo,
            settings_repo,
        }
    }

    /// 计算当前低耗材监测结果（退役线轴不参与）
    pub fn low_filament_report(&self) -> ApiResult<LowFilamentReport> {
        let threshold_g = self.settings_repo.get_low_filament_threshold()?;
        let active = self.spool_repo.list_by_status(SpoolStatus::Active)?;
        Ok(low_filament::evaluate(&active, threshold_g))
    }
}
