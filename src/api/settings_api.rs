// ==========================================
// 3D打印耗材管理系统 - 用户设置 API
// ==========================================
// 职责: 低耗材阈值的读写
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::repository::settings_repo::SettingsRepository;

// ==========================================
// SettingsApi - 用户设置 API
// ==========================================
pub struct SettingsApi {
    settings_repo: Arc<SettingsRepository>,
}

impl SettingsApi {
    /// 创建新的 SettingsApi 实例
    pub fn new(settings_repo: Arc<SettingsRepository>) -> Self {
        Self { settings_repo }
    }

    /// 读取低耗材阈值（克）; 未设置时返回缺省值 200g
    pub fn get_low_filament_threshold(&self) -> ApiResult<f64> {
        Ok(self.settings_repo.get_low_filament_threshold()?)
    }

    /// 设置低耗材阈值（克）
    ///
    /// # 校验
    /// - 须为有限正数
    pub fn set_low_filament_threshold(&self, threshold_g: f64) -> ApiResult<()> {
        if !threshold_g.is_finite() || threshold_g <= 0.0 {
            return Err(ApiError::ValidationError(format!(
                "低耗材阈值必须是正数: {}",
                threshold_g
            )));
        }
        self.settings_repo.set_low_filament_threshold(threshold_g)?;
        info!(threshold_g, "低耗材阈值已更新");
        Ok(())
    }
}
