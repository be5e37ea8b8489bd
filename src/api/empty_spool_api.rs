// ==========================================
// 3D打印耗材管理系统 - 空轴皮重 API
// ==========================================
// 职责: 皮重目录的 CRUD（线轴建档时作为皮重查询消费）
// 红线: 任务控制器从不经由本 API 写入
// ==========================================

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::spool::EmptySpool;
use crate::repository::empty_spool_repo::EmptySpoolRepository;

// ==========================================
// EmptySpoolApi - 空轴皮重 API
// ==========================================
pub struct EmptySpoolApi {
    empty_spool_repo: Arc<EmptySpoolRepository>,
}

impl EmptySpoolApi {
    /// 创建新的 EmptySpoolApi 实例
    pub fn new(empty_spool_repo: Arc<EmptySpoolRepository>) -> Self {
        Self { empty_spool_repo }
    }

    /// 新增皮重记录
    ///
    /// # 校验
    /// - brand/package 非空, weight_g 为有限正数
    pub fn add_empty_spool(
        &self,
        brand: &str,
        package: &str,
        weight_g: f64,
    ) -> ApiResult<EmptySpool> {
        validate_fields(brand, package, weight_g)?;

        let spool = EmptySpool {
            empty_spool_id: Uuid::new_v4().to_string(),
            brand: brand.trim().to_string(),
            package: package.trim().to_string(),
            weight_g,
            created_at: chrono::Utc::now(),
        };
        self.empty_spool_repo.create(&spool)?;
        info!(empty_spool_id = %spool.empty_spool_id, brand, package, weight_g, "空轴皮重已登记");
        Ok(spool)
    }

    /// 查询全部皮重记录
    pub fn list_empty_spools(&self) -> ApiResult<Vec<EmptySpool>> {
        Ok(self.empty_spool_repo.list_all()?)
    }

    /// 更新皮重记录
    pub fn update_empty_spool(
        &self,
        empty_spool_id: &str,
        brand: &str,
        package: &str,
        weight_g: f64,
    ) -> ApiResult<()> {
        validate_fields(brand, package, weight_g)?;
        self.empty_spool_repo
            .update(empty_spool_id, brand.trim(), package.trim(), weight_g)?;
        Ok(())
    }

    /// 删除皮重记录
    pub fn delete_empty_spool(&self, empty_spool_id: &str) -> ApiResult<()> {
        self.empty_spool_repo.delete(empty_spool_id)?;
        info!(empty_spool_id, "空轴皮重已删除");
        Ok(())
    }
}

/// 皮重字段校验（新增/更新共用）
fn validate_fields(brand: &str, package: &str, weight_g: f64) -> ApiResult<()> {
    if brand.trim().is_empty() || package.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "brand/package 均不能为空".to_string(),
        ));
    }
    if !weight_g.is_finite() || weight_g <= 0.0 {
        return Err(ApiError::ValidationError(format!(
            "空轴自重必须是正数: {}",
            weight_g
        )));
    }
    Ok(())
}
