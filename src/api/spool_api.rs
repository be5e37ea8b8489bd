// ==========================================
// 3D打印耗材管理系统 - 线轴库存 API
// ==========================================
// 职责: 线轴建档、退役/复用、列表查询、行内编辑
// 红线: weight_g 的任务内变更只经由 JobController, 不走本 API
// ==========================================

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::spool::{NewSpool, Spool, SpoolPatch};
use crate::domain::types::SpoolStatus;
use crate::repository::empty_spool_repo::EmptySpoolRepository;
use crate::repository::material_repo::MaterialRepository;
use crate::repository::spool_repo::SpoolRepository;

// ==========================================
// SpoolApi - 线轴库存 API
// ==========================================
pub struct SpoolApi {
    spool_repo: Arc<SpoolRepository>,
    empty_spool_repo: Arc<EmptySpoolRepository>,
    material_repo: Arc<MaterialRepository>,
}

impl SpoolApi {
    /// 创建新的 SpoolApi 实例
    pub fn new(
        spool_repo: Arc<SpoolRepository>,
        empty_spool_repo: Arc<EmptySpoolRepository>,
        material_repo: Arc<MaterialRepository>,
    ) -> Self {
        Self {
            spool_repo,
            empty_spool_repo,
            material_repo,
        }
    }

    // ==========================================
    // 建档
    // ==========================================

    /// 线轴建档
    ///
    /// # 校验
    /// - brand/color/material 非空
    /// - 两种净重来源（二选一）:
    ///   a) weight_g 直接给出, 须为有限数
    ///   b) empty_spool_id + full_spool_weight_g: 皮重记录须存在
    ///      且 full > empty, 净重 = full - empty
    /// - 未知材料自动并入材料目录（原型的"自定义材料"路径）
    ///
    /// # 返回
    /// - Ok(Spool): 已落库的新线轴
    /// - Err(ValidationError): 字段校验失败
    pub fn add_spool(&self, spec: NewSpool) -> ApiResult<Spool> {
        let brand = spec.brand.trim();
        let color = spec.color.trim();
        let material = spec.material.trim();
        if brand.is_empty() || color.is_empty() || material.is_empty() {
            return Err(ApiError::ValidationError(
                "brand/color/material 均不能为空".to_string(),
            ));
        }
        if let Some(len) = spec.length_m {
            if !len.is_finite() || len < 0.0 {
                return Err(ApiError::ValidationError(format!(
                    "长度必须是非负数字: {}",
                    len
                )));
            }
        }

        // 净重解算
        let weight_g = match &spec.empty_spool_id {
            Some(empty_id) => {
                let full = spec.full_spool_weight_g.ok_or_else(|| {
                    ApiError::ValidationError(
                        "选择了空轴皮重时必须给出整轴毛重 full_spool_weight_g".to_string(),
                    )
                })?;
                if !full.is_finite() {
                    return Err(ApiError::ValidationError(format!(
                        "整轴毛重必须是有效数字: {}",
                        full
                    )));
                }
                let tare = self
                    .empty_spool_repo
                    .find_by_id(empty_id)?
                    .ok_or_else(|| {
                        ApiError::ValidationError(format!("空轴皮重记录不存在: {}", empty_id))
                    })?;
                if full <= tare.weight_g {
                    return Err(ApiError::ValidationError(format!(
                        "整轴毛重({}g)必须大于空轴自重({}g)",
                        full, tare.weight_g
                    )));
                }
                full - tare.weight_g
            }
            None => {
                let w = spec.weight_g.ok_or_else(|| {
                    ApiError::ValidationError("必须给出当前净重 weight_g".to_string())
                })?;
                if !w.is_finite() {
                    return Err(ApiError::ValidationError(format!(
                        "净重必须是有效数字: {}",
                        w
                    )));
                }
                w
            }
        };

        // 未知材料并入目录
        if !self.material_repo.exists(material)? {
            debug!(material, "材料不在目录中, 自动并入");
            self.material_repo.insert(material)?;
        }

        let spool = Spool {
            spool_id: Uuid::new_v4().to_string(),
            brand: brand.to_string(),
            color: color.to_string(),
            color_attrs: spec.color_attrs,
            material: material.to_string(),
            length_m: spec.length_m,
            weight_g,
            full_spool_weight_g: spec.full_spool_weight_g,
            empty_spool_id: spec.empty_spool_id,
            status: SpoolStatus::Active,
            retired_reason: None,
            retired_at: None,
            created_at: chrono::Utc::now(),
        };

        self.spool_repo.create(&spool)?;
        info!(spool_id = %spool.spool_id, brand, material, weight_g, "线轴建档完成");
        Ok(spool)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 活跃线轴列表（任务选择界面与低耗材监测共用）
    pub fn list_active(&self) -> ApiResult<Vec<Spool>> {
        Ok(self.spool_repo.list_by_status(SpoolStatus::Active)?)
    }

    /// 退役线轴列表（单独的"退役"视图）
    pub fn list_retired(&self) -> ApiResult<Vec<Spool>> {
        Ok(self.spool_repo.list_by_status(SpoolStatus::Retired)?)
    }

    /// 按ID查询线轴详情
    pub fn get_spool(&self, spool_id: &str) -> ApiResult<Spool> {
        self.spool_repo
            .find_by_id(spool_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Spool(id={})不存在", spool_id)))
    }

    // ==========================================
    // 状态管理
    // ==========================================

    /// 退役线轴
    ///
    /// # 返回
    /// - Err(NotFound): 不存在匹配的活跃线轴（已退役或ID错误）
    pub fn retire_spool(&self, spool_id: &str, reason: Option<&str>) -> ApiResult<()> {
        let retired = self
            .spool_repo
            .mark_retired(spool_id, reason, chrono::Utc::now())?;
        if !retired {
            return Err(ApiError::NotFound(format!(
                "没有找到可退役的活跃线轴: {}",
                spool_id
            )));
        }
        info!(spool_id, reason = reason.unwrap_or(""), "线轴已退役");
        Ok(())
    }

    /// 取消退役（清除原因与时间戳）
    pub fn unretire_spool(&self, spool_id: &str) -> ApiResult<()> {
        let unretired = self.spool_repo.mark_unretired(spool_id)?;
        if !unretired {
            return Err(ApiError::NotFound(format!(
                "没有找到可复用的退役线轴: {}",
                spool_id
            )));
        }
        info!(spool_id, "线轴已恢复使用");
        Ok(())
    }

    // ==========================================
    // 编辑
    // ==========================================

    /// 行内编辑线轴基础字段（None 字段保持不变）
    ///
    /// 校验与建档一致; 新材料同样并入目录
    pub fn update_spool(&self, spool_id: &str, patch: SpoolPatch) -> ApiResult<Spool> {
        let current = self.get_spool(spool_id)?;

        let brand = patch.brand.as_deref().unwrap_or(&current.brand).trim().to_string();
        let color = patch.color.as_deref().unwrap_or(&current.color).trim().to_string();
        let material = patch
            .material
            .as_deref()
            .unwrap_or(&current.material)
            .trim()
            .to_string();
        if brand.is_empty() || color.is_empty() || material.is_empty() {
            return Err(ApiError::ValidationError(
                "brand/color/material 均不能为空".to_string(),
            ));
        }

        let length_m = patch.length_m.or(current.length_m);
        if let Some(len) = length_m {
            if !len.is_finite() || len < 0.0 {
                return Err(ApiError::ValidationError(format!(
                    "长度必须是非负数字: {}",
                    len
                )));
            }
        }
        let weight_g = patch.weight_g.unwrap_or(current.weight_g);
        if !weight_g.is_finite() {
            return Err(ApiError::ValidationError(format!(
                "净重必须是有效数字: {}",
                weight_g
            )));
        }

        if !self.material_repo.exists(&material)? {
            self.material_repo.insert(&material)?;
        }

        self.spool_repo
            .update_fields(spool_id, &brand, &color, &material, length_m, weight_g)?;
        self.get_spool(spool_id)
    }
}
