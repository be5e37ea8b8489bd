// ==========================================
// 3D打印耗材管理系统 - 材料目录 API
// ==========================================
// 职责: 用户可编辑材料目录的查询与增删
// 说明: 建档时遇到未知材料会自动并入目录（见 SpoolApi）
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::repository::material_repo::MaterialRepository;

// ==========================================
// MaterialApi - 材料目录 API
// ==========================================
pub struct MaterialApi {
    material_repo: Arc<MaterialRepository>,
}

impl MaterialApi {
    /// 创建新的 MaterialApi 实例
    pub fn new(material_repo: Arc<MaterialRepository>) -> Self {
        Self { material_repo }
    }

    /// 查询全部材料名
    pub fn list_materials(&self) -> ApiResult<Vec<String>> {
        Ok(self.material_repo.list_all()?)
    }

    /// 新增材料（幂等; 空白名拒绝）
    pub fn add_material(&self, name: &str) -> ApiResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::ValidationError("材料名不能为空".to_string()));
        }
        self.material_repo.insert(name)?;
        info!(material = name, "材料已加入目录");
        Ok(())
    }

    /// 删除材料
    pub fn remove_material(&self, name: &str) -> ApiResult<()> {
        self.material_repo.delete(name.trim())?;
        info!(material = name, "材料已从目录移除");
        Ok(())
    }
}
