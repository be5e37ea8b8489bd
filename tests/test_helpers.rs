// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的临时数据库与 AppState 装配
// ==========================================

#![allow(dead_code)]

use filament_aps::app::AppState;
use filament_aps::domain::spool::{NewSpool, Spool};
use std::error::Error;
use tempfile::NamedTempFile;

/// 集成测试环境: 临时数据库 + 完整装配的 AppState
///
/// NamedTempFile 需要保持存活, 否则数据库文件被提前删除
pub struct TestEnv {
    _temp_file: NamedTempFile,
    pub db_path: String,
    pub state: AppState,
}

impl TestEnv {
    /// 创建测试环境（独立临时数据库, schema 由 AppState 初始化）
    pub fn new() -> Result<Self, Box<dyn Error>> {
        filament_aps::logging::init_test();

        let temp_file = NamedTempFile::new()?;
        let db_path = temp_file.path().to_str().unwrap().to_string();
        let state = AppState::new(db_path.clone())?;

        Ok(Self {
            _temp_file: temp_file,
            db_path,
            state,
        })
    }

    /// 在同一数据库上重新装配 AppState（模拟进程重启/页面重载）
    pub fn reopen(&self) -> Result<AppState, Box<dyn Error>> {
        Ok(AppState::new(self.db_path.clone())?)
    }

    /// 快捷建档: 给定品牌/颜色/材料/净重的活跃线轴
    pub fn add_spool(
        &self,
        brand: &str,
        color: &str,
        material: &str,
        weight_g: f64,
    ) -> Result<Spool, Box<dyn Error>> {
        let spool = self.state.spool_api.add_spool(NewSpool {
            brand: brand.to_string(),
            color: color.to_string(),
            material: material.to_string(),
            weight_g: Some(weight_g),
            ..Default::default()
        })?;
        Ok(spool)
    }
}
