// ==========================================
// 3D打印耗材管理系统 - 打印任务 API
// ==========================================
// 职责: 任务生命周期操作的对外入口
// 说明: 纯转发至 JobController 状态机, 只做错误翻译 —
//       业务判定全部在引擎层（展示层适配器只收集输入/渲染输出）
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::history::HistoryEntry;
use crate::domain::job::ActivePrintJob;
use crate::engine::job_controller::JobController;

// ==========================================
// JobApi - 打印任务 API
// ==========================================
pub struct JobApi {
    controller: Arc<JobController>,
}

impl JobApi {
    /// 创建新的 JobApi 实例
    pub fn new(controller: Arc<JobController>) -> Self {
        Self { controller }
    }

    /// 当前进行中任务（None 表示 Idle）
    pub fn active_job(&self) -> ApiResult<Option<ActivePrintJob>> {
        Ok(self.controller.active_job()?)
    }

    /// 开始打印任务
    ///
    /// # 参数
    /// - job_name: 任务名（空白时自动生成）
    /// - selected_spool_ids: 选中的线轴ID
    /// - estimates: 线轴ID → 预估耗量(克)
    pub fn start_job(
        &self,
        job_name: &str,
        selected_spool_ids: &[String],
        estimates: &HashMap<String, f64>,
    ) -> ApiResult<ActivePrintJob> {
        Ok(self.controller.start(job_name, selected_spool_ids, estimates)?)
    }

    /// 正常结束任务（缺失的终重按 start 时的预估耗量推算）
    pub fn end_job(&self, end_weights: &HashMap<String, f64>) -> ApiResult<HistoryEntry> {
        Ok(self.controller.end(end_weights)?)
    }

    /// 以失败结束任务（每个线轴都要求显式实测终重）
    pub fn fail_job(&self, end_weights: &HashMap<String, f64>) -> ApiResult<HistoryEntry> {
        Ok(self.controller.fail(end_weights)?)
    }

    /// 取消任务: 不更新库存、不写台账
    pub fn cancel_job(&self) -> ApiResult<bool> {
        Ok(self.controller.cancel()?)
    }
}
