// ==========================================
// 3D打印耗材管理系统 - 历史台账 API
// ==========================================
// 职责: 台账查询（追加只经由任务控制器）
// 设计: 两个显式查询模式 recent(n) / filter(query),
//       取代原型中布尔标志贯穿单函数的隐式分支
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::history::{HistoryEntry, HistoryQuery};
use crate::repository::history_repo::HistoryRepository;

/// 默认视图条数（无过滤条件时展示最近十条）
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

// ==========================================
// HistoryApi - 历史台账 API
// ==========================================
pub struct HistoryApi {
    history_repo: Arc<HistoryRepository>,
}

impl HistoryApi {
    /// 创建新的 HistoryApi 实例
    pub fn new(history_repo: Arc<HistoryRepository>) -> Self {
        Self { history_repo }
    }

    /// 最近 n 条台账（按开始时间倒序）
    pub fn recent(&self, limit: u32) -> ApiResult<Vec<HistoryEntry>> {
        Ok(self.history_repo.list_recent(limit)?)
    }

    /// 默认视图: 最近十条（清空过滤条件后的回退视图）
    pub fn default_view(&self) -> ApiResult<Vec<HistoryEntry>> {
        self.recent(DEFAULT_RECENT_LIMIT)
    }

    /// 条件过滤: 所有给出的谓词须同时满足, 不加隐式条数上限
    ///
    /// # 校验
    /// - 给出日期区间时 start_date 不得晚于 end_date
    pub fn filter(&self, query: &HistoryQuery) -> ApiResult<Vec<HistoryEntry>> {
        if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            if start > end {
                return Err(ApiError::ValidationError(format!(
                    "起始日期({})不能晚于终止日期({})",
                    start, end
                )));
            }
        }

        // 空条件等价于默认视图
        if query.is_empty() {
            return self.default_view();
        }

        Ok(self.history_repo.filter(query)?)
    }
}
