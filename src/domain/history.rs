// ==========================================
// 3D打印耗材管理系统 - 历史台账领域模型
// ==========================================
// 对齐: schema history_entry / history_spool_usage 表
// 红线: 台账只追加, 一旦写入不可修改
// ==========================================

use crate::domain::types::JobStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// SpoolUsage - 已关闭任务的单线轴耗量
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoolUsage {
    pub spool_id: String,
    pub label: String, // start 时刻快照的展示标签
    pub start_weight_g: f64,
    pub estimated_weight_g: Option<f64>,
    pub end_weight_g: f64,
    pub grams_used_g: f64, // = start_weight_g - end_weight_g (允许为负)
}

// ==========================================
// HistoryEntry - 台账条目
// ==========================================
// 失败任务的 job_name 带 "FAILED: " 前缀以便台账中醒目标记
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub job_id: String,
    pub job_name: String,
    pub status: JobStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub spools: Vec<SpoolUsage>,
}

// ==========================================
// HistoryQuery - 台账过滤条件
// ==========================================
// 所有给出的谓词须同时满足; end_date 含当日整天 (end-of-day 闭区间)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub spool_label_substring: Option<String>,
}

impl HistoryQuery {
    /// 是否未给出任何谓词
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self
                .spool_label_substring
                .as_deref()
                .map(|s| s.trim().is_empty())
                .unwrap_or(true)
    }
}
