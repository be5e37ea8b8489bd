// ==========================================
// 3D打印耗材管理系统 - 打印任务领域模型
// ==========================================
// 对齐: schema active_job / active_job_spool 表
// 红线: 全局至多一个 ActivePrintJob (单行表 slot=1)
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// JobSpoolEntry - 任务内单线轴条目
// ==========================================
// start 时快照; label 为去规范化的展示字符串, 线轴后续改名不影响台账
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpoolEntry {
    pub spool_id: String,
    pub label: String,                   // 开始时刻快照的展示标签
    pub start_weight_g: f64,             // 开始时刻的线轴剩余量快照
    pub estimated_weight_g: Option<f64>, // 预估耗量(克), 结束时可用于推算终重
}

// ==========================================
// ActivePrintJob - 进行中的打印任务
// ==========================================
// 生命周期: start 创建, end/fail/cancel 销毁
// 持久化为瞬态记录以便进程重启后恢复; 关闭前不进台账
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePrintJob {
    pub job_id: String, // UUID v4
    pub job_name: String,
    pub start_time: DateTime<Utc>,
    pub spools: Vec<JobSpoolEntry>,
}
