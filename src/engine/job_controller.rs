// ==========================================
// 3D打印耗材管理系统 - 打印任务状态机
// ==========================================
// 状态: Idle (无进行中任务) / JobActive (恰好一个)
// 转移: start 进入 JobActive; end/fail/cancel 回到 Idle
// 红线: 校验失败不转移状态、不产生部分写入
// ==========================================
// 职责: 任务生命周期 + 耗量核算
// 输入: 线轴选择、预估耗量、显式终重
// 输出: 线轴剩余量更新 + 台账条目
// ==========================================

use crate::domain::history::{HistoryEntry, SpoolUsage};
use crate::domain::job::{ActivePrintJob, JobSpoolEntry};
use crate::domain::types::JobStatus;
use crate::repository::active_job_repo::ActiveJobRepository;
use crate::repository::error::RepositoryError;
use crate::repository::spool_repo::SpoolRepository;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 失败任务在台账中的名称前缀
pub const FAILED_JOB_PREFIX: &str = "FAILED: ";

// ==========================================
// JobError - 任务状态机错误
// ==========================================
/// 所有校验失败均为局部、非致命: 状态机停留在原状态, 调用方修正输入后重试
#[derive(Error, Debug)]
pub enum JobError {
    #[error("未选择任何线轴")]
    SelectionError,

    #[error("线轴重量无效: {0}")]
    InvalidWeight(String),

    #[error("缺少必填终重: {0}")]
    MissingWeight(String),

    #[error("线轴不可选入任务: {spool_id} ({reason})")]
    SpoolNotSelectable { spool_id: String, reason: String },

    #[error("线轴未找到: {0}")]
    SpoolNotFound(String),

    #[error("状态机状态不符: {0}")]
    StateError(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type JobResult<T> = Result<T, JobError>;

// ==========================================
// JobController - 打印任务控制器
// ==========================================
/// 进行中任务以内存副本 + 单行瞬态表双重持有:
/// - 内存副本由 Mutex 守护, 多入口嵌入(如 server)时显式串行化
/// - 瞬态表保证进程重启后可恢复
pub struct JobController {
    spool_repo: Arc<SpoolRepository>,
    active_job_repo: Arc<ActiveJobRepository>,
    active: Mutex<Option<ActivePrintJob>>,
}

impl JobController {
    /// 创建控制器并从瞬态表恢复进行中任务
    pub fn new(
        spool_repo: Arc<SpoolRepository>,
        active_job_repo: Arc<ActiveJobRepository>,
    ) -> JobResult<Self> {
        let restored = active_job_repo.load()?;
        if let Some(ref job) = restored {
            info!(job_id = %job.job_id, job_name = %job.job_name, "恢复进行中的打印任务");
        }
        Ok(Self {
            spool_repo,
            active_job_repo,
            active: Mutex::new(restored),
        })
    }

    /// 当前进行中任务（无则为 Idle 状态）
    pub fn active_job(&self) -> JobResult<Option<ActivePrintJob>> {
        let guard = self.lock_active()?;
        Ok(guard.clone())
    }

    // ==========================================
    // start - Idle → JobActive
    // ==========================================

    /// 开始打印任务
    ///
    /// # 前置条件
    /// - 状态机处于 Idle（否则 StateError）
    /// - 选择非空（否则 SelectionError）
    /// - 所有选中线轴存在、在用且重量为有限数（任一不满足则整体中止, 不产生部分任务）
    ///
    /// # 参数
    /// - job_name: 任务名; 空白时生成 "Print {时间戳}"
    /// - selected_spool_ids: 选中的线轴ID列表
    /// - estimates: 线轴ID → 预估耗量(克), 结束时用于推算终重
    #[instrument(skip(self, estimates), fields(selected = selected_spool_ids.len()))]
    pub fn start(
        &self,
        job_name: &str,
        selected_spool_ids: &[String],
        estimates: &HashMap<String, f64>,
    ) -> JobResult<ActivePrintJob> {
        let mut guard = self.lock_active()?;
        if let Some(ref job) = *guard {
            return Err(JobError::StateError(format!(
                "已有进行中任务: {} ({})",
                job.job_name, job.job_id
            )));
        }

        if selected_spool_ids.is_empty() {
            return Err(JobError::SelectionError);
        }

        // 先全量校验选择, 再构造任务 — 不产生部分任务
        let mut entries: Vec<JobSpoolEntry> = Vec::with_capacity(selected_spool_ids.len());
        for spool_id in selected_spool_ids {
            if entries.iter().any(|e| &e.spool_id == spool_id) {
                continue; // 重复选择按一次计
            }

            let spool = self
                .spool_repo
                .find_by_id(spool_id)?
                .ok_or_else(|| JobError::SpoolNotFound(spool_id.clone()))?;

            if !spool.is_selectable() {
                if spool.status == crate::domain::types::SpoolStatus::Retired {
                    return Err(JobError::SpoolNotSelectable {
                        spool_id: spool_id.clone(),
                        reason: "已退役".to_string(),
                    });
                }
                return Err(JobError::InvalidWeight(format!(
                    "线轴 {} 缺少有效的当前重量",
                    spool_id
                )));
            }

            let estimated = match estimates.get(spool_id) {
                Some(est) if !est.is_finite() => {
                    return Err(JobError::InvalidWeight(format!(
                        "线轴 {} 的预估耗量不是有效数字",
                        spool_id
                    )));
                }
                Some(est) => Some(*est),
                None => None,
            };

            entries.push(JobSpoolEntry {
                spool_id: spool_id.clone(),
                label: spool.display_label(),
                start_weight_g: spool.weight_g,
                estimated_weight_g: estimated,
            });
        }

        let now = Utc::now();
        let name = job_name.trim();
        let job = ActivePrintJob {
            job_id: Uuid::new_v4().to_string(),
            job_name: if name.is_empty() {
                format!("Print {}", now.format("%Y-%m-%d %H:%M"))
            } else {
                name.to_string()
            },
            start_time: now,
            spools: entries,
        };

        self.active_job_repo.store(&job)?;
        info!(job_id = %job.job_id, job_name = %job.job_name, spools = job.spools.len(), "打印任务已开始");

        *guard = Some(job.clone());
        Ok(job)
    }

    // ==========================================
    // end / fail - JobActive → Idle
    // ==========================================

    /// 正常结束打印任务
    ///
    /// 终重解算顺序（逐线轴）:
    /// 1. 调用方给出显式终重 → 采用（须为有限数, 否则 InvalidWeight）
    /// 2. start 时记录过预估耗量 → end = start - estimated
    /// 3. 两者皆无 → MissingWeight
    ///
    /// grams_used = start - end; 不做符号/范围检查 —
    /// 终重高于始重（负耗量）照常接受, 不因操作员录入问题阻断
    pub fn end(&self, end_weights: &HashMap<String, f64>) -> JobResult<HistoryEntry> {
        self.close(end_weights, JobStatus::Success)
    }

    /// 以失败结束打印任务
    ///
    /// 与 end 的唯一差别: 禁用预估回退 — 失败打印的余料状态不可预估,
    /// 必须实际复秤, 每个线轴都要求显式终重
    pub fn fail(&self, end_weights: &HashMap<String, f64>) -> JobResult<HistoryEntry> {
        self.close(end_weights, JobStatus::Failed)
    }

    fn close(
        &self,
        end_weights: &HashMap<String, f64>,
        status: JobStatus,
    ) -> JobResult<HistoryEntry> {
        let mut guard = self.lock_active()?;
        let job = guard
            .as_ref()
            .ok_or_else(|| JobError::StateError("当前没有进行中任务".to_string()))?
            .clone();

        let allow_estimate = status == JobStatus::Success;

        // 先解算全部终重, 再统一落库 — 任一解算失败时无任何写入
        let mut usages: Vec<SpoolUsage> = Vec::with_capacity(job.spools.len());
        for entry in &job.spools {
            let end_weight_g = match end_weights.get(&entry.spool_id) {
                Some(v) if !v.is_finite() => {
                    return Err(JobError::InvalidWeight(format!(
                        "线轴 {} 的终重不是有效数字",
                        entry.spool_id
                    )));
                }
                Some(v) => *v,
                None => match entry.estimated_weight_g {
                    Some(est) if allow_estimate => entry.start_weight_g - est,
                    _ => {
                        return Err(JobError::MissingWeight(format!(
                            "线轴 {} 需要录入终重",
                            entry.spool_id
                        )));
                    }
                },
            };

            let grams_used_g = entry.start_weight_g - end_weight_g;
            if grams_used_g < 0.0 {
                warn!(
                    spool_id = %entry.spool_id,
                    grams_used_g,
                    "终重高于始重, 记录负耗量"
                );
            }

            usages.push(SpoolUsage {
                spool_id: entry.spool_id.clone(),
                label: entry.label.clone(),
                start_weight_g: entry.start_weight_g,
                estimated_weight_g: entry.estimated_weight_g,
                end_weight_g,
                grams_used_g,
            });
        }

        let entry = HistoryEntry {
            job_id: job.job_id.clone(),
            job_name: match status {
                JobStatus::Success => job.job_name.clone(),
                JobStatus::Failed => format!("{}{}", FAILED_JOB_PREFIX, job.job_name),
            },
            status,
            start_time: job.start_time,
            end_time: Utc::now(),
            spools: usages,
        };

        // 剩余量更新 + 台账追加 + 瞬态清除在同一事务内
        self.active_job_repo.commit_close(&entry)?;
        info!(
            job_id = %entry.job_id,
            status = %entry.status,
            spools = entry.spools.len(),
            "打印任务已关闭"
        );

        *guard = None;
        Ok(entry)
    }

    // ==========================================
    // cancel - 无条件回到 Idle
    // ==========================================

    /// 取消进行中任务: 不更新库存、不写台账
    ///
    /// # 返回
    /// - Ok(true): 有任务被丢弃
    /// - Ok(false): 本就处于 Idle（空操作）
    pub fn cancel(&self) -> JobResult<bool> {
        let mut guard = self.lock_active()?;
        if guard.is_none() {
            return Ok(false);
        }

        self.active_job_repo.clear()?;
        if let Some(ref job) = *guard {
            info!(job_id = %job.job_id, job_name = %job.job_name, "打印任务已取消");
        }
        *guard = None;
        Ok(true)
    }

    fn lock_active(&self) -> JobResult<std::sync::MutexGuard<Option<ActivePrintJob>>> {
        self.active
            .lock()
            .map_err(|e| JobError::StateError(format!("任务状态锁获取失败: {}", e)))
    }
}
