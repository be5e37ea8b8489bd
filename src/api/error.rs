// ==========================================
// 3D打印耗材管理系统 - API层错误类型
// ==========================================
// 职责: 定义面向调用方的错误分类, 转换底层错误
// 约定: 所有错误在调用边界恢复, 无致命路径、无自动重试
// ==========================================

use crate::engine::job_controller::JobError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
///
/// 调用方负责用户侧提示文案; 这里只携带可解释的原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 任务状态机错误
    // ==========================================
    /// start 时未选择任何线轴
    #[error("未选择任何线轴")]
    SelectionError,

    /// 重量非数字/非有限, 或选中线轴缺少有效重量
    #[error("重量无效: {0}")]
    InvalidWeightError(String),

    /// 必须显式录入的终重缺失（失败路径禁用预估回退）
    #[error("缺少终重: {0}")]
    MissingWeightError(String),

    /// 在错误的状态机状态下调用（如 Idle 状态调用 end）
    #[error("状态不符: {0}")]
    StateError(String),

    // ==========================================
    // 数据校验错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将仓储层的技术错误转换为调用方可处理的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg) => ApiError::DatabaseError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 JobError 转换（引擎层 → API层）
// ==========================================
impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::SelectionError => ApiError::SelectionError,
            JobError::InvalidWeight(msg) => ApiError::InvalidWeightError(msg),
            JobError::MissingWeight(msg) => ApiError::MissingWeightError(msg),
            JobError::SpoolNotSelectable { spool_id, reason } => {
                ApiError::ValidationError(format!("线轴 {} 不可选: {}", spool_id, reason))
            }
            JobError::SpoolNotFound(id) => ApiError::NotFound(format!("Spool(id={})不存在", id)),
            JobError::StateError(msg) => ApiError::StateError(msg),
            JobError::Repository(repo_err) => repo_err.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
