// ==========================================
// 3D打印耗材管理系统 - 领域类型定义
// ==========================================
// 红线: 状态一律使用标签联合(enum),禁止裸字符串传递
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 线轴状态 (Spool Status)
// ==========================================
// 不变量: retired 线轴不参与任务选择、活跃列表与低耗材统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpoolStatus {
    Active,  // 在用
    Retired, // 退役
}

impl fmt::Display for SpoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpoolStatus::Active => write!(f, "ACTIVE"),
            SpoolStatus::Retired => write!(f, "RETIRED"),
        }
    }
}

impl SpoolStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "RETIRED" => SpoolStatus::Retired,
            _ => SpoolStatus::Active, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SpoolStatus::Active => "ACTIVE",
            SpoolStatus::Retired => "RETIRED",
        }
    }
}

// ==========================================
// 任务结束状态 (Job Status)
// ==========================================
// 历史台账中的最终状态; 进行中的任务不入台账
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Success, // 正常完成
    Failed,  // 打印失败 (要求实测重量)
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Success => write!(f, "SUCCESS"),
            JobStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl JobStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Success, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            JobStatus::Success => "SUCCESS",
            JobStatus::Failed => "FAILED",
        }
    }
}

// ==========================================
// 颜色类型 (Color Type)
// ==========================================
// 可选颜色属性组的一部分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorType {
    Solid,    // 单色
    Gradient, // 渐变
}

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorType::Solid => write!(f, "SOLID"),
            ColorType::Gradient => write!(f, "GRADIENT"),
        }
    }
}

impl ColorType {
    /// 从字符串解析颜色类型
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GRADIENT" => ColorType::Gradient,
            _ => ColorType::Solid, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ColorType::Solid => "SOLID",
            ColorType::Gradient => "GRADIENT",
        }
    }
}

// ==========================================
// 低耗材告警等级 (Alert Tier)
// ==========================================
// 派生值: critical 优先于 warning, 两者互斥
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertTier {
    Warning,  // 剩余量 <= 阈值 (且未达 critical)
    Critical, // 剩余量 <= floor(阈值/2)
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertTier::Warning => write!(f, "WARNING"),
            AlertTier::Critical => write!(f, "CRITICAL"),
        }
    }
}
