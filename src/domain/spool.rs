// ==========================================
// 3D打印耗材管理系统 - 线轴领域模型
// ==========================================
// 对齐: schema spool / empty_spool / material_catalog 表
// 红线: weight_g 是任务控制器唯一可变更的数量
// ==========================================

use crate::domain::types::{ColorType, SpoolStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ColorAttributes - 颜色属性组 (可选)
// ==========================================
// 用途: 展示层过滤/分组; 核算逻辑不读取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAttributes {
    pub color_type: ColorType,    // 单色 / 渐变
    pub base_colors: Vec<String>, // 基础色 (渐变时多个)
    pub sheen: Option<String>,    // 光泽 (silk / matte / ...)
    pub glow: bool,               // 夜光标志
    pub texture: Option<String>,  // 质感 (wood / marble / ...)
}

// ==========================================
// Spool - 线轴主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spool {
    // ===== 主键 =====
    pub spool_id: String, // UUID v4

    // ===== 基础信息 =====
    pub brand: String,
    pub color: String,
    pub color_attrs: Option<ColorAttributes>,
    pub material: String, // 取自用户可编辑的材料目录

    // ===== 物理量 =====
    pub length_m: Option<f64>,           // 标称长度(米), 仅信息用途
    pub weight_g: f64,                   // 当前剩余耗材质量(克), 唯一可变量
    pub full_spool_weight_g: Option<f64>, // 建档时的整轴毛重(克)
    pub empty_spool_id: Option<String>,  // 建档时选用的空轴皮重记录

    // ===== 状态 =====
    pub status: SpoolStatus,
    pub retired_reason: Option<String>,
    pub retired_at: Option<DateTime<Utc>>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
}

impl Spool {
    /// 任务选择界面展示用的标签 (开始任务时快照进 JobSpoolEntry)
    ///
    /// 格式与原型一致: "{brand} - {color} ({material}) ({weight}g)"
    pub fn display_label(&self) -> String {
        format!(
            "{} - {} ({}) ({}g)",
            self.brand, self.color, self.material, self.weight_g
        )
    }

    /// 是否可被选入打印任务
    pub fn is_selectable(&self) -> bool {
        self.status == SpoolStatus::Active && self.weight_g.is_finite()
    }
}

// ==========================================
// NewSpool - 建档输入
// ==========================================
// 两种建档路径:
// 1. 直接给出 weight_g (净重)
// 2. 给出 full_spool_weight_g + empty_spool_id, 由皮重扣减推导净重
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSpool {
    pub brand: String,
    pub color: String,
    pub color_attrs: Option<ColorAttributes>,
    pub material: String,
    pub length_m: Option<f64>,
    pub weight_g: Option<f64>,
    pub full_spool_weight_g: Option<f64>,
    pub empty_spool_id: Option<String>,
}

// ==========================================
// SpoolPatch - 行内编辑输入
// ==========================================
// None 字段表示不修改
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpoolPatch {
    pub brand: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub length_m: Option<f64>,
    pub weight_g: Option<f64>,
}

// ==========================================
// EmptySpool - 空轴皮重记录
// ==========================================
// 仅在线轴建档时作为皮重查询使用; 任务控制器从不修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmptySpool {
    pub empty_spool_id: String, // UUID v4
    pub brand: String,
    pub package: String, // 包装规格 (如 "1kg cardboard")
    pub weight_g: f64,   // 空轴自重(克)
    pub created_at: DateTime<Utc>,
}
