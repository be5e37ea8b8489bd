// ==========================================
// 3D打印耗材管理系统 - 低耗材监测
// ==========================================
// 职责: 基于活跃线轴与阈值的纯派生计算
// 红线: 只读 — 不修改库存, 每次按需重算
// ==========================================
// 分级规则:
// - critical: weight <= floor(threshold / 2)
// - warning:  weight <= threshold 且未达 critical
// 退役线轴完全不参与统计
// ==========================================

use crate::domain::spool::Spool;
use crate::domain::types::AlertTier;
use serde::{Deserialize, Serialize};

// ==========================================
// LowFilamentAlert - 单线轴告警
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowFilamentAlert {
    pub spool_id: String,
    pub label: String,
    pub weight_g: f64,
    pub tier: AlertTier,
}

// ==========================================
// LowFilamentReport - 监测结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowFilamentReport {
    pub threshold_g: f64,
    pub critical_cutoff_g: f64, // = floor(threshold / 2)
    pub warning_count: usize,
    pub critical_count: usize,
    pub alerts: Vec<LowFilamentAlert>,
}

/// 对活跃线轴集合计算低耗材告警
///
/// # 参数
/// - active_spools: 活跃线轴列表（调用方负责排除退役线轴）
/// - threshold_g: 低耗材阈值（克）
pub fn evaluate(active_spools: &[Spool], threshold_g: f64) -> LowFilamentReport {
    let critical_cutoff_g = (threshold_g / 2.0).floor();

    let mut alerts = Vec::new();
    for spool in active_spools {
        let tier = if spool.weight_g <= critical_cutoff_g {
            Some(AlertTier::Critical)
        } else if spool.weight_g <= threshold_g {
            Some(AlertTier::Warning)
        } else {
            None
        };

        if let Some(tier) = tier {
            alerts.push(LowFilamentAlert {
                spool_id: spool.spool_id.clone(),
                label: spool.display_label(),
                weight_g: spool.weight_g,
                tier,
            });
        }
    }

    // critical 在前, 同级按剩余量升序
    alerts.sort_by(|a, b| {
        let rank = |t: AlertTier| match t {
            AlertTier::Critical => 0,
            AlertTier::Warning => 1,
        };
        rank(a.tier)
            .cmp(&rank(b.tier))
            .then(a.weight_g.partial_cmp(&b.weight_g).unwrap_or(std::cmp::Ordering::Equal))
    });

    LowFilamentReport {
        threshold_g,
        critical_cutoff_g,
        warning_count: alerts.iter().filter(|a| a.tier == AlertTier::Warning).count(),
        critical_count: alerts.iter().filter(|a| a.tier == AlertTier::Critical).count(),
        alerts,
    }
}
