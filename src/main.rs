// ==========================================
// 3D打印耗材管理系统 - 主入口
// ==========================================
// 说明: 桌面壳/服务进程作为外部协作方接入 AppState;
//       本入口初始化应用状态并输出库存概览, 用于本地自检
// ==========================================

use filament_aps::app::{get_default_db_path, AppState};

fn main() {
    // 初始化日志系统
    filament_aps::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", filament_aps::APP_NAME);
    tracing::info!("系统版本: {}", filament_aps::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = print_overview(&app_state) {
        tracing::error!("库存概览生成失败: {}", e);
        std::process::exit(1);
    }
}

/// 输出库存与任务概览
fn print_overview(state: &AppState) -> Result<(), filament_aps::ApiError> {
    let active = state.spool_api.list_active()?;
    let retired = state.spool_api.list_retired()?;
    tracing::info!("活跃线轴: {} 个, 退役线轴: {} 个", active.len(), retired.len());

    match state.job_api.active_job()? {
        Some(job) => tracing::info!(
            "进行中任务: {} (自 {}, {} 个线轴)",
            job.job_name,
            job.start_time,
            job.spools.len()
        ),
        None => tracing::info!("当前无进行中任务"),
    }

    let report = state.alert_api.low_filament_report()?;
    tracing::info!(
        "低耗材监测: 阈值 {}g, warning {} 个, critical {} 个",
        report.threshold_g,
        report.warning_count,
        report.critical_count
    );
    for alert in &report.alerts {
        tracing::warn!("[{}] {} 剩余 {}g", alert.tier, alert.label, alert.weight_g);
    }

    Ok(())
}
