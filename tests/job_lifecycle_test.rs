// ==========================================
// 打印任务生命周期集成测试
// ==========================================
// 测试范围:
// 1. start 前置条件: 空选择、无效重量、退役线轴、重复开始
// 2. end 终重解算: 显式终重 / 预估回退 / 缺失报错
// 3. fail 路径: 禁用预估回退, 台账名称前缀
// 4. cancel: 不动库存、不写台账
// 5. 耗量核算不变量: grams_used == start - end, 库存等于终重
// ==========================================

mod test_helpers;

use filament_aps::api::ApiError;
use filament_aps::domain::types::JobStatus;
use filament_aps::engine::FAILED_JOB_PREFIX;
use std::collections::HashMap;
use test_helpers::TestEnv;

fn weights(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(id, w)| (id.to_string(), *w)).collect()
}

// ==========================================
// start 前置条件
// ==========================================

#[test]
fn test_start_空选择报_selection_error() {
    let env = TestEnv::new().expect("无法创建测试环境");

    let result = env.state.job_api.start_job("Vase", &[], &HashMap::new());
    assert!(matches!(result, Err(ApiError::SelectionError)));

    // 状态机停留在 Idle
    assert!(env.state.job_api.active_job().unwrap().is_none());
}

#[test]
fn test_start_退役线轴不可选() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let spool = env.add_spool("Prusament", "Orange", "PLA", 800.0).unwrap();
    env.state
        .spool_api
        .retire_spool(&spool.spool_id, Some("用完"))
        .unwrap();

    let result = env
        .state
        .job_api
        .start_job("Vase", &[spool.spool_id.clone()], &HashMap::new());
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
    assert!(env.state.job_api.active_job().unwrap().is_none());
}

#[test]
fn test_start_未知线轴整体中止() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let good = env.add_spool("Prusament", "Orange", "PLA", 800.0).unwrap();

    // 第二个ID不存在 → 整体失败, 不产生部分任务
    let result = env.state.job_api.start_job(
        "Vase",
        &[good.spool_id.clone(), "no-such-id".to_string()],
        &HashMap::new(),
    );
    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert!(env.state.job_api.active_job().unwrap().is_none());
}

#[test]
fn test_start_重复开始报_state_error() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let spool = env.add_spool("Prusament", "Orange", "PLA", 800.0).unwrap();

    env.state
        .job_api
        .start_job("Job1", &[spool.spool_id.clone()], &HashMap::new())
        .unwrap();

    let result = env
        .state
        .job_api
        .start_job("Job2", &[spool.spool_id.clone()], &HashMap::new());
    assert!(matches!(result, Err(ApiError::StateError(_))));

    // 原任务不受影响
    let active = env.state.job_api.active_job().unwrap().unwrap();
    assert_eq!(active.job_name, "Job1");
}

#[test]
fn test_start_快照当前重量与标签() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let spool = env.add_spool("Prusament", "Orange", "PLA", 800.0).unwrap();

    let mut estimates = HashMap::new();
    estimates.insert(spool.spool_id.clone(), 50.0);

    let job = env
        .state
        .job_api
        .start_job("Benchy", &[spool.spool_id.clone()], &estimates)
        .unwrap();

    assert_eq!(job.spools.len(), 1);
    let entry = &job.spools[0];
    assert_eq!(entry.start_weight_g, 800.0);
    assert_eq!(entry.estimated_weight_g, Some(50.0));
    assert_eq!(entry.label, "Prusament - Orange (PLA) (800g)");
}

#[test]
fn test_start_空任务名自动生成() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let spool = env.add_spool("Prusament", "Orange", "PLA", 800.0).unwrap();

    let job = env
        .state
        .job_api
        .start_job("   ", &[spool.spool_id.clone()], &HashMap::new())
        .unwrap();
    assert!(job.job_name.starts_with("Print "));
}

// ==========================================
// end - 正常结束
// ==========================================

#[test]
fn test_end_显式终重_核算与落库() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();
    let b = env.add_spool("BrandB", "Blue", "PETG", 1000.0).unwrap();

    env.state
        .job_api
        .start_job("双色打印", &[a.spool_id.clone(), b.spool_id.clone()], &HashMap::new())
        .unwrap();

    let entry = env
        .state
        .job_api
        .end_job(&weights(&[(&a.spool_id, 420.0), (&b.spool_id, 930.5)]))
        .unwrap();

    assert_eq!(entry.status, JobStatus::Success);
    assert_eq!(entry.spools.len(), 2);
    for usage in &entry.spools {
        // 不变量: grams_used == start - end
        assert_eq!(usage.grams_used_g, usage.start_weight_g - usage.end_weight_g);
        // 不变量: 库存等于该任务的终重
        let stored = env.state.spool_api.get_spool(&usage.spool_id).unwrap();
        assert_eq!(stored.weight_g, usage.end_weight_g);
    }

    // 状态机回到 Idle, 台账追加一条
    assert!(env.state.job_api.active_job().unwrap().is_none());
    let history = env.state.history_api.default_view().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].job_name, "双色打印");
}

#[test]
fn test_end_预估回退() {
    // start(Vase, [A(500)], est=80) → end({}) ⇒ 终重420, 耗量80
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();

    let mut estimates = HashMap::new();
    estimates.insert(a.spool_id.clone(), 80.0);
    env.state
        .job_api
        .start_job("Vase", &[a.spool_id.clone()], &estimates)
        .unwrap();

    let entry = env.state.job_api.end_job(&HashMap::new()).unwrap();
    assert_eq!(entry.spools[0].end_weight_g, 420.0);
    assert_eq!(entry.spools[0].grams_used_g, 80.0);

    let stored = env.state.spool_api.get_spool(&a.spool_id).unwrap();
    assert_eq!(stored.weight_g, 420.0);

    let history = env.state.history_api.default_view().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, JobStatus::Success);
}

#[test]
fn test_end_无终重无预估报_missing_weight() {
    // start(Vase, [A(500)]) 无预估 → end({}) ⇒ MissingWeightError
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();

    env.state
        .job_api
        .start_job("Vase", &[a.spool_id.clone()], &HashMap::new())
        .unwrap();

    let result = env.state.job_api.end_job(&HashMap::new());
    assert!(matches!(result, Err(ApiError::MissingWeightError(_))));

    // 无任何写入: 库存不变, 任务仍在进行
    let stored = env.state.spool_api.get_spool(&a.spool_id).unwrap();
    assert_eq!(stored.weight_g, 500.0);
    assert!(env.state.job_api.active_job().unwrap().is_some());
    assert_eq!(env.state.history_api.default_view().unwrap().len(), 0);
}

#[test]
fn test_end_部分缺失时任何线轴都不写入() {
    // 多线轴任务: 一个有显式终重, 一个无终重无预估 → 整体失败, 有终重的也不落库
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();
    let b = env.add_spool("BrandB", "Blue", "PETG", 700.0).unwrap();

    env.state
        .job_api
        .start_job("双色", &[a.spool_id.clone(), b.spool_id.clone()], &HashMap::new())
        .unwrap();

    let result = env.state.job_api.end_job(&weights(&[(&a.spool_id, 450.0)]));
    assert!(matches!(result, Err(ApiError::MissingWeightError(_))));

    assert_eq!(env.state.spool_api.get_spool(&a.spool_id).unwrap().weight_g, 500.0);
    assert_eq!(env.state.spool_api.get_spool(&b.spool_id).unwrap().weight_g, 700.0);
    assert!(env.state.job_api.active_job().unwrap().is_some());
}

#[test]
fn test_end_非有限终重报_invalid_weight() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();

    env.state
        .job_api
        .start_job("Vase", &[a.spool_id.clone()], &HashMap::new())
        .unwrap();

    let result = env.state.job_api.end_job(&weights(&[(&a.spool_id, f64::NAN)]));
    assert!(matches!(result, Err(ApiError::InvalidWeightError(_))));
    assert!(env.state.job_api.active_job().unwrap().is_some());
}

#[test]
fn test_end_负耗量照常接受() {
    // 终重高于始重（操作员录入/换秤）→ 接受, 不阻断
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();

    env.state
        .job_api
        .start_job("Vase", &[a.spool_id.clone()], &HashMap::new())
        .unwrap();

    let entry = env.state.job_api.end_job(&weights(&[(&a.spool_id, 510.0)])).unwrap();
    assert_eq!(entry.spools[0].grams_used_g, -10.0);
    assert_eq!(env.state.spool_api.get_spool(&a.spool_id).unwrap().weight_g, 510.0);
}

#[test]
fn test_end_显式终重优先于预估() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();

    let mut estimates = HashMap::new();
    estimates.insert(a.spool_id.clone(), 80.0);
    env.state
        .job_api
        .start_job("Vase", &[a.spool_id.clone()], &estimates)
        .unwrap();

    // 实测 430g, 预估本应推出 420g — 采用实测
    let entry = env.state.job_api.end_job(&weights(&[(&a.spool_id, 430.0)])).unwrap();
    assert_eq!(entry.spools[0].end_weight_g, 430.0);
    assert_eq!(entry.spools[0].grams_used_g, 70.0);
}

#[test]
fn test_end_在_idle_状态报_state_error() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let result = env.state.job_api.end_job(&HashMap::new());
    assert!(matches!(result, Err(ApiError::StateError(_))));
}

// ==========================================
// fail - 失败结束
// ==========================================

#[test]
fn test_fail_禁用预估回退() {
    // 即使 start 时有预估, 失败路径也必须实测复秤
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();

    let mut estimates = HashMap::new();
    estimates.insert(a.spool_id.clone(), 80.0);
    env.state
        .job_api
        .start_job("Vase", &[a.spool_id.clone()], &estimates)
        .unwrap();

    let result = env.state.job_api.fail_job(&HashMap::new());
    assert!(matches!(result, Err(ApiError::MissingWeightError(_))));
    assert!(env.state.job_api.active_job().unwrap().is_some());
    assert_eq!(env.state.spool_api.get_spool(&a.spool_id).unwrap().weight_g, 500.0);
}

#[test]
fn test_fail_显式终重_台账带前缀() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();

    env.state
        .job_api
        .start_job("Vase", &[a.spool_id.clone()], &HashMap::new())
        .unwrap();

    let entry = env.state.job_api.fail_job(&weights(&[(&a.spool_id, 460.0)])).unwrap();
    assert_eq!(entry.status, JobStatus::Failed);
    assert_eq!(entry.job_name, format!("{}Vase", FAILED_JOB_PREFIX));
    assert_eq!(entry.spools[0].grams_used_g, 40.0);
    assert_eq!(env.state.spool_api.get_spool(&a.spool_id).unwrap().weight_g, 460.0);

    let history = env.state.history_api.default_view().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, JobStatus::Failed);
}

// ==========================================
// cancel
// ==========================================

#[test]
fn test_cancel_不动库存不写台账() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();

    env.state
        .job_api
        .start_job("Vase", &[a.spool_id.clone()], &HashMap::new())
        .unwrap();

    let discarded = env.state.job_api.cancel_job().unwrap();
    assert!(discarded);

    assert!(env.state.job_api.active_job().unwrap().is_none());
    assert_eq!(env.state.spool_api.get_spool(&a.spool_id).unwrap().weight_g, 500.0);
    assert_eq!(env.state.history_api.default_view().unwrap().len(), 0);
}

#[test]
fn test_cancel_在_idle_状态为空操作() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let discarded = env.state.job_api.cancel_job().unwrap();
    assert!(!discarded);
}

// ==========================================
// 瞬态恢复
// ==========================================

#[test]
fn test_进行中任务在重启后恢复() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let a = env.add_spool("BrandA", "Red", "PLA", 500.0).unwrap();

    let mut estimates = HashMap::new();
    estimates.insert(a.spool_id.clone(), 80.0);
    env.state
        .job_api
        .start_job("隔夜打印", &[a.spool_id.clone()], &estimates)
        .unwrap();

    // 在同一数据库上重新装配（模拟页面重载/进程重启）
    let reopened = env.reopen().expect("无法重新装配");
    let restored = reopened.job_api.active_job().unwrap().expect("任务应被恢复");
    assert_eq!(restored.job_name, "隔夜打印");
    assert_eq!(restored.spools[0].start_weight_g, 500.0);
    assert_eq!(restored.spools[0].estimated_weight_g, Some(80.0));

    // 恢复后可正常走预估回退结束
    let entry = reopened.job_api.end_job(&HashMap::new()).unwrap();
    assert_eq!(entry.spools[0].end_weight_g, 420.0);
}
