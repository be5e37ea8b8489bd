// ==========================================
// 历史台账 API 集成测试
// ==========================================
// 测试范围:
// 1. 默认视图: 最近十条, 按开始时间倒序
// 2. recent(n) 显式条数
// 3. filter: 日期区间(end 含当日整天) / 标签子串 / 组合谓词
// 4. 区间校验: start > end 报 ValidationError
// ==========================================

mod test_helpers;

use chrono::{DateTime, NaiveDate, Utc};
use filament_aps::api::ApiError;
use filament_aps::domain::history::{HistoryEntry, HistoryQuery, SpoolUsage};
use filament_aps::domain::types::JobStatus;
use filament_aps::repository::history_repo::HistoryRepository;
use std::sync::{Arc, Mutex};
use test_helpers::TestEnv;

/// 直接经由仓储层播种台账（绕过任务状态机, 以便控制开始时间）
fn seed_repo(env: &TestEnv) -> HistoryRepository {
    let conn = filament_aps::db::open_sqlite_connection(&env.db_path).expect("无法打开数据库");
    HistoryRepository::from_connection(Arc::new(Mutex::new(conn)))
}

fn entry(job_id: &str, job_name: &str, start_rfc3339: &str, label: &str) -> HistoryEntry {
    let start_time: DateTime<Utc> = start_rfc3339.parse().expect("开始时间格式错误");
    HistoryEntry {
        job_id: job_id.to_string(),
        job_name: job_name.to_string(),
        status: JobStatus::Success,
        start_time,
        end_time: start_time + chrono::Duration::hours(2),
        spools: vec![SpoolUsage {
            spool_id: format!("{}-spool", job_id),
            label: label.to_string(),
            start_weight_g: 500.0,
            estimated_weight_g: None,
            end_weight_g: 450.0,
            grams_used_g: 50.0,
        }],
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().expect("日期格式错误")
}

// ==========================================
// 默认视图 / recent
// ==========================================

#[test]
fn test_默认视图_最近十条倒序() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let repo = seed_repo(&env);

    // 播种 12 条, 每天一条
    for day in 1..=12 {
        let start = format!("2026-08-{:02}T09:00:00Z", day);
        repo.append(&entry(
            &format!("job-{:02}", day),
            &format!("Job {:02}", day),
            &start,
            "BrandA - Red (PLA) (500g)",
        ))
        .unwrap();
    }

    assert_eq!(repo.count().unwrap(), 12);
    let view = env.state.history_api.default_view().unwrap();
    assert_eq!(view.len(), 10);
    // 倒序: 最新(12号)在前, 最早两条(1/2号)被截掉
    assert_eq!(view[0].job_id, "job-12");
    assert_eq!(view[9].job_id, "job-03");
    // 耗量明细随条目一并加载
    assert_eq!(view[0].spools.len(), 1);
    assert_eq!(view[0].spools[0].grams_used_g, 50.0);
}

#[test]
fn test_recent_显式条数() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let repo = seed_repo(&env);
    for day in 1..=5 {
        repo.append(&entry(
            &format!("job-{}", day),
            "Job",
            &format!("2026-08-{:02}T09:00:00Z", day),
            "BrandA - Red (PLA) (500g)",
        ))
        .unwrap();
    }

    let view = env.state.history_api.recent(3).unwrap();
    assert_eq!(view.len(), 3);
    assert_eq!(view[0].job_id, "job-5");
}

// ==========================================
// filter - 日期区间
// ==========================================

#[test]
fn test_filter_日期区间_终止日含当日整天() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let repo = seed_repo(&env);
    repo.append(&entry("early", "早", "2026-08-01T08:00:00Z", "A")).unwrap();
    repo.append(&entry("inside", "中", "2026-08-05T12:00:00Z", "A")).unwrap();
    // 终止日当天深夜 — end_date=2026-08-10 必须含这条
    repo.append(&entry("edge", "边界", "2026-08-10T23:30:00Z", "A")).unwrap();
    repo.append(&entry("late", "晚", "2026-08-11T00:10:00Z", "A")).unwrap();

    let query = HistoryQuery {
        start_date: Some(date("2026-08-05")),
        end_date: Some(date("2026-08-10")),
        spool_label_substring: None,
    };
    let view = env.state.history_api.filter(&query).unwrap();

    let ids: Vec<&str> = view.iter().map(|e| e.job_id.as_str()).collect();
    assert_eq!(ids, vec!["edge", "inside"]);
}

#[test]
fn test_filter_只给起始日() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let repo = seed_repo(&env);
    repo.append(&entry("old", "旧", "2026-08-01T08:00:00Z", "A")).unwrap();
    repo.append(&entry("new", "新", "2026-08-20T08:00:00Z", "A")).unwrap();

    let query = HistoryQuery {
        start_date: Some(date("2026-08-10")),
        ..Default::default()
    };
    let view = env.state.history_api.filter(&query).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].job_id, "new");
}

#[test]
fn test_filter_起始晚于终止报_validation_error() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let query = HistoryQuery {
        start_date: Some(date("2026-08-20")),
        end_date: Some(date("2026-08-10")),
        spool_label_substring: None,
    };
    let result = env.state.history_api.filter(&query);
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

// ==========================================
// filter - 标签子串 / 组合
// ==========================================

#[test]
fn test_filter_标签子串() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let repo = seed_repo(&env);
    repo.append(&entry("j1", "红色件", "2026-08-01T08:00:00Z", "Prusament - Red (PLA) (500g)"))
        .unwrap();
    repo.append(&entry("j2", "蓝色件", "2026-08-02T08:00:00Z", "Polymaker - Blue (PETG) (700g)"))
        .unwrap();

    let query = HistoryQuery {
        spool_label_substring: Some("Prusament".to_string()),
        ..Default::default()
    };
    let view = env.state.history_api.filter(&query).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].job_id, "j1");
}

#[test]
fn test_filter_组合谓词同时满足() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let repo = seed_repo(&env);
    // 标签匹配但日期在区间外
    repo.append(&entry("out", "区间外", "2026-07-01T08:00:00Z", "Prusament - Red (PLA) (500g)"))
        .unwrap();
    // 日期在区间内但标签不匹配
    repo.append(&entry("wrong-label", "错标签", "2026-08-05T08:00:00Z", "Polymaker - Blue (PETG) (700g)"))
        .unwrap();
    // 两个谓词都满足
    repo.append(&entry("hit", "命中", "2026-08-06T08:00:00Z", "Prusament - Red (PLA) (500g)"))
        .unwrap();

    let query = HistoryQuery {
        start_date: Some(date("2026-08-01")),
        end_date: Some(date("2026-08-31")),
        spool_label_substring: Some("Prusament".to_string()),
    };
    let view = env.state.history_api.filter(&query).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].job_id, "hit");
}

#[test]
fn test_filter_空条件回退默认视图() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let repo = seed_repo(&env);
    for day in 1..=12 {
        repo.append(&entry(
            &format!("job-{:02}", day),
            "Job",
            &format!("2026-08-{:02}T09:00:00Z", day),
            "A",
        ))
        .unwrap();
    }

    // 全空(含纯空白子串)等价于默认视图: 最近十条
    let query = HistoryQuery {
        spool_label_substring: Some("   ".to_string()),
        ..Default::default()
    };
    let view = env.state.history_api.filter(&query).unwrap();
    assert_eq!(view.len(), 10);
}

#[test]
fn test_filter_过滤结果不设条数上限() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let repo = seed_repo(&env);
    for day in 1..=12 {
        repo.append(&entry(
            &format!("job-{:02}", day),
            "Job",
            &format!("2026-08-{:02}T09:00:00Z", day),
            "A",
        ))
        .unwrap();
    }

    // 命中 12 条的过滤查询应全部返回, 不截为十条
    let query = HistoryQuery {
        start_date: Some(date("2026-08-01")),
        ..Default::default()
    };
    let view = env.state.history_api.filter(&query).unwrap();
    assert_eq!(view.len(), 12);
}
