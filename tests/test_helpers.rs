// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 生成合成数据集 CSV、装配应用状态、构造预测结果
// ==========================================

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use corridor_advisor::config::AdvisorConfig;
use corridor_advisor::domain::{
    CorridorId, CostBreakdown, PredictionResult, SegmentForecast, SegmentRole,
};
use corridor_advisor::importer::TrafficDataset;
use corridor_advisor::AppState;

/// 合成数据集覆盖的走廊与道路
pub const CORRIDOR_ROADS: [(&str, &[&str]); 6] = [
    ("M.G. Road", &["Trinity Circle", "Anil Kumble Circle"]),
    ("Whitefield", &["ITPL Main Road"]),
    ("Koramangala", &["Sony World Junction"]),
    ("Hebbal", &["Hebbal Flyover", "Ballari Road"]),
    ("Indiranagar", &["100 Feet Road", "CMH Road"]),
    ("Electronic City", &["Hosur Road"]),
];

pub const REQUIRED_HEADERS: [&str; 9] = [
    "Date",
    "Area Name",
    "Road/Intersection Name",
    "Traffic Volume",
    "Average Speed",
    "Travel Time Index",
    "Congestion Level",
    "Incident Reports",
    "Traffic Signal Compliance",
];

pub const OPTIONAL_HEADERS: [&str; 7] = [
    "Road Capacity Utilization",
    "Environmental Impact",
    "Public Transport Usage",
    "Parking Usage",
    "Pedestrian and Cyclist Count",
    "Weather Conditions",
    "Roadwork and Construction Activity",
];

const WEATHERS: [&str; 4] = ["Clear", "Rain", "Overcast", "Fog"];

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
}

/// 合成数据行（确定性：同样参数生成同样内容）
pub fn dataset_rows(days: u32, with_optional: bool) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for day in 0..days {
        let date = start_date() + Duration::days(day as i64);
        for (c_idx, (corridor, roads)) in CORRIDOR_ROADS.iter().enumerate() {
            for (r_idx, road) in roads.iter().enumerate() {
                let wave = ((day as f64) * 0.7 + c_idx as f64).sin();
                let tti = 1.1 + 0.08 * c_idx as f64 + 0.05 * r_idx as f64 + 0.1 * wave.abs();
                let speed = 45.0 / tti;
                let volume = 18000.0 + 2500.0 * c_idx as f64 + 400.0 * (day % 7) as f64;
                let congestion = (40.0 + 30.0 * (tti - 1.0) + 5.0 * wave).clamp(0.0, 100.0);
                let incidents = ((day + c_idx as u32) % 4) as f64;
                let compliance = 70.0 + 2.0 * (day % 10) as f64;

                let mut row = vec![
                    date.format("%Y-%m-%d").to_string(),
                    corridor.to_string(),
                    road.to_string(),
                    format!("{:.0}", volume),
                    format!("{:.2}", speed),
                    format!("{:.3}", tti),
                    format!("{:.1}", congestion),
                    format!("{}", incidents),
                    format!("{:.1}", compliance),
                ];
                if with_optional {
                    row.extend([
                        format!("{:.1}", 60.0 + 20.0 * wave.abs()),
                        format!("{:.1}", 100.0 + volume / 500.0),
                        format!("{:.1}", 30.0 + c_idx as f64),
                        format!("{:.1}", 50.0 + (day % 5) as f64 * 5.0),
                        format!("{}", 100 + 10 * c_idx),
                        WEATHERS[(day as usize + c_idx) % WEATHERS.len()].to_string(),
                        if day % 6 == 0 { "Yes" } else { "No" }.to_string(),
                    ]);
                }
                rows.push(row);
            }
        }
    }
    rows
}

pub fn headers(with_optional: bool) -> Vec<&'static str> {
    let mut headers = REQUIRED_HEADERS.to_vec();
    if with_optional {
        headers.extend(OPTIONAL_HEADERS);
    }
    headers
}

/// 写 CSV（值中含逗号时加引号）
pub fn write_csv(dir: &Path, file_name: &str, headers: &[&str], rows: &[Vec<String>]) -> PathBuf {
    let quote = |v: &str| {
        if v.contains(',') {
            format!("\"{}\"", v)
        } else {
            v.to_string()
        }
    };
    let mut content = headers.join(",");
    content.push('\n');
    for row in rows {
        content.push_str(&row.iter().map(|v| quote(v)).collect::<Vec<_>>().join(","));
        content.push('\n');
    }

    let path = dir.join(file_name);
    fs::write(&path, content).expect("写入测试 CSV 失败");
    path
}

/// 创建临时数据集文件
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活）
/// - PathBuf: 数据集文件路径
pub fn create_test_dataset(days: u32, with_optional: bool) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("创建临时目录失败");
    let path = write_csv(
        dir.path(),
        "Banglore_traffic_Dataset.csv",
        &headers(with_optional),
        &dataset_rows(days, with_optional),
    );
    (dir, path)
}

/// 测试用配置（缩小森林规模）
pub fn test_config() -> AdvisorConfig {
    let mut config = AdvisorConfig::default();
    config.model.n_estimators = 15;
    config.model.max_depth = 8;
    config
}

pub fn load_test_dataset() -> (TempDir, TrafficDataset) {
    let (dir, path) = create_test_dataset(20, true);
    let dataset = TrafficDataset::load(&path).expect("加载测试数据集失败");
    (dir, dataset)
}

/// 装配应用状态（加载 + 训练）
pub fn build_test_state() -> (TempDir, AppState) {
    build_test_state_with(test_config())
}

pub fn build_test_state_with(config: AdvisorConfig) -> (TempDir, AppState) {
    corridor_advisor::logging::init_test();
    let (dir, path) = create_test_dataset(20, true);
    let state = AppState::initialize(&path, config).expect("初始化应用状态失败");
    (dir, state)
}

/// 2024-03-04 为周一
pub fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// 2024-03-09 为周六
pub fn saturday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn forecast(role: SegmentRole, corridor: &str, modifier: f64) -> SegmentForecast {
    SegmentForecast {
        role,
        corridor: CorridorId::new(corridor),
        road: format!("{} Main Road", corridor),
        travel_time_index: 1.2 * modifier,
        implied_congestion_pct: 60.0,
        congestion_modifier: modifier,
        baseline_tti: 1.2,
    }
}

/// 构造预测结果（仅枢纽评分相关字段有意义）
pub fn prediction_with_destination_modifier(destination: &str, modifier: f64) -> PredictionResult {
    PredictionResult {
        travel_time_index: 1.2 * modifier,
        congestion_modifier: modifier,
        implied_congestion_pct: 60.0,
        eta_modifier_pct: 11.0,
        distance_km: 12.0,
        free_flow_minutes: 24.0,
        eta_minutes: 30.0,
        buffer_minutes: 6.0,
        vehicle_drag_factor: 1.0,
        cost_estimate: 496.0,
        cost_breakdown: CostBreakdown {
            distance_cost: 336.0,
            time_cost: 160.0,
            priority_multiplier: 1.0,
        },
        priority_window_minutes: 240.0,
        window_slack_minutes: 210.0,
        origin: forecast(SegmentRole::Origin, "M.G. Road", 1.0),
        destination: forecast(SegmentRole::Destination, destination, modifier),
    }
}
