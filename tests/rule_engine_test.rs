// ==========================================
// RuleEngine 集成测试
// ==========================================
// 测试目标: 时间窗 / 载重阈值 / 拥堵阈值规则的命中与判定
// ==========================================

mod test_helpers;

use chrono::NaiveDateTime;
use corridor_advisor::config::RuleCatalog;
use corridor_advisor::domain::{
    ClockTime, CorridorId, FeatureRecord, PredictionResult, Rule, RuleCondition, RuleSeverity,
    TimeWindow, VehicleClass,
};
use corridor_advisor::engine::{FeatureBuilder, RuleEngine};
use corridor_advisor::{AppState, TripQuery};
use test_helpers::{build_test_state, monday_at, saturday_at};

fn features(
    state: &AppState,
    origin: &str,
    destination: &str,
    departure: NaiveDateTime,
    vehicle: VehicleClass,
    payload: f64,
) -> (FeatureRecord, PredictionResult) {
    let builder = FeatureBuilder::new(&state.dataset, &state.config.time_buckets);
    let record = builder
        .build_features(
            &CorridorId::new(origin),
            &CorridorId::new(destination),
            departure,
            vehicle,
            payload,
            None,
        )
        .expect("构建特征失败");
    let prediction = state.pipeline.predict(&record).expect("预测失败");
    (record, prediction)
}

/// 指定起终点道路构建特征
fn features_on_roads(
    state: &AppState,
    origin: (&str, &str),
    destination: (&str, &str),
    departure: NaiveDateTime,
    vehicle: VehicleClass,
) -> (FeatureRecord, PredictionResult) {
    let builder = FeatureBuilder::new(&state.dataset, &state.config.time_buckets);
    let query = TripQuery::new(origin.0, destination.0, departure, 1.0)
        .with_roads(Some(origin.1.to_string()), Some(destination.1.to_string()));
    let record = builder.build_for_query(&query, vehicle).expect("构建特征失败");
    let prediction = state.pipeline.predict(&record).expect("预测失败");
    (record, prediction)
}

fn triggered_ids(engine: &RuleEngine, record: &FeatureRecord, prediction: &PredictionResult) -> Vec<String> {
    engine
        .evaluate(record, prediction)
        .triggered
        .into_iter()
        .map(|t| t.rule_id)
        .collect()
}

#[test]
fn test_cbd_curfew_blocks_heavy_weekday_morning() {
    let (_dir, state) = build_test_state();
    let (record, prediction) = features(
        &state,
        "MG Road",
        "Whitefield",
        monday_at(8, 30),
        VehicleClass::Heavy,
        5.0,
    );

    let verdict = state.rule_engine.evaluate(&record, &prediction);
    assert!(!verdict.pass, "重型车工作日 08:30 进入 CBD 应被拦截");

    let curfew = verdict
        .blocking()
        .find(|t| t.rule_id == "CBD_HEAVY_CURFEW")
        .expect("应命中 CBD_HEAVY_CURFEW");
    assert!(curfew.message.contains("08:00–21:00"), "消息应包含时间窗: {}", curfew.message);
    assert!(curfew.message.contains("Mon–Fri"));
    assert!(curfew.message.contains("M.G. Road"));
}

#[test]
fn test_curfew_window_boundaries() {
    let (_dir, state) = build_test_state();

    for (departure, expected) in [
        (monday_at(7, 59), false),
        (monday_at(8, 0), true),
        (monday_at(20, 59), true),
        (monday_at(21, 0), false),
        (saturday_at(9, 0), false),
    ] {
        let (record, prediction) =
            features(&state, "M.G. Road", "Whitefield", departure, VehicleClass::Heavy, 5.0);
        let ids = triggered_ids(&state.rule_engine, &record, &prediction);
        assert_eq!(
            ids.iter().any(|id| id == "CBD_HEAVY_CURFEW"),
            expected,
            "出发 {} 的命中结果不符",
            departure
        );
    }
}

#[test]
fn test_light_vehicle_not_subject_to_curfew() {
    let (_dir, state) = build_test_state();
    let (record, prediction) = features(
        &state,
        "M.G. Road",
        "Whitefield",
        monday_at(8, 30),
        VehicleClass::Light,
        1.0,
    );
    let ids = triggered_ids(&state.rule_engine, &record, &prediction);
    assert!(!ids.iter().any(|id| id == "CBD_HEAVY_CURFEW"));
    // 轻型车在 Whitefield 早高峰只触发提示
    assert!(ids.iter().any(|id| id == "BUS_PRIORITY_LANE"));
    assert!(state.rule_engine.evaluate(&record, &prediction).pass);
}

#[test]
fn test_destination_corridor_rule_matches() {
    let (_dir, state) = build_test_state();
    let (record, prediction) = features_on_roads(
        &state,
        ("Electronic City", "Hosur Road"),
        ("Hebbal", "Hebbal Flyover"),
        saturday_at(12, 0),
        VehicleClass::Heavy,
    );

    let verdict = state.rule_engine.evaluate(&record, &prediction);
    let orr = verdict
        .triggered
        .iter()
        .find(|t| t.rule_id == "ORR_NIGHT_ENTRY")
        .expect("终点 Hebbal 应命中 ORR_NIGHT_ENTRY");
    assert_eq!(orr.severity, RuleSeverity::Blocking);
    assert!(orr.message.contains("Hebbal / Hebbal Flyover"));
    assert!(orr.message.contains("all days"));
}

#[test]
fn test_road_restricted_rule_skips_unlisted_road() {
    let (_dir, state) = build_test_state();
    let orr_hit = |road: &str| {
        let (record, prediction) = features_on_roads(
            &state,
            ("Electronic City", "Hosur Road"),
            ("Hebbal", road),
            monday_at(12, 0),
            VehicleClass::Heavy,
        );
        triggered_ids(&state.rule_engine, &record, &prediction)
            .iter()
            .any(|id| id == "ORR_NIGHT_ENTRY")
    };

    assert!(orr_hit("Hebbal Flyover"));
    assert!(orr_hit("hebbal flyover"), "道路名称应归一化比较");
    // 同一走廊的未列出道路不受限
    assert!(!orr_hit("Ballari Road"));
}

#[test]
fn test_road_and_corridor_must_match_same_segment() {
    let (_dir, state) = build_test_state();
    let rule = Rule {
        id: "FLYOVER_FROM_WHITEFIELD".to_string(),
        name: "Flyover ban".to_string(),
        description: String::new(),
        severity: RuleSeverity::Blocking,
        condition: RuleCondition::TimeWindow {
            corridors: vec![CorridorId::new("Whitefield")],
            roads: vec!["Hebbal Flyover".to_string()],
            vehicle_classes: Vec::new(),
            window: TimeWindow {
                start: ClockTime::MIDNIGHT,
                end: ClockTime::MIDNIGHT,
            },
            days: Vec::new(),
        },
        recommendation: String::new(),
        enabled: true,
    };
    let engine = RuleEngine::new(RuleCatalog::new(vec![rule]).unwrap());

    // 走廊命中起点、道路命中终点，不构成同一路段
    let (record, prediction) = features_on_roads(
        &state,
        ("Whitefield", "ITPL Main Road"),
        ("Hebbal", "Hebbal Flyover"),
        monday_at(12, 0),
        VehicleClass::Light,
    );
    assert!(engine.evaluate(&record, &prediction).pass);
}

#[test]
fn test_payload_threshold_inclusive_boundary() {
    let (_dir, state) = build_test_state();

    for (payload, expected) in [(0.0, false), (9.99, false), (10.0, true), (14.0, true)] {
        let (record, prediction) = features(
            &state,
            "Koramangala",
            "Electronic City",
            monday_at(23, 0),
            VehicleClass::Heavy,
            payload,
        );
        let ids = triggered_ids(&state.rule_engine, &record, &prediction);
        assert_eq!(
            ids.iter().any(|id| id == "CBD_PAYLOAD_RELAY"),
            expected,
            "载重 {} 的命中结果不符",
            payload
        );
    }
}

#[test]
fn test_evaluate_is_idempotent() {
    let (_dir, state) = build_test_state();
    let (record, prediction) = features(
        &state,
        "Indiranagar",
        "Koramangala",
        monday_at(9, 15),
        VehicleClass::Medium,
        12.0,
    );

    let first = state.rule_engine.evaluate(&record, &prediction);
    let second = state.rule_engine.evaluate(&record, &prediction);
    assert_eq!(first, second);
    assert!(!first.triggered.is_empty());
}

#[test]
fn test_triggered_rules_follow_catalog_order() {
    let (_dir, state) = build_test_state();
    let (record, prediction) = features(
        &state,
        "Indiranagar",
        "Koramangala",
        monday_at(9, 0),
        VehicleClass::Heavy,
        12.0,
    );

    let ids = triggered_ids(&state.rule_engine, &record, &prediction);
    let catalog_order: Vec<&str> = state
        .rule_engine
        .catalog()
        .rules()
        .iter()
        .map(|r| r.id.as_str())
        .filter(|id| ids.iter().any(|t| t == id))
        .collect();
    assert_eq!(ids, catalog_order);
    assert!(ids.len() >= 3);
}

#[test]
fn test_custom_catalog_congestion_and_disabled_rules() {
    let (_dir, state) = build_test_state();
    let (record, prediction) = features(
        &state,
        "Hebbal",
        "Whitefield",
        monday_at(18, 0),
        VehicleClass::Light,
        0.5,
    );

    let congestion = Rule {
        id: "ANY_CONGESTION".to_string(),
        name: "Any congestion".to_string(),
        description: String::new(),
        severity: RuleSeverity::Advisory,
        condition: RuleCondition::CongestionThreshold {
            corridors: vec![CorridorId::new("Whitefield")],
            min_congestion_pct: 30.0,
        },
        recommendation: String::new(),
        enabled: true,
    };
    let disabled = Rule {
        id: "ALL_DAY_BAN".to_string(),
        name: "All day ban".to_string(),
        description: String::new(),
        severity: RuleSeverity::Blocking,
        condition: RuleCondition::TimeWindow {
            corridors: Vec::new(),
            roads: Vec::new(),
            vehicle_classes: Vec::new(),
            window: TimeWindow {
                start: ClockTime::MIDNIGHT,
                end: ClockTime::MIDNIGHT,
            },
            days: Vec::new(),
        },
        recommendation: String::new(),
        enabled: false,
    };

    let engine = RuleEngine::new(RuleCatalog::new(vec![congestion, disabled]).unwrap());
    let verdict = engine.evaluate(&record, &prediction);

    assert!(verdict.pass, "禁用规则不应参与求值");
    assert_eq!(verdict.triggered.len(), 1);
    assert_eq!(verdict.triggered[0].rule_id, "ANY_CONGESTION");
    assert!(verdict.triggered[0].message.contains("Whitefield"));
    assert!(verdict.triggered[0].message.contains("预测拥堵度"));
}
