// ==========================================
// PredictionPipeline 集成测试
// ==========================================
// 测试目标: 训练 / 预测正值 / 确定性 / 特征缺失检测
// ==========================================

mod test_helpers;

use corridor_advisor::config::AdvisorConfig;
use corridor_advisor::domain::{CorridorId, SegmentRole, ServicePriority, VehicleClass};
use corridor_advisor::engine::{EngineError, FeatureBuilder, PredictionPipeline};
use corridor_advisor::importer::TrafficDataset;
use test_helpers::{create_test_dataset, load_test_dataset, monday_at, test_config, CORRIDOR_ROADS};

fn trained(dataset: &TrafficDataset, config: &AdvisorConfig) -> PredictionPipeline {
    let mut pipeline = PredictionPipeline::new(config);
    pipeline.fit(dataset).expect("训练失败");
    pipeline
}

#[test]
fn test_all_corridor_pairs_predict_positive_tti() {
    let (_dir, dataset) = load_test_dataset();
    let config = test_config();
    let pipeline = trained(&dataset, &config);
    let builder = FeatureBuilder::new(&dataset, &config.time_buckets);

    for (origin, _) in CORRIDOR_ROADS {
        for (destination, _) in CORRIDOR_ROADS {
            let record = builder
                .build_features(
                    &CorridorId::new(origin),
                    &CorridorId::new(destination),
                    monday_at(17, 45),
                    VehicleClass::Medium,
                    4.0,
                    None,
                )
                .unwrap();
            let prediction = pipeline.predict(&record).unwrap();

            assert!(
                prediction.travel_time_index > 0.0,
                "{} → {} TTI 应为正: {}",
                origin,
                destination,
                prediction.travel_time_index
            );
            assert!(prediction.eta_minutes > 0.0);
            assert!(prediction.eta_minutes >= prediction.free_flow_minutes);
            assert!(prediction.cost_estimate > 0.0);
        }
    }
}

#[test]
fn test_predict_is_deterministic() {
    let (_dir, dataset) = load_test_dataset();
    let config = test_config();
    let builder = FeatureBuilder::new(&dataset, &config.time_buckets);
    let record = builder
        .build_features(
            &CorridorId::new("Koramangala"),
            &CorridorId::new("Hebbal"),
            monday_at(9, 10),
            VehicleClass::Light,
            2.0,
            None,
        )
        .unwrap()
        .with_priority(ServicePriority::Express);

    let pipeline = trained(&dataset, &config);
    let first = pipeline.predict(&record).unwrap();
    let second = pipeline.predict(&record).unwrap();
    assert_eq!(first, second);

    // 同种子重训得到相同模型
    let retrained = trained(&dataset, &config);
    assert_eq!(first, retrained.predict(&record).unwrap());

    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_training_report_reflects_split() {
    let (_dir, dataset) = load_test_dataset();
    let mut config = test_config();
    config.model.validation_ratio = 0.25;

    let mut pipeline = PredictionPipeline::new(&config);
    let report = pipeline.fit(&dataset).unwrap().clone();

    assert_eq!(report.train_rows + report.validation_rows, dataset.len());
    let expected_val = (dataset.len() as f64 * 0.25).round() as usize;
    assert!(report.validation_rows.abs_diff(expected_val) <= 1);
    assert_eq!(report.n_estimators, config.model.n_estimators);
    assert!(report.validation_mae >= 0.0);
    assert!(report.validation_rmse >= report.validation_mae);
    assert!(report.feature_columns.iter().any(|c| c == "weather"));
    assert!(pipeline.is_trained());
}

#[test]
fn test_predict_before_fit_is_model_not_trained() {
    let (_dir, dataset) = load_test_dataset();
    let config = test_config();
    let builder = FeatureBuilder::new(&dataset, &config.time_buckets);
    let record = builder
        .build_features(
            &CorridorId::new("Hebbal"),
            &CorridorId::new("Whitefield"),
            monday_at(12, 0),
            VehicleClass::Light,
            1.0,
            None,
        )
        .unwrap();

    let pipeline = PredictionPipeline::new(&config);
    assert_eq!(pipeline.predict(&record), Err(EngineError::ModelNotTrained));
}

#[test]
fn test_missing_model_column_is_schema_mismatch() {
    // 模型按含天气列的数据集训练
    let (_dir, with_weather) = load_test_dataset();
    let config = test_config();
    let pipeline = trained(&with_weather, &config);

    // 特征来自不含可选列的数据集
    let (_dir2, path) = create_test_dataset(10, false);
    let without_weather = TrafficDataset::load(&path).unwrap();
    let builder = FeatureBuilder::new(&without_weather, &config.time_buckets);
    let record = builder
        .build_features(
            &CorridorId::new("Whitefield"),
            &CorridorId::new("Hebbal"),
            monday_at(12, 0),
            VehicleClass::Light,
            1.0,
            None,
        )
        .unwrap();

    match pipeline.predict(&record) {
        Err(EngineError::SchemaMismatch { segment, .. }) => {
            assert_eq!(segment, SegmentRole::Origin);
        }
        other => panic!("应返回 SchemaMismatch，实际 {:?}", other),
    }
}

#[test]
fn test_dataset_without_optional_columns_trains_on_base_schema() {
    let (_dir, path) = create_test_dataset(12, false);
    let dataset = TrafficDataset::load(&path).unwrap();
    let config = test_config();
    let pipeline = trained(&dataset, &config);

    let columns = pipeline.schema_columns().unwrap();
    assert!(!columns.contains(&"weather"));
    assert!(columns.contains(&"corridor"));
    assert!(columns.contains(&"average_speed_kmh"));
}
