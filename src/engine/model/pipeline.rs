// ==========================================
// 城市走廊通行决策系统 - 预测管线
// ==========================================
// 职责: 编码 + 随机森林 + 行程指标推算
// 流程: fit（运维触发，可重训）→ predict（只读）
// 红线: 未训练不得预测；模型所需列缺失时报 SchemaMismatch
// ==========================================

use crate::config::{AdvisorConfig, ModelConfig};
use crate::domain::corridor::HistoricalRecord;
use crate::domain::features::{columns, FeatureRecord, FeatureRow, SegmentFeatures};
use crate::domain::prediction::PredictionResult;
use crate::domain::types::{SegmentRole, VehicleClass};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::model::encoder::{ColumnEncoder, MissingColumn};
use crate::engine::model::forest::{ForestParams, RandomForestRegressor};
use crate::engine::model::split::train_validation_split;
use crate::engine::trip_estimator::{round_to, TripEstimator};
use crate::importer::TrafficDataset;
use chrono::{Datelike, Local, NaiveDateTime};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument};

/// 至少需要的训练行数（切分后两侧各 1 行）
pub const MIN_TRAINING_ROWS: usize = 2;

/// 预测 TTI 下限
const MIN_TTI: f64 = 0.5;

/// 训练报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub model_id: String,
    pub train_rows: usize,
    pub validation_rows: usize,
    pub validation_mae: f64,
    pub validation_rmse: f64,
    /// 模型使用的原始列
    pub feature_columns: Vec<String>,
    /// one-hot 展开后的宽度
    pub encoded_width: usize,
    pub n_estimators: usize,
    pub trained_at: NaiveDateTime,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone)]
struct TrainedModel {
    encoder: ColumnEncoder,
    forest: RandomForestRegressor,
    report: TrainingReport,
}

/// 历史记录 → 训练行（参考车型 light，载重 0）
///
/// 历史数据不含货运属性，vehicle_class / payload_tons 两列训练时恒定，
/// 森林不会在其上分裂；查询时 medium / heavy 编码为全零。
/// 车型影响只经由 TripEstimator 的拖曳系数进入 ETA 与费用。
pub fn training_row(record: &HistoricalRecord) -> FeatureRow {
    SegmentFeatures::from_record(SegmentRole::Origin, record, record.travel_time_index).model_row(
        record.day_of_week(),
        record.date.month(),
        VehicleClass::Light,
        0.0,
    )
}

// ==========================================
// PredictionPipeline
// ==========================================
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    model_config: ModelConfig,
    estimator: TripEstimator,
    trained: Option<TrainedModel>,
}

impl PredictionPipeline {
    /// 创建未训练的管线
    pub fn new(config: &AdvisorConfig) -> Self {
        Self {
            model_config: config.model.clone(),
            estimator: TripEstimator::new(config),
            trained: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.trained.as_ref().map(|t| &t.report)
    }

    /// 模型所需的原始列（未训练时为 None）
    pub fn schema_columns(&self) -> Option<Vec<&'static str>> {
        self.trained.as_ref().map(|t| t.encoder.columns())
    }

    /// 训练（重复调用即重训，替换旧模型）
    #[instrument(skip_all, fields(rows = dataset.len()))]
    pub fn fit(&mut self, dataset: &TrafficDataset) -> EngineResult<&TrainingReport> {
        let started = Instant::now();
        let records = dataset.records();
        if records.len() < MIN_TRAINING_ROWS {
            return Err(EngineError::InsufficientTrainingData {
                rows: records.len(),
                required: MIN_TRAINING_ROWS,
            });
        }

        // schema: 固定列 + 全部记录都具备的可选列
        let optional = dataset.complete_optional_columns();
        let categorical: Vec<&'static str> = columns::BASE_CATEGORICAL
            .iter()
            .copied()
            .chain(
                columns::OPTIONAL_CATEGORICAL
                    .iter()
                    .copied()
                    .filter(|c| optional.contains(c)),
            )
            .collect();
        let numeric: Vec<&'static str> = columns::BASE_NUMERIC
            .iter()
            .copied()
            .chain(
                columns::OPTIONAL_NUMERIC
                    .iter()
                    .copied()
                    .filter(|c| optional.contains(c)),
            )
            .collect();

        let rows: Vec<FeatureRow> = records.iter().map(training_row).collect();
        let targets: Vec<f64> = records.iter().map(|r| r.travel_time_index).collect();

        let (train_idx, val_idx) = train_validation_split(
            rows.len(),
            self.model_config.validation_ratio,
            self.model_config.seed,
        );

        let train_rows: Vec<&FeatureRow> = train_idx.iter().map(|&i| &rows[i]).collect();
        let encoder = ColumnEncoder::fit(&train_rows, &categorical, &numeric)
            .map_err(|MissingColumn(c)| EngineError::InternalError(format!("训练行缺少列 {}", c)))?;

        let encode = |idx: &[usize]| -> EngineResult<Vec<Vec<f64>>> {
            idx.iter()
                .map(|&i| {
                    encoder.transform(&rows[i]).map_err(|MissingColumn(c)| {
                        EngineError::InternalError(format!("训练行缺少列 {}", c))
                    })
                })
                .collect()
        };
        let x_train = encode(&train_idx)?;
        let y_train: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();

        let params = ForestParams::from(&self.model_config);
        let forest = RandomForestRegressor::fit(&x_train, &y_train, &params).ok_or(
            EngineError::InsufficientTrainingData {
                rows: x_train.len(),
                required: MIN_TRAINING_ROWS,
            },
        )?;

        let x_val = encode(&val_idx)?;
        let errors: Vec<f64> = x_val
            .iter()
            .zip(val_idx.iter())
            .map(|(x, &i)| forest.predict(x) - targets[i])
            .collect();
        let n_val = errors.len().max(1) as f64;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n_val;
        let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n_val).sqrt();

        let report = TrainingReport {
            model_id: uuid::Uuid::new_v4().to_string(),
            train_rows: train_idx.len(),
            validation_rows: val_idx.len(),
            validation_mae: round_to(mae, 4),
            validation_rmse: round_to(rmse, 4),
            feature_columns: encoder.columns().iter().map(|c| c.to_string()).collect(),
            encoded_width: encoder.width(),
            n_estimators: forest.n_trees(),
            trained_at: Local::now().naive_local(),
            elapsed_ms: started.elapsed().as_millis(),
        };

        info!(
            model_id = %report.model_id,
            train_rows = report.train_rows,
            validation_rows = report.validation_rows,
            validation_mae = report.validation_mae,
            encoded_width = report.encoded_width,
            elapsed_ms = report.elapsed_ms as u64,
            "模型训练完成"
        );

        let trained = self.trained.insert(TrainedModel {
            encoder,
            forest,
            report,
        });
        Ok(&trained.report)
    }

    /// 单路段 TTI（未取整）
    pub fn predict_segment_tti(&self, record: &FeatureRecord, role: SegmentRole) -> EngineResult<f64> {
        let model = self.trained.as_ref().ok_or(EngineError::ModelNotTrained)?;
        let x = model
            .encoder
            .transform(&record.model_row(role))
            .map_err(|MissingColumn(c)| EngineError::SchemaMismatch {
                column: c.to_string(),
                segment: role,
            })?;
        Ok(model.forest.predict(&x).max(MIN_TTI))
    }

    /// 预测行程指标
    pub fn predict(&self, record: &FeatureRecord) -> EngineResult<PredictionResult> {
        let origin_tti = self.predict_segment_tti(record, SegmentRole::Origin)?;
        let destination_tti = self.predict_segment_tti(record, SegmentRole::Destination)?;
        Ok(self.estimator.estimate(record, origin_tti, destination_tti))
    }
}
