// ==========================================
// 城市走廊通行决策系统 - 行程规划 API
// ==========================================
// 职责: 查询接口（供外部 UI 层调用）
// 流程: 车型确定 → 特征构建 → 预测 → 规则求值 → 枢纽排名 → 标签
// ==========================================

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::Serialize;
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::AdvisorConfig;
use crate::domain::corridor::CorridorId;
use crate::domain::dataset::DqReport;
use crate::domain::trip::{TripLabels, TripQuery, TripResult};
use crate::domain::types::{CongestionBucket, PlanningStatus};
use crate::engine::{
    suggest_vehicle_class, FeatureBuilder, HubRecommender, PredictionPipeline, RuleEngine,
    TrainingReport,
};
use crate::importer::TrafficDataset;

/// 趋势默认取最近 14 条记录
pub const DEFAULT_TREND_POINTS: usize = 14;

// ==========================================
// 标签
// ==========================================

/// 时长标签: 满 1 小时为 "Xh Ym"，否则为 "N min"
pub fn minutes_to_label(minutes: f64) -> String {
    let rounded = minutes.round().max(0.0) as i64;
    let (hours, mins) = (rounded / 60, rounded % 60);
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{} min", mins)
    }
}

/// 到达时刻 "HH:MM"（跨天取模）
pub fn arrival_time_label(departure: NaiveTime, duration_minutes: f64) -> String {
    let total = departure.hour() as i64 * 60
        + departure.minute() as i64
        + duration_minutes.round() as i64;
    let total = total.rem_euclid(24 * 60);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// 带符号时长: |m| < 1 为 "On target"
pub fn signed_minutes_label(minutes: f64) -> String {
    if minutes.abs() < 1.0 {
        return "On target".to_string();
    }
    let prefix = if minutes >= 0.0 { "+" } else { "-" };
    format!("{}{}", prefix, minutes_to_label(minutes.abs()))
}

/// 费用标签 "INR 1,234"
pub fn cost_label(amount: f64) -> String {
    let whole = amount.round().max(0.0) as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("INR {}", grouped)
}

// ==========================================
// 查询输出
// ==========================================

/// 走廊概要
#[derive(Debug, Clone, Serialize)]
pub struct CorridorSummary {
    pub corridor: CorridorId,
    pub roads: Vec<String>,
    pub baseline_tti: f64,
    pub recent_congestion: f64,
    /// 最近窗口内遵守率达标记录占比 (0-1)
    pub compliance_share: f64,
    pub has_coordinates: bool,
    pub served_by_hubs: usize,
}

/// 趋势点
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub road: String,
    pub average_speed_kmh: f64,
    pub travel_time_index: f64,
    pub congestion_level: f64,
    pub congestion_bucket: CongestionBucket,
    pub signal_compliance_pct: f64,
    pub compliant: bool,
}

/// 模型质量
#[derive(Debug, Clone, Serialize)]
pub struct ModelQuality {
    pub training: TrainingReport,
    pub data_quality: DqReport,
}

// ==========================================
// TripApi
// ==========================================
pub struct TripApi<'a> {
    dataset: &'a TrafficDataset,
    pipeline: &'a PredictionPipeline,
    rule_engine: &'a RuleEngine,
    hub_recommender: &'a HubRecommender,
    config: &'a AdvisorConfig,
}

impl<'a> TripApi<'a> {
    pub fn new(
        dataset: &'a TrafficDataset,
        pipeline: &'a PredictionPipeline,
        rule_engine: &'a RuleEngine,
        hub_recommender: &'a HubRecommender,
        config: &'a AdvisorConfig,
    ) -> Self {
        Self {
            dataset,
            pipeline,
            rule_engine,
            hub_recommender,
            config,
        }
    }

    /// 规划行程
    ///
    /// # 返回
    /// - Ok(TripResult): 含预测、规则判定、枢纽排名；被 Blocking 规则拦截时 status = Blocked
    /// - Err(ApiError): 未知走廊 / 非法输入 / 模型未训练 / 特征缺失
    #[instrument(skip_all, fields(origin = %query.origin, destination = %query.destination))]
    pub fn plan_trip(&self, query: &TripQuery) -> ApiResult<TripResult> {
        if query.top_k == 0 {
            return Err(ApiError::InvalidInput("top_k 必须 ≥ 1".to_string()));
        }

        let (vehicle_class, suggested) = match query.vehicle_class {
            Some(class) => (class, false),
            None => (
                suggest_vehicle_class(query.payload_tons, &self.config.vehicles),
                true,
            ),
        };

        let builder = FeatureBuilder::new(self.dataset, &self.config.time_buckets);
        let features = builder.build_for_query(query, vehicle_class)?;
        let prediction = self.pipeline.predict(&features)?;
        let verdict = self.rule_engine.evaluate(&features, &prediction);
        let hubs = self
            .hub_recommender
            .rank_hubs(&features.destination.corridor, &prediction, query.top_k);

        let status = if verdict.pass {
            PlanningStatus::Planned
        } else {
            PlanningStatus::Blocked
        };

        let departure = query.departure.time();
        let arrival_time = departure + Duration::minutes(prediction.eta_minutes.round() as i64);
        let labels = TripLabels {
            duration: minutes_to_label(prediction.eta_minutes),
            buffer: if prediction.buffer_minutes > 0.0 {
                minutes_to_label(prediction.buffer_minutes)
            } else {
                "No extra buffer".to_string()
            },
            arrival: arrival_time_label(departure, prediction.eta_minutes),
            window_slack: signed_minutes_label(prediction.window_slack_minutes),
            cost: cost_label(prediction.cost_estimate),
        };

        info!(
            status = ?status,
            vehicle = %vehicle_class,
            tti = prediction.travel_time_index,
            eta_minutes = prediction.eta_minutes,
            within_window = prediction.fits_priority_window(),
            triggered = verdict.triggered.len(),
            hubs = hubs.len(),
            "行程规划完成"
        );

        Ok(TripResult {
            status,
            vehicle_class,
            vehicle_class_suggested: suggested,
            features,
            within_priority_window: prediction.fits_priority_window(),
            prediction,
            verdict,
            hubs,
            arrival_time,
            labels,
        })
    }

    /// 走廊列表（含基准指标）
    pub fn list_corridors(&self) -> Vec<CorridorSummary> {
        let window = self.config.recent_window;
        let threshold = self.config.compliance_threshold_pct;
        self.dataset
            .corridors()
            .into_iter()
            .map(|corridor| CorridorSummary {
                corridor: corridor.clone(),
                roads: self
                    .dataset
                    .roads(corridor)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                baseline_tti: self.dataset.baseline_tti(corridor).unwrap_or(1.0),
                recent_congestion: self
                    .dataset
                    .recent_congestion(corridor, window)
                    .unwrap_or(0.0),
                compliance_share: self
                    .dataset
                    .recent_compliance_share(corridor, window, threshold)
                    .unwrap_or(0.0),
                has_coordinates: self.config.route.coordinate(corridor).is_some(),
                served_by_hubs: self
                    .hub_recommender
                    .catalog()
                    .hubs()
                    .iter()
                    .filter(|h| h.serves(corridor).is_some())
                    .count(),
            })
            .collect()
    }

    pub fn list_roads(&self, corridor: &CorridorId) -> ApiResult<Vec<String>> {
        if !self.dataset.contains(corridor) {
            return Err(ApiError::NotFound(format!("走廊 {} 不存在", corridor)));
        }
        Ok(self
            .dataset
            .roads(corridor)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// 最近趋势（时间升序）
    pub fn corridor_trend(
        &self,
        corridor: &CorridorId,
        road: Option<&str>,
        points: usize,
    ) -> ApiResult<Vec<TrendPoint>> {
        if !self.dataset.contains(corridor) {
            return Err(ApiError::NotFound(format!("走廊 {} 不存在", corridor)));
        }
        Ok(self
            .dataset
            .recent_trend(corridor, road, points)
            .into_iter()
            .map(|r| TrendPoint {
                date: r.date,
                road: r.road.clone(),
                average_speed_kmh: r.average_speed_kmh,
                travel_time_index: r.travel_time_index,
                congestion_level: r.congestion_level,
                congestion_bucket: r.congestion_bucket(),
                signal_compliance_pct: r.signal_compliance_pct,
                compliant: r.is_compliant(self.config.compliance_threshold_pct),
            })
            .collect())
    }

    pub fn model_quality(&self) -> ApiResult<ModelQuality> {
        let training = self.pipeline.report().ok_or(ApiError::ModelNotTrained)?;
        Ok(ModelQuality {
            training: training.clone(),
            data_quality: self.dataset.data_quality().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_to_label() {
        assert_eq!(minutes_to_label(45.4), "45 min");
        assert_eq!(minutes_to_label(59.6), "1h 0m");
        assert_eq!(minutes_to_label(135.0), "2h 15m");
    }

    #[test]
    fn test_arrival_time_wraps_midnight() {
        let dep = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
        assert_eq!(arrival_time_label(dep, 45.0), "00:15");
        let dep = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        assert_eq!(arrival_time_label(dep, 62.2), "09:32");
    }

    #[test]
    fn test_signed_minutes_label() {
        assert_eq!(signed_minutes_label(0.4), "On target");
        assert_eq!(signed_minutes_label(-0.9), "On target");
        assert_eq!(signed_minutes_label(75.0), "+1h 15m");
        assert_eq!(signed_minutes_label(-12.0), "-12 min");
    }

    #[test]
    fn test_cost_label_grouping() {
        assert_eq!(cost_label(999.4), "INR 999");
        assert_eq!(cost_label(1234.5), "INR 1,235");
        assert_eq!(cost_label(1_234_567.0), "INR 1,234,567");
    }
}
