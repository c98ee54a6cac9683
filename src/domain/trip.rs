// ==========================================
// 城市走廊通行决策系统 - 行程查询与结果
// ==========================================
// 用途: 查询接口（供外部 UI 层调用）的输入输出
// ==========================================

use crate::domain::corridor::CorridorId;
use crate::domain::features::{FeatureRecord, TripOverrides};
use crate::domain::hub::HubRanking;
use crate::domain::prediction::PredictionResult;
use crate::domain::rule::RuleVerdict;
use crate::domain::types::{PlanningStatus, ServicePriority, VehicleClass};
use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

fn default_top_k() -> usize {
    3
}

/// 行程查询
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripQuery {
    pub origin: CorridorId,
    pub destination: CorridorId,
    /// 可选: 指定起点道路（缺省取该走廊最新记录）
    #[serde(default)]
    pub origin_road: Option<String>,
    #[serde(default)]
    pub destination_road: Option<String>,
    pub departure: NaiveDateTime,
    /// 缺省时按载重推荐车型
    #[serde(default)]
    pub vehicle_class: Option<VehicleClass>,
    pub payload_tons: f64,
    #[serde(default)]
    pub priority: ServicePriority,
    #[serde(default)]
    pub overrides: Option<TripOverrides>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl TripQuery {
    pub fn new(
        origin: impl Into<CorridorId>,
        destination: impl Into<CorridorId>,
        departure: NaiveDateTime,
        payload_tons: f64,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            origin_road: None,
            destination_road: None,
            departure,
            vehicle_class: None,
            payload_tons,
            priority: ServicePriority::Standard,
            overrides: None,
            top_k: default_top_k(),
        }
    }

    pub fn with_vehicle_class(mut self, vehicle_class: VehicleClass) -> Self {
        self.vehicle_class = Some(vehicle_class);
        self
    }

    pub fn with_priority(mut self, priority: ServicePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_overrides(mut self, overrides: TripOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_roads(mut self, origin_road: Option<String>, destination_road: Option<String>) -> Self {
        self.origin_road = origin_road;
        self.destination_road = destination_road;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// 展示用文案
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripLabels {
    pub duration: String,
    pub buffer: String,
    pub arrival: String,
    pub window_slack: String,
    pub cost: String,
}

/// 行程综合结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripResult {
    pub status: PlanningStatus,
    pub vehicle_class: VehicleClass,
    /// 车型是否由载重推荐得出
    pub vehicle_class_suggested: bool,
    pub features: FeatureRecord,
    pub prediction: PredictionResult,
    /// 预计时长是否落在服务优先级时窗内
    pub within_priority_window: bool,
    pub verdict: RuleVerdict,
    pub hubs: HubRanking,
    pub arrival_time: NaiveTime,
    pub labels: TripLabels,
}

impl TripResult {
    pub fn is_blocked(&self) -> bool {
        self.status == PlanningStatus::Blocked
    }
}
