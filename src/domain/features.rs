// ==========================================
// 城市走廊通行决策系统 - 特征记录
// ==========================================
// 职责: 模型输入的固定 schema（列名 + 取值）
// 红线: 预测前 schema 所需列必须全部存在且类型正确
// ==========================================

use crate::domain::corridor::{CorridorId, HistoricalRecord};
use crate::domain::types::{DayType, SegmentRole, ServicePriority, TimeBucket, VehicleClass};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 模型列名
pub mod columns {
    // 分类列
    pub const CORRIDOR: &str = "corridor";
    pub const ROAD: &str = "road";
    pub const WEATHER: &str = "weather";
    pub const ROADWORK: &str = "roadwork";
    pub const VEHICLE_CLASS: &str = "vehicle_class";
    pub const DAY_TYPE: &str = "day_type";

    // 数值列
    pub const TRAFFIC_VOLUME: &str = "traffic_volume";
    pub const AVERAGE_SPEED: &str = "average_speed_kmh";
    pub const INCIDENT_REPORTS: &str = "incident_reports";
    pub const SIGNAL_COMPLIANCE: &str = "signal_compliance_pct";
    pub const CAPACITY_UTILIZATION: &str = "capacity_utilization_pct";
    pub const ENVIRONMENTAL_IMPACT: &str = "environmental_impact";
    pub const PUBLIC_TRANSPORT: &str = "public_transport_usage_pct";
    pub const PARKING_USAGE: &str = "parking_usage_pct";
    pub const PEDESTRIAN_COUNT: &str = "pedestrian_cyclist_count";
    pub const DAY_OF_WEEK: &str = "day_of_week";
    pub const MONTH: &str = "month";
    pub const IS_WEEKEND: &str = "is_weekend";
    pub const PAYLOAD_TONS: &str = "payload_tons";

    /// 任何数据集都具备的分类列
    pub const BASE_CATEGORICAL: [&str; 4] = [CORRIDOR, ROAD, VEHICLE_CLASS, DAY_TYPE];

    /// 任何数据集都具备的数值列
    pub const BASE_NUMERIC: [&str; 8] = [
        TRAFFIC_VOLUME,
        AVERAGE_SPEED,
        INCIDENT_REPORTS,
        SIGNAL_COMPLIANCE,
        DAY_OF_WEEK,
        MONTH,
        IS_WEEKEND,
        PAYLOAD_TONS,
    ];

    /// 可选分类列（取决于数据集是否提供）
    pub const OPTIONAL_CATEGORICAL: [&str; 2] = [WEATHER, ROADWORK];

    /// 可选数值列
    pub const OPTIONAL_NUMERIC: [&str; 5] = [
        CAPACITY_UTILIZATION,
        ENVIRONMENTAL_IMPACT,
        PUBLIC_TRANSPORT,
        PARKING_USAGE,
        PEDESTRIAN_COUNT,
    ];
}

// ==========================================
// FeatureValue / FeatureRow
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

/// 单个路段的模型输入行（列名 → 取值）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureRow {
    values: BTreeMap<&'static str, FeatureValue>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_numeric(&mut self, column: &'static str, value: f64) {
        self.values.insert(column, FeatureValue::Numeric(value));
    }

    pub fn set_categorical(&mut self, column: &'static str, value: impl Into<String>) {
        self.values.insert(column, FeatureValue::Categorical(value.into()));
    }

    pub fn set_opt_numeric(&mut self, column: &'static str, value: Option<f64>) {
        if let Some(v) = value {
            self.set_numeric(column, v);
        }
    }

    pub fn set_opt_categorical(&mut self, column: &'static str, value: Option<&str>) {
        if let Some(v) = value {
            self.set_categorical(column, v);
        }
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.values.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<FeatureValue> {
        self.values.remove(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }
}

// ==========================================
// SegmentFeatures - 单个走廊路段的特征
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentFeatures {
    pub role: SegmentRole,
    pub corridor: CorridorId,
    pub road: String,
    pub source_date: NaiveDate, // 取数的历史记录日期

    pub traffic_volume: f64,
    pub average_speed_kmh: f64,
    pub incident_reports: f64,
    pub signal_compliance_pct: f64,

    pub capacity_utilization_pct: Option<f64>,
    pub environmental_impact: Option<f64>,
    pub public_transport_usage_pct: Option<f64>,
    pub parking_usage_pct: Option<f64>,
    pub pedestrian_cyclist_count: Option<f64>,
    pub weather: Option<String>,
    pub roadwork: Option<String>,

    /// 该走廊历史平均通行时间指数（拥堵修正的基准）
    pub baseline_tti: f64,

    /// 被人工覆写的字段
    pub overridden_fields: Vec<String>,
}

impl SegmentFeatures {
    pub fn from_record(role: SegmentRole, record: &HistoricalRecord, baseline_tti: f64) -> Self {
        Self {
            role,
            corridor: record.corridor.clone(),
            road: record.road.clone(),
            source_date: record.date,
            traffic_volume: record.traffic_volume,
            average_speed_kmh: record.average_speed_kmh,
            incident_reports: record.incident_reports,
            signal_compliance_pct: record.signal_compliance_pct,
            capacity_utilization_pct: record.capacity_utilization_pct,
            environmental_impact: record.environmental_impact,
            public_transport_usage_pct: record.public_transport_usage_pct,
            parking_usage_pct: record.parking_usage_pct,
            pedestrian_cyclist_count: record.pedestrian_cyclist_count,
            weather: record.weather.clone(),
            roadwork: record.roadwork.clone(),
            baseline_tti,
            overridden_fields: Vec::new(),
        }
    }

    /// 组装模型输入行
    ///
    /// 训练（历史记录）与预测（实时查询）共用同一组装逻辑，保证列口径一致
    pub fn model_row(
        &self,
        day_of_week: u32,
        month: u32,
        vehicle_class: VehicleClass,
        payload_tons: f64,
    ) -> FeatureRow {
        let mut row = FeatureRow::new();

        row.set_categorical(columns::CORRIDOR, self.corridor.key());
        row.set_categorical(columns::ROAD, self.road.as_str());
        row.set_categorical(columns::VEHICLE_CLASS, vehicle_class.as_str());
        row.set_categorical(
            columns::DAY_TYPE,
            DayType::from_day_of_week(day_of_week).as_str(),
        );
        row.set_opt_categorical(columns::WEATHER, self.weather.as_deref());
        row.set_opt_categorical(columns::ROADWORK, self.roadwork.as_deref());

        row.set_numeric(columns::TRAFFIC_VOLUME, self.traffic_volume);
        row.set_numeric(columns::AVERAGE_SPEED, self.average_speed_kmh);
        row.set_numeric(columns::INCIDENT_REPORTS, self.incident_reports);
        row.set_numeric(columns::SIGNAL_COMPLIANCE, self.signal_compliance_pct);
        row.set_opt_numeric(columns::CAPACITY_UTILIZATION, self.capacity_utilization_pct);
        row.set_opt_numeric(columns::ENVIRONMENTAL_IMPACT, self.environmental_impact);
        row.set_opt_numeric(columns::PUBLIC_TRANSPORT, self.public_transport_usage_pct);
        row.set_opt_numeric(columns::PARKING_USAGE, self.parking_usage_pct);
        row.set_opt_numeric(columns::PEDESTRIAN_COUNT, self.pedestrian_cyclist_count);
        row.set_numeric(columns::DAY_OF_WEEK, day_of_week as f64);
        row.set_numeric(columns::MONTH, month as f64);
        row.set_numeric(columns::IS_WEEKEND, if day_of_week >= 5 { 1.0 } else { 0.0 });
        row.set_numeric(columns::PAYLOAD_TONS, payload_tons);

        row
    }
}

// ==========================================
// CalendarFeatures - 出发时间派生特征
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarFeatures {
    pub departure: NaiveDateTime,
    pub day_of_week: u32, // 0=周一
    pub month: u32,
    pub is_weekend: bool,
    pub hour: u32,
    pub minute: u32,
    pub time_bucket: TimeBucket,
    pub day_type: DayType,
}

// ==========================================
// FeatureRecord - 一次查询的完整特征
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub origin: SegmentFeatures,
    pub destination: SegmentFeatures,
    pub calendar: CalendarFeatures,
    pub vehicle_class: VehicleClass,
    pub payload_tons: f64,
    pub priority: ServicePriority,
}

impl FeatureRecord {
    pub fn with_priority(mut self, priority: ServicePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn segment(&self, role: SegmentRole) -> &SegmentFeatures {
        match role {
            SegmentRole::Origin => &self.origin,
            SegmentRole::Destination => &self.destination,
        }
    }

    /// 行程涉及的走廊（起点、终点）
    pub fn corridors(&self) -> [&CorridorId; 2] {
        [&self.origin.corridor, &self.destination.corridor]
    }

    pub fn model_row(&self, role: SegmentRole) -> FeatureRow {
        self.segment(role).model_row(
            self.calendar.day_of_week,
            self.calendar.month,
            self.vehicle_class,
            self.payload_tons,
        )
    }
}

// ==========================================
// 人工覆写
// ==========================================
/// 单个走廊的可覆写字段（缺省时回退到最新历史值）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorridorOverrides {
    #[serde(default)]
    pub traffic_volume: Option<f64>,
    #[serde(default)]
    pub average_speed_kmh: Option<f64>,
    #[serde(default)]
    pub incident_reports: Option<f64>,
}

impl CorridorOverrides {
    pub fn is_empty(&self) -> bool {
        self.traffic_volume.is_none()
            && self.average_speed_kmh.is_none()
            && self.incident_reports.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TripOverrides {
    #[serde(default)]
    pub origin: CorridorOverrides,
    #[serde(default)]
    pub destination: CorridorOverrides,
}

impl TripOverrides {
    /// 起终点使用同一组覆写（例如统一的事故数）
    pub fn uniform(overrides: CorridorOverrides) -> Self {
        Self {
            origin: overrides,
            destination: overrides,
        }
    }

    pub fn for_role(&self, role: SegmentRole) -> &CorridorOverrides {
        match role {
            SegmentRole::Origin => &self.origin,
            SegmentRole::Destination => &self.destination,
        }
    }
}
