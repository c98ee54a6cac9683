// ==========================================
// 城市走廊通行决策系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod corridor;
pub mod dataset;
pub mod features;
pub mod hub;
pub mod prediction;
pub mod rule;
pub mod trip;
pub mod types;

// 重导出核心类型
pub use corridor::{CorridorId, HistoricalRecord};
pub use dataset::{DqLevel, DqReport, DqViolation};
pub use features::{
    CalendarFeatures, CorridorOverrides, FeatureRecord, FeatureRow, FeatureValue,
    SegmentFeatures, TripOverrides,
};
pub use hub::{HubMatch, HubRanking, HubScore, MicroHub};
pub use prediction::{CostBreakdown, PredictionResult, SegmentForecast};
pub use rule::{ClockTime, Rule, RuleCondition, RuleVerdict, TimeWindow, TriggeredRule};
pub use trip::{TripLabels, TripQuery, TripResult};
pub use types::{
    CongestionBucket, DayType, PlanningStatus, RuleSeverity, SegmentRole, ServicePriority,
    TimeBucket, VehicleClass,
};
