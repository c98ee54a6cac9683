// ==========================================
// 城市走廊通行决策系统 - API层
// ==========================================
// 职责: 面向调用方（CLI / 外部 UI）的查询接口
// ==========================================

pub mod error;
pub mod trip_api;

pub use error::{ApiError, ApiResult};
pub use trip_api::{
    arrival_time_label, cost_label, minutes_to_label, signed_minutes_label, CorridorSummary,
    ModelQuality, TrendPoint, TripApi, DEFAULT_TREND_POINTS,
};
