// ==========================================
// 城市走廊通行决策系统 - 预测结果
// ==========================================
// 红线: 由 FeatureRecord 确定性派生，生成后不可变
// ==========================================

use crate::domain::corridor::CorridorId;
use crate::domain::types::SegmentRole;
use serde::Serialize;

/// 单个路段的模型预测
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentForecast {
    pub role: SegmentRole,
    pub corridor: CorridorId,
    pub road: String,
    pub travel_time_index: f64,
    pub implied_congestion_pct: f64,
    pub congestion_modifier: f64,
    pub baseline_tti: f64,
}

/// 费用拆分
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub distance_cost: f64,
    pub time_cost: f64,
    pub priority_multiplier: f64,
}

/// 行程预测结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// 行程通行时间指数（起终点均值，> 0）
    pub travel_time_index: f64,
    /// 相对历史基准的拥堵修正系数
    pub congestion_modifier: f64,
    /// 折算拥堵度（%）
    pub implied_congestion_pct: f64,
    /// ETA 修正（%）
    pub eta_modifier_pct: f64,

    pub distance_km: f64,
    pub free_flow_minutes: f64,
    pub eta_minutes: f64,
    pub buffer_minutes: f64,
    pub vehicle_drag_factor: f64,

    pub cost_estimate: f64,
    pub cost_breakdown: CostBreakdown,

    /// 服务时间窗（分钟）及剩余余量（负数表示超窗）
    pub priority_window_minutes: f64,
    pub window_slack_minutes: f64,

    pub origin: SegmentForecast,
    pub destination: SegmentForecast,
}

impl PredictionResult {
    pub fn segment(&self, role: SegmentRole) -> &SegmentForecast {
        match role {
            SegmentRole::Origin => &self.origin,
            SegmentRole::Destination => &self.destination,
        }
    }

    pub fn fits_priority_window(&self) -> bool {
        self.window_slack_minutes >= 0.0
    }
}
