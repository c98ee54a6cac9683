// ==========================================
// 城市走廊通行决策系统 - 行程指标推算
// ==========================================
// 职责: 路段 TTI → 拥堵度 / ETA / 缓冲 / 费用
// 红线: 确定性计算，输出按固定精度取整
// ==========================================

use crate::config::{AdvisorConfig, PriorityTable, RouteConfig, VehicleRateTable};
use crate::domain::features::{FeatureRecord, SegmentFeatures};
use crate::domain::prediction::{CostBreakdown, PredictionResult, SegmentForecast};
use crate::engine::geo::corridor_distance_km;

/// TTI → 拥堵度插值节点
const TTI_KNOTS: [f64; 4] = [1.0, 1.2, 1.4, 1.6];
const CONGESTION_KNOTS: [f64; 4] = [30.0, 55.0, 80.0, 100.0];

/// 每单位 TTI 超出对应的 ETA 修正百分比
const ETA_PCT_PER_TTI: f64 = 55.0;

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// 折算拥堵度（%），两端截断
pub fn implied_congestion_pct(tti: f64) -> f64 {
    if tti <= TTI_KNOTS[0] {
        return CONGESTION_KNOTS[0];
    }
    for i in 1..TTI_KNOTS.len() {
        if tti <= TTI_KNOTS[i] {
            let t = (tti - TTI_KNOTS[i - 1]) / (TTI_KNOTS[i] - TTI_KNOTS[i - 1]);
            return CONGESTION_KNOTS[i - 1] + t * (CONGESTION_KNOTS[i] - CONGESTION_KNOTS[i - 1]);
        }
    }
    CONGESTION_KNOTS[CONGESTION_KNOTS.len() - 1]
}

pub fn eta_modifier_pct(tti: f64) -> f64 {
    ((tti - 1.0) * ETA_PCT_PER_TTI).max(0.0)
}

/// 相对历史基准的拥堵修正系数
pub fn congestion_modifier(tti: f64, baseline_tti: f64) -> f64 {
    if baseline_tti > 0.0 {
        tti / baseline_tti
    } else {
        1.0
    }
}

pub fn minutes_to_hours(minutes: f64) -> f64 {
    minutes / 60.0
}

// ==========================================
// TripEstimator
// ==========================================
#[derive(Debug, Clone)]
pub struct TripEstimator {
    vehicles: VehicleRateTable,
    priorities: PriorityTable,
    route: RouteConfig,
}

impl TripEstimator {
    pub fn new(config: &AdvisorConfig) -> Self {
        Self {
            vehicles: config.vehicles.clone(),
            priorities: config.priorities.clone(),
            route: config.route.clone(),
        }
    }

    fn forecast(&self, seg: &SegmentFeatures, tti: f64) -> SegmentForecast {
        SegmentForecast {
            role: seg.role,
            corridor: seg.corridor.clone(),
            road: seg.road.clone(),
            travel_time_index: round_to(tti, 3),
            implied_congestion_pct: round_to(implied_congestion_pct(tti), 1),
            congestion_modifier: round_to(congestion_modifier(tti, seg.baseline_tti), 3),
            baseline_tti: round_to(seg.baseline_tti, 3),
        }
    }

    /// 由起终点 TTI（未取整）推算行程指标
    pub fn estimate(&self, record: &FeatureRecord, origin_tti: f64, destination_tti: f64) -> PredictionResult {
        let tti = (origin_tti + destination_tti) / 2.0;
        let baseline = (record.origin.baseline_tti + record.destination.baseline_tti) / 2.0;

        let distance_km = corridor_distance_km(
            &self.route,
            &record.origin.corridor,
            &record.destination.corridor,
        );
        let avg_speed = ((record.origin.average_speed_kmh + record.destination.average_speed_kmh) / 2.0)
            .max(self.route.min_speed_kmh);

        let rate = self.vehicles.get(record.vehicle_class);
        let free_flow_minutes = distance_km / avg_speed * 60.0;
        let eta_minutes = free_flow_minutes * tti * rate.drag_factor;
        let buffer_minutes = (eta_minutes - free_flow_minutes).max(0.0);

        let priority = self.priorities.get(record.priority);
        let distance_cost = distance_km * rate.cost_per_km;
        let time_cost = minutes_to_hours(eta_minutes) * rate.cost_per_hour;

        PredictionResult {
            travel_time_index: round_to(tti, 3),
            congestion_modifier: round_to(congestion_modifier(tti, baseline), 3),
            implied_congestion_pct: round_to(implied_congestion_pct(tti), 1),
            eta_modifier_pct: round_to(eta_modifier_pct(tti), 1),

            distance_km: round_to(distance_km, 2),
            free_flow_minutes: round_to(free_flow_minutes, 1),
            eta_minutes: round_to(eta_minutes, 1),
            buffer_minutes: round_to(buffer_minutes, 1),
            vehicle_drag_factor: rate.drag_factor,

            cost_estimate: round_to((distance_cost + time_cost) * priority.surcharge, 2),
            cost_breakdown: CostBreakdown {
                distance_cost: round_to(distance_cost, 2),
                time_cost: round_to(time_cost, 2),
                priority_multiplier: priority.surcharge,
            },

            priority_window_minutes: priority.window_minutes,
            window_slack_minutes: round_to(priority.window_minutes - eta_minutes, 1),

            origin: self.forecast(&record.origin, origin_tti),
            destination: self.forecast(&record.destination, destination_tti),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implied_congestion_interpolation() {
        assert_eq!(implied_congestion_pct(0.8), 30.0);
        assert_eq!(implied_congestion_pct(1.0), 30.0);
        assert!((implied_congestion_pct(1.1) - 42.5).abs() < 1e-9);
        assert!((implied_congestion_pct(1.5) - 90.0).abs() < 1e-9);
        assert_eq!(implied_congestion_pct(2.4), 100.0);
    }

    #[test]
    fn test_implied_congestion_monotonic() {
        let mut prev = 0.0;
        for i in 0..100 {
            let v = implied_congestion_pct(0.9 + i as f64 * 0.01);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_eta_modifier() {
        assert_eq!(eta_modifier_pct(0.9), 0.0);
        assert!((eta_modifier_pct(1.2) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_congestion_modifier_relative_to_baseline() {
        assert!((congestion_modifier(1.5, 1.2) - 1.25).abs() < 1e-12);
        assert_eq!(congestion_modifier(1.5, 0.0), 1.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(12.345, 1), 12.3);
    }
}
