// ==========================================
// 城市走廊通行决策系统 - 配置项全集
// ==========================================
// 职责: 费率表 / 优先级 / 枢纽权重 / 模型参数 / 路线参数 / 时段划分
// 存储: JSON 文件（缺省时使用内置默认值）
// ==========================================

use crate::config::catalog::{HubCatalog, RuleCatalog};
use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::corridor::CorridorId;
use crate::domain::rule::{ClockTime, TimeWindow};
use crate::domain::types::{ServicePriority, TimeBucket, VehicleClass};
use serde::{Deserialize, Serialize};

// ==========================================
// 车型费率
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRate {
    /// 额定载重（吨）
    pub payload_capacity_tons: f64,
    /// 通行时间拖曳系数（≥ 1）
    pub drag_factor: f64,
    pub cost_per_km: f64,
    pub cost_per_hour: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRateTable {
    pub light: VehicleRate,
    pub medium: VehicleRate,
    pub heavy: VehicleRate,
}

impl VehicleRateTable {
    pub fn get(&self, class: VehicleClass) -> &VehicleRate {
        match class {
            VehicleClass::Light => &self.light,
            VehicleClass::Medium => &self.medium,
            VehicleClass::Heavy => &self.heavy,
        }
    }
}

impl Default for VehicleRateTable {
    fn default() -> Self {
        Self {
            light: VehicleRate {
                payload_capacity_tons: 3.5,
                drag_factor: 1.0,
                cost_per_km: 28.0,
                cost_per_hour: 320.0,
                description: "City van / light commercial vehicle up to 3.5T payload".to_string(),
            },
            medium: VehicleRate {
                payload_capacity_tons: 7.5,
                drag_factor: 1.18,
                cost_per_km: 58.0,
                cost_per_hour: 580.0,
                description: "Multi-axle hauler handling 4-7T loads".to_string(),
            },
            heavy: VehicleRate {
                payload_capacity_tons: 25.0,
                drag_factor: 1.28,
                cost_per_km: 72.0,
                cost_per_hour: 720.0,
                description: "Heavy cargo carrier best for trunk hauls".to_string(),
            },
        }
    }
}

// ==========================================
// 服务优先级
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityRate {
    /// 承诺送达时间窗（分钟）
    pub window_minutes: f64,
    /// 费用乘数
    pub surcharge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityTable {
    pub standard: PriorityRate,
    pub express: PriorityRate,
    pub night_linehaul: PriorityRate,
}

impl PriorityTable {
    pub fn get(&self, priority: ServicePriority) -> &PriorityRate {
        match priority {
            ServicePriority::Standard => &self.standard,
            ServicePriority::Express => &self.express,
            ServicePriority::NightLinehaul => &self.night_linehaul,
        }
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self {
            standard: PriorityRate {
                window_minutes: 240.0,
                surcharge: 1.0,
            },
            express: PriorityRate {
                window_minutes: 120.0,
                surcharge: 1.2,
            },
            night_linehaul: PriorityRate {
                window_minutes: 480.0,
                surcharge: 0.9,
            },
        }
    }
}

// ==========================================
// 微枢纽评分权重
// ==========================================
// score = w1 * relief + w2 * emissions_savings_factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubWeights {
    pub w1: f64,
    pub w2: f64,
    /// 拥堵修正系数低于该值时无疏解收益
    pub relief_floor: f64,
    pub relief_slope: f64,
    /// 相邻走廊匹配的距离折减
    pub neighbor_factor: f64,
    /// 满额疏解所需吞吐能力（吨/小时）
    pub reference_capacity_tph: f64,
}

impl Default for HubWeights {
    fn default() -> Self {
        Self {
            w1: 0.6,
            w2: 0.4,
            relief_floor: 0.9,
            relief_slope: 2.0,
            neighbor_factor: 0.5,
            reference_capacity_tph: 120.0,
        }
    }
}

// ==========================================
// 模型参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// 每次分裂候选特征占比 (0, 1]
    pub max_features_ratio: f64,
    /// 验证集占比 (0, 1)
    pub validation_ratio: f64,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 60,
            max_depth: 12,
            min_samples_leaf: 2,
            max_features_ratio: 0.6,
            validation_ratio: 0.2,
            seed: 42,
        }
    }
}

// ==========================================
// 路线参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorCoordinate {
    pub corridor: CorridorId,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub coordinates: Vec<CorridorCoordinate>,
    /// 坐标未知时的回退距离
    pub fallback_distance_km: f64,
    /// 小于该距离按短途处理
    pub short_trip_threshold_km: f64,
    pub short_trip_distance_km: f64,
    /// 有效车速下限
    pub min_speed_kmh: f64,
}

impl RouteConfig {
    pub fn coordinate(&self, corridor: &CorridorId) -> Option<(f64, f64)> {
        self.coordinates
            .iter()
            .find(|c| &c.corridor == corridor)
            .map(|c| (c.lat, c.lon))
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        let coord = |name: &str, lat: f64, lon: f64| CorridorCoordinate {
            corridor: CorridorId::new(name),
            lat,
            lon,
        };
        Self {
            coordinates: vec![
                coord("Indiranagar", 12.9784, 77.6408),
                coord("Whitefield", 12.9698, 77.7500),
                coord("Koramangala", 12.9352, 77.6245),
                coord("M.G. Road", 12.9750, 77.6040),
                coord("Jayanagar", 12.9250, 77.5938),
                coord("Hebbal", 13.0358, 77.5970),
                coord("Yeshwanthpur", 13.0170, 77.5560),
            ],
            fallback_distance_km: 6.5,
            short_trip_threshold_km: 0.5,
            short_trip_distance_km: 3.5,
            min_speed_kmh: 10.0,
        }
    }
}

// ==========================================
// 出发时段划分
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucketConfig {
    pub peak_windows: Vec<TimeWindow>,
    pub night_window: TimeWindow,
}

impl TimeBucketConfig {
    /// 夜间优先于高峰
    pub fn classify(&self, t: ClockTime) -> TimeBucket {
        if self.night_window.contains(t) {
            TimeBucket::Night
        } else if self.peak_windows.iter().any(|w| w.contains(t)) {
            TimeBucket::Peak
        } else {
            TimeBucket::OffPeak
        }
    }
}

impl Default for TimeBucketConfig {
    fn default() -> Self {
        let w = |sh: u32, eh: u32| TimeWindow {
            start: ClockTime::new(sh, 0).unwrap_or(ClockTime::MIDNIGHT),
            end: ClockTime::new(eh, 0).unwrap_or(ClockTime::MIDNIGHT),
        };
        Self {
            peak_windows: vec![w(8, 11), w(17, 21)],
            night_window: w(22, 6),
        }
    }
}

// ==========================================
// AdvisorConfig - 全量配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub vehicles: VehicleRateTable,
    pub priorities: PriorityTable,
    pub hub: HubWeights,
    pub model: ModelConfig,
    pub route: RouteConfig,
    pub time_buckets: TimeBucketConfig,
    /// 信号灯遵守率达标阈值（%）
    pub compliance_threshold_pct: f64,
    /// 近期拥堵统计窗口（条）
    pub recent_window: usize,
    pub rules: RuleCatalog,
    pub hubs: HubCatalog,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            vehicles: VehicleRateTable::default(),
            priorities: PriorityTable::default(),
            hub: HubWeights::default(),
            model: ModelConfig::default(),
            route: RouteConfig::default(),
            time_buckets: TimeBucketConfig::default(),
            compliance_threshold_pct: 80.0,
            recent_window: 30,
            rules: RuleCatalog::default(),
            hubs: HubCatalog::default(),
        }
    }
}

impl AdvisorConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |key: &str, message: String| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };

        let mut last_capacity = 0.0;
        for class in VehicleClass::ALL {
            let rate = self.vehicles.get(class);
            let key = format!("vehicles.{}", class.as_str());
            if !(rate.payload_capacity_tons > last_capacity) {
                return invalid(&key, "额定载重须按 light < medium < heavy 递增".to_string());
            }
            if !(rate.drag_factor >= 1.0) {
                return invalid(&key, format!("拖曳系数须 ≥ 1，实际 {}", rate.drag_factor));
            }
            if rate.cost_per_km < 0.0 || rate.cost_per_hour < 0.0 {
                return invalid(&key, "费率不能为负".to_string());
            }
            last_capacity = rate.payload_capacity_tons;
        }

        for priority in [
            ServicePriority::Standard,
            ServicePriority::Express,
            ServicePriority::NightLinehaul,
        ] {
            let rate = self.priorities.get(priority);
            if !(rate.window_minutes > 0.0) || !(rate.surcharge > 0.0) {
                return invalid(
                    &format!("priorities.{}", priority.as_str()),
                    "时间窗与费用乘数必须 > 0".to_string(),
                );
            }
        }

        let hub = &self.hub;
        if !(hub.w1 >= 0.0 && hub.w2 >= 0.0) || !hub.w1.is_finite() || !hub.w2.is_finite() {
            return invalid("hub.w1", "权重须为非负有限值".to_string());
        }
        if !hub.relief_floor.is_finite() {
            return invalid("hub.relief_floor", format!("须为有限值，实际 {}", hub.relief_floor));
        }
        if !(0.0..=1.0).contains(&hub.neighbor_factor) {
            return invalid("hub.neighbor_factor", "须在 [0, 1] 内".to_string());
        }
        if !(hub.relief_slope >= 0.0) || !hub.relief_slope.is_finite() {
            return invalid("hub.relief_slope", "须为非负有限值".to_string());
        }
        if !(hub.reference_capacity_tph > 0.0) {
            return invalid("hub.reference_capacity_tph", "必须 > 0".to_string());
        }

        let model = &self.model;
        if model.n_estimators == 0 {
            return invalid("model.n_estimators", "至少 1 棵树".to_string());
        }
        if model.max_depth == 0 || model.min_samples_leaf == 0 {
            return invalid("model.max_depth", "树深与叶子最小样本数必须 ≥ 1".to_string());
        }
        if !(model.max_features_ratio > 0.0 && model.max_features_ratio <= 1.0) {
            return invalid("model.max_features_ratio", "须在 (0, 1] 内".to_string());
        }
        if !(model.validation_ratio > 0.0 && model.validation_ratio < 1.0) {
            return invalid("model.validation_ratio", "须在 (0, 1) 内".to_string());
        }

        let route = &self.route;
        if !(route.fallback_distance_km > 0.0 && route.short_trip_distance_km > 0.0) {
            return invalid("route.fallback_distance_km", "距离必须 > 0".to_string());
        }
        if !(route.min_speed_kmh > 0.0) {
            return invalid("route.min_speed_kmh", "必须 > 0".to_string());
        }

        if !(0.0..=100.0).contains(&self.compliance_threshold_pct) {
            return invalid("compliance_threshold_pct", "须在 [0, 100] 内".to_string());
        }
        if self.recent_window == 0 {
            return invalid("recent_window", "必须 ≥ 1".to_string());
        }

        self.rules.validate()?;
        self.hubs.validate()?;
        Ok(())
    }
}
