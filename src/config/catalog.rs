// ==========================================
// 城市走廊通行决策系统 - 规则目录 / 微枢纽目录
// ==========================================
// 职责: 静态参考数据（可由独立 JSON 文件替换，无需重新发布）
// 红线: 进程启动时加载，之后只读
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::corridor::CorridorId;
use crate::domain::hub::MicroHub;
use crate::domain::rule::{ClockTime, Rule, RuleCondition, TimeWindow};
use crate::domain::types::{RuleSeverity, VehicleClass};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// 核心商务区走廊
const CBD_CORRIDORS: [&str; 4] = ["M.G. Road", "Indiranagar", "Koramangala", "Jayanagar"];

fn corridors(names: &[&str]) -> Vec<CorridorId> {
    names.iter().map(|n| CorridorId::new(*n)).collect()
}

fn roads(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    // 常量时刻，构造不会失败
    let clock = |(h, m): (u32, u32)| ClockTime::new(h, m).unwrap_or(ClockTime::MIDNIGHT);
    TimeWindow {
        start: clock(start),
        end: clock(end),
    }
}

fn read_file(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

// ==========================================
// RuleCatalog - 限行规则目录（按目录顺序求值）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl RuleCatalog {
    pub fn new(rules: Vec<Rule>) -> ConfigResult<Self> {
        let catalog = Self { rules };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let rules: Vec<Rule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    /// 从独立 JSON 文件加载规则目录
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let catalog = Self::from_json_str(&read_file(path.as_ref())?)?;
        info!(
            path = %path.as_ref().display(),
            rules = catalog.rules.len(),
            "规则目录加载完成"
        );
        Ok(catalog)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// 启用的规则（保持目录顺序）
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn get(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                return Err(ConfigError::ValidationError("规则 id 不能为空".to_string()));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigError::ValidationError(format!("规则 id 重复: {}", rule.id)));
            }
            match &rule.condition {
                RuleCondition::TimeWindow { roads, days, .. } => {
                    if roads.iter().any(|r| CorridorId::normalize(r).is_empty()) {
                        return Err(ConfigError::ValidationError(format!(
                            "规则 {} 道路名称不能为空",
                            rule.id
                        )));
                    }
                    if let Some(d) = days.iter().find(|d| **d > 6) {
                        return Err(ConfigError::ValidationError(format!(
                            "规则 {} 星期取值越界: {} (0=周一 ... 6=周日)",
                            rule.id, d
                        )));
                    }
                }
                RuleCondition::PayloadThreshold { threshold_tons, .. } => {
                    if !threshold_tons.is_finite() || *threshold_tons <= 0.0 {
                        return Err(ConfigError::ValidationError(format!(
                            "规则 {} 载重阈值必须 > 0，实际 {}",
                            rule.id, threshold_tons
                        )));
                    }
                }
                RuleCondition::CongestionThreshold {
                    min_congestion_pct, ..
                } => {
                    if !(0.0..=100.0).contains(min_congestion_pct) || *min_congestion_pct == 0.0 {
                        return Err(ConfigError::ValidationError(format!(
                            "规则 {} 拥堵阈值须在 (0, 100] 内，实际 {}",
                            rule.id, min_congestion_pct
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// 默认规则（班加罗尔交警公告口径）
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "CBD_HEAVY_CURFEW".to_string(),
            name: "CBD heavy vehicle curfew".to_string(),
            description: "Heavy commercial vehicles above 3T banned inside core CBD during peak \
                          windows as per Bengaluru Traffic Police notifications."
                .to_string(),
            severity: RuleSeverity::Blocking,
            condition: RuleCondition::TimeWindow {
                corridors: corridors(&CBD_CORRIDORS),
                roads: Vec::new(),
                vehicle_classes: vec![VehicleClass::Medium, VehicleClass::Heavy],
                window: window((8, 0), (21, 0)),
                days: vec![0, 1, 2, 3, 4],
            },
            recommendation: "Schedule dock transfers pre-08:00 or post-21:00, or hand over to micro-hubs."
                .to_string(),
            enabled: true,
        },
        Rule {
            id: "ORR_NIGHT_ENTRY".to_string(),
            name: "Outer Ring night entry".to_string(),
            description: "Entry for vehicles over 16T limited to 22:00-06:00 beyond ORR toll plazas."
                .to_string(),
            severity: RuleSeverity::Blocking,
            condition: RuleCondition::TimeWindow {
                corridors: corridors(&["Hebbal", "Yeshwanthpur"]),
                roads: roads(&["Hebbal Flyover", "Tumkur Road"]),
                vehicle_classes: vec![VehicleClass::Heavy],
                window: window((6, 0), (22, 0)),
                days: Vec::new(),
            },
            recommendation: "Hold at peripheral yards and use relay fleets during daylight hours."
                .to_string(),
            enabled: true,
        },
        Rule {
            id: "SCHOOL_ZONE_CAP".to_string(),
            name: "School zone speed cap".to_string(),
            description: "30 km/h cap applies 07:30-10:00 and 13:30-16:00 on school corridors."
                .to_string(),
            severity: RuleSeverity::Advisory,
            condition: RuleCondition::TimeWindow {
                corridors: corridors(&["Indiranagar", "Koramangala"]),
                roads: roads(&["CMH Road", "Sarjapur Road"]),
                vehicle_classes: vec![VehicleClass::Medium, VehicleClass::Heavy],
                window: window((7, 0), (16, 0)),
                days: vec![0, 1, 2, 3, 4, 5],
            },
            recommendation: "Buffer +12 minutes in ETA or reroute via parallel collectors."
                .to_string(),
            enabled: true,
        },
        Rule {
            id: "BUS_PRIORITY_LANE".to_string(),
            name: "Bus priority lane".to_string(),
            description: "Dedicated BMTC priority lanes restrict loading/unloading during commute peaks."
                .to_string(),
            severity: RuleSeverity::Advisory,
            condition: RuleCondition::TimeWindow {
                corridors: corridors(&["Whitefield"]),
                roads: roads(&["ITPL Main Road"]),
                vehicle_classes: vec![VehicleClass::Light, VehicleClass::Medium],
                window: window((7, 0), (11, 0)),
                days: vec![0, 1, 2, 3, 4],
            },
            recommendation: "Switch to electric vans or schedule between 11:00-15:00.".to_string(),
            enabled: true,
        },
        Rule {
            id: "CBD_PAYLOAD_RELAY".to_string(),
            name: "CBD payload relay".to_string(),
            description: "Consignments of 10T or more must break bulk at a micro-hub before CBD entry."
                .to_string(),
            severity: RuleSeverity::Blocking,
            condition: RuleCondition::PayloadThreshold {
                corridors: corridors(&CBD_CORRIDORS),
                threshold_tons: 10.0,
            },
            recommendation: "Split the load across lighter vehicles or cross-dock at a micro-hub."
                .to_string(),
            enabled: true,
        },
        Rule {
            id: "SEVERE_CONGESTION".to_string(),
            name: "Severe congestion advisory".to_string(),
            description: "Predicted congestion at or above 90% on either corridor.".to_string(),
            severity: RuleSeverity::Advisory,
            condition: RuleCondition::CongestionThreshold {
                corridors: Vec::new(),
                min_congestion_pct: 90.0,
            },
            recommendation: "Shift departure out of the peak or add ETA buffer.".to_string(),
            enabled: true,
        },
    ]
}

// ==========================================
// HubCatalog - 微枢纽目录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HubCatalog {
    hubs: Vec<MicroHub>,
}

impl Default for HubCatalog {
    fn default() -> Self {
        Self {
            hubs: default_hubs(),
        }
    }
}

impl HubCatalog {
    pub fn new(hubs: Vec<MicroHub>) -> ConfigResult<Self> {
        let catalog = Self { hubs };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let hubs: Vec<MicroHub> = serde_json::from_str(json)?;
        Self::new(hubs)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let catalog = Self::from_json_str(&read_file(path.as_ref())?)?;
        info!(
            path = %path.as_ref().display(),
            hubs = catalog.hubs.len(),
            "微枢纽目录加载完成"
        );
        Ok(catalog)
    }

    pub fn hubs(&self) -> &[MicroHub] {
        &self.hubs
    }

    pub fn get(&self, hub_id: &str) -> Option<&MicroHub> {
        self.hubs.iter().find(|h| h.id == hub_id)
    }

    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for hub in &self.hubs {
            if !seen.insert(hub.id.as_str()) {
                return Err(ConfigError::ValidationError(format!("微枢纽 id 重复: {}", hub.id)));
            }
            if !(0.0..=1.0).contains(&hub.emissions_savings_factor) {
                return Err(ConfigError::ValidationError(format!(
                    "微枢纽 {} 减排系数须在 [0, 1] 内，实际 {}",
                    hub.id, hub.emissions_savings_factor
                )));
            }
            if !hub.capacity_tph.is_finite() || hub.capacity_tph <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "微枢纽 {} 吞吐能力必须 > 0",
                    hub.id
                )));
            }
        }
        Ok(())
    }
}

/// 默认微枢纽
pub fn default_hubs() -> Vec<MicroHub> {
    vec![
        MicroHub {
            id: "HUB_WHITEFIELD".to_string(),
            name: "Whitefield EV Consolidation Yard".to_string(),
            lat: 12.9721,
            lon: 77.7410,
            corridor: CorridorId::new("Whitefield"),
            neighbor_corridors: corridors(&["Indiranagar"]),
            capacity_tph: 120.0,
            ideal_vehicle: VehicleClass::Light,
            emissions_savings_factor: 0.225,
            notes: "Works with IT corridor night windows; supports DC fast-charging.".to_string(),
        },
        MicroHub {
            id: "HUB_KORAMANGALA".to_string(),
            name: "Koramangala Intermediate Hub".to_string(),
            lat: 12.9330,
            lon: 77.6190,
            corridor: CorridorId::new("Koramangala"),
            neighbor_corridors: corridors(&["M.G. Road", "Jayanagar"]),
            capacity_tph: 90.0,
            ideal_vehicle: VehicleClass::Light,
            emissions_savings_factor: 0.18,
            notes: "Shared dock with tech park; aligns with CBD truck bans.".to_string(),
        },
        MicroHub {
            id: "HUB_HEBBAL".to_string(),
            name: "Hebbal Peripheral Staging".to_string(),
            lat: 13.0400,
            lon: 77.5930,
            corridor: CorridorId::new("Hebbal"),
            neighbor_corridors: corridors(&["Yeshwanthpur", "M.G. Road"]),
            capacity_tph: 160.0,
            ideal_vehicle: VehicleClass::Medium,
            emissions_savings_factor: 0.14,
            notes: "Link to airport and ORR; ideal for cross-docking before CBD entry.".to_string(),
        },
    ]
}
