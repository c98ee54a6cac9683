// ==========================================
// 城市走廊通行决策系统 - 领域类型定义
// ==========================================
// 车型 / 拥堵分级 / 规则严重度 / 时段 / 服务优先级
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 车型 (Vehicle Class)
// ==========================================
// 固定枚举集合: light / medium / heavy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Light,  // 轻型（城配小货 / LCV）
    Medium, // 中型（多轴 4-7.5t）
    Heavy,  // 重型（干线 HCV）
}

impl VehicleClass {
    /// 按载重从小到大排列
    pub const ALL: [VehicleClass; 3] = [VehicleClass::Light, VehicleClass::Medium, VehicleClass::Heavy];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Light => "light",
            VehicleClass::Medium => "medium",
            VehicleClass::Heavy => "heavy",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(VehicleClass::Light),
            "medium" => Ok(VehicleClass::Medium),
            "heavy" => Ok(VehicleClass::Heavy),
            other => Err(format!("未知车型: {} (可选: light/medium/heavy)", other)),
        }
    }
}

// ==========================================
// 拥堵分级 (Congestion Bucket)
// ==========================================
// 由 Congestion Level (0-100) 分箱: (-1,50] (50,80] (80,100] (100,101]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CongestionBucket {
    Low,
    Moderate,
    High,
    Severe,
}

impl CongestionBucket {
    pub fn from_level(level: f64) -> Self {
        if level <= 50.0 {
            CongestionBucket::Low
        } else if level <= 80.0 {
            CongestionBucket::Moderate
        } else if level <= 100.0 {
            CongestionBucket::High
        } else {
            CongestionBucket::Severe
        }
    }
}

impl fmt::Display for CongestionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CongestionBucket::Low => write!(f, "LOW"),
            CongestionBucket::Moderate => write!(f, "MODERATE"),
            CongestionBucket::High => write!(f, "HIGH"),
            CongestionBucket::Severe => write!(f, "SEVERE"),
        }
    }
}

// ==========================================
// 规则严重度 (Rule Severity)
// ==========================================
// Blocking: 阻断行程规划; Advisory: 仅提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleSeverity {
    Blocking,
    Advisory,
}

impl fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSeverity::Blocking => write!(f, "BLOCKING"),
            RuleSeverity::Advisory => write!(f, "ADVISORY"),
        }
    }
}

// ==========================================
// 出发时段 (Time Bucket)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeBucket {
    Peak,    // 早晚高峰
    OffPeak, // 平峰
    Night,   // 夜间
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBucket::Peak => write!(f, "PEAK"),
            TimeBucket::OffPeak => write!(f, "OFF_PEAK"),
            TimeBucket::Night => write!(f, "NIGHT"),
        }
    }
}

// ==========================================
// 日期类型 (Day Type) - 模型分类特征
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// day_of_week: 0=周一 ... 6=周日
    pub fn from_day_of_week(day_of_week: u32) -> Self {
        if day_of_week >= 5 {
            DayType::Weekend
        } else {
            DayType::Weekday
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "WEEKDAY",
            DayType::Weekend => "WEEKEND",
        }
    }
}

// ==========================================
// 服务优先级 (Service Priority)
// ==========================================
// 时间窗与附加费率见 config::PriorityRate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServicePriority {
    Standard,      // 标准（4h 窗口）
    Express,       // 加急（2h 窗口）
    NightLinehaul, // 夜间干线
}

impl Default for ServicePriority {
    fn default() -> Self {
        ServicePriority::Standard
    }
}

impl ServicePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServicePriority::Standard => "standard",
            ServicePriority::Express => "express",
            ServicePriority::NightLinehaul => "night_linehaul",
        }
    }
}

impl fmt::Display for ServicePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServicePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(ServicePriority::Standard),
            "express" => Ok(ServicePriority::Express),
            "night_linehaul" | "night" => Ok(ServicePriority::NightLinehaul),
            other => Err(format!("未知服务优先级: {}", other)),
        }
    }
}

// ==========================================
// 路段角色 (起点 / 终点)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentRole {
    Origin,
    Destination,
}

impl fmt::Display for SegmentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentRole::Origin => write!(f, "origin"),
            SegmentRole::Destination => write!(f, "destination"),
        }
    }
}

// ==========================================
// 规划状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanningStatus {
    Planned,
    Blocked, // 存在 Blocking 规则命中
}
