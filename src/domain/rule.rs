// ==========================================
// 城市走廊通行决策系统 - 限行规则定义
// ==========================================
// 规则条件为有限的标签变体集合，通过统一接口求值
// 规则在进程启动时加载，之后不可变
// ==========================================

use crate::domain::corridor::CorridorId;
use crate::domain::types::{RuleSeverity, VehicleClass};
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

// ==========================================
// ClockTime - 一天中的时刻（"HH:MM"）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u32,
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime { minutes: 0 };

    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self {
                minutes: hour * 60 + minute,
            })
        } else {
            None
        }
    }

    /// 取日期时间中的时:分（忽略秒）
    pub fn from_timelike<T: Timelike>(t: &T) -> Self {
        Self {
            minutes: t.hour() * 60 + t.minute(),
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (h, m) = value
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("时刻格式错误: {} (期望 HH:MM)", value))?;
        let hour: u32 = h.parse().map_err(|_| format!("小时无效: {}", value))?;
        let minute: u32 = m.parse().map_err(|_| format!("分钟无效: {}", value))?;
        ClockTime::new(hour, minute).ok_or_else(|| format!("时刻超出范围: {}", value))
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

// ==========================================
// TimeWindow - 左闭右开时间窗 [start, end)
// ==========================================
// start > end 表示跨零点（如 22:00-06:00）; start == end 表示全天
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeWindow {
    pub fn contains(&self, t: ClockTime) -> bool {
        if self.start == self.end {
            return true;
        }
        if self.start < self.end {
            self.start <= t && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.start, self.end)
    }
}

/// 星期列表描述: 连续区间 "Mon–Fri"，否则逗号分隔；空列表为 "all days"
pub fn describe_days(days: &[u8]) -> String {
    let mut sorted: Vec<u8> = days.iter().copied().filter(|d| *d < 7).collect();
    sorted.sort_unstable();
    sorted.dedup();

    if sorted.is_empty() || sorted.len() == 7 {
        return "all days".to_string();
    }

    let contiguous = sorted.windows(2).all(|w| w[1] == w[0] + 1);
    if contiguous && sorted.len() > 2 {
        let first = sorted[0] as usize;
        let last = sorted[sorted.len() - 1] as usize;
        return format!("{}–{}", WEEKDAY_LABELS[first], WEEKDAY_LABELS[last]);
    }

    sorted
        .iter()
        .map(|d| WEEKDAY_LABELS[*d as usize])
        .collect::<Vec<_>>()
        .join(", ")
}

// ==========================================
// RuleCondition - 规则条件（标签变体）
// ==========================================
// corridors / roads / vehicle_classes 为空表示不限
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    /// 指定时间窗内限制车型通行
    TimeWindow {
        #[serde(default)]
        corridors: Vec<CorridorId>,
        /// 限定道路，与走廊须落在同一路段上
        #[serde(default)]
        roads: Vec<String>,
        #[serde(default)]
        vehicle_classes: Vec<VehicleClass>,
        window: TimeWindow,
        /// 0=周一 ... 6=周日
        #[serde(default)]
        days: Vec<u8>,
    },

    /// 载重达到阈值（含）需经微枢纽接驳
    PayloadThreshold {
        #[serde(default)]
        corridors: Vec<CorridorId>,
        threshold_tons: f64,
    },

    /// 预测拥堵度达到阈值（含）时提示
    CongestionThreshold {
        #[serde(default)]
        corridors: Vec<CorridorId>,
        min_congestion_pct: f64,
    },
}

impl RuleCondition {
    pub fn corridors(&self) -> &[CorridorId] {
        match self {
            RuleCondition::TimeWindow { corridors, .. }
            | RuleCondition::PayloadThreshold { corridors, .. }
            | RuleCondition::CongestionThreshold { corridors, .. } => corridors,
        }
    }

    pub fn roads(&self) -> &[String] {
        match self {
            RuleCondition::TimeWindow { roads, .. } => roads,
            RuleCondition::PayloadThreshold { .. } | RuleCondition::CongestionThreshold { .. } => &[],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RuleCondition::TimeWindow { .. } => "time_window",
            RuleCondition::PayloadThreshold { .. } => "payload_threshold",
            RuleCondition::CongestionThreshold { .. } => "congestion_threshold",
        }
    }
}

// ==========================================
// Rule - 限行规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub severity: RuleSeverity,
    pub condition: RuleCondition,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

// ==========================================
// 规则求值输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggeredRule {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: RuleSeverity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleVerdict {
    /// 无 Blocking 规则命中时为 true
    pub pass: bool,
    /// 按规则目录顺序排列的全部命中项
    pub triggered: Vec<TriggeredRule>,
}

impl RuleVerdict {
    pub fn from_triggered(triggered: Vec<TriggeredRule>) -> Self {
        let pass = !triggered
            .iter()
            .any(|t| t.severity == RuleSeverity::Blocking);
        Self { pass, triggered }
    }

    pub fn blocking(&self) -> impl Iterator<Item = &TriggeredRule> {
        self.triggered
            .iter()
            .filter(|t| t.severity == RuleSeverity::Blocking)
    }

    pub fn advisories(&self) -> impl Iterator<Item = &TriggeredRule> {
        self.triggered
            .iter()
            .filter(|t| t.severity == RuleSeverity::Advisory)
    }

    pub fn messages(&self) -> Vec<&str> {
        self.triggered.iter().map(|t| t.message.as_str()).collect()
    }
}
