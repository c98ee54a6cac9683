// ==========================================
// 城市走廊通行决策系统 - 走廊与历史记录
// ==========================================
// 职责: 走廊标识（归一化比较）+ 历史观测记录
// 红线: 历史记录加载后只读
// ==========================================

use crate::domain::types::CongestionBucket;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// ==========================================
// CorridorId - 走廊标识
// ==========================================
// 比较时忽略大小写 / 标点 / 空白: "M.G. Road" == "MG Road"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CorridorId {
    display: String,
    key: String,
}

impl CorridorId {
    pub fn new(name: impl Into<String>) -> Self {
        let display = name.into().trim().to_string();
        let key = Self::normalize(&display);
        Self { display, key }
    }

    /// 归一化键: 仅保留字母数字并转小写
    pub fn normalize(name: &str) -> String {
        name.chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(|c| c.to_lowercase())
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn matches(&self, name: &str) -> bool {
        self.key == Self::normalize(name)
    }
}

impl PartialEq for CorridorId {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CorridorId {}

impl Hash for CorridorId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for CorridorId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CorridorId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for CorridorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

impl From<String> for CorridorId {
    fn from(value: String) -> Self {
        CorridorId::new(value)
    }
}

impl From<&str> for CorridorId {
    fn from(value: &str) -> Self {
        CorridorId::new(value)
    }
}

impl From<CorridorId> for String {
    fn from(value: CorridorId) -> Self {
        value.display
    }
}

// ==========================================
// HistoricalRecord - 历史观测记录（数据集一行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub row_number: usize,          // 原始文件行号
    pub corridor: CorridorId,       // Area Name
    pub road: String,               // Road/Intersection Name
    pub date: NaiveDate,            // Date

    // 必填观测值
    pub traffic_volume: f64,        // 车流量（veh/day）
    pub average_speed_kmh: f64,     // 平均速度
    pub travel_time_index: f64,     // 训练目标
    pub congestion_level: f64,      // 0-100
    pub incident_reports: f64,      // 事故上报数
    pub signal_compliance_pct: f64, // 信号灯遵守率

    // 出行方式构成
    pub public_transport_usage_pct: Option<f64>,
    pub pedestrian_cyclist_count: Option<f64>,

    // 可选上下文列
    pub capacity_utilization_pct: Option<f64>,
    pub environmental_impact: Option<f64>,
    pub parking_usage_pct: Option<f64>,
    pub weather: Option<String>,
    pub roadwork: Option<String>,
}

impl HistoricalRecord {
    pub fn congestion_bucket(&self) -> CongestionBucket {
        CongestionBucket::from_level(self.congestion_level)
    }

    /// 遵守率是否达标
    pub fn is_compliant(&self, threshold_pct: f64) -> bool {
        self.signal_compliance_pct >= threshold_pct
    }

    /// 0=周一 ... 6=周日
    pub fn day_of_week(&self) -> u32 {
        self.date.weekday().num_days_from_monday()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_corridor_id_normalized_equality() {
        assert_eq!(CorridorId::new("M.G. Road"), CorridorId::new("MG Road"));
        assert_eq!(CorridorId::new("whitefield"), CorridorId::new(" Whitefield "));
        assert_ne!(CorridorId::new("Hebbal"), CorridorId::new("Whitefield"));
    }

    #[test]
    fn test_corridor_id_keeps_display() {
        let id = CorridorId::new("M.G. Road");
        assert_eq!(id.to_string(), "M.G. Road");
        assert_eq!(id.key(), "mgroad");
        assert!(id.matches("mg road"));
    }

    #[test]
    fn test_corridor_id_hash_consistent_with_eq() {
        let mut set = HashSet::new();
        set.insert(CorridorId::new("M.G. Road"));
        assert!(set.contains(&CorridorId::new("MG Road")));
    }

    #[test]
    fn test_corridor_id_serde_as_string() {
        let json = serde_json::to_string(&CorridorId::new("Hebbal")).unwrap();
        assert_eq!(json, "\"Hebbal\"");
        let back: CorridorId = serde_json::from_str("\"M.G. Road\"").unwrap();
        assert!(back.matches("MG Road"));
    }
}
