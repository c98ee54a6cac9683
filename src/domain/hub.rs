// ==========================================
// 城市走廊通行决策系统 - 微枢纽
// ==========================================

use crate::domain::corridor::CorridorId;
use crate::domain::types::VehicleClass;
use serde::{Deserialize, Serialize};

/// 微枢纽目录项（静态参考数据）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroHub {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// 直接服务的走廊
    pub corridor: CorridorId,
    /// 可兼顾的相邻走廊
    #[serde(default)]
    pub neighbor_corridors: Vec<CorridorId>,
    /// 基础吞吐能力（吨/小时）
    pub capacity_tph: f64,
    pub ideal_vehicle: VehicleClass,
    /// 减排系数 0-1
    pub emissions_savings_factor: f64,
    #[serde(default)]
    pub notes: String,
}

impl MicroHub {
    pub fn serves(&self, corridor: &CorridorId) -> Option<HubMatch> {
        if &self.corridor == corridor {
            Some(HubMatch::Direct)
        } else if self.neighbor_corridors.contains(corridor) {
            Some(HubMatch::Neighbor)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubMatch {
    Direct,
    Neighbor,
}

/// 单次查询的枢纽评分（不持久化）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubScore {
    pub hub_id: String,
    pub hub_name: String,
    pub score: f64,
    pub relief_component: f64,
    pub emissions_component: f64,
    pub matched_by: HubMatch,
    pub ideal_vehicle: VehicleClass,
}

// ==========================================
// HubRanking - 有限、可重复遍历的排名序列
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HubRanking {
    entries: Vec<HubScore>,
}

impl HubRanking {
    /// entries 须已按 (score 降序, hub_id 升序) 排好并截断
    pub(crate) fn from_sorted(entries: Vec<HubScore>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HubScore> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self) -> Option<&HubScore> {
        self.entries.first()
    }

    pub fn into_vec(self) -> Vec<HubScore> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a HubRanking {
    type Item = &'a HubScore;
    type IntoIter = std::slice::Iter<'a, HubScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for HubRanking {
    type Item = HubScore;
    type IntoIter = std::vec::IntoIter<HubScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
