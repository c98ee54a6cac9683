// ==========================================
// 城市走廊通行决策系统 - 微枢纽推荐
// ==========================================
// 评分: score = w1 * relief + w2 * emissions_savings_factor
// relief = clamp((modifier - floor) * slope, 0, 1) * 邻近系数 * 能力系数
// 排序: score 降序，同分按 hub_id 升序；截断 top_k
// ==========================================

use crate::config::{HubCatalog, HubWeights};
use crate::domain::corridor::CorridorId;
use crate::domain::hub::{HubMatch, HubRanking, HubScore, MicroHub};
use crate::domain::prediction::PredictionResult;
use crate::engine::trip_estimator::round_to;
use tracing::{debug, instrument};

pub struct HubRecommender {
    catalog: HubCatalog,
    weights: HubWeights,
}

impl HubRecommender {
    pub fn new(catalog: HubCatalog, weights: HubWeights) -> Self {
        Self { catalog, weights }
    }

    pub fn catalog(&self) -> &HubCatalog {
        &self.catalog
    }

    /// 为目的走廊排名微枢纽；无枢纽服务该走廊时返回空排名
    #[instrument(skip(self, prediction), fields(destination = %destination))]
    pub fn rank_hubs(
        &self,
        destination: &CorridorId,
        prediction: &PredictionResult,
        top_k: usize,
    ) -> HubRanking {
        let modifier = prediction.destination.congestion_modifier;

        let mut scores: Vec<HubScore> = self
            .catalog
            .hubs()
            .iter()
            .filter_map(|hub| {
                hub.serves(destination)
                    .map(|matched| self.score(hub, matched, modifier))
            })
            .collect();

        scores.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.hub_id.cmp(&b.hub_id))
        });
        scores.truncate(top_k);

        debug!(
            candidates = scores.len(),
            top = scores.first().map(|s| s.hub_id.as_str()).unwrap_or("-"),
            "微枢纽排名完成"
        );
        HubRanking::from_sorted(scores)
    }

    /// 单个枢纽评分
    pub fn score(&self, hub: &MicroHub, matched: HubMatch, congestion_modifier: f64) -> HubScore {
        let w = &self.weights;

        let pressure = ((congestion_modifier - w.relief_floor) * w.relief_slope).clamp(0.0, 1.0);
        let proximity = match matched {
            HubMatch::Direct => 1.0,
            HubMatch::Neighbor => w.neighbor_factor,
        };
        let capacity = (hub.capacity_tph / w.reference_capacity_tph).min(1.0);
        let relief = pressure * proximity * capacity;

        let relief_component = w.w1 * relief;
        let emissions_component = w.w2 * hub.emissions_savings_factor;

        HubScore {
            hub_id: hub.id.clone(),
            hub_name: hub.name.clone(),
            score: round_to(relief_component + emissions_component, 4),
            relief_component: round_to(relief_component, 4),
            emissions_component: round_to(emissions_component, 4),
            matched_by: matched,
            ideal_vehicle: hub.ideal_vehicle,
        }
    }
}
