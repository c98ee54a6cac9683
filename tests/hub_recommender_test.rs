// ==========================================
// HubRecommender 集成测试
// ==========================================
// 测试目标: 排名顺序 / 并列打破 / top_k 截断 / 无服务走廊
// ==========================================

mod test_helpers;

use corridor_advisor::config::{HubCatalog, HubWeights};
use corridor_advisor::domain::{CorridorId, HubMatch, MicroHub, VehicleClass};
use corridor_advisor::engine::HubRecommender;
use test_helpers::prediction_with_destination_modifier;

fn hub(id: &str, corridor: &str, neighbors: &[&str], capacity: f64, emissions: f64) -> MicroHub {
    MicroHub {
        id: id.to_string(),
        name: format!("{} Micro-Hub", id),
        lat: 12.97,
        lon: 77.64,
        corridor: CorridorId::new(corridor),
        neighbor_corridors: neighbors.iter().map(|n| CorridorId::new(*n)).collect(),
        capacity_tph: capacity,
        ideal_vehicle: VehicleClass::Light,
        emissions_savings_factor: emissions,
        notes: String::new(),
    }
}

fn recommender(hubs: Vec<MicroHub>) -> HubRecommender {
    HubRecommender::new(HubCatalog::new(hubs).unwrap(), HubWeights::default())
}

#[test]
fn test_identical_scores_break_ties_by_id() {
    // relief = 1.0 * 1.0 * (102 / 120) = 0.85 → 0.6 * 0.85 + 0.4 * 0.6 = 0.75
    let rec = recommender(vec![
        hub("H2", "Whitefield", &[], 102.0, 0.6),
        hub("H1", "Whitefield", &[], 102.0, 0.6),
    ]);
    let prediction = prediction_with_destination_modifier("Whitefield", 1.6);

    let ranking = rec.rank_hubs(&CorridorId::new("Whitefield"), &prediction, 5);
    let ids: Vec<&str> = ranking.iter().map(|s| s.hub_id.as_str()).collect();
    assert_eq!(ids, vec!["H1", "H2"]);
    for score in &ranking {
        assert!((score.score - 0.75).abs() < 1e-9, "score = {}", score.score);
    }
}

#[test]
fn test_ranking_is_descending_and_truncated() {
    let rec = recommender(vec![
        hub("A", "Koramangala", &[], 120.0, 0.1),
        hub("B", "Koramangala", &[], 60.0, 0.9),
        hub("C", "Indiranagar", &["Koramangala"], 120.0, 0.5),
        hub("D", "Koramangala", &[], 30.0, 0.2),
    ]);
    let prediction = prediction_with_destination_modifier("Koramangala", 1.3);

    let full = rec.rank_hubs(&CorridorId::new("Koramangala"), &prediction, 10);
    assert_eq!(full.len(), 4);
    let scores: Vec<f64> = full.iter().map(|s| s.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "应按分数降序: {:?}", scores);

    let top2 = rec.rank_hubs(&CorridorId::new("Koramangala"), &prediction, 2);
    assert_eq!(top2.len(), 2);
    let head: Vec<&str> = full.iter().take(2).map(|s| s.hub_id.as_str()).collect();
    let top: Vec<&str> = top2.iter().map(|s| s.hub_id.as_str()).collect();
    assert_eq!(head, top);
}

#[test]
fn test_neighbor_match_discounted() {
    let rec = recommender(vec![
        hub("DIRECT", "Hebbal", &[], 120.0, 0.3),
        hub("NEAR", "Yeshwanthpur", &["Hebbal"], 120.0, 0.3),
    ]);
    let prediction = prediction_with_destination_modifier("Hebbal", 1.5);

    let ranking = rec.rank_hubs(&CorridorId::new("Hebbal"), &prediction, 3);
    let top = ranking.top().unwrap();
    assert_eq!(top.hub_id, "DIRECT");
    assert_eq!(top.matched_by, HubMatch::Direct);

    let near = ranking.iter().find(|s| s.hub_id == "NEAR").unwrap();
    assert_eq!(near.matched_by, HubMatch::Neighbor);
    assert!((near.relief_component - top.relief_component * 0.5).abs() < 1e-9);
}

#[test]
fn test_free_flow_destination_scores_emissions_only() {
    let rec = recommender(vec![hub("H1", "Whitefield", &[], 120.0, 0.5)]);
    let prediction = prediction_with_destination_modifier("Whitefield", 0.8);

    let ranking = rec.rank_hubs(&CorridorId::new("Whitefield"), &prediction, 3);
    let top = ranking.top().unwrap();
    assert_eq!(top.relief_component, 0.0);
    assert!((top.score - 0.2).abs() < 1e-9);
}

#[test]
fn test_unserved_destination_returns_empty_ranking() {
    let rec = HubRecommender::new(HubCatalog::default(), HubWeights::default());
    let prediction = prediction_with_destination_modifier("Electronic City", 1.4);

    let ranking = rec.rank_hubs(&CorridorId::new("Electronic City"), &prediction, 3);
    assert!(ranking.is_empty());
    assert!(ranking.top().is_none());
}

#[test]
fn test_ranking_is_restartable() {
    let rec = HubRecommender::new(HubCatalog::default(), HubWeights::default());
    let prediction = prediction_with_destination_modifier("M.G. Road", 1.4);

    let ranking = rec.rank_hubs(&CorridorId::new("MG Road"), &prediction, 3);
    let first: Vec<String> = ranking.iter().map(|s| s.hub_id.clone()).collect();
    let second: Vec<String> = (&ranking).into_iter().map(|s| s.hub_id.clone()).collect();
    assert_eq!(first, second);
    // 两者均为相邻匹配，Hebbal 吞吐更大
    assert_eq!(first, vec!["HUB_HEBBAL".to_string(), "HUB_KORAMANGALA".to_string()]);
}
