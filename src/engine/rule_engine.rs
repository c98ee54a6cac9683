// ==========================================
// 城市走廊通行决策系统 - 限行规则引擎
// ==========================================
// 规则: 按目录顺序逐条独立求值，命中全部上报
// 判定: 无 Blocking 命中 → pass
// 红线: 无状态、纯函数，同一输入多次求值结果一致
// ==========================================

use crate::config::RuleCatalog;
use crate::domain::corridor::CorridorId;
use crate::domain::features::{FeatureRecord, SegmentFeatures};
use crate::domain::prediction::PredictionResult;
use crate::domain::rule::{describe_days, ClockTime, Rule, RuleCondition, RuleVerdict, TriggeredRule};
use crate::domain::types::{RuleSeverity, VehicleClass};
use tracing::{debug, instrument};

/// RuleEngine - 限行规则引擎
pub struct RuleEngine {
    catalog: RuleCatalog,
}

impl RuleEngine {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// 对一次行程求值全部启用规则
    #[instrument(skip_all, fields(
        origin = %record.origin.corridor,
        destination = %record.destination.corridor,
        vehicle = %record.vehicle_class,
    ))]
    pub fn evaluate(&self, record: &FeatureRecord, prediction: &PredictionResult) -> RuleVerdict {
        let triggered: Vec<TriggeredRule> = self
            .catalog
            .enabled()
            .filter_map(|rule| evaluate_rule(rule, record, prediction))
            .collect();

        let verdict = RuleVerdict::from_triggered(triggered);
        debug!(
            pass = verdict.pass,
            triggered = verdict.triggered.len(),
            "规则求值完成"
        );
        verdict
    }
}

/// 规则作用的行程路段（起点优先）: 走廊与道路须同时命中同一路段
/// 规则未限定走廊与道路时取起点
fn matched_segment<'r>(
    corridors: &[CorridorId],
    roads: &[String],
    record: &'r FeatureRecord,
) -> Option<&'r SegmentFeatures> {
    [&record.origin, &record.destination].into_iter().find(|seg| {
        let corridor_hit = corridors.is_empty() || corridors.contains(&seg.corridor);
        let road_key = CorridorId::normalize(&seg.road);
        let road_hit = roads.is_empty() || roads.iter().any(|r| CorridorId::normalize(r) == road_key);
        corridor_hit && road_hit
    })
}

/// 消息中的路段名: 规则限定道路时附带道路
fn segment_label(segment: &SegmentFeatures, roads: &[String]) -> String {
    if roads.is_empty() {
        segment.corridor.to_string()
    } else {
        format!("{} / {}", segment.corridor, segment.road)
    }
}

fn describe_classes(classes: &[VehicleClass]) -> String {
    if classes.is_empty() {
        return "全部车型".to_string();
    }
    classes
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

fn triggered(rule: &Rule, detail: String) -> TriggeredRule {
    let message = if rule.recommendation.is_empty() {
        format!("{}: {}", rule.name, detail)
    } else {
        format!("{}: {}。建议: {}", rule.name, detail, rule.recommendation)
    };
    TriggeredRule {
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        severity: rule.severity,
        message,
    }
}

/// 单条规则求值
pub fn evaluate_rule(
    rule: &Rule,
    record: &FeatureRecord,
    prediction: &PredictionResult,
) -> Option<TriggeredRule> {
    let roads = rule.condition.roads();
    let segment = matched_segment(rule.condition.corridors(), roads, record)?;
    let corridor = segment_label(segment, roads);

    match &rule.condition {
        RuleCondition::TimeWindow {
            vehicle_classes,
            window,
            days,
            ..
        } => {
            if !vehicle_classes.is_empty() && !vehicle_classes.contains(&record.vehicle_class) {
                return None;
            }
            let day = record.calendar.day_of_week as u8;
            if !days.is_empty() && !days.contains(&day) {
                return None;
            }
            let departure = ClockTime::from_timelike(&record.calendar.departure);
            if !window.contains(departure) {
                return None;
            }

            let verb = match rule.severity {
                RuleSeverity::Blocking => "禁行",
                RuleSeverity::Advisory => "受限",
            };
            Some(triggered(
                rule,
                format!(
                    "{} 在 {}, {} 对 {} 车型{}（出发 {}）",
                    corridor,
                    window,
                    describe_days(days),
                    describe_classes(vehicle_classes),
                    verb,
                    departure
                ),
            ))
        }

        RuleCondition::PayloadThreshold { threshold_tons, .. } => {
            if *threshold_tons > 0.0 && record.payload_tons >= *threshold_tons {
                Some(triggered(
                    rule,
                    format!(
                        "载重 {:.1}t 达到 {} 接驳阈值 {:.1}t",
                        record.payload_tons, corridor, threshold_tons
                    ),
                ))
            } else {
                None
            }
        }

        RuleCondition::CongestionThreshold {
            corridors,
            min_congestion_pct,
        } => {
            let segment = [&prediction.origin, &prediction.destination]
                .into_iter()
                .filter(|s| corridors.is_empty() || corridors.contains(&s.corridor))
                .find(|s| s.implied_congestion_pct >= *min_congestion_pct)?;
            Some(triggered(
                rule,
                format!(
                    "{} 预测拥堵度 {:.1}% ≥ {:.1}%",
                    segment.corridor, segment.implied_congestion_pct, min_congestion_pct
                ),
            ))
        }
    }
}
