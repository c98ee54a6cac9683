// ==========================================
// 城市走廊通行决策系统 - 特征构建
// ==========================================
// 职责: 走廊最新历史记录 + 人工覆写 + 出发时间 → FeatureRecord
// 红线: 纯函数，无副作用；未知走廊 / 非法输入直接报错
// ==========================================

use crate::config::{TimeBucketConfig, VehicleRateTable};
use crate::domain::corridor::CorridorId;
use crate::domain::features::{
    CalendarFeatures, CorridorOverrides, FeatureRecord, SegmentFeatures, TripOverrides,
};
use crate::domain::rule::ClockTime;
use crate::domain::trip::TripQuery;
use crate::domain::types::{DayType, SegmentRole, ServicePriority, VehicleClass};
use crate::engine::error::{EngineError, EngineResult};
use crate::importer::TrafficDataset;
use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::{debug, instrument};

/// 按载重推荐车型: 额定载重可容纳该载重的最小车型
pub fn suggest_vehicle_class(payload_tons: f64, rates: &VehicleRateTable) -> VehicleClass {
    VehicleClass::ALL
        .into_iter()
        .find(|class| payload_tons <= rates.get(*class).payload_capacity_tons)
        .unwrap_or(VehicleClass::Heavy)
}

/// 出发时间派生的日历特征
pub fn calendar_features(departure: NaiveDateTime, buckets: &TimeBucketConfig) -> CalendarFeatures {
    let day_of_week = departure.weekday().num_days_from_monday();
    CalendarFeatures {
        departure,
        day_of_week,
        month: departure.month(),
        is_weekend: day_of_week >= 5,
        hour: departure.hour(),
        minute: departure.minute(),
        time_bucket: buckets.classify(ClockTime::from_timelike(&departure)),
        day_type: DayType::from_day_of_week(day_of_week),
    }
}

// ==========================================
// FeatureBuilder
// ==========================================
pub struct FeatureBuilder<'a> {
    dataset: &'a TrafficDataset,
    time_buckets: &'a TimeBucketConfig,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(dataset: &'a TrafficDataset, time_buckets: &'a TimeBucketConfig) -> Self {
        Self {
            dataset,
            time_buckets,
        }
    }

    /// 构建行程特征（各走廊取最新记录）
    #[instrument(skip_all, fields(origin = %origin, destination = %destination))]
    pub fn build_features(
        &self,
        origin: &CorridorId,
        destination: &CorridorId,
        departure: NaiveDateTime,
        vehicle_class: VehicleClass,
        payload_tons: f64,
        overrides: Option<&TripOverrides>,
    ) -> EngineResult<FeatureRecord> {
        validate_payload(payload_tons)?;
        let overrides = overrides.copied().unwrap_or_default();

        let origin_seg = self.segment(
            SegmentRole::Origin,
            origin,
            None,
            overrides.for_role(SegmentRole::Origin),
        )?;
        let dest_seg = self.segment(
            SegmentRole::Destination,
            destination,
            None,
            overrides.for_role(SegmentRole::Destination),
        )?;

        Ok(self.assemble(origin_seg, dest_seg, departure, vehicle_class, payload_tons))
    }

    /// 按查询构建（支持指定道路、服务优先级）
    pub fn build_for_query(
        &self,
        query: &TripQuery,
        vehicle_class: VehicleClass,
    ) -> EngineResult<FeatureRecord> {
        validate_payload(query.payload_tons)?;
        let overrides = query.overrides.unwrap_or_default();

        let origin_seg = self.segment(
            SegmentRole::Origin,
            &query.origin,
            query.origin_road.as_deref(),
            overrides.for_role(SegmentRole::Origin),
        )?;
        let dest_seg = self.segment(
            SegmentRole::Destination,
            &query.destination,
            query.destination_road.as_deref(),
            overrides.for_role(SegmentRole::Destination),
        )?;

        Ok(self
            .assemble(origin_seg, dest_seg, query.departure, vehicle_class, query.payload_tons)
            .with_priority(query.priority))
    }

    fn assemble(
        &self,
        origin: SegmentFeatures,
        destination: SegmentFeatures,
        departure: NaiveDateTime,
        vehicle_class: VehicleClass,
        payload_tons: f64,
    ) -> FeatureRecord {
        FeatureRecord {
            origin,
            destination,
            calendar: calendar_features(departure, self.time_buckets),
            vehicle_class,
            payload_tons,
            priority: ServicePriority::default(),
        }
    }

    fn segment(
        &self,
        role: SegmentRole,
        corridor: &CorridorId,
        road: Option<&str>,
        overrides: &CorridorOverrides,
    ) -> EngineResult<SegmentFeatures> {
        if !self.dataset.contains(corridor) {
            return Err(EngineError::UnknownCorridor {
                corridor: corridor.to_string(),
                role,
            });
        }

        let record = self
            .dataset
            .latest(corridor, road)
            .ok_or_else(|| EngineError::UnknownCorridor {
                corridor: format!("{} / {}", corridor, road.unwrap_or_default()),
                role,
            })?;
        let baseline = self
            .dataset
            .baseline_tti(corridor)
            .unwrap_or(record.travel_time_index);

        let mut seg = SegmentFeatures::from_record(role, record, baseline);
        apply_overrides(&mut seg, overrides)?;

        debug!(
            role = %role,
            corridor = %seg.corridor,
            road = %seg.road,
            source_date = %seg.source_date,
            overridden = seg.overridden_fields.len(),
            "路段特征已构建"
        );
        Ok(seg)
    }
}

fn validate_payload(payload_tons: f64) -> EngineResult<()> {
    if !payload_tons.is_finite() || payload_tons < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "载重必须为非负有限数，实际 {}",
            payload_tons
        )));
    }
    Ok(())
}

fn apply_overrides(seg: &mut SegmentFeatures, overrides: &CorridorOverrides) -> EngineResult<()> {
    let check = |field: &str, v: f64| -> EngineResult<f64> {
        if v.is_finite() && v >= 0.0 {
            Ok(v)
        } else {
            Err(EngineError::InvalidInput(format!(
                "覆写值 {} 必须为非负有限数，实际 {}",
                field, v
            )))
        }
    };

    if let Some(v) = overrides.traffic_volume {
        seg.traffic_volume = check("traffic_volume", v)?;
        seg.overridden_fields.push("traffic_volume".to_string());
    }
    if let Some(v) = overrides.average_speed_kmh {
        let v = check("average_speed_kmh", v)?;
        if v == 0.0 {
            return Err(EngineError::InvalidInput("覆写车速必须 > 0".to_string()));
        }
        seg.average_speed_kmh = v;
        seg.overridden_fields.push("average_speed_kmh".to_string());
    }
    if let Some(v) = overrides.incident_reports {
        seg.incident_reports = check("incident_reports", v)?;
        seg.overridden_fields.push("incident_reports".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::corridor::HistoricalRecord;
    use crate::domain::types::TimeBucket;
    use chrono::NaiveDate;

    fn rec(corridor: &str, road: &str, day: u32, volume: f64) -> HistoricalRecord {
        HistoricalRecord {
            row_number: day as usize + 1,
            corridor: CorridorId::new(corridor),
            road: road.to_string(),
            date: NaiveDate::from_ymd_opt(2022, 3, day).unwrap(),
            traffic_volume: volume,
            average_speed_kmh: 25.0,
            travel_time_index: 1.2,
            congestion_level: 70.0,
            incident_reports: 1.0,
            signal_compliance_pct: 80.0,
            public_transport_usage_pct: None,
            pedestrian_cyclist_count: None,
            capacity_utilization_pct: None,
            environmental_impact: None,
            parking_usage_pct: None,
            weather: None,
            roadwork: None,
        }
    }

    fn dataset() -> TrafficDataset {
        TrafficDataset::from_records(vec![
            rec("M.G. Road", "Trinity Circle", 1, 100.0),
            rec("M.G. Road", "Anil Kumble Circle", 2, 200.0),
            rec("Whitefield", "ITPL Main Road", 1, 300.0),
        ])
        .unwrap()
    }

    fn departure(h: u32, m: u32) -> NaiveDateTime {
        // 2024-03-04 为周一
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_suggest_vehicle_class() {
        let rates = VehicleRateTable::default();
        assert_eq!(suggest_vehicle_class(0.0, &rates), VehicleClass::Light);
        assert_eq!(suggest_vehicle_class(3.5, &rates), VehicleClass::Light);
        assert_eq!(suggest_vehicle_class(5.0, &rates), VehicleClass::Medium);
        assert_eq!(suggest_vehicle_class(12.0, &rates), VehicleClass::Heavy);
        assert_eq!(suggest_vehicle_class(40.0, &rates), VehicleClass::Heavy);
    }

    #[test]
    fn test_build_uses_latest_record() {
        let ds = dataset();
        let buckets = TimeBucketConfig::default();
        let builder = FeatureBuilder::new(&ds, &buckets);
        let record = builder
            .build_features(
                &CorridorId::new("MG Road"),
                &CorridorId::new("Whitefield"),
                departure(8, 30),
                VehicleClass::Heavy,
                5.0,
                None,
            )
            .unwrap();

        assert_eq!(record.origin.road, "Anil Kumble Circle");
        assert_eq!(record.origin.traffic_volume, 200.0);
        assert_eq!(record.calendar.day_of_week, 0);
        assert_eq!(record.calendar.time_bucket, TimeBucket::Peak);
        assert!(!record.calendar.is_weekend);
    }

    #[test]
    fn test_unknown_corridor_names_role() {
        let ds = dataset();
        let buckets = TimeBucketConfig::default();
        let builder = FeatureBuilder::new(&ds, &buckets);
        let err = builder
            .build_features(
                &CorridorId::new("M.G. Road"),
                &CorridorId::new("Atlantis"),
                departure(9, 0),
                VehicleClass::Light,
                1.0,
                None,
            )
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownCorridor {
                corridor: "Atlantis".to_string(),
                role: SegmentRole::Destination,
            }
        );
    }

    #[test]
    fn test_negative_payload_rejected() {
        let ds = dataset();
        let buckets = TimeBucketConfig::default();
        let builder = FeatureBuilder::new(&ds, &buckets);
        let mg = CorridorId::new("M.G. Road");
        for payload in [-1.0, f64::NAN, f64::INFINITY] {
            let result =
                builder.build_features(&mg, &mg, departure(9, 0), VehicleClass::Light, payload, None);
            assert!(matches!(result, Err(EngineError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_overrides_supersede_history() {
        let ds = dataset();
        let buckets = TimeBucketConfig::default();
        let builder = FeatureBuilder::new(&ds, &buckets);
        let overrides = TripOverrides {
            origin: CorridorOverrides {
                incident_reports: Some(6.0),
                ..Default::default()
            },
            destination: CorridorOverrides::default(),
        };
        let record = builder
            .build_features(
                &CorridorId::new("M.G. Road"),
                &CorridorId::new("Whitefield"),
                departure(14, 0),
                VehicleClass::Light,
                1.0,
                Some(&overrides),
            )
            .unwrap();
        assert_eq!(record.origin.incident_reports, 6.0);
        assert_eq!(record.origin.overridden_fields, vec!["incident_reports".to_string()]);
        assert_eq!(record.destination.incident_reports, 1.0);
    }

    #[test]
    fn test_negative_override_rejected() {
        let ds = dataset();
        let buckets = TimeBucketConfig::default();
        let builder = FeatureBuilder::new(&ds, &buckets);
        let overrides = TripOverrides::uniform(CorridorOverrides {
            traffic_volume: Some(-5.0),
            ..Default::default()
        });
        let mg = CorridorId::new("M.G. Road");
        let result = builder.build_features(
            &mg,
            &mg,
            departure(14, 0),
            VehicleClass::Light,
            1.0,
            Some(&overrides),
        );
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_query_with_road_and_priority() {
        let ds = dataset();
        let buckets = TimeBucketConfig::default();
        let builder = FeatureBuilder::new(&ds, &buckets);
        let query = TripQuery::new("M.G. Road", "Whitefield", departure(23, 0), 2.0)
            .with_roads(Some("trinity circle".to_string()), None)
            .with_priority(ServicePriority::NightLinehaul);
        let record = builder.build_for_query(&query, VehicleClass::Light).unwrap();
        assert_eq!(record.origin.road, "Trinity Circle");
        assert_eq!(record.priority, ServicePriority::NightLinehaul);
        assert_eq!(record.calendar.time_bucket, TimeBucket::Night);

        let bad = query.with_roads(Some("Nowhere".to_string()), None);
        assert!(matches!(
            builder.build_for_query(&bad, VehicleClass::Light),
            Err(EngineError::UnknownCorridor { role: SegmentRole::Origin, .. })
        ));
    }
}
