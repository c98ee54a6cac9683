// ==========================================
// 城市走廊通行决策系统 - 数据质量校验器
// ==========================================
// 职责: 列完整性校验 + 行级取值范围校验
// ==========================================

use crate::domain::corridor::HistoricalRecord;
use crate::domain::dataset::{DqLevel, DqViolation};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{column_aliases, source_columns};

pub struct DatasetValidator;

impl DatasetValidator {
    /// 校验必需列是否齐全（列名或其别名之一存在即可）
    ///
    /// # 返回
    /// - Err(MissingColumns): 列出全部缺失列
    pub fn check_columns(&self, headers: &[String]) -> ImportResult<()> {
        let missing: Vec<String> = source_columns::REQUIRED
            .iter()
            .filter(|required| {
                !column_aliases(required)
                    .iter()
                    .any(|alias| headers.iter().any(|h| h == alias))
            })
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::MissingColumns { columns: missing })
        }
    }

    /// 行级取值校验
    ///
    /// - Error: 物理上不可能的值（负流量、非正速度 / TTI、负事故数），阻断加载
    /// - Warning: 超出常规范围但可用（百分比越界等），仅记录
    pub fn validate_record(&self, record: &HistoricalRecord) -> Vec<DqViolation> {
        let mut violations = Vec::new();
        let row = record.row_number;

        let mut push = |level: DqLevel, field: &str, message: String| {
            violations.push(DqViolation {
                row_number: row,
                level,
                field: field.to_string(),
                message,
            });
        };

        if record.traffic_volume < 0.0 {
            push(
                DqLevel::Error,
                source_columns::TRAFFIC_VOLUME,
                format!("车流量为负数: {}", record.traffic_volume),
            );
        }

        if record.average_speed_kmh <= 0.0 {
            push(
                DqLevel::Error,
                source_columns::AVERAGE_SPEED,
                format!("平均速度 <= 0: {}", record.average_speed_kmh),
            );
        }

        if record.travel_time_index <= 0.0 {
            push(
                DqLevel::Error,
                source_columns::TRAVEL_TIME_INDEX,
                format!("通行时间指数 <= 0: {}", record.travel_time_index),
            );
        }

        if record.incident_reports < 0.0 {
            push(
                DqLevel::Error,
                source_columns::INCIDENT_REPORTS,
                format!("事故数为负数: {}", record.incident_reports),
            );
        }

        if !(0.0..=101.0).contains(&record.congestion_level) {
            push(
                DqLevel::Warning,
                source_columns::CONGESTION_LEVEL,
                format!("拥堵度超出 [0, 101]: {}", record.congestion_level),
            );
        }

        if !(0.0..=100.0).contains(&record.signal_compliance_pct) {
            push(
                DqLevel::Warning,
                source_columns::SIGNAL_COMPLIANCE,
                format!("信号遵守率超出 [0, 100]: {}", record.signal_compliance_pct),
            );
        }

        if let Some(pt) = record.public_transport_usage_pct {
            if !(0.0..=100.0).contains(&pt) {
                push(
                    DqLevel::Warning,
                    source_columns::PUBLIC_TRANSPORT,
                    format!("公共交通占比超出 [0, 100]: {}", pt),
                );
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::corridor::CorridorId;
    use chrono::NaiveDate;

    fn record() -> HistoricalRecord {
        HistoricalRecord {
            row_number: 7,
            corridor: CorridorId::new("Indiranagar"),
            road: "100 Feet Road".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 2, 1).unwrap(),
            traffic_volume: 30000.0,
            average_speed_kmh: 35.0,
            travel_time_index: 1.2,
            congestion_level: 60.0,
            incident_reports: 0.0,
            signal_compliance_pct: 90.0,
            public_transport_usage_pct: Some(45.0),
            pedestrian_cyclist_count: Some(120.0),
            capacity_utilization_pct: None,
            environmental_impact: None,
            parking_usage_pct: None,
            weather: None,
            roadwork: None,
        }
    }

    fn headers(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_check_columns_ok() {
        let h = headers(&source_columns::REQUIRED);
        assert!(DatasetValidator.check_columns(&h).is_ok());
    }

    #[test]
    fn test_check_columns_reports_every_missing() {
        let h = headers(&["Date", "Area Name", "Road/Intersection Name"]);
        match DatasetValidator.check_columns(&h) {
            Err(ImportError::MissingColumns { columns }) => {
                assert_eq!(columns.len(), 6);
                assert!(columns.contains(&"Travel Time Index".to_string()));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_check_columns_accepts_alias() {
        let mut cols: Vec<&str> = source_columns::REQUIRED
            .iter()
            .copied()
            .filter(|c| *c != source_columns::INCIDENT_REPORTS)
            .collect();
        cols.push("Incident Count");
        assert!(DatasetValidator.check_columns(&headers(&cols)).is_ok());
    }

    #[test]
    fn test_valid_record_has_no_violations() {
        assert!(DatasetValidator.validate_record(&record()).is_empty());
    }

    #[test]
    fn test_negative_speed_is_error() {
        let mut r = record();
        r.average_speed_kmh = 0.0;
        let v = DatasetValidator.validate_record(&r);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].level, DqLevel::Error);
        assert_eq!(v[0].field, "Average Speed");
    }

    #[test]
    fn test_out_of_range_percent_is_warning() {
        let mut r = record();
        r.signal_compliance_pct = 120.0;
        let v = DatasetValidator.validate_record(&r);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].level, DqLevel::Warning);
    }
}
