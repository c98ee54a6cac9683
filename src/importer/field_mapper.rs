// ==========================================
// 城市走廊通行决策系统 - 字段映射器
// ==========================================
// 职责: 数据集列 → HistoricalRecord 字段映射 + 类型转换
// ==========================================

use crate::domain::corridor::{CorridorId, HistoricalRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use chrono::NaiveDate;
use std::collections::HashMap;

/// 数据集列名
pub mod source_columns {
    pub const DATE: &str = "Date";
    pub const AREA_NAME: &str = "Area Name";
    pub const ROAD_NAME: &str = "Road/Intersection Name";
    pub const TRAFFIC_VOLUME: &str = "Traffic Volume";
    pub const AVERAGE_SPEED: &str = "Average Speed";
    pub const TRAVEL_TIME_INDEX: &str = "Travel Time Index";
    pub const CONGESTION_LEVEL: &str = "Congestion Level";
    pub const INCIDENT_REPORTS: &str = "Incident Reports";
    pub const SIGNAL_COMPLIANCE: &str = "Traffic Signal Compliance";

    pub const CAPACITY_UTILIZATION: &str = "Road Capacity Utilization";
    pub const ENVIRONMENTAL_IMPACT: &str = "Environmental Impact";
    pub const PUBLIC_TRANSPORT: &str = "Public Transport Usage";
    pub const PARKING_USAGE: &str = "Parking Usage";
    pub const PEDESTRIAN_COUNT: &str = "Pedestrian and Cyclist Count";
    pub const WEATHER: &str = "Weather Conditions";
    pub const ROADWORK: &str = "Roadwork and Construction Activity";

    /// 必需列
    pub const REQUIRED: [&str; 9] = [
        DATE,
        AREA_NAME,
        ROAD_NAME,
        TRAFFIC_VOLUME,
        AVERAGE_SPEED,
        TRAVEL_TIME_INDEX,
        CONGESTION_LEVEL,
        INCIDENT_REPORTS,
        SIGNAL_COMPLIANCE,
    ];
}

use source_columns as col;

/// 列名别名（首项为标准列名）
pub fn column_aliases(key: &str) -> Vec<&str> {
    match key {
        col::AREA_NAME => vec![col::AREA_NAME, "Area", "Corridor"],
        col::ROAD_NAME => vec![col::ROAD_NAME, "Road Name", "Road"],
        col::INCIDENT_REPORTS => vec![col::INCIDENT_REPORTS, "Incident Count"],
        _ => vec![key],
    }
}

pub struct FieldMapper;

impl FieldMapper {
    /// 映射一行原始数据
    ///
    /// # 返回
    /// - Ok(HistoricalRecord)
    /// - Err(DateFormatError): 日期无法解析（调用方剔除该行）
    /// - Err(TypeConversionError / InvalidValue): 必填字段缺失或类型错误
    pub fn map_row(&self, row: &RawRow) -> ImportResult<HistoricalRecord> {
        let values = &row.values;
        let row_number = row.row_number;

        let date = self.parse_date(values, col::DATE, row_number)?;
        let corridor = self.require_string(values, col::AREA_NAME, row_number)?;
        let road = self.require_string(values, col::ROAD_NAME, row_number)?;

        Ok(HistoricalRecord {
            row_number,
            corridor: CorridorId::new(corridor),
            road,
            date,

            traffic_volume: self.require_f64(values, col::TRAFFIC_VOLUME, row_number)?,
            average_speed_kmh: self.require_f64(values, col::AVERAGE_SPEED, row_number)?,
            travel_time_index: self.require_f64(values, col::TRAVEL_TIME_INDEX, row_number)?,
            congestion_level: self.require_f64(values, col::CONGESTION_LEVEL, row_number)?,
            incident_reports: self.require_f64(values, col::INCIDENT_REPORTS, row_number)?,
            signal_compliance_pct: self.require_f64(values, col::SIGNAL_COMPLIANCE, row_number)?,

            public_transport_usage_pct: self.parse_f64(values, col::PUBLIC_TRANSPORT, row_number)?,
            pedestrian_cyclist_count: self.parse_f64(values, col::PEDESTRIAN_COUNT, row_number)?,
            capacity_utilization_pct: self.parse_f64(values, col::CAPACITY_UTILIZATION, row_number)?,
            environmental_impact: self.parse_f64(values, col::ENVIRONMENTAL_IMPACT, row_number)?,
            parking_usage_pct: self.parse_f64(values, col::PARKING_USAGE, row_number)?,
            weather: self.get_string(values, col::WEATHER),
            roadwork: self.get_string(values, col::ROADWORK),
        })
    }

    /// 提取字符串字段（空串视为缺失），支持列名别名
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        for alias in column_aliases(key) {
            if let Some(v) = row.get(alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    fn require_string(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<String> {
        self.get_string(row, key)
            .ok_or_else(|| ImportError::TypeConversionError {
                row: row_number,
                field: key.to_string(),
                message: "必填字段为空".to_string(),
            })
    }

    /// 解析浮点数（可选）
    fn parse_f64(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<f64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为浮点数: {}", value),
                }),
        }
    }

    fn require_f64(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<f64> {
        self.parse_f64(row, key, row_number)?
            .ok_or_else(|| ImportError::TypeConversionError {
                row: row_number,
                field: key.to_string(),
                message: "必填字段为空".to_string(),
            })
    }

    /// 解析日期（YYYY-MM-DD，兼容 YYYY/MM/DD、DD-MM-YYYY、带时间后缀）
    fn parse_date(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<NaiveDate> {
        let value = self.get_string(row, key).unwrap_or_default();
        // 去掉可能的时间部分 "2022-01-01 00:00:00"
        let date_part = value.split_whitespace().next().unwrap_or("");

        ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%Y%m%d"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
            .ok_or_else(|| ImportError::DateFormatError {
                row: row_number,
                field: key.to_string(),
                value,
            })
    }
}
