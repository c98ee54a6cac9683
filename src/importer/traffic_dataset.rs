// ==========================================
// 城市走廊通行决策系统 - 历史数据集
// ==========================================
// 职责: 解析 → 列校验 → 字段映射 → 行校验 → 按走廊建索引
// 红线: 每次加载都重新解析、重新校验；加载后只读
// ==========================================

use crate::domain::corridor::{CorridorId, HistoricalRecord};
use crate::domain::dataset::{DqLevel, DqReport, DqViolation};
use crate::domain::features::columns;
use crate::importer::dq_validator::DatasetValidator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{RawTable, UniversalFileParser};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument, warn};

/// 历史交通数据集（进程生命周期内缓存）
#[derive(Debug, Clone)]
pub struct TrafficDataset {
    records: Vec<HistoricalRecord>,
    // 走廊 → 记录下标（按 日期, 行号 升序）
    by_corridor: BTreeMap<CorridorId, Vec<usize>>,
    dq_report: DqReport,
}

impl TrafficDataset {
    /// 从文件加载数据集（.csv / .xlsx / .xls）
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let table = UniversalFileParser.parse(path.as_ref())?;
        let dataset = Self::from_raw_table(table)?;

        info!(
            rows = dataset.records.len(),
            corridors = dataset.by_corridor.len(),
            dropped = dataset.dq_report.dropped_rows,
            "数据集加载完成"
        );

        Ok(dataset)
    }

    /// 从原始表构建
    pub fn from_raw_table(table: RawTable) -> ImportResult<Self> {
        let validator = DatasetValidator;
        validator.check_columns(&table.headers)?;

        let mapper = FieldMapper;
        let total_rows = table.rows.len();
        let mut records = Vec::with_capacity(total_rows);
        let mut violations = Vec::new();

        for row in &table.rows {
            let record = match mapper.map_row(row) {
                Ok(r) => r,
                // 日期无法解析的行剔除（记为 Warning），其余映射错误直接失败
                Err(ImportError::DateFormatError { row, field, value }) => {
                    warn!(row, value = %value, "日期无法解析，剔除该行");
                    violations.push(DqViolation {
                        row_number: row,
                        level: DqLevel::Warning,
                        field,
                        message: format!("日期无法解析，已剔除: {}", value),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let row_violations = validator.validate_record(&record);
            if let Some(err) = row_violations.iter().find(|v| v.level == DqLevel::Error) {
                return Err(ImportError::InvalidValue {
                    row: err.row_number,
                    field: err.field.clone(),
                    message: err.message.clone(),
                });
            }
            violations.extend(row_violations);
            records.push(record);
        }

        let loaded_rows = records.len();
        let dq_report = DqReport {
            total_rows,
            loaded_rows,
            dropped_rows: total_rows - loaded_rows,
            violations,
        };

        Self::build(records, dq_report)
    }

    /// 从已映射的记录构建（测试 / 内存数据）
    pub fn from_records(records: Vec<HistoricalRecord>) -> ImportResult<Self> {
        let validator = DatasetValidator;
        let mut violations = Vec::new();
        for record in &records {
            let row_violations = validator.validate_record(record);
            if let Some(err) = row_violations.iter().find(|v| v.level == DqLevel::Error) {
                return Err(ImportError::InvalidValue {
                    row: err.row_number,
                    field: err.field.clone(),
                    message: err.message.clone(),
                });
            }
            violations.extend(row_violations);
        }

        let dq_report = DqReport {
            total_rows: records.len(),
            loaded_rows: records.len(),
            dropped_rows: 0,
            violations,
        };
        Self::build(records, dq_report)
    }

    fn build(records: Vec<HistoricalRecord>, dq_report: DqReport) -> ImportResult<Self> {
        if records.is_empty() {
            return Err(ImportError::EmptyDataset(format!(
                "共 {} 行，剔除 {} 行",
                dq_report.total_rows, dq_report.dropped_rows
            )));
        }

        let mut by_corridor: BTreeMap<CorridorId, Vec<usize>> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_corridor
                .entry(record.corridor.clone())
                .or_default()
                .push(idx);
        }
        for indices in by_corridor.values_mut() {
            indices.sort_by_key(|&i| (records[i].date, records[i].row_number));
        }

        Ok(Self {
            records,
            by_corridor,
            dq_report,
        })
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn data_quality(&self) -> &DqReport {
        &self.dq_report
    }

    /// 全部走廊（按归一化键排序）
    pub fn corridors(&self) -> Vec<&CorridorId> {
        self.by_corridor.keys().collect()
    }

    pub fn contains(&self, corridor: &CorridorId) -> bool {
        self.by_corridor.contains_key(corridor)
    }

    /// 数据集中登记的走廊标识（保留原始写法，如 "M.G. Road"）
    pub fn resolve(&self, corridor: &CorridorId) -> Option<&CorridorId> {
        self.by_corridor.get_key_value(corridor).map(|(k, _)| k)
    }

    fn corridor_records<'a>(
        &'a self,
        corridor: &CorridorId,
    ) -> impl DoubleEndedIterator<Item = &'a HistoricalRecord> + 'a {
        self.by_corridor
            .get(corridor)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.records[i])
    }

    /// 走廊下的道路 / 路口（排序去重）
    pub fn roads(&self, corridor: &CorridorId) -> Vec<&str> {
        let mut roads: Vec<&str> = self
            .corridor_records(corridor)
            .map(|r| r.road.as_str())
            .collect();
        roads.sort_unstable();
        roads.dedup();
        roads
    }

    /// 最新记录；指定 road 时限定该道路（忽略大小写 / 标点）
    pub fn latest(&self, corridor: &CorridorId, road: Option<&str>) -> Option<&HistoricalRecord> {
        let road_key = road.map(CorridorId::normalize);
        self.corridor_records(corridor)
            .rev()
            .find(|r| match &road_key {
                Some(key) => &CorridorId::normalize(&r.road) == key,
                None => true,
            })
    }

    /// 历史平均通行时间指数
    pub fn baseline_tti(&self, corridor: &CorridorId) -> Option<f64> {
        mean(self.corridor_records(corridor).map(|r| r.travel_time_index))
    }

    /// 最近 n 条记录的平均拥堵度
    pub fn recent_congestion(&self, corridor: &CorridorId, n: usize) -> Option<f64> {
        mean(
            self.corridor_records(corridor)
                .rev()
                .take(n)
                .map(|r| r.congestion_level),
        )
    }

    /// 最近 n 条记录中信号遵守率达标的占比
    pub fn recent_compliance_share(
        &self,
        corridor: &CorridorId,
        n: usize,
        threshold_pct: f64,
    ) -> Option<f64> {
        mean(
            self.corridor_records(corridor)
                .rev()
                .take(n)
                .map(|r| if r.is_compliant(threshold_pct) { 1.0 } else { 0.0 }),
        )
    }

    /// 最近 n 条记录（时间升序），可限定道路
    pub fn recent_trend(
        &self,
        corridor: &CorridorId,
        road: Option<&str>,
        n: usize,
    ) -> Vec<&HistoricalRecord> {
        let road_key = road.map(CorridorId::normalize);
        let mut trend: Vec<&HistoricalRecord> = self
            .corridor_records(corridor)
            .rev()
            .filter(|r| match &road_key {
                Some(key) => &CorridorId::normalize(&r.road) == key,
                None => true,
            })
            .take(n)
            .collect();
        trend.reverse();
        trend
    }

    /// 全部记录均提供取值的可选模型列
    pub fn complete_optional_columns(&self) -> Vec<&'static str> {
        let all = |f: fn(&HistoricalRecord) -> bool| self.records.iter().all(f);
        let mut cols = Vec::new();
        if all(|r| r.weather.is_some()) {
            cols.push(columns::WEATHER);
        }
        if all(|r| r.roadwork.is_some()) {
            cols.push(columns::ROADWORK);
        }
        if all(|r| r.capacity_utilization_pct.is_some()) {
            cols.push(columns::CAPACITY_UTILIZATION);
        }
        if all(|r| r.environmental_impact.is_some()) {
            cols.push(columns::ENVIRONMENTAL_IMPACT);
        }
        if all(|r| r.public_transport_usage_pct.is_some()) {
            cols.push(columns::PUBLIC_TRANSPORT);
        }
        if all(|r| r.parking_usage_pct.is_some()) {
            cols.push(columns::PARKING_USAGE);
        }
        if all(|r| r.pedestrian_cyclist_count.is_some()) {
            cols.push(columns::PEDESTRIAN_COUNT);
        }
        cols
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
