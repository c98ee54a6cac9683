// ==========================================
// 城市走廊通行决策系统 - 导入层
// ==========================================
// 职责: 历史交通数据集导入，生成只读的走廊索引
// 支持: CSV, Excel (.xlsx / .xls)
// ==========================================

pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod traffic_dataset;

pub use dq_validator::DatasetValidator;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, RawTable, UniversalFileParser};
pub use traffic_dataset::TrafficDataset;
