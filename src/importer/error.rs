// ==========================================
// 城市走廊通行决策系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
///
/// 除文件访问类错误外，其余均属于数据集格式错误（启动期致命，不做部分加载）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据集格式错误 =====
    #[error("数据集缺少必需列: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("日期格式错误 (行 {row}, 字段 {field}): 期望 YYYY-MM-DD，实际 {value}")]
    DateFormatError {
        row: usize,
        field: String,
        value: String,
    },

    #[error("数值非法 (行 {row}, 字段 {field}): {message}")]
    InvalidValue {
        row: usize,
        field: String,
        message: String,
    },

    #[error("数据集无可用数据行: {0}")]
    EmptyDataset(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ImportError {
    /// 是否属于数据集格式错误（列缺失 / 类型 / 取值 / 空数据集）
    pub fn is_dataset_format(&self) -> bool {
        matches!(
            self,
            ImportError::MissingColumns { .. }
                | ImportError::TypeConversionError { .. }
                | ImportError::DateFormatError { .. }
                | ImportError::InvalidValue { .. }
                | ImportError::EmptyDataset(_)
                | ImportError::CsvParseError(_)
                | ImportError::ExcelParseError(_)
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
