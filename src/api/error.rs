// ==========================================
// 城市走廊通行决策系统 - API层错误类型
// ==========================================
// 职责: 将各层错误转换为面向调用方的错误（保留走廊 / 列 / 行定位信息）
// ==========================================

use crate::config::ConfigError;
use crate::domain::types::SegmentRole;
use crate::engine::EngineError;
use crate::importer::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 查询错误
    // ==========================================
    #[error("未知走廊 ({role}): {corridor}")]
    UnknownCorridor { corridor: String, role: SegmentRole },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 模型错误
    // ==========================================
    #[error("模型尚未训练")]
    ModelNotTrained,

    #[error("特征缺失 ({segment}): 模型需要列 {column}")]
    SchemaMismatch { column: String, segment: SegmentRole },

    #[error("模型训练失败: {0}")]
    TrainingFailed(String),

    // ==========================================
    // 数据 / 配置错误
    // ==========================================
    #[error("数据集格式错误: {0}")]
    DatasetFormat(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownCorridor { corridor, role } => {
                ApiError::UnknownCorridor { corridor, role }
            }
            EngineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            EngineError::ModelNotTrained => ApiError::ModelNotTrained,
            EngineError::SchemaMismatch { column, segment } => {
                ApiError::SchemaMismatch { column, segment }
            }
            err @ EngineError::InsufficientTrainingData { .. } => {
                ApiError::TrainingFailed(err.to_string())
            }
            EngineError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if err.is_dataset_format() {
            ApiError::DatasetFormat(err.to_string())
        } else {
            ApiError::ImportError(err.to_string())
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
