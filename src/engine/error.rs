// ==========================================
// 城市走廊通行决策系统 - 引擎层错误类型
// ==========================================
// 红线: 错误必须携带走廊 / 列名 / 角色，便于定位
// ==========================================

use crate::domain::types::SegmentRole;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("未知走廊 ({role}): {corridor}")]
    UnknownCorridor { corridor: String, role: SegmentRole },

    #[error("输入非法: {0}")]
    InvalidInput(String),

    #[error("模型尚未训练，请先执行训练")]
    ModelNotTrained,

    #[error("特征缺失 ({segment}): 模型需要列 {column}")]
    SchemaMismatch { column: String, segment: SegmentRole },

    #[error("训练数据不足: 可用 {rows} 行，至少需要 {required} 行")]
    InsufficientTrainingData { rows: usize, required: usize },

    #[error("内部错误: {0}")]
    InternalError(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
