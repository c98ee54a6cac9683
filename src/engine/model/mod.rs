// ==========================================
// 城市走廊通行决策系统 - 通行时间预测模型
// ==========================================
// ColumnEncoder (one-hot + 标准化) → RandomForestRegressor
// ==========================================

pub mod encoder;
pub mod forest;
pub mod pipeline;
pub mod split;

pub use encoder::{ColumnEncoder, MissingColumn};
pub use forest::{ForestParams, RandomForestRegressor, RegressionTree};
pub use pipeline::{PredictionPipeline, TrainingReport, MIN_TRAINING_ROWS};
pub use split::train_validation_split;
