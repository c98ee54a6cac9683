// ==========================================
// 城市走廊通行决策系统 - 引擎层
// ==========================================
// 流程: 特征构建 → 预测管线 → (限行规则, 微枢纽推荐)
// 红线: 引擎无状态（模型训练后只读），所有命中规则必须输出原因
// ==========================================

pub mod error;
pub mod feature_builder;
pub mod geo;
pub mod hub_recommender;
pub mod model;
pub mod rule_engine;
pub mod trip_estimator;

pub use error::{EngineError, EngineResult};
pub use feature_builder::{calendar_features, suggest_vehicle_class, FeatureBuilder};
pub use hub_recommender::HubRecommender;
pub use model::{PredictionPipeline, TrainingReport};
pub use rule_engine::RuleEngine;
pub use trip_estimator::TripEstimator;
