// ==========================================
// 城市走廊通行决策系统 - 库入口
// ==========================================
// 依据: 班加罗尔走廊历史交通数据集
// 分层: domain → importer → config → engine → api → app
// ==========================================

// 领域模型层
pub mod domain;

// 数据导入层
pub mod importer;

// 配置层
pub mod config;

// 引擎层
pub mod engine;

// API 层
pub mod api;

// 应用层
pub mod app;

// 日志系统
pub mod logging;

// 重导出核心类型
pub use api::{ApiError, ApiResult, TripApi};
pub use app::AppState;
pub use config::{AdvisorConfig, ConfigManager};
pub use domain::{CorridorId, PredictionResult, RuleVerdict, TripQuery, TripResult, VehicleClass};
pub use engine::{PredictionPipeline, TrainingReport};
pub use importer::TrafficDataset;

// 版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "城市走廊通行决策系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "城市走廊通行决策系统");
    }
}
