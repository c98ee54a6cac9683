// ==========================================
// 城市走廊通行决策系统 - 配置层
// ==========================================
// 职责: 系统配置管理，支持文件 / 环境变量 / 命令行多级覆写
// 存储: JSON 文件
// ==========================================

pub mod advisor_config;
pub mod catalog;
pub mod config_manager;
pub mod error;

pub use advisor_config::{
    AdvisorConfig, CorridorCoordinate, HubWeights, ModelConfig, PriorityRate, PriorityTable,
    RouteConfig, TimeBucketConfig, VehicleRate, VehicleRateTable,
};
pub use catalog::{default_hubs, default_rules, HubCatalog, RuleCatalog};
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
