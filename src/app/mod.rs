// ==========================================
// 城市走廊通行决策系统 - 应用层
// ==========================================
// 职责: 应用状态装配（数据集 + 模型 + 规则 + 枢纽目录）
// ==========================================

pub mod state;

pub use state::{get_default_config_path, get_default_data_path, AppState};
