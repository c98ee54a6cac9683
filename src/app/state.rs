// ==========================================
// 城市走廊通行决策系统 - 应用状态
// ==========================================
// 职责: 一次性初始化（加载数据集 → 训练模型），之后只读共享
// 重训: 仅由运维显式触发（retrain）
// ==========================================

use std::path::{Path, PathBuf};

use tracing::info;

use crate::api::{ApiError, ApiResult, TripApi};
use crate::config::AdvisorConfig;
use crate::engine::{HubRecommender, PredictionPipeline, RuleEngine, TrainingReport};
use crate::importer::TrafficDataset;

/// 数据集路径环境变量
pub const DATA_PATH_ENV: &str = "CORRIDOR_ADVISOR_DATA_PATH";
/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "CORRIDOR_ADVISOR_CONFIG_PATH";

const APP_DIR: &str = "corridor-advisor";
const DATASET_FILE: &str = "Banglore_traffic_Dataset.csv";
const CONFIG_FILE: &str = "config.json";

/// 应用状态
pub struct AppState {
    pub data_path: PathBuf,
    pub config: AdvisorConfig,
    pub dataset: TrafficDataset,
    pub pipeline: PredictionPipeline,
    pub rule_engine: RuleEngine,
    pub hub_recommender: HubRecommender,
}

impl AppState {
    /// 初始化: 加载数据集并训练模型
    ///
    /// 数据集格式错误 / 训练失败均为致命错误，不做部分初始化
    pub fn initialize<P: AsRef<Path>>(data_path: P, config: AdvisorConfig) -> ApiResult<Self> {
        let data_path = data_path.as_ref().to_path_buf();
        info!(path = %data_path.display(), "初始化应用状态");

        config.validate()?;
        let dataset = TrafficDataset::load(&data_path)?;
        Self::from_dataset(data_path, dataset, config)
    }

    /// 使用已加载的数据集初始化
    pub fn from_dataset(
        data_path: PathBuf,
        dataset: TrafficDataset,
        config: AdvisorConfig,
    ) -> ApiResult<Self> {
        let mut pipeline = PredictionPipeline::new(&config);
        let report = pipeline.fit(&dataset)?;
        info!(
            rows = dataset.len(),
            corridors = dataset.corridors().len(),
            validation_mae = report.validation_mae,
            "应用状态初始化完成"
        );

        Ok(Self {
            data_path,
            rule_engine: RuleEngine::new(config.rules.clone()),
            hub_recommender: HubRecommender::new(config.hubs.clone(), config.hub.clone()),
            config,
            dataset,
            pipeline,
        })
    }

    /// 重新加载数据集并重训模型
    ///
    /// 任一步骤失败时保留原有数据集与模型
    pub fn retrain(&mut self) -> ApiResult<&TrainingReport> {
        let dataset = TrafficDataset::load(&self.data_path)?;
        let mut pipeline = PredictionPipeline::new(&self.config);
        pipeline.fit(&dataset)?;

        self.dataset = dataset;
        self.pipeline = pipeline;
        info!(path = %self.data_path.display(), "模型已重训");

        self.pipeline
            .report()
            .ok_or(ApiError::ModelNotTrained)
    }

    pub fn trip_api(&self) -> TripApi<'_> {
        TripApi::new(
            &self.dataset,
            &self.pipeline,
            &self.rule_engine,
            &self.hub_recommender,
            &self.config,
        )
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_DIR))
}

/// 默认数据集路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_data_path() -> PathBuf {
    if let Some(path) = env_path(DATA_PATH_ENV) {
        return path;
    }
    match app_data_dir() {
        Some(dir) if dir.join(DATASET_FILE).exists() => dir.join(DATASET_FILE),
        _ => PathBuf::from(DATASET_FILE),
    }
}

/// 默认配置文件路径
///
/// 优先级: 环境变量 → 用户配置目录
pub fn get_default_config_path() -> PathBuf {
    if let Some(path) = env_path(CONFIG_PATH_ENV) {
        return path;
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR).join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}
