// ==========================================
// 城市走廊通行决策系统 - 配置管理器
// ==========================================
// 职责: 配置加载、覆写、校验、快照
// 优先级: 内置默认值 < JSON 文件 < 环境变量 < 命令行 key=value
// ==========================================

use crate::config::advisor_config::AdvisorConfig;
use crate::config::catalog::{HubCatalog, RuleCatalog};
use crate::config::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 环境变量前缀: CORRIDOR_ADVISOR__HUB__W1=0.7 → hub.w1=0.7
pub const ENV_PREFIX: &str = "CORRIDOR_ADVISOR__";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config: AdvisorConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 内置默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载；文件不存在时使用默认值
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self::new());
        }

        let raw = fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut manager = Self::from_json_str(&raw)?;
        manager.source = Some(path.to_path_buf());

        info!(path = %path.display(), "配置加载完成");
        Ok(manager)
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: AdvisorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(Self {
            config,
            source: None,
        })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn into_config(self) -> AdvisorConfig {
        self.config
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    // ==========================================
    // 覆写
    // ==========================================

    /// 覆写单个配置项（点分路径，如 hub.w1 / model.validation_ratio）
    ///
    /// 取值先按 JSON 解析（数字 / 布尔 / 数组），失败则视为字符串。
    /// 覆写后整体重新校验，失败时配置保持不变。
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let path: Vec<&str> = key.trim().split('.').filter(|s| !s.is_empty()).collect();
        if path.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut tree = serde_json::to_value(&self.config)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        let slot = path
            .iter()
            .try_fold(&mut tree, |node, segment| match node {
                Value::Object(map) => map.get_mut(*segment),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(move |i| items.get_mut(i)),
                _ => None,
            })
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let parsed = serde_json::from_str::<Value>(value.trim())
            .unwrap_or_else(|_| Value::String(value.trim().to_string()));
        *slot = parsed;

        let updated: AdvisorConfig =
            serde_json::from_value(tree).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;

        debug!(key, value, "配置项已覆写");
        self.config = updated;
        Ok(())
    }

    /// 解析 "key=value" 形式的覆写
    pub fn apply_override(&mut self, assignment: &str) -> ConfigResult<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedOverride(assignment.to_string()))?;
        self.set(key, value)
    }

    pub fn apply_overrides<I, S>(&mut self, assignments: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for assignment in assignments {
            self.apply_override(assignment.as_ref())?;
        }
        Ok(())
    }

    /// 应用环境变量覆写，返回生效的条数
    pub fn apply_env_overrides(&mut self) -> ConfigResult<usize> {
        self.apply_env_pairs(std::env::vars())
    }

    /// 按前缀筛选键值对并覆写（便于测试时注入）
    pub fn apply_env_pairs<I>(&mut self, vars: I) -> ConfigResult<usize>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut pairs: Vec<(String, String)> = vars
            .into_iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(ENV_PREFIX)
                    .map(|rest| (rest.to_ascii_lowercase().replace("__", "."), v))
            })
            .collect();
        // 环境变量遍历顺序不确定
        pairs.sort();

        for (key, value) in &pairs {
            self.set(key, value)?;
        }
        if !pairs.is_empty() {
            info!(count = pairs.len(), "已应用环境变量覆写");
        }
        Ok(pairs.len())
    }

    /// 以独立文件替换规则目录
    pub fn load_rule_catalog<P: AsRef<Path>>(&mut self, path: P) -> ConfigResult<()> {
        self.config.rules = RuleCatalog::load(path)?;
        Ok(())
    }

    /// 以独立文件替换微枢纽目录
    pub fn load_hub_catalog<P: AsRef<Path>>(&mut self, path: P) -> ConfigResult<()> {
        self.config.hubs = HubCatalog::load(path)?;
        Ok(())
    }

    // ==========================================
    // 快照
    // ==========================================

    /// 生效配置的 JSON 快照（训练报告 / 问题复现时记录）
    pub fn snapshot(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(&self.config)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// 从快照恢复
    pub fn restore_from_snapshot(&mut self, snapshot_json: &str) -> ConfigResult<()> {
        let restored = Self::from_json_str(snapshot_json)?;
        self.config = restored.config;
        Ok(())
    }
}

/// 常用配置键
pub mod config_keys {
    // 枢纽评分
    pub const HUB_W1: &str = "hub.w1";
    pub const HUB_W2: &str = "hub.w2";
    pub const HUB_RELIEF_FLOOR: &str = "hub.relief_floor";
    pub const HUB_RELIEF_SLOPE: &str = "hub.relief_slope";
    pub const HUB_NEIGHBOR_FACTOR: &str = "hub.neighbor_factor";

    // 模型
    pub const MODEL_N_ESTIMATORS: &str = "model.n_estimators";
    pub const MODEL_MAX_DEPTH: &str = "model.max_depth";
    pub const MODEL_VALIDATION_RATIO: &str = "model.validation_ratio";
    pub const MODEL_SEED: &str = "model.seed";

    // 路线
    pub const ROUTE_FALLBACK_DISTANCE_KM: &str = "route.fallback_distance_km";
    pub const ROUTE_MIN_SPEED_KMH: &str = "route.min_speed_kmh";

    pub const COMPLIANCE_THRESHOLD_PCT: &str = "compliance_threshold_pct";
    pub const RECENT_WINDOW: &str = "recent_window";
}
