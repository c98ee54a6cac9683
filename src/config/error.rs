// ==========================================
// 城市走廊通行决策系统 - 配置层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {path}: {message}")]
    FileReadError { path: String, message: String },

    #[error("配置解析失败: {0}")]
    ParseError(String),

    #[error("未知配置键: {0}")]
    UnknownKey(String),

    #[error("配置值非法 ({key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("覆写格式错误: {0}（期望 key=value）")]
    MalformedOverride(String),

    #[error("配置校验失败: {0}")]
    ValidationError(String),

    #[error("序列化失败: {0}")]
    SerializeError(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
