// ==========================================
// 城市走廊通行决策系统 - 数据质量报告
// ==========================================
// 用途: 数据集加载时记录被剔除 / 告警的行
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// DqLevel - 数据质量级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,   // 错误（阻断加载）
    Warning, // 警告（该行剔除，继续加载）
    Info,    // 提示（仅记录）
}

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize, // 原始文件行号（含表头，从 2 开始）
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

// ==========================================
// DqReport - 数据质量报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DqReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub dropped_rows: usize,
    pub violations: Vec<DqViolation>,
}

impl DqReport {
    pub fn warnings(&self) -> impl Iterator<Item = &DqViolation> {
        self.violations
            .iter()
            .filter(|v| v.level == DqLevel::Warning)
    }
}
