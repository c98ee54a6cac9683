// ==========================================
// 城市走廊通行决策系统 - 列编码器
// ==========================================
// 分类列: one-hot（训练集未出现的取值 → 全零）
// 数值列: 标准化（方差为 0 时缩放系数取 1）
// 红线: 仅在训练切分上拟合
// ==========================================

use crate::domain::features::{FeatureRow, FeatureValue};
use std::collections::BTreeSet;

/// transform 时缺失（或类型不符）的列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingColumn(pub &'static str);

#[derive(Debug, Clone)]
struct CategoricalColumn {
    name: &'static str,
    categories: Vec<String>, // 已排序
}

#[derive(Debug, Clone)]
struct NumericColumn {
    name: &'static str,
    mean: f64,
    scale: f64,
}

#[derive(Debug, Clone)]
pub struct ColumnEncoder {
    categorical: Vec<CategoricalColumn>,
    numeric: Vec<NumericColumn>,
}

impl ColumnEncoder {
    /// 在训练行上拟合
    pub fn fit(
        rows: &[&FeatureRow],
        categorical: &[&'static str],
        numeric: &[&'static str],
    ) -> Result<Self, MissingColumn> {
        let mut cat_columns = Vec::with_capacity(categorical.len());
        for &name in categorical {
            let mut categories = BTreeSet::new();
            for row in rows {
                match row.get(name) {
                    Some(FeatureValue::Categorical(v)) => {
                        categories.insert(v.clone());
                    }
                    _ => return Err(MissingColumn(name)),
                }
            }
            cat_columns.push(CategoricalColumn {
                name,
                categories: categories.into_iter().collect(),
            });
        }

        let mut num_columns = Vec::with_capacity(numeric.len());
        for &name in numeric {
            let values = rows
                .iter()
                .map(|row| match row.get(name) {
                    Some(FeatureValue::Numeric(v)) => Ok(*v),
                    _ => Err(MissingColumn(name)),
                })
                .collect::<Result<Vec<f64>, _>>()?;

            let n = values.len().max(1) as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            num_columns.push(NumericColumn {
                name,
                mean,
                scale: if std > 1e-12 { std } else { 1.0 },
            });
        }

        Ok(Self {
            categorical: cat_columns,
            numeric: num_columns,
        })
    }

    /// 编码后向量宽度
    pub fn width(&self) -> usize {
        self.categorical
            .iter()
            .map(|c| c.categories.len())
            .sum::<usize>()
            + self.numeric.len()
    }

    /// 模型所需的原始列（分类列在前）
    pub fn columns(&self) -> Vec<&'static str> {
        self.categorical
            .iter()
            .map(|c| c.name)
            .chain(self.numeric.iter().map(|c| c.name))
            .collect()
    }

    /// 编码后的特征名（如 corridor=mgroad）
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        for col in &self.categorical {
            names.extend(col.categories.iter().map(|v| format!("{}={}", col.name, v)));
        }
        names.extend(self.numeric.iter().map(|c| c.name.to_string()));
        names
    }

    pub fn transform(&self, row: &FeatureRow) -> Result<Vec<f64>, MissingColumn> {
        let mut out = Vec::with_capacity(self.width());

        for col in &self.categorical {
            let value = match row.get(col.name) {
                Some(FeatureValue::Categorical(v)) => v,
                _ => return Err(MissingColumn(col.name)),
            };
            let hot = col.categories.binary_search(value).ok();
            out.extend((0..col.categories.len()).map(|i| if Some(i) == hot { 1.0 } else { 0.0 }));
        }

        for col in &self.numeric {
            let value = match row.get(col.name) {
                Some(FeatureValue::Numeric(v)) => *v,
                _ => return Err(MissingColumn(col.name)),
            };
            out.push((value - col.mean) / col.scale);
        }

        Ok(out)
    }
}
