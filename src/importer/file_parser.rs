// ==========================================
// 城市走廊通行决策系统 - 文件解析器
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 表头 + 原始行（列名 → 字符串）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始行
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 原始文件行号（表头为第 1 行）
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

/// 原始表
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// 文件解析接口
pub trait FileParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        ensure_exists(path)?;

        // 检查扩展名
        let ext = extension_of(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut values = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    values.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if values.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow {
                row_number: idx + 2,
                values,
            });
        }

        Ok(RawTable { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        ensure_exists(path)?;

        let ext = extension_of(path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names().to_owned();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, data_row) in sheet_rows.enumerate() {
            let mut values = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    values.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }

            if values.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow {
                row_number: idx + 2,
                values,
            });
        }

        Ok(RawTable { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawTable> {
        let path = file_path.as_ref();

        match extension_of(path).as_str() {
            "csv" => CsvParser.parse_to_raw_table(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_table(path),
            other => {
                ensure_exists(path)?;
                Err(ImportError::UnsupportedFormat(other.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file() -> tempfile::NamedTempFile {
        Builder::new().suffix(".csv").tempfile().unwrap()
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = csv_file();
        writeln!(temp_file, "Area Name,Traffic Volume,Average Speed").unwrap();
        writeln!(temp_file, "Hebbal,40000,32.5").unwrap();
        writeln!(temp_file, "Whitefield,38000,28.0").unwrap();

        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();

        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].row_number, 2);
        assert_eq!(
            table.rows[0].values.get("Area Name"),
            Some(&"Hebbal".to_string())
        );
        assert_eq!(
            table.rows[1].values.get("Average Speed"),
            Some(&"28.0".to_string())
        );
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_table(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let mut temp_file = csv_file();
        writeln!(temp_file, "Area Name,Traffic Volume").unwrap();
        writeln!(temp_file, "Hebbal,40000").unwrap();
        writeln!(temp_file, ",").unwrap(); // 空行
        writeln!(temp_file, "Whitefield,38000").unwrap();

        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();

        // 应跳过空行，行号保持原文件位置
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].row_number, 4);
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
