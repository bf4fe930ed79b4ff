// crates/lh_io/src/timeseries.rs

//! 时序文件解析
//!
//! 格式：表头行 + 数据行 `t v1 v2 … vN`（空白分隔，`#` 注释）。
//! 时间必须严格单调递增；变量列数以首个数据行为准。

use crate::error::IoError;
use lh_foundation::Scalar;
use lh_physics::ScheduleSeries;
use std::path::Path;

/// 读取时序文件
pub fn load_timeseries(path: &Path) -> Result<ScheduleSeries, IoError> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
    parse_timeseries(&text, path)
}

/// 解析时序文本（路径仅用于错误报告）
pub fn parse_timeseries(text: &str, path: &Path) -> Result<ScheduleSeries, IoError> {
    let mut times: Vec<Scalar> = Vec::new();
    let mut rows: Vec<Vec<Scalar>> = Vec::new();
    let mut header_seen = false;
    let mut nv: Option<usize> = None;

    for (ln, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }
        let mut values = Vec::new();
        for tok in trimmed.split_whitespace() {
            let v: Scalar = tok.parse().map_err(|_| {
                IoError::parse(path, ln + 1, format!("期望数值，得到 '{}'", tok))
            })?;
            values.push(v);
        }
        if values.len() < 2 {
            return Err(IoError::parse(path, ln + 1, "每行至少需要时间与一个变量"));
        }
        let row_nv = values.len() - 1;
        match nv {
            None => nv = Some(row_nv),
            Some(expect) if expect != row_nv => {
                return Err(IoError::parse(
                    path,
                    ln + 1,
                    format!("变量列数不一致: 期望 {}, 实际 {}", expect, row_nv),
                ));
            }
            _ => {}
        }
        times.push(values[0]);
        rows.push(values[1..].to_vec());
    }

    if times.is_empty() {
        return Err(IoError::parse(path, 0, "没有数据行"));
    }
    ScheduleSeries::new(times, rows).map_err(|e| IoError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
