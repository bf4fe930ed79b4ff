// crates/lh_io/src/profile.rs

//! 初始垂向剖面文件
//!
//! 格式：表头行 + 数据行 `z value`，高程严格递增。
//! 求解器按单元中心高程线性插值，范围外取端值。

use crate::error::IoError;
use lh_foundation::Scalar;
use std::path::Path;

/// 读取剖面文件为 (高程, 值) 点列
pub fn load_profile(path: &Path) -> Result<Vec<(Scalar, Scalar)>, IoError> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
    parse_profile(&text, path)
}

/// 解析剖面文本
pub fn parse_profile(text: &str, path: &Path) -> Result<Vec<(Scalar, Scalar)>, IoError> {
    let mut points: Vec<(Scalar, Scalar)> = Vec::new();
    let mut header_seen = false;
    for (ln, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }
        let toks: Vec<&str> = trimmed.split_whitespace().collect();
        if toks.len() != 2 {
            return Err(IoError::parse(path, ln + 1, "期望 'z value' 两列"));
        }
        let z: Scalar = toks[0]
            .parse()
            .map_err(|_| IoError::parse(path, ln + 1, format!("非法高程 '{}'", toks[0])))?;
        let v: Scalar = toks[1]
            .parse()
            .map_err(|_| IoError::parse(path, ln + 1, format!("非法数值 '{}'", toks[1])))?;
        if let Some(&(z_prev, _)) = points.last() {
            if z <= z_prev {
                return Err(IoError::parse(path, ln + 1, "剖面高程必须严格递增"));
            }
        }
        points.push((z, v));
    }
    if points.is_empty() {
        return Err(IoError::parse(path, 0, "剖面没有数据行"));
    }
    Ok(points)
}
