// crates/lh_io/src/geometry.rs

//! 几何文件解析
//!
//! 文件格式（`#` 开头的行为注释，空行忽略）：
//!
//! ```text
//! <标题行，自由文本>
//! nx nz
//! x[0] z_bed[0]
//! …            （共 nx+1 行）
//! z[0] … z[nz] （任意断行，共 nz+1 个值）
//! b[0,0] … b[0,nz]
//! …            （按 i 逐行，共 (nx+1)·(nz+1) 个值）
//! ```
//!
//! 坐标单调性等几何校验由 [`GeometryData::validate`] 统一执行。

use crate::error::IoError;
use lh_foundation::{Field2, Scalar};
use lh_physics::GeometryData;
use std::path::Path;

/// 读取几何文件
pub fn load_geometry(path: &Path) -> Result<GeometryData, IoError> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
    parse_geometry(&text, path)
}

/// 解析几何文本（路径仅用于错误报告）
pub fn parse_geometry(text: &str, path: &Path) -> Result<GeometryData, IoError> {
    // 标题行：首个非注释非空行
    let mut lines = text.lines().enumerate();
    let mut header_seen = false;
    let mut tokens: Vec<(usize, &str)> = Vec::new();
    for (ln, line) in &mut lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }
        for tok in trimmed.split_whitespace() {
            tokens.push((ln + 1, tok));
        }
    }

    let mut cursor = 0usize;
    let mut next_value = |what: &str| -> Result<(usize, Scalar), IoError> {
        let (ln, tok) = tokens
            .get(cursor)
            .copied()
            .ok_or_else(|| IoError::parse(path, 0, format!("数据提前结束，期望 {}", what)))?;
        cursor += 1;
        let v: Scalar = tok
            .parse()
            .map_err(|_| IoError::parse(path, ln, format!("期望数值（{}），得到 '{}'", what, tok)))?;
        Ok((ln, v))
    };

    let (ln_nx, nx_f) = next_value("nx")?;
    let (_, nz_f) = next_value("nz")?;
    let nx = nx_f as usize;
    let nz = nz_f as usize;
    if nx < 2 || nz < 2 || nx_f.fract() != 0.0 || nz_f.fract() != 0.0 {
        return Err(IoError::parse(
            path,
            ln_nx,
            format!("非法网格尺寸 nx={} nz={}", nx_f, nz_f),
        ));
    }

    let mut x = Vec::with_capacity(nx + 1);
    let mut z_bed = Vec::with_capacity(nx + 1);
    for _ in 0..=nx {
        x.push(next_value("x")?.1);
        z_bed.push(next_value("z_bed")?.1);
    }
    let mut z = Vec::with_capacity(nz + 1);
    for _ in 0..=nz {
        z.push(next_value("z")?.1);
    }
    let mut b = Field2::zeros(nx + 1, nz + 1);
    for i in 0..=nx {
        for k in 0..=nz {
            b[(i, k)] = next_value("b")?.1;
        }
    }
    if cursor < tokens.len() {
        let (ln, _) = tokens[cursor];
        return Err(IoError::parse(path, ln, "几何数据之后存在多余内容"));
    }

    let geom = GeometryData {
        nx,
        nz,
        x,
        z,
        z_bed,
        b,
    };
    geom.validate().map_err(|e| IoError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(geom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> String {
        let mut text = String::from("# 试验库\n矩形断面试验几何\n2 2\n");
        // x z_bed
        text.push_str("0.0 0.0\n100.0 0.0\n200.0 0.0\n");
        // z
        text.push_str("0.0 1.0 2.0\n");
        // b：3×3
        for _ in 0..3 {
            text.push_str("50.0 50.0 50.0\n");
        }
        text
    }

    #[test]
    fn test_parse_roundtrip() {
        let geom = parse_geometry(&sample_text(), Path::new("test.dat")).unwrap();
        assert_eq!(geom.nx, 2);
        assert_eq!(geom.nz, 2);
        assert!((geom.x[2] - 200.0).abs() < 1e-12);
        assert!((geom.b[(1, 1)] - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_truncated_fails() {
        let text = "标题\n2 2\n0.0 0.0\n";
        let err = parse_geometry(text, Path::new("bad.dat")).unwrap_err();
        assert!(err.to_string().contains("提前结束"));
    }

    #[test]
    fn test_non_monotone_rejected() {
        let mut text = String::from("标题\n2 2\n0.0 0.0\n100.0 0.0\n50.0 0.0\n");
        text.push_str("0.0 1.0 2.0\n");
        for _ in 0..3 {
            text.push_str("50.0 50.0 50.0\n");
        }
        assert!(parse_geometry(&text, Path::new("bad.dat")).is_err());
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut text = sample_text();
        text.push_str("99.0\n");
        assert!(parse_geometry(&text, Path::new("bad.dat")).is_err());
    }
}
