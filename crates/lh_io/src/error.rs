// crates/lh_io/src/error.rs

//! IO 层错误类型

use std::path::PathBuf;

/// IO 错误
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// 文件读写失败
    #[error("文件读写失败 {}: {source}", path.display())]
    File {
        /// 文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 解析失败
    #[error("解析失败 {}: 第 {line} 行: {reason}", path.display())]
    Parse {
        /// 文件路径
        path: PathBuf,
        /// 行号（1 起；0 表示整体结构问题）
        line: usize,
        /// 原因
        reason: String,
    },

    /// 数据校验失败
    #[error("数据校验失败 {}: {reason}", path.display())]
    Invalid {
        /// 文件路径
        path: PathBuf,
        /// 原因
        reason: String,
    },
}

impl IoError {
    /// 文件错误
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// 解析错误
    pub fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

impl From<IoError> for lh_foundation::LhError {
    fn from(err: IoError) -> Self {
        lh_foundation::LhError::io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = IoError::parse("geom.dat", 12, "期望数值");
        let text = err.to_string();
        assert!(text.contains("geom.dat"));
        assert!(text.contains("12"));
    }
}
