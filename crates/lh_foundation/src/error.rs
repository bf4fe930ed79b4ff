// crates/lh_foundation/src/error.rs

//! 基础错误类型
//!
//! 仅包含与基础设施相关的错误（IO、尺寸、索引、输入校验），
//! 不含网格、密度、湍流等高层概念。高层 crate 定义自己的错误
//! 并在需要时转换为本类型。

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型别名
pub type LhResult<T> = Result<T, LhError>;

/// Foundation 层基础错误
#[derive(Debug, Error)]
pub enum LhError {
    /// IO 操作失败
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        /// 底层 IO 错误源
        #[source]
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {}", path.display())]
    FileNotFound {
        /// 未找到的文件路径
        path: PathBuf,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 输入数据验证失败
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 内部实现错误（不变量被破坏）
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

impl LhError {
    /// 创建 IO 错误
    #[inline]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带源的 IO 错误
    #[inline]
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 创建文件未找到错误
    #[inline]
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 创建无效输入错误
    #[inline]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 创建内部错误
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 验证数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> LhResult<()> {
        if expected != actual {
            Err(Self::SizeMismatch {
                name,
                expected,
                actual,
            })
        } else {
            Ok(())
        }
    }
}

impl From<std::io::Error> for LhError {
    fn from(err: std::io::Error) -> Self {
        Self::io_with_source("IO 操作失败", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LhError::io("磁盘已满");
        assert!(err.to_string().contains("IO错误"));
    }

    #[test]
    fn test_file_not_found() {
        let err = LhError::file_not_found("/path/to/geom.dat");
        assert!(err.to_string().contains("/path/to/geom.dat"));
    }

    #[test]
    fn test_check_size() {
        assert!(LhError::check_size("widths", 10, 10).is_ok());
        let err = LhError::check_size("widths", 10, 5).unwrap_err();
        assert!(matches!(err, LhError::SizeMismatch { .. }));
        assert!(err.to_string().contains("widths"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "无权限");
        let err: LhError = io_err.into();
        assert!(matches!(err, LhError::Io { .. }));
    }
}
