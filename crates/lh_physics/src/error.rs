// crates/lh_physics/src/error.rs

//! 求解器错误类型
//!
//! 原始模型的 `print*; stop` 式中止在这里表达为带域 id 与步号
//! 上下文的标记错误，逐层上抛；入口在退出前冲刷输出句柄并以
//! 非零码结束。可恢复的数值异常（tke 复位）不经过本类型，
//! 由湍流模块就地处理并告警。

use lh_foundation::{LhError, Scalar};

/// 求解器统一结果类型
pub type SolverResult<T> = Result<T, SolverError>;

/// 求解器错误
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] lh_config::ConfigError),

    /// 域内运行错误（水面越界、时序越界、密度定位失败等）
    #[error("域 {dom} 第 {step} 步: {source}")]
    Domain {
        /// 域 id
        dom: usize,
        /// 时间步号
        step: usize,
        /// 底层错误
        #[source]
        source: LhError,
    },

    /// 库容超限
    #[error("域 {dom} 第 {step} 步: 蓄水体积 {volume:.6e} 超出范围 [{min:.6e}, {max:.6e}]")]
    Capacity {
        /// 域 id
        dom: usize,
        /// 时间步号
        step: usize,
        /// 当前蓄水体积 [m³]
        volume: Scalar,
        /// 下限 [m³]
        min: Scalar,
        /// 上限（库容）[m³]
        max: Scalar,
    },

    /// 固定时间步超过 CFL 稳定上限
    #[error("域 {dom} 第 {step} 步: 时间步长 {dt} s 超过稳定上限 {dt_max:.6} s")]
    Cfl {
        /// 限制最严的域 id
        dom: usize,
        /// 时间步号
        step: usize,
        /// 配置的时间步长 [s]
        dt: Scalar,
        /// 稳定上限 [s]
        dt_max: Scalar,
    },

    /// 汇流两侧网格不一致
    #[error("汇流网格不一致: 域 {a} 与域 {b}: {reason}")]
    Mesh {
        /// 一侧域 id
        a: usize,
        /// 另一侧域 id
        b: usize,
        /// 不一致说明
        reason: String,
    },

    /// 场中出现 NaN/Inf
    #[error("域 {dom} 第 {step} 步: 场 {field} 出现非有限值")]
    NonFinite {
        /// 域 id
        dom: usize,
        /// 时间步号
        step: usize,
        /// 场名
        field: &'static str,
    },

    /// 装配/IO 阶段的基础错误
    #[error(transparent)]
    Foundation(#[from] LhError),
}

impl SolverError {
    /// 给基础错误补上域与步号上下文
    pub fn in_domain(dom: usize, step: usize, source: LhError) -> Self {
        Self::Domain { dom, step, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_context_in_message() {
        let err = SolverError::in_domain(3, 120, LhError::invalid_input("密度定位失败"));
        let text = err.to_string();
        assert!(text.contains('3'));
        assert!(text.contains("120"));
    }

    #[test]
    fn test_cfl_message() {
        let err = SolverError::Cfl {
            dom: 1,
            step: 1,
            dt: 120.0,
            dt_max: 45.3,
        };
        assert!(err.to_string().contains("120"));
        assert!(err.to_string().contains("45.3"));
    }
}
