// crates/lh_foundation/src/lib.rs

//! LimnoHydro Foundation Layer
//!
//! 零领域基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`scalar`]: 标量类型别名与物理常数
//! - [`field`]: 列主序二维场数组
//! - [`error`]: 统一基础错误类型
//! - [`kahan`]: 补偿求和（体积/质量审计用）
//!
//! # 设计原则
//!
//! 1. **零领域概念**: 不含网格、密度、湍流等高层概念
//! 2. **最小依赖**: 仅依赖 serde 和 thiserror
//! 3. **索引约定**: 场数组按 (i, k) 访问，i 为纵向、k 为垂向

#![warn(clippy::all)]

pub mod error;
pub mod field;
pub mod kahan;
pub mod scalar;

// 重导出常用类型
pub use error::{LhError, LhResult};
pub use field::Field2;
pub use kahan::KahanSum;
pub use scalar::{lerp, safe_div, Scalar, GRAVITY, RHO_WATER, SECONDS_PER_DAY};
