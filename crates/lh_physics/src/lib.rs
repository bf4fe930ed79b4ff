// crates/lh_physics/src/lib.rs

//! LimnoHydro 数值核心
//!
//! 分层水体（水库、河道、坝前池）的纵向-垂向二维水温-水动力
//! 求解器，包括：
//! - 交错网格与移动表层 (mesh)
//! - 状态方程、静水压与层平均密度 (density)
//! - Richardson / k-ε 湍流闭合 (turbulence)
//! - 密度选择性取排水分配 (sources)
//! - 动量 / 热量 / 悬浮颗粒积分器 (momentum, heat, solids, transport)
//! - 多域水面耦合与列流量修正 (coupler)
//! - CFL 守卫与主循环调度 (timestep, simulation)
//!
//! 文件读写（几何、时序、快照、逐步输出）不在本 crate：上游
//! 装配好的 [`domain::DomainInput`] 与时序即是本核心的全部输入。

pub mod coupler;
pub mod density;
pub mod domain;
pub mod error;
pub mod forcing;
pub mod heat;
pub mod mesh;
pub mod momentum;
pub mod numerics;
pub mod simulation;
pub mod solids;
pub mod sources;
pub mod timestep;
pub mod transport;
pub mod turbulence;

// 重导出常用类型
pub use domain::{Domain, DomainInput, SourceTerms};
pub use error::{SolverError, SolverResult};
pub use forcing::{MeteoRecord, ScheduleCursor, ScheduleSeries};
pub use mesh::{GeometryData, StaggeredMesh};
pub use simulation::{ExceedEvent, Simulation};
