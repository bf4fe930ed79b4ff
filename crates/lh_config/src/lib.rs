// crates/lh_config/src/lib.rs

//! LimnoHydro 配置层
//!
//! 提供模拟控制与域配置记录：
//! - 顶层控制（域数量、时间推进、重启、输出间隔）
//! - 动量/热量方程选项
//! - 粒径谱与湍流参数
//! - 每域的几何路径、初始状态与边界描述符
//!
//! 所有记录从 JSON 加载（serde 缺省值补全），`validate()` 统一校验。
//! 原始模型中的模块级可变状态（粒径谱、气象）在这里显式成为
//! 配置记录，由调用方传递。

pub mod domain;
pub mod error;
pub mod records;

pub use domain::{
    ConfluenceConfig, DomainConfig, FenceConfig, FenceKind, FieldInit, InitialState, InletConfig,
    OutletConfig, PipeConfig, PointInflowConfig, PointOutflowConfig, ProbeConfig, ScheduleSource,
    TributaryConfig,
};
pub use error::ConfigError;
pub use records::{
    HeatOptions, InflowMode, MomentumOptions, OutflowMode, OutputControl, ParticleClass,
    ParticleSpec, RestartControl, SimulationConfig, TimeControl, TurbulenceConfig, TurbulenceMode,
    MAX_DOMAINS, MAX_OUTLETS, MAX_PARTICLE_CLASSES,
};
