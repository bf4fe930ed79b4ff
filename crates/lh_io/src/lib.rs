// crates/lh_io/src/lib.rs

//! LimnoHydro IO 层
//!
//! 数值核心之外的全部文件交互：
//! - [`geometry`]: 几何文件解析
//! - [`timeseries`]: 边界/气象时序解析
//! - [`profile`]: 初始垂向剖面
//! - [`snapshot`]: 重启快照读写
//! - [`output`]: 逐步 CSV 输出与越限日志
//! - [`loader`]: 配置 → 模拟的装配（含重启恢复）

pub mod error;
pub mod geometry;
pub mod loader;
pub mod output;
pub mod profile;
pub mod snapshot;
pub mod timeseries;

pub use error::IoError;
pub use loader::{build_simulation, load_simulation, write_snapshots};
pub use output::OutputWriters;
