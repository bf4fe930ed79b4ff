// apps/lh_cli/src/commands/validate.rs

//! 校验配置命令
//!
//! 只装配不推进：配置记录、几何、时序、跨域连接全部过一遍
//! 校验路径。

use anyhow::{Context, Result};
use clap::Args;
use lh_io::load_simulation;
use std::path::PathBuf;
use tracing::info;

/// 校验参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径（JSON）
    #[arg(short, long)]
    pub config: PathBuf,
}

/// 执行
pub fn execute(args: ValidateArgs) -> Result<()> {
    let sim = load_simulation(&args.config)
        .with_context(|| format!("校验失败: {}", args.config.display()))?;
    for dom in &sim.domains {
        info!(
            domain = dom.id,
            name = %dom.name,
            nx = dom.mesh.nx,
            nz = dom.mesh.nz,
            z_srf = dom.mesh.z_srf,
            "域校验通过"
        );
    }
    info!(ndom = sim.domains.len(), "配置校验通过");
    println!("OK: {} 个域全部通过校验", sim.domains.len());
    Ok(())
}
