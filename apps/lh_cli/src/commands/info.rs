// apps/lh_cli/src/commands/info.rs

//! 几何信息命令
//!
//! 打印几何文件的网格尺寸与高程-库容表。

use anyhow::{Context, Result};
use clap::Args;
use lh_physics::StaggeredMesh;
use std::path::PathBuf;

/// 信息参数
#[derive(Args)]
pub struct InfoArgs {
    /// 几何文件路径
    #[arg(short, long)]
    pub geometry: PathBuf,

    /// 参考水面高程（缺省取网格顶）
    #[arg(short, long)]
    pub z_srf: Option<f64>,
}

/// 执行
pub fn execute(args: InfoArgs) -> Result<()> {
    let geom = lh_io::geometry::load_geometry(&args.geometry)
        .with_context(|| format!("读取几何失败: {}", args.geometry.display()))?;
    let z_top = geom.z[geom.nz];
    let z_srf = args.z_srf.unwrap_or(z_top);
    let mesh = StaggeredMesh::build(&geom, z_srf).context("构建网格失败")?;

    println!("几何: {}", args.geometry.display());
    println!("  网格: nx={} nz={}", mesh.nx, mesh.nz);
    println!(
        "  范围: x ∈ [{:.1}, {:.1}] m, z ∈ [{:.2}, {:.2}] m",
        mesh.x[0], mesh.x[mesh.nx], mesh.z[0], mesh.z[mesh.nz]
    );
    println!("  库容: {:.4e} m³ (满蓄)", mesh.vol_hgt[mesh.nz]);
    println!("  当前水面 {:.2} m: 蓄水 {:.4e} m³", z_srf, mesh.wet_volume());
    println!();
    println!("  高程-库容表:");
    println!("    z [m]    volume [m³]    area [m²]    length [m]");
    for k in 0..=mesh.nz {
        println!(
            "    {:8.2} {:14.4e} {:12.4e} {:10.1}",
            mesh.z[k], mesh.vol_hgt[k], mesh.area_hgt[k], mesh.len_hgt[k]
        );
    }
    Ok(())
}
