// apps/lh_cli/src/commands/run.rs

//! 运行模拟命令
//!
//! 装配模拟、按输出间隔驱动主循环；致命错误时先冲刷输出句柄
//! 再以非零码退出（错误信息已含域 id 与步号）。

use anyhow::{Context, Result};
use clap::Args;
use lh_io::{load_simulation, write_snapshots, OutputWriters};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// 运行模拟参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径（JSON）
    #[arg(short, long)]
    pub config: PathBuf,

    /// 覆盖输出目录（缺省用配置中的 out_dir）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 覆盖最大步数
    #[arg(long)]
    pub it_max: Option<usize>,
}

/// 执行
pub fn execute(args: RunArgs) -> Result<()> {
    let started = Instant::now();
    info!(
        "LimnoHydro 运行开始 @ {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let mut sim = load_simulation(&args.config)
        .with_context(|| format!("装配模拟失败: {}", args.config.display()))?;
    if let Some(it_max) = args.it_max {
        sim.config.time.it_max = it_max;
    }
    if let Some(out) = &args.output {
        sim.config.output.out_dir = out.clone();
    }

    let base_dir = args
        .config
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let out_dir = if sim.config.output.out_dir.is_absolute() {
        sim.config.output.out_dir.clone()
    } else {
        base_dir.join(&sim.config.output.out_dir)
    };

    let mut writers = OutputWriters::create(&out_dir, &sim).context("创建输出文件失败")?;
    let series_interval = sim.config.output.series_interval.max(1);
    let snap_interval = sim.config.output.snap_interval;
    let it_max = sim.config.time.it_max;

    info!(
        ndom = sim.domains.len(),
        it_max,
        dt_sec = sim.config.time.dt_sec,
        "开始推进"
    );

    let mut snap_id = sim.config.restart.snapshot_id;
    let result = (|| -> lh_physics::SolverResult<()> {
        while sim.step < it_max {
            sim.advance_step()?;
            if sim.step % series_interval == 0 {
                writers
                    .write_step(&mut sim)
                    .map_err(|e| lh_physics::SolverError::Foundation(e.into()))?;
            }
            if snap_interval > 0 && sim.step % snap_interval == 0 {
                snap_id += 1;
                write_snapshots(&sim, &out_dir, snap_id)
                    .map_err(|e| lh_physics::SolverError::Foundation(e.into()))?;
            }
        }
        Ok(())
    })();

    // 致命错误：冲刷输出后上抛（进程以非零码退出）
    if let Err(err) = result {
        error!("模拟中止: {}", err);
        let _ = writers.flush_all();
        return Err(err).context("模拟中止");
    }

    writers.flush_all().context("冲刷输出失败")?;
    write_snapshots(&sim, &out_dir, snap_id + 1).context("写收尾快照失败")?;
    info!(
        steps = sim.step,
        elapsed_s = started.elapsed().as_secs_f64(),
        "运行完成"
    );
    Ok(())
}
