// crates/lh_io/src/loader.rs

//! 模拟装配
//!
//! 把配置记录解析为求解器输入：逐域读取几何与初始剖面，解析
//! 各边界时序（文件或常值），读取气象时序，最后交给
//! [`lh_physics::Simulation::new`]。配置中的相对路径相对配置
//! 文件所在目录解析。
//!
//! 重启模式下再从快照目录恢复各域状态并刷新导出量。

use crate::error::IoError;
use crate::{geometry, profile, snapshot, timeseries};
use lh_config::{FieldInit, ScheduleSource, SimulationConfig};
use lh_foundation::Scalar;
use lh_physics::{DomainInput, ScheduleSeries, Simulation, SolverError};
use std::path::{Path, PathBuf};
use tracing::info;

/// 从配置文件装配模拟
pub fn load_simulation(config_path: &Path) -> Result<Simulation, SolverError> {
    let config = SimulationConfig::from_json_file(config_path)?;
    let base_dir = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
    build_simulation(config, &base_dir)
}

/// 从已解析的配置装配模拟（`base_dir` 用于解析相对路径）
pub fn build_simulation(
    config: SimulationConfig,
    base_dir: &Path,
) -> Result<Simulation, SolverError> {
    let mut inputs = Vec::with_capacity(config.domains.len());
    for dom_cfg in &config.domains {
        let geom_path = resolve(base_dir, &dom_cfg.geometry);
        let geom = geometry::load_geometry(&geom_path).map_err(to_solver_err)?;

        let inlet_series = dom_cfg
            .inlet
            .as_ref()
            .map(|ic| resolve_schedule(base_dir, &ic.schedule))
            .transpose()?;
        let outflow_series = dom_cfg
            .outflow_schedule
            .as_ref()
            .map(|s| resolve_schedule(base_dir, s))
            .transpose()?;
        let tributary_series = dom_cfg
            .tributaries
            .iter()
            .map(|tc| resolve_schedule(base_dir, &tc.schedule))
            .collect::<Result<Vec<_>, _>>()?;
        let pipe_series = dom_cfg
            .pipes
            .iter()
            .map(|pc| resolve_schedule(base_dir, &pc.schedule))
            .collect::<Result<Vec<_>, _>>()?;
        let point_inflow_series = dom_cfg
            .point_inflows
            .iter()
            .map(|pc| resolve_schedule(base_dir, &pc.schedule))
            .collect::<Result<Vec<_>, _>>()?;
        let point_outflow_series = dom_cfg
            .point_outflows
            .iter()
            .map(|pc| resolve_schedule(base_dir, &pc.schedule))
            .collect::<Result<Vec<_>, _>>()?;

        let t_profile = resolve_profile(base_dir, &dom_cfg.initial.temperature)?;
        let c_profile = resolve_profile(base_dir, &dom_cfg.initial.concentration)?;

        inputs.push(DomainInput {
            config: dom_cfg.clone(),
            geometry: geom,
            inlet_series,
            outflow_series,
            tributary_series,
            pipe_series,
            point_inflow_series,
            point_outflow_series,
            t_profile,
            c_profile,
        });
    }

    let meteo = config
        .heat
        .meteo_file
        .as_ref()
        .map(|p| {
            let path = resolve(base_dir, p);
            timeseries::load_timeseries(&path).map_err(to_solver_err)
        })
        .transpose()?;

    let restart = config.restart.clone();
    let out_dir = resolve(base_dir, &config.output.out_dir);
    let dt_sec = config.time.dt_sec;
    let mut sim = Simulation::new(config, inputs, meteo)?;

    // 重启：从快照恢复并续算步号
    if restart.enabled {
        let mut time_day = 0.0;
        for dom in &mut sim.domains {
            let snap_path = out_dir.join(format!("{}_snap{:03}.dat", dom.name, restart.snapshot_id));
            time_day = snapshot::read_snapshot(dom, &snap_path).map_err(to_solver_err)?;
        }
        sim.refresh_after_restore();
        let elapsed_day = time_day - sim.config.time.start_day;
        sim.step = (elapsed_day * lh_foundation::SECONDS_PER_DAY / dt_sec).round() as usize;
        info!(snapshot = restart.snapshot_id, step = sim.step, "已从快照恢复");
    }
    Ok(sim)
}

/// 写出全部域的快照（编号拼在文件名里）
pub fn write_snapshots(
    sim: &Simulation,
    out_dir: &Path,
    snapshot_id: usize,
) -> Result<(), IoError> {
    let time_day = sim.time_day();
    for dom in &sim.domains {
        let path = out_dir.join(format!("{}_snap{:03}.dat", dom.name, snapshot_id));
        snapshot::write_snapshot(dom, time_day, &path)?;
    }
    Ok(())
}

fn resolve(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

fn resolve_schedule(base: &Path, source: &ScheduleSource) -> Result<ScheduleSeries, SolverError> {
    match source {
        ScheduleSource::File(path) => {
            let full = resolve(base, path);
            timeseries::load_timeseries(&full).map_err(to_solver_err)
        }
        ScheduleSource::Constant(values) => Ok(ScheduleSeries::constant(values.clone())),
    }
}

fn resolve_profile(
    base: &Path,
    init: &FieldInit,
) -> Result<Option<Vec<(Scalar, Scalar)>>, SolverError> {
    match init {
        FieldInit::Uniform(_) => Ok(None),
        FieldInit::Profile(path) => {
            let full = resolve(base, path);
            Ok(Some(profile::load_profile(&full).map_err(to_solver_err)?))
        }
    }
}

fn to_solver_err(err: IoError) -> SolverError {
    SolverError::Foundation(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_box_geometry(path: &Path) {
        let mut text = String::from("box\n6 10\n");
        for i in 0..=6 {
            text.push_str(&format!("{}.0 0.0\n", i * 100));
        }
        for k in 0..=10 {
            text.push_str(&format!("{}.0\n", k));
        }
        for _ in 0..7 {
            for _ in 0..11 {
                text.push_str("40.0 ");
            }
            text.push('\n');
        }
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_build_simulation_from_files() {
        let dir = tempfile::tempdir().unwrap();
        write_box_geometry(&dir.path().join("geom.dat"));
        fs::write(
            dir.path().join("inflow.dat"),
            "t Q T\n0.0 2.0 15.0\n100.0 2.0 15.0\n",
        )
        .unwrap();
        let config_json = r#"{
            "domains": [ {
                "name": "main",
                "geometry": "geom.dat",
                "initial": { "z_srf": 7.5 },
                "inlet": { "schedule": { "file": "inflow.dat" }, "width": 40.0 }
            } ],
            "time": { "dt_sec": 30.0, "it_max": 10 }
        }"#;
        let config_path = dir.path().join("sim.json");
        fs::write(&config_path, config_json).unwrap();

        let sim = load_simulation(&config_path).unwrap();
        assert_eq!(sim.domains.len(), 1);
        assert!(sim.domains[0].inlet.is_some());
        assert_eq!(sim.domains[0].mesh.nx, 6);
    }

    #[test]
    fn test_missing_geometry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config_json = r#"{
            "domains": [ { "name": "main", "geometry": "nope.dat",
                           "initial": { "z_srf": 7.5 } } ]
        }"#;
        let config_path = dir.path().join("sim.json");
        fs::write(&config_path, config_json).unwrap();
        assert!(load_simulation(&config_path).is_err());
    }

    #[test]
    fn test_snapshot_restart_cycle() {
        let dir = tempfile::tempdir().unwrap();
        write_box_geometry(&dir.path().join("geom.dat"));
        let config_json = format!(
            r#"{{
            "domains": [ {{ "name": "main", "geometry": "geom.dat",
                           "initial": {{ "z_srf": 7.5 }} }} ],
            "time": {{ "dt_sec": 30.0, "it_max": 10 }},
            "output": {{ "out_dir": "{}" }}
        }}"#,
            dir.path().join("out").display()
        );
        let config_path = dir.path().join("sim.json");
        fs::write(&config_path, &config_json).unwrap();

        let mut sim = load_simulation(&config_path).unwrap();
        for _ in 0..4 {
            sim.advance_step().unwrap();
        }
        let out_dir = dir.path().join("out");
        fs::create_dir_all(&out_dir).unwrap();
        write_snapshots(&sim, &out_dir, 1).unwrap();

        // 重启配置
        let restart_json = config_json.replace(
            r#""time":"#,
            r#""restart": { "enabled": true, "snapshot_id": 1 }, "time":"#,
        );
        fs::write(&config_path, restart_json).unwrap();
        let sim2 = load_simulation(&config_path).unwrap();
        assert_eq!(sim2.step, 4);
        let sum = |s: &Simulation| {
            s.domains[0]
                .t
                .as_slice()
                .iter()
                .sum::<lh_foundation::Scalar>()
        };
        assert!((sum(&sim) - sum(&sim2)).abs() < 1e-9);
    }
}
