// crates/lh_io/src/output.rs

//! 逐步输出
//!
//! 每域一组 CSV：水体状态、边界流量、床面沉积、测点值；
//! 全局一个涡粘性越限日志（每单元只记首次越限）。
//! 写入端持有缓冲句柄，致命错误路径上由调用方 `flush_all` 后
//! 再退出进程。

use crate::error::IoError;
use lh_foundation::Scalar;
use lh_physics::{Domain, Simulation};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 一个域的输出句柄
struct DomainWriters {
    water: BufWriter<File>,
    flows: BufWriter<File>,
    sediment: BufWriter<File>,
    probes: Option<BufWriter<File>>,
}

/// 全部输出句柄
pub struct OutputWriters {
    domains: Vec<DomainWriters>,
    exceed: BufWriter<File>,
    out_dir: PathBuf,
}

impl OutputWriters {
    /// 创建输出目录与全部文件，写表头
    pub fn create(out_dir: &Path, sim: &Simulation) -> Result<Self, IoError> {
        std::fs::create_dir_all(out_dir).map_err(|e| IoError::file(out_dir, e))?;

        let mut domains = Vec::with_capacity(sim.domains.len());
        for dom in &sim.domains {
            let open = |suffix: &str, header: &str| -> Result<BufWriter<File>, IoError> {
                let path = out_dir.join(format!("{}_{}.csv", dom.name, suffix));
                let file = File::create(&path).map_err(|e| IoError::file(&path, e))?;
                let mut w = BufWriter::new(file);
                writeln!(w, "{}", header).map_err(|e| IoError::file(&path, e))?;
                Ok(w)
            };

            let water = open("water", "time_day,z_srf,total_vol,w_srf,t_mean,c_mean")?;
            let flows = open(
                "flows",
                "time_day,q_inlet,q_trb,q_cnf,q_wtp,q_pin,q_pout,q_out",
            )?;
            let sediment = open("sediment", "time_day,class,total_sed_g")?;
            let probes = if dom.probes.is_empty() {
                None
            } else {
                let mut header = String::from("time_day");
                for probe in &dom.probes {
                    header.push_str(&format!(
                        ",t_x{:.0}z{:.0},u_x{:.0}z{:.0}",
                        probe.x, probe.z, probe.x, probe.z
                    ));
                }
                Some(open("probes", &header)?)
            };
            domains.push(DomainWriters {
                water,
                flows,
                sediment,
                probes,
            });
        }

        let exceed_path = out_dir.join("exceed.log");
        let exceed_file = File::create(&exceed_path).map_err(|e| IoError::file(&exceed_path, e))?;
        let mut exceed = BufWriter::new(exceed_file);
        writeln!(exceed, "# time_day dom i k nut")
            .map_err(|e| IoError::file(&exceed_path, e))?;

        Ok(Self {
            domains,
            exceed,
            out_dir: out_dir.to_path_buf(),
        })
    }

    /// 写一步的全部时序输出
    pub fn write_step(&mut self, sim: &mut Simulation) -> Result<(), IoError> {
        let t_day = sim.time_day();
        for (dom, w) in sim.domains.iter().zip(self.domains.iter_mut()) {
            write_water_row(&mut w.water, dom, t_day, &self.out_dir)?;
            write_flows_row(&mut w.flows, dom, t_day, &self.out_dir)?;
            write_sediment_rows(&mut w.sediment, dom, t_day, &self.out_dir)?;
            if let Some(p) = &mut w.probes {
                write_probe_row(p, dom, t_day, &self.out_dir)?;
            }
        }
        for ev in sim.take_exceed_events() {
            writeln!(
                self.exceed,
                "{:.6} {} {} {} {:.6e}",
                ev.time_day, ev.dom, ev.i, ev.k, ev.nut
            )
            .map_err(|e| IoError::file(&self.out_dir, e))?;
        }
        Ok(())
    }

    /// 冲刷全部句柄（致命错误退出前调用）
    pub fn flush_all(&mut self) -> Result<(), IoError> {
        for w in &mut self.domains {
            w.water.flush().map_err(|e| IoError::file(&self.out_dir, e))?;
            w.flows.flush().map_err(|e| IoError::file(&self.out_dir, e))?;
            w.sediment
                .flush()
                .map_err(|e| IoError::file(&self.out_dir, e))?;
            if let Some(p) = &mut w.probes {
                p.flush().map_err(|e| IoError::file(&self.out_dir, e))?;
            }
        }
        self.exceed.flush().map_err(|e| IoError::file(&self.out_dir, e))
    }
}

fn write_water_row(
    w: &mut BufWriter<File>,
    dom: &Domain,
    t_day: Scalar,
    dir: &Path,
) -> Result<(), IoError> {
    // 体积加权平均水温与总浓度
    let mut t_sum = 0.0;
    let mut c_sum = 0.0;
    let mut vol_sum = 0.0;
    for i in 1..=dom.mesh.nx {
        for k in dom.mesh.kc_bot[i]..=dom.mesh.k_srf {
            let vol = dom.mesh.vol[(i, k)];
            t_sum += dom.t[(i, k)] * vol;
            for c in &dom.c {
                c_sum += c[(i, k)] * vol;
            }
            vol_sum += vol;
        }
    }
    let t_mean = if vol_sum > 0.0 { t_sum / vol_sum } else { 0.0 };
    let c_mean = if vol_sum > 0.0 { c_sum / vol_sum } else { 0.0 };
    writeln!(
        w,
        "{:.6},{:.6},{:.6e},{:.6e},{:.4},{:.4}",
        t_day, dom.mesh.z_srf, dom.total_vol, dom.w_srf, t_mean, c_mean
    )
    .map_err(|e| IoError::file(dir, e))
}

fn write_flows_row(
    w: &mut BufWriter<File>,
    dom: &Domain,
    t_day: Scalar,
    dir: &Path,
) -> Result<(), IoError> {
    let s = &dom.src;
    writeln!(
        w,
        "{:.6},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
        t_day, s.q_inlet, s.q_trb, s.q_cnf, s.q_wtp, s.q_pin, s.q_pout, s.q_out
    )
    .map_err(|e| IoError::file(dir, e))
}

fn write_sediment_rows(
    w: &mut BufWriter<File>,
    dom: &Domain,
    t_day: Scalar,
    dir: &Path,
) -> Result<(), IoError> {
    for (l, sed) in dom.c_sed.iter().enumerate() {
        let total: Scalar = sed.iter().sum();
        writeln!(w, "{:.6},{},{:.6e}", t_day, l + 1, total).map_err(|e| IoError::file(dir, e))?;
    }
    Ok(())
}

fn write_probe_row(
    w: &mut BufWriter<File>,
    dom: &Domain,
    t_day: Scalar,
    dir: &Path,
) -> Result<(), IoError> {
    let mut row = format!("{:.6}", t_day);
    for probe in &dom.probes {
        let i = probe.i_cell;
        let k = dom.mesh.layer_of_z(probe.z);
        let u_c = 0.5 * (dom.u[(i - 1, k)] + dom.u[(i, k)]);
        row.push_str(&format!(",{:.4},{:.6}", dom.t[(i, k)], u_c));
    }
    writeln!(w, "{}", row).map_err(|e| IoError::file(dir, e))
}
