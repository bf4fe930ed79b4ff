// crates/lh_physics/src/simulation.rs

//! 模拟主循环
//!
//! 持有按 id 排序的域序列并执行每步调度：
//!
//! ```text
//! CFL 检查 → 并行 B（源项构建）→ 屏障 → 单线程 C（耦合器）
//!          → 并行 M, H, S, D, T（每域内部 M/H/S 依次、D 先于 T）
//! ```
//!
//! 域内推进只依赖本域状态，跨域量全部经由耦合器单线程阶段
//! 交换，因此两个并行段均可安全使用 rayon。固定步长模式下
//! CFL 检查在任何状态改动之前执行，首步超限时状态保持原样。

use crate::coupler;
use crate::density;
use crate::domain::{Domain, DomainInput};
use crate::error::{SolverError, SolverResult};
use crate::forcing::{MeteoRecord, ScheduleCursor, ScheduleSeries};
use crate::heat;
use crate::momentum;
use crate::solids;
use crate::sources;
use crate::timestep;
use crate::turbulence;
use lh_config::SimulationConfig;
use lh_foundation::{Scalar, SECONDS_PER_DAY};
use rayon::prelude::*;
use tracing::{info, warn};

/// 涡粘性越限阈值 [m²/s]
const NUT_EXCEED_LIMIT: Scalar = 10.0;

/// 涡粘性越限事件（每单元只记首次）
#[derive(Debug, Clone, Copy)]
pub struct ExceedEvent {
    /// 域 id
    pub dom: usize,
    /// 单元纵向索引
    pub i: usize,
    /// 单元垂向索引
    pub k: usize,
    /// 发生时刻 [day]
    pub time_day: Scalar,
    /// 越限值 [m²/s]
    pub nut: Scalar,
}

/// 模拟实体
pub struct Simulation {
    /// 全局配置
    pub config: SimulationConfig,
    /// 域序列（id 即下标 + 1）
    pub domains: Vec<Domain>,
    /// 气象时序（solar, t_air, e_air, wind, cloud）
    pub meteo: Option<ScheduleSeries>,
    meteo_cursor: ScheduleCursor,
    /// 已完成的步数
    pub step: usize,
    /// 自上次取走后新增的越限事件
    pub exceed_events: Vec<ExceedEvent>,
}

impl Simulation {
    /// 装配模拟：构建各域并校验跨域一致性
    pub fn new(
        config: SimulationConfig,
        inputs: Vec<DomainInput>,
        meteo: Option<ScheduleSeries>,
    ) -> SolverResult<Self> {
        config.validate()?;
        lh_foundation::LhError::check_size("domain inputs", config.domains.len(), inputs.len())?;

        let particles = config.particles.clone();
        let mut domains = Vec::with_capacity(inputs.len());
        for (idx, input) in inputs.into_iter().enumerate() {
            let id = idx + 1;
            let mut dom = Domain::new(id, input, &particles)
                .map_err(|e| SolverError::in_domain(id, 0, e))?;
            // 支汊的出水口被覆盖：东端必须开放给汇流
            if dom.confluences.iter().any(|c| c.is_branch) && !dom.outlets.is_empty() {
                warn!(
                    domain = id,
                    "支汊域配置了出水口，已覆盖为开放东端（汇流要求）"
                );
                dom.outlets.clear();
                dom.outflow_series = None;
            }
            domains.push(dom);
        }

        check_confluence_meshes(&domains)?;

        // 初始导出量：密度/压力 → 湍流系数（CFL 检查首步就要用）
        for dom in &mut domains {
            density::update_density(dom);
            density::update_column_avg_density(dom);
            density::update_pressure(dom);
            turbulence::update(dom, 0.0, 0.0);
        }

        info!(ndom = domains.len(), "模拟装配完成");
        Ok(Self {
            config,
            domains,
            meteo,
            meteo_cursor: ScheduleCursor::default(),
            step: 0,
            exceed_events: Vec::new(),
        })
    }

    /// 当前模拟时刻 [day]
    pub fn time_day(&self) -> Scalar {
        self.config.time.start_day + self.step as Scalar * self.config.time.dt_sec / SECONDS_PER_DAY
    }

    /// 推进一个时间步
    pub fn advance_step(&mut self) -> SolverResult<()> {
        let dt = self.config.time.dt_sec;
        let step = self.step + 1;
        let t_day = self.time_day();

        // ---- CFL 检查（任何状态改动之前）----
        if self.config.time.fixed_dt {
            timestep::check_fixed_dt(&self.domains, dt, step)?;
        }

        // ---- 气象采样 ----
        let meteo_rec = match &self.meteo {
            Some(series) => {
                let row = series
                    .sample(t_day, &mut self.meteo_cursor)
                    .map_err(|e| SolverError::in_domain(0, step, e))?;
                Some(MeteoRecord::from_row(&row))
            }
            None => None,
        };
        let wind = meteo_rec.map(|m| m.wind).unwrap_or(0.0);

        // ---- 并行 B：源项构建 ----
        let inflow_mode = self.config.inflow_mode;
        let outflow_mode = self.config.outflow_mode;
        self.domains.par_iter_mut().try_for_each(|dom| {
            sources::build_sources(dom, t_day, inflow_mode, outflow_mode)
                .map_err(|e| SolverError::in_domain(dom.id, step, e))
        })?;

        // ---- 单线程 C：体积平衡、共享水面、列流量、跨域交换 ----
        coupler::update(&mut self.domains, dt, step)?;

        // ---- 并行 M, H, S, D, T ----
        let momentum_opts = &self.config.momentum;
        let heat_opts = &self.config.heat;
        self.domains.par_iter_mut().for_each(|dom| {
            momentum::advance(dom, dt, momentum_opts);
            heat::advance(dom, dt, heat_opts, meteo_rec.as_ref());
            solids::advance(dom, dt);
            density::update_density(dom);
            density::update_column_avg_density(dom);
            density::update_pressure(dom);
            turbulence::update(dom, dt, wind);
        });

        // ---- 数值哨兵 ----
        for dom in &self.domains {
            if let Some(field) = dom.find_non_finite() {
                return Err(SolverError::NonFinite {
                    dom: dom.id,
                    step,
                    field,
                });
            }
        }

        // ---- 涡粘性越限日志（每单元只记首次）----
        self.collect_exceed_events(t_day);

        self.step = step;
        Ok(())
    }

    /// 连续推进到 it_max，每步结束调用回调（输出挂在回调上）
    pub fn run<F>(&mut self, mut per_step: F) -> SolverResult<()>
    where
        F: FnMut(&mut Simulation) -> SolverResult<()>,
    {
        while self.step < self.config.time.it_max {
            self.advance_step()?;
            per_step(self)?;
        }
        Ok(())
    }

    /// 取走本步新增的越限事件
    pub fn take_exceed_events(&mut self) -> Vec<ExceedEvent> {
        std::mem::take(&mut self.exceed_events)
    }

    /// 快照恢复后刷新导出量（密度、压力、湍流系数、幽灵带）
    pub fn refresh_after_restore(&mut self) {
        for dom in &mut self.domains {
            dom.mirror_ghost_bands();
            density::update_density(dom);
            density::update_column_avg_density(dom);
            density::update_pressure(dom);
            turbulence::update(dom, 0.0, 0.0);
        }
    }

    fn collect_exceed_events(&mut self, t_day: Scalar) {
        for dom in &mut self.domains {
            let nz = dom.mesh.nz;
            for i in 1..=dom.mesh.nx {
                for k in 1..=dom.mesh.k_srf {
                    let nut = dom.nut[(i, k)];
                    if nut > NUT_EXCEED_LIMIT {
                        let flag = &mut dom.exceed_flagged[i * (nz + 1) + k];
                        if !*flag {
                            *flag = true;
                            self.exceed_events.push(ExceedEvent {
                                dom: dom.id,
                                i,
                                k,
                                time_day: t_day,
                                nut,
                            });
                        }
                    }
                }
            }
        }
    }
}

/// 汇流两侧网格一致性检查
fn check_confluence_meshes(domains: &[Domain]) -> SolverResult<()> {
    for dom in domains {
        for cnf in &dom.confluences {
            let partner = &domains[cnf.partner_id - 1];
            if dom.mesh.nz != partner.mesh.nz {
                return Err(SolverError::Mesh {
                    a: dom.id,
                    b: partner.id,
                    reason: format!("nz 不一致: {} vs {}", dom.mesh.nz, partner.mesh.nz),
                });
            }
            for k in 0..=dom.mesh.nz {
                if (dom.mesh.z[k] - partner.mesh.z[k]).abs() > 1e-9 {
                    return Err(SolverError::Mesh {
                        a: dom.id,
                        b: partner.id,
                        reason: format!("垂向节点 z[{}] 不一致", k),
                    });
                }
            }
            // 交汇处底层一致（支汊东端 vs 干流汇入单元）
            if cnf.is_branch {
                let kc_branch = dom.mesh.kc_bot[dom.mesh.nx];
                let main_cnf = partner
                    .confluences
                    .iter()
                    .find(|c| c.partner_id == dom.id && !c.is_branch);
                if let Some(mc) = main_cnf {
                    let kc_main = partner.mesh.kc_bot[mc.i_cell];
                    if kc_branch != kc_main {
                        return Err(SolverError::Mesh {
                            a: dom.id,
                            b: partner.id,
                            reason: format!(
                                "交汇处底层索引不一致: {} vs {}",
                                kc_branch, kc_main
                            ),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}
