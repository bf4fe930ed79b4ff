// crates/lh_physics/src/timestep.rs

//! CFL 时间步检查
//!
//! 全部域、全部湿单元上的稳定上限：
//!
//! ```text
//! dt ≤ min( dx/|u|, dx²/(2·dmx), dz/|w−w_ss|, dz²/(2·dmz) )
//! ```
//!
//! 固定步长模式下配置步长超过上限即致命（首步失败时不得改动
//! 任何状态，因此检查放在每步推进之前）。

use crate::domain::Domain;
use crate::error::{SolverError, SolverResult};
use lh_foundation::Scalar;

/// 稳定上限与限制最严的域 id
pub fn cfl_limit(doms: &[Domain]) -> (Scalar, usize) {
    let mut dt_min = Scalar::INFINITY;
    let mut dom_min = doms.first().map(|d| d.id).unwrap_or(0);

    for dom in doms {
        let mesh = &dom.mesh;
        let w_ss_max = dom.w_ss.iter().cloned().fold(0.0, Scalar::max);
        for i in 1..=mesh.nx {
            let kb = mesh.kc_bot[i];
            if kb > mesh.k_srf {
                continue;
            }
            let dx = mesh.dx[i];
            for k in kb..=mesh.k_srf {
                let dz = mesh.dz[k].max(1e-6);
                let u_face = dom.u[(i - 1, k)].abs().max(dom.u[(i, k)].abs());
                let w_lo = dom.w[(i, k - 1)];
                let w_hi = dom.w[(i, k)];
                let w_max = (w_lo.abs().max(w_hi.abs()) + w_ss_max).max(1e-30);
                let dmx = dom.dmx[(i, k)].max(dom.dmx[(i - 1, k)]);
                let dmz = dom.dmz[(i, k)].max(dom.dmz[(i, k - 1)]);

                let mut local = Scalar::INFINITY;
                if u_face > 1e-30 {
                    local = local.min(dx / u_face);
                }
                if dmx > 1e-30 {
                    local = local.min(dx * dx / (2.0 * dmx));
                }
                local = local.min(dz / w_max);
                if dmz > 1e-30 {
                    local = local.min(dz * dz / (2.0 * dmz));
                }

                if local < dt_min {
                    dt_min = local;
                    dom_min = dom.id;
                }
            }
        }
    }
    (dt_min, dom_min)
}

/// 固定步长模式的稳定性检查
pub fn check_fixed_dt(doms: &[Domain], dt: Scalar, step: usize) -> SolverResult<()> {
    let (dt_max, dom) = cfl_limit(doms);
    if dt > dt_max {
        return Err(SolverError::Cfl {
            dom,
            step,
            dt,
            dt_max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::box_input;
    use lh_config::ParticleSpec;

    #[test]
    fn test_still_water_unbounded() {
        let doms = vec![Domain::new(1, box_input(10, 20, 15.0), &ParticleSpec::default()).unwrap()];
        // 静水、零扩散系数 → 无有效限制
        let (dt_max, _) = cfl_limit(&doms);
        assert!(dt_max > 1.0e6);
        assert!(check_fixed_dt(&doms, 3600.0, 1).is_ok());
    }

    #[test]
    fn test_advection_limit() {
        let mut dom = Domain::new(1, box_input(10, 20, 15.0), &ParticleSpec::default()).unwrap();
        for i in 0..=dom.mesh.nx {
            for k in 1..=dom.mesh.k_srf {
                dom.u[(i, k)] = 2.0;
            }
        }
        let doms = vec![dom];
        let (dt_max, _) = cfl_limit(&doms);
        // dx/|u| = 100/2 = 50
        assert!((dt_max - 50.0).abs() < 1e-9);
        assert!(check_fixed_dt(&doms, 60.0, 1).is_err());
        assert!(check_fixed_dt(&doms, 40.0, 1).is_ok());
    }

    #[test]
    fn test_diffusion_limit() {
        let mut dom = Domain::new(1, box_input(10, 20, 15.0), &ParticleSpec::default()).unwrap();
        dom.dmz.fill(1.0e-3);
        let doms = vec![dom];
        let (dt_max, _) = cfl_limit(&doms);
        // dz²/(2·dmz) = 1/(2e-3) = 500
        assert!((dt_max - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_error_carries_context() {
        let mut dom = Domain::new(1, box_input(10, 20, 15.0), &ParticleSpec::default()).unwrap();
        for i in 0..=dom.mesh.nx {
            for k in 1..=dom.mesh.k_srf {
                dom.u[(i, k)] = 10.0;
            }
        }
        let doms = vec![dom];
        let err = check_fixed_dt(&doms, 60.0, 42).unwrap_err();
        match err {
            SolverError::Cfl { dom, step, .. } => {
                assert_eq!(dom, 1);
                assert_eq!(step, 42);
            }
            other => panic!("意外错误: {}", other),
        }
    }
}
