// crates/lh_physics/src/turbulence/richardson.rs

//! Richardson 数经验闭合
//!
//! 垂向涡扩散系数由局地梯度 Richardson 数指数衰减：
//!
//! ```text
//! Ri  = clamp(−g·(∂ρ/∂z)/(ρ·(∂u/∂z)²), 0, 15)
//! dmz = ν + dmz0·exp(−ll·Ri)
//! dhz = α + dhz0·exp(−mm·Ri)
//! dcz = ν + dcz0·exp(−nn·Ri)
//! ```
//!
//! 不稳定分层（上重下轻）时 dhz、dcz 直接置为强制混合系数
//! dmix。底面与水面继承相邻内部面的值。

use super::du_dz;
use crate::density::{kinematic_viscosity, thermal_diffusivity};
use crate::domain::Domain;
use lh_foundation::{Scalar, GRAVITY};

/// Richardson 数上限
const RI_MAX: Scalar = 15.0;

/// 更新垂向涡扩散系数（w 面）
pub fn update_vertical(dom: &mut Domain) {
    let cfg = dom.turbulence.clone();
    let nx = dom.mesh.nx;
    let k_srf = dom.mesh.k_srf;

    for i in 1..=nx {
        let kb = dom.mesh.kc_bot[i];
        if kb >= k_srf {
            // 单层水柱无内部 w 面
            for k in kb.saturating_sub(1)..=k_srf.min(dom.mesh.nz) {
                dom.dmz[(i, k)] = kinematic_viscosity(dom.t[(i, k_srf)]) + cfg.dmz0;
                dom.dhz[(i, k)] = thermal_diffusivity(dom.t[(i, k_srf)]) + cfg.dhz0;
                dom.dcz[(i, k)] = kinematic_viscosity(dom.t[(i, k_srf)]) + cfg.dcz0;
            }
            continue;
        }

        for k in kb..k_srf {
            let drho_dz =
                (dom.rho[(i, k + 1)] - dom.rho[(i, k)]) / dom.mesh.dzs[k].max(1e-10);
            let rho_face = 0.5 * (dom.rho[(i, k)] + dom.rho[(i, k + 1)]);
            let shear = du_dz(dom, i, k);
            let shear_sq = (shear * shear).max(1e-10);
            let ri = (-GRAVITY * drho_dz / (rho_face * shear_sq)).clamp(0.0, RI_MAX);

            let t_face = 0.5 * (dom.t[(i, k)] + dom.t[(i, k + 1)]);
            let nu = kinematic_viscosity(t_face);
            let alpha = thermal_diffusivity(t_face);

            dom.dmz[(i, k)] = nu + cfg.dmz0 * (-cfg.ll * ri).exp();
            dom.dhz[(i, k)] = alpha + cfg.dhz0 * (-cfg.mm * ri).exp();
            dom.dcz[(i, k)] = nu + cfg.dcz0 * (-cfg.nn * ri).exp();

            // 不稳定分层：强制混合
            if dom.rho[(i, k + 1)] > dom.rho[(i, k)] {
                dom.dhz[(i, k)] = cfg.dmix;
                dom.dcz[(i, k)] = cfg.dmix;
            }
        }

        // 底面与水面继承相邻值
        dom.dmz[(i, kb - 1)] = dom.dmz[(i, kb)];
        dom.dhz[(i, kb - 1)] = dom.dhz[(i, kb)];
        dom.dcz[(i, kb - 1)] = dom.dcz[(i, kb)];
        dom.dmz[(i, k_srf)] = dom.dmz[(i, k_srf - 1)];
        dom.dhz[(i, k_srf)] = dom.dhz[(i, k_srf - 1)];
        dom.dcz[(i, k_srf)] = dom.dcz[(i, k_srf - 1)];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density;
    use crate::domain::test_support::box_input;
    use lh_config::ParticleSpec;

    fn make_domain() -> Domain {
        Domain::new(1, box_input(6, 10, 8.0), &ParticleSpec::default()).unwrap()
    }

    #[test]
    fn test_neutral_column_full_mixing() {
        // 均温水柱 Ri=0，垂向系数取基值
        let mut dom = make_domain();
        update_vertical(&mut dom);
        let nu = kinematic_viscosity(20.0);
        let k = 4;
        assert!((dom.dmz[(3, k)] - (nu + dom.turbulence.dmz0)).abs() < 1e-9);
    }

    #[test]
    fn test_stable_stratification_suppresses_mixing() {
        let mut dom = make_domain();
        // 上暖下冷 → 稳定分层
        for i in 0..dom.t.ni() {
            for k in 0..dom.t.nk() {
                dom.t[(i, k)] = 5.0 + 2.0 * k as Scalar;
            }
        }
        density::update_density(&mut dom);
        update_vertical(&mut dom);
        let neutral = dom.turbulence.dmz0 + kinematic_viscosity(13.0);
        // 静止剪切 → Ri 封顶 → 扩散被强烈抑制
        assert!(dom.dmz[(3, 4)] < neutral * 0.1);
    }

    #[test]
    fn test_unstable_stratification_forces_dmix() {
        let mut dom = make_domain();
        // 上冷下暖（夜间冷却型）→ 不稳定
        for i in 0..dom.t.ni() {
            for k in 0..dom.t.nk() {
                dom.t[(i, k)] = 25.0 - 1.5 * k as Scalar;
            }
        }
        density::update_density(&mut dom);
        update_vertical(&mut dom);
        assert!((dom.dhz[(3, 4)] - dom.turbulence.dmix).abs() < 1e-15);
        assert!((dom.dcz[(3, 4)] - dom.turbulence.dmix).abs() < 1e-15);
    }

    #[test]
    fn test_boundary_faces_inherit() {
        let mut dom = make_domain();
        update_vertical(&mut dom);
        let kb = dom.mesh.kc_bot[3];
        let ks = dom.mesh.k_srf;
        assert!((dom.dmz[(3, kb - 1)] - dom.dmz[(3, kb)]).abs() < 1e-15);
        assert!((dom.dmz[(3, ks)] - dom.dmz[(3, ks - 1)]).abs() < 1e-15);
    }
}
