// crates/lh_physics/src/heat.rs

//! 热量积分器
//!
//! 水温走标量输运核心（扩散增幅 alpha_heat，无沉速），外加
//! 辐射强迫：
//! - 表层单元：水面净热通量 φ(T_srf)·A
//! - radiation 开启时：穿透短波按 Beer-Lambert 衰减逐层吸收，
//!   到床面的剩余辐射全部记入底层单元

use crate::density::{water_density, SPECIFIC_HEAT};
use crate::domain::Domain;
use crate::forcing::{penetrating_flux, surface_heat_flux, MeteoRecord};
use crate::transport::{advance_channel, ChannelSpec};
use lh_config::HeatOptions;
use lh_foundation::{Field2, Scalar};

/// 推进一个时间步
pub fn advance(dom: &mut Domain, dt: Scalar, opts: &HeatOptions, meteo: Option<&MeteoRecord>) {
    let extra = meteo.map(|m| radiation_forcing(dom, opts, m));
    let old = dom.t.clone();
    let spec = ChannelSpec {
        alpha: opts.alpha_heat,
        settling: 0.0,
        src_value: &dom.src.t_src,
        diff_x: &dom.dhx,
        diff_z: &dom.dhz,
        extra_rhs: extra.as_ref(),
    };
    let (new, _) = advance_channel(dom, dt, &old, &spec);
    dom.t = new;
    dom.mirror_ghost_bands();
}

/// 辐射与水面热交换的单元源 [°C·m³/s]
fn radiation_forcing(dom: &Domain, opts: &HeatOptions, meteo: &MeteoRecord) -> Field2 {
    let mesh = &dom.mesh;
    let nx = mesh.nx;
    let k_srf = mesh.k_srf;
    let mut extra = Field2::zeros(nx + 1, mesh.nz + 1);

    for i in 1..=nx {
        let kb = mesh.kc_bot[i];
        if kb > k_srf {
            continue;
        }
        // 水面净热通量
        let t_s = dom.t[(i, k_srf)];
        let rho_cp = water_density(t_s) * SPECIFIC_HEAT;
        let phi_srf = surface_heat_flux(t_s, meteo, opts);
        extra[(i, k_srf)] += phi_srf * mesh.aw[(i, k_srf)] / rho_cp;

        // 穿透短波：单元吸收 = 顶面入射 − 底面穿出；床面剩余全吸收
        if opts.radiation {
            for k in kb..=k_srf {
                let depth_top = (mesh.z_srf - mesh.z[k]).max(0.0);
                let phi_top = penetrating_flux(depth_top, meteo.solar, opts) * mesh.aw[(i, k)];
                let phi_bot = if k > kb {
                    let depth_bot = mesh.z_srf - mesh.z[k - 1];
                    penetrating_flux(depth_bot, meteo.solar, opts) * mesh.aw[(i, k - 1)]
                } else {
                    0.0
                };
                let rho_cp_k = water_density(dom.t[(i, k)]) * SPECIFIC_HEAT;
                extra[(i, k)] += (phi_top - phi_bot) / rho_cp_k;
            }
        }
    }
    extra
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::box_input;
    use crate::forcing::saturation_vapor_mmhg;
    use lh_config::ParticleSpec;

    fn still_domain() -> Domain {
        Domain::new(1, box_input(10, 20, 15.0), &ParticleSpec::default()).unwrap()
    }

    #[test]
    fn test_no_meteo_keeps_uniform() {
        let mut dom = still_domain();
        for _ in 0..20 {
            advance(&mut dom, 60.0, &HeatOptions::default(), None);
        }
        for i in 1..=dom.mesh.nx {
            for k in 1..=dom.mesh.k_srf {
                assert!((dom.t[(i, k)] - 20.0).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_solar_warms_surface_first() {
        let mut dom = still_domain();
        let meteo = MeteoRecord {
            solar: 800.0,
            t_air: 20.0,
            e_air: saturation_vapor_mmhg(20.0),
            wind: 0.0,
            cloud: 0.0,
        };
        let opts = HeatOptions {
            radiation: true,
            ..Default::default()
        };
        for _ in 0..30 {
            advance(&mut dom, 60.0, &opts, Some(&meteo));
        }
        let ks = dom.mesh.k_srf;
        // 表层升温快于底层
        let dt_srf = dom.t[(5, ks)] - 20.0;
        let dt_bot = dom.t[(5, 1)] - 20.0;
        assert!(dt_srf > dt_bot);
        assert!(dt_srf > 0.0);
    }

    #[test]
    fn test_radiation_energy_budget() {
        // 一步之内：全水柱吸收的辐射能 == 入射净辐射·表面积
        let mut dom = still_domain();
        let meteo = MeteoRecord {
            solar: 500.0,
            t_air: 20.0,
            e_air: saturation_vapor_mmhg(20.0),
            wind: 0.0,
            cloud: 0.0,
        };
        let opts = HeatOptions {
            radiation: true,
            ..Default::default()
        };
        let before: Scalar = column_heat(&dom, 5);
        let dt = 60.0;
        advance(&mut dom, dt, &opts, Some(&meteo));
        let after: Scalar = column_heat(&dom, 5);

        let rho_cp = water_density(20.0) * SPECIFIC_HEAT;
        let aw_srf = dom.mesh.aw[(5, dom.mesh.k_srf)];
        let phi_net = surface_heat_flux(20.0, &meteo, &opts)
            + penetrating_flux(0.0, 500.0, &opts);
        let expected = phi_net * aw_srf * dt / rho_cp;
        assert!(
            ((after - before) - expected).abs() < expected.abs() * 1e-6 + 1e-9,
            "ΔE={} expected={}",
            after - before,
            expected
        );
    }

    fn column_heat(dom: &Domain, i: usize) -> Scalar {
        let mut sum = 0.0;
        for k in dom.mesh.kc_bot[i]..=dom.mesh.k_srf {
            sum += dom.t[(i, k)] * dom.mesh.vol[(i, k)];
        }
        sum
    }
}
