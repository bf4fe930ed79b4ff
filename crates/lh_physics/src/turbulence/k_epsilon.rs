// crates/lh_physics/src/turbulence/k_epsilon.rs

//! k-ε 两方程闭合
//!
//! 每列独立推进 k 与 ε：
//!
//! ```text
//! dk/dt = P_k − B_k − ε + ∂/∂z[(ν_t/σ_k)·∂k/∂z]
//! dε/dt = c₁·(ε/k)·P_k − c₂·ε²/k + ∂/∂z[(ν_t/σ_ε)·∂ε/∂z]
//! ```
//!
//! 表面边界为风应力摩阻流速，底面为二次摩擦律；垂向扩散可显式
//! 迎风推进或逐列半隐式三对角推进（σ_k=1, σ_ε=1.3）。推进后
//! k ∈ [1.25e-7, 10]、ε ≥ 1e-9，ν_t = min(0.09·k²/max(ε,1e-9), 0.2)。
//! 面上系数取算术平均后 dmz ∈ [1.4e-6, 0.2]，dhz = max(1.4e-7,
//! 0.14·dmz)，dcz = dhz。freeslip 时底面与水面面系数置零。
//!
//! k ≤ 0 或 NaN 属可恢复异常：复位到下限值并继续（只告警一次）。

use super::{
    du_dz, C_1, C_2, C_MU, DHZ_MIN, DMZ_MIN, EPS_MIN, KAPPA, NUT_MAX, SIGMA_EPS, SIGMA_K,
    TKE_MAX, TKE_MIN, Z0,
};
use crate::domain::Domain;
use crate::numerics::solve_tridiagonal;
use lh_foundation::{Scalar, GRAVITY, RHO_WATER};
use tracing::warn;

/// 空气密度 [kg/m³]
const RHO_AIR: Scalar = 1.2;

/// 风拖曳系数（Wu 1982，风速分段）
#[inline]
fn wind_drag_coefficient(wind: Scalar) -> Scalar {
    if wind < 7.5 {
        1.2875e-3
    } else {
        (0.8 + 0.065 * wind) * 1.0e-3
    }
}

/// 更新垂向涡扩散系数（k-ε 模式）
pub fn update_vertical(dom: &mut Domain, dt: Scalar, wind: Scalar) {
    let nx = dom.mesh.nx;
    let k_srf = dom.mesh.k_srf;
    let semi_implicit = dom.turbulence.semi_implicit;
    let freeslip = dom.turbulence.freeslip;

    let mut scratch = Vec::new();
    let mut diag_a = Vec::new();
    let mut diag_b = Vec::new();
    let mut diag_c = Vec::new();
    let mut rhs = Vec::new();

    for i in 1..=nx {
        let kb = dom.mesh.kc_bot[i];
        if kb >= k_srf {
            // 单层水柱：边界值即单元值
            let (tke_s, eps_s) = surface_boundary(dom, wind, k_srf);
            dom.tke[(i, k_srf)] = tke_s.clamp(TKE_MIN, TKE_MAX);
            dom.td_eps[(i, k_srf)] = eps_s.max(EPS_MIN);
            update_nut_column(dom, i, kb, k_srf);
            set_face_coefficients(dom, i, kb, k_srf, freeslip);
            continue;
        }

        let n = k_srf - kb + 1;

        // 边界值
        let (tke_srf, eps_srf) = surface_boundary(dom, wind, k_srf);
        let (tke_bot, eps_bot) = bottom_boundary(dom, i, kb);

        // 单元中心的产生与浮力项
        let mut pk = vec![0.0; n];
        let mut bk = vec![0.0; n];
        for (j, k) in (kb..=k_srf).enumerate() {
            let s_lo = if k > kb { du_dz(dom, i, k - 1) } else { 0.0 };
            let s_hi = if k < k_srf { du_dz(dom, i, k) } else { 0.0 };
            let dmz_lo = dom.dmz[(i, k - 1)];
            let dmz_hi = dom.dmz[(i, k)];
            pk[j] = 0.5 * (dmz_lo * s_lo * s_lo + dmz_hi * s_hi * s_hi);
            if k > kb {
                let dz = dom.mesh.dz[k].max(1e-10);
                bk[j] = (dmz_lo * GRAVITY * (dom.rho[(i, k - 1)] - dom.rho[(i, k)])
                    / (RHO_WATER * dz))
                    .max(0.0);
            }
        }

        // k 方程
        step_column(
            dom,
            i,
            kb,
            k_srf,
            dt,
            semi_implicit,
            SIGMA_K,
            Tracked::Tke,
            &pk,
            &bk,
            tke_bot,
            tke_srf,
            &mut diag_a,
            &mut diag_b,
            &mut diag_c,
            &mut rhs,
            &mut scratch,
        );

        // ε 方程
        step_column(
            dom,
            i,
            kb,
            k_srf,
            dt,
            semi_implicit,
            SIGMA_EPS,
            Tracked::Eps,
            &pk,
            &bk,
            eps_bot,
            eps_srf,
            &mut diag_a,
            &mut diag_b,
            &mut diag_c,
            &mut rhs,
            &mut scratch,
        );

        // 钳制与异常复位
        for k in kb..=k_srf {
            let tke = dom.tke[(i, k)];
            let eps = dom.td_eps[(i, k)];
            if !tke.is_finite() || tke <= 0.0 || !eps.is_finite() {
                if !dom.anomaly_warned {
                    warn!(
                        domain = dom.id,
                        i, k, "湍流量出现非正/非有限值，复位到下限并继续"
                    );
                    dom.anomaly_warned = true;
                }
                dom.tke[(i, k)] = TKE_MIN;
                dom.td_eps[(i, k)] = EPS_MIN;
            } else {
                dom.tke[(i, k)] = tke.clamp(TKE_MIN, TKE_MAX);
                dom.td_eps[(i, k)] = eps.max(EPS_MIN);
            }
        }

        update_nut_column(dom, i, kb, k_srf);
        set_face_coefficients(dom, i, kb, k_srf, freeslip);
    }
}

/// 被推进的量
#[derive(Clone, Copy, PartialEq)]
enum Tracked {
    Tke,
    Eps,
}

/// 单列推进（显式或半隐式）
#[allow(clippy::too_many_arguments)]
fn step_column(
    dom: &mut Domain,
    i: usize,
    kb: usize,
    k_srf: usize,
    dt: Scalar,
    semi_implicit: bool,
    sigma: Scalar,
    which: Tracked,
    pk: &[Scalar],
    bk: &[Scalar],
    bc_bot: Scalar,
    bc_srf: Scalar,
    diag_a: &mut Vec<Scalar>,
    diag_b: &mut Vec<Scalar>,
    diag_c: &mut Vec<Scalar>,
    rhs: &mut Vec<Scalar>,
    scratch: &mut Vec<Scalar>,
) {
    let n = k_srf - kb + 1;
    rhs.clear();
    rhs.resize(n, 0.0);

    let value = |dom: &Domain, k: usize| match which {
        Tracked::Tke => dom.tke[(i, k)],
        Tracked::Eps => dom.td_eps[(i, k)],
    };

    // 源项 + 显式迎风垂向输运
    for (j, k) in (kb..=k_srf).enumerate() {
        let v = value(dom, k);
        let tke = dom.tke[(i, k)].max(TKE_MIN);
        let eps = dom.td_eps[(i, k)].max(EPS_MIN);
        let source = match which {
            Tracked::Tke => pk[j] - bk[j] - eps,
            Tracked::Eps => {
                let ratio = eps / tke;
                C_1 * ratio * pk[j] - C_2 * eps * ratio
            }
        };

        // w 迎风对流
        let dz = dom.mesh.dz[k].max(1e-10);
        let mut advect = 0.0;
        if k > kb {
            let w_lo = dom.w[(i, k - 1)];
            let upwind = if w_lo >= 0.0 { value(dom, k - 1) } else { v };
            advect += w_lo * upwind / dz;
        }
        if k < k_srf {
            let w_hi = dom.w[(i, k)];
            let upwind = if w_hi >= 0.0 { v } else { value(dom, k + 1) };
            advect -= w_hi * upwind / dz;
        }

        rhs[j] = v + dt * (source + advect);
    }

    if semi_implicit {
        // 隐式垂向扩散：三对角系统
        diag_a.clear();
        diag_b.clear();
        diag_c.clear();
        diag_a.resize(n, 0.0);
        diag_b.resize(n, 1.0);
        diag_c.resize(n, 0.0);
        for (j, k) in (kb..=k_srf).enumerate() {
            if j == 0 || j == n - 1 {
                continue;
            }
            let dz = dom.mesh.dz[k].max(1e-10);
            let d_lo = dom.dmz[(i, k - 1)] / sigma / dom.mesh.dzs[k - 1].max(1e-10);
            let d_hi = dom.dmz[(i, k)] / sigma / dom.mesh.dzs[k].max(1e-10);
            diag_a[j] = -dt * d_lo / dz;
            diag_c[j] = -dt * d_hi / dz;
            diag_b[j] = 1.0 + dt * (d_lo + d_hi) / dz;
        }
        // 边界单元固定为壁面/表面值
        rhs[0] = bc_bot;
        rhs[n - 1] = bc_srf;
        if !solve_tridiagonal(diag_a, diag_b, diag_c, rhs, scratch) {
            // 退化系统：保留显式右端
        }
    } else {
        // 显式扩散
        let mut explicit = rhs.clone();
        for (j, k) in (kb..=k_srf).enumerate() {
            if j == 0 {
                explicit[j] = bc_bot;
                continue;
            }
            if j == n - 1 {
                explicit[j] = bc_srf;
                continue;
            }
            let dz = dom.mesh.dz[k].max(1e-10);
            let d_lo = dom.dmz[(i, k - 1)] / sigma / dom.mesh.dzs[k - 1].max(1e-10);
            let d_hi = dom.dmz[(i, k)] / sigma / dom.mesh.dzs[k].max(1e-10);
            let v = value(dom, k);
            let flux = d_hi * (value(dom, k + 1) - v) - d_lo * (v - value(dom, k - 1));
            explicit[j] += dt * flux / dz;
        }
        rhs.copy_from_slice(&explicit);
    }

    for (j, k) in (kb..=k_srf).enumerate() {
        match which {
            Tracked::Tke => dom.tke[(i, k)] = rhs[j],
            Tracked::Eps => dom.td_eps[(i, k)] = rhs[j],
        }
    }
}

/// 表面边界值（风应力摩阻）
fn surface_boundary(dom: &Domain, wind: Scalar, k_srf: usize) -> (Scalar, Scalar) {
    let cd = wind_drag_coefficient(wind);
    let u_star_sq = cd * (RHO_AIR / RHO_WATER) * wind * wind;
    let tke = (u_star_sq / C_MU.sqrt()).max(TKE_MIN);
    let depth = 0.5 * dom.mesh.dz[k_srf].max(1e-6) + Z0;
    let eps = (u_star_sq.powf(1.5) / (KAPPA * depth)).max(EPS_MIN);
    (tke, eps)
}

/// 底面边界值（二次摩擦律）
fn bottom_boundary(dom: &Domain, i: usize, kb: usize) -> (Scalar, Scalar) {
    // 底层单元平均流速（取域内 u 场）
    let u_bot = 0.5 * (dom.u[(i - 1, kb)] + dom.u[(i, kb)]);
    let half_dz = 0.5 * dom.mesh.dz[kb].max(1e-6);
    let log_arg = (half_dz / Z0).max(1.1);
    let cb = (KAPPA / log_arg.ln()).powi(2);
    let u_star_sq = cb * u_bot * u_bot;
    let tke = (u_star_sq / C_MU.sqrt()).max(TKE_MIN);
    let eps = (u_star_sq.powf(1.5) / (KAPPA * (half_dz + Z0))).max(EPS_MIN);
    (tke, eps)
}

/// 单列涡粘性更新
fn update_nut_column(dom: &mut Domain, i: usize, kb: usize, k_srf: usize) {
    for k in kb..=k_srf {
        let tke = dom.tke[(i, k)];
        let eps = dom.td_eps[(i, k)].max(EPS_MIN);
        dom.nut[(i, k)] = (C_MU * tke * tke / eps).min(NUT_MAX);
    }
}

/// 面上系数：算术平均 + 钳制
fn set_face_coefficients(dom: &mut Domain, i: usize, kb: usize, k_srf: usize, freeslip: bool) {
    for k in kb..k_srf {
        let nut_face = 0.5 * (dom.nut[(i, k)] + dom.nut[(i, k + 1)]);
        let dmz = nut_face.clamp(DMZ_MIN, NUT_MAX);
        dom.dmz[(i, k)] = dmz;
        let dhz = (0.14 * dmz).max(DHZ_MIN);
        dom.dhz[(i, k)] = dhz;
        dom.dcz[(i, k)] = dhz;
    }
    // 底面与水面
    let (bot, srf) = (kb - 1, k_srf);
    if freeslip {
        dom.dmz[(i, bot)] = 0.0;
        dom.dhz[(i, bot)] = 0.0;
        dom.dcz[(i, bot)] = 0.0;
        dom.dmz[(i, srf)] = 0.0;
        dom.dhz[(i, srf)] = 0.0;
        dom.dcz[(i, srf)] = 0.0;
    } else {
        let dmz_b = dom.nut[(i, kb)].clamp(DMZ_MIN, NUT_MAX);
        dom.dmz[(i, bot)] = dmz_b;
        dom.dhz[(i, bot)] = (0.14 * dmz_b).max(DHZ_MIN);
        dom.dcz[(i, bot)] = dom.dhz[(i, bot)];
        let dmz_s = dom.nut[(i, k_srf)].clamp(DMZ_MIN, NUT_MAX);
        dom.dmz[(i, srf)] = dmz_s;
        dom.dhz[(i, srf)] = (0.14 * dmz_s).max(DHZ_MIN);
        dom.dcz[(i, srf)] = dom.dhz[(i, srf)];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::box_input;
    use lh_config::{ParticleSpec, TurbulenceMode};

    fn keps_domain(semi_implicit: bool) -> Domain {
        let mut input = box_input(6, 10, 8.0);
        input.config.turbulence.mode = TurbulenceMode::KEpsilon;
        input.config.turbulence.semi_implicit = semi_implicit;
        Domain::new(1, input, &ParticleSpec::default()).unwrap()
    }

    #[test]
    fn test_drag_coefficient_piecewise() {
        assert!((wind_drag_coefficient(3.0) - 1.2875e-3).abs() < 1e-12);
        let cd_10 = wind_drag_coefficient(10.0);
        assert!((cd_10 - 1.45e-3).abs() < 1e-6);
        // 连续性检查点附近
        assert!(wind_drag_coefficient(7.5) > wind_drag_coefficient(7.49));
    }

    #[test]
    fn test_still_water_stays_clamped() {
        let mut dom = keps_domain(true);
        update_vertical(&mut dom, 60.0, 0.0);
        for k in 1..=dom.mesh.k_srf {
            let tke = dom.tke[(3, k)];
            assert!((TKE_MIN..=TKE_MAX).contains(&tke));
            assert!(dom.td_eps[(3, k)] >= EPS_MIN);
        }
    }

    #[test]
    fn test_wind_raises_surface_tke() {
        let mut calm = keps_domain(true);
        let mut windy = keps_domain(true);
        update_vertical(&mut calm, 60.0, 0.0);
        update_vertical(&mut windy, 60.0, 12.0);
        let ks = calm.mesh.k_srf;
        assert!(windy.tke[(3, ks)] > calm.tke[(3, ks)]);
    }

    #[test]
    fn test_face_coefficient_bounds() {
        let mut dom = keps_domain(true);
        update_vertical(&mut dom, 60.0, 8.0);
        for k in dom.mesh.kc_bot[3] - 1..=dom.mesh.k_srf {
            assert!(dom.dmz[(3, k)] <= NUT_MAX + 1e-15);
            assert!(dom.dmz[(3, k)] >= DMZ_MIN - 1e-18);
            assert!((dom.dcz[(3, k)] - dom.dhz[(3, k)]).abs() < 1e-18);
        }
    }

    #[test]
    fn test_freeslip_zeroes_boundary_faces() {
        let mut input = box_input(6, 10, 8.0);
        input.config.turbulence.mode = TurbulenceMode::KEpsilon;
        input.config.turbulence.freeslip = true;
        let mut dom = Domain::new(1, input, &ParticleSpec::default()).unwrap();
        update_vertical(&mut dom, 60.0, 8.0);
        let kb = dom.mesh.kc_bot[3];
        let ks = dom.mesh.k_srf;
        assert_eq!(dom.dmz[(3, kb - 1)], 0.0);
        assert_eq!(dom.dmz[(3, ks)], 0.0);
        assert_eq!(dom.dhz[(3, ks)], 0.0);
    }

    #[test]
    fn test_anomaly_reset_recovers() {
        let mut dom = keps_domain(false);
        dom.tke[(3, 5)] = Scalar::NAN;
        update_vertical(&mut dom, 60.0, 5.0);
        assert!(dom.tke[(3, 5)].is_finite());
        assert!(dom.tke[(3, 5)] >= TKE_MIN);
        assert!(dom.anomaly_warned);
    }

    #[test]
    fn test_explicit_and_implicit_agree_roughly() {
        let mut dom_e = keps_domain(false);
        let mut dom_i = keps_domain(true);
        // 同样的小步长下两种推进应接近
        for _ in 0..5 {
            update_vertical(&mut dom_e, 1.0, 6.0);
            update_vertical(&mut dom_i, 1.0, 6.0);
        }
        let ks = dom_e.mesh.k_srf;
        let ratio = dom_e.tke[(3, ks - 1)] / dom_i.tke[(3, ks - 1)];
        assert!(ratio > 0.5 && ratio < 2.0);
    }
}
