// crates/lh_physics/src/sources/outflow.rs

//! 出水口分配
//!
//! 全出流量按各口份额拆分后逐口分配到东端面：
//! - NDO：取水口高程正态剖面，轴对称 Froude 厚度（体积立方根）
//! - EDO：闸门高度内面积等权分配，顶底裁剪
//! - DDD：密度依存双侧射流，密度频率厚度 HSW 定上下缘
//!
//! 无出水口（n_out = 0）时东端开放：直接把 i = nx−1 列的流量
//! 作为东端面出流，并把流速与标量复制进幽灵列。

use super::profile;
use crate::domain::Domain;
use lh_config::OutflowMode;
use lh_foundation::{LhResult, Scalar, GRAVITY};

/// DDD 近表层放大系数
const OUTCOEF: Scalar = 2.0;

/// 应用出水口（或开放东端）
pub fn apply_outlets(dom: &mut Domain, time_day: Scalar, mode: OutflowMode) -> LhResult<()> {
    if dom.outlets.is_empty() {
        apply_open_east(dom);
        return Ok(());
    }

    let q_total = match dom.outflow_series.as_ref() {
        Some(series) => {
            let cursor = &mut dom.outflow_cursor;
            series.sample(time_day, cursor)?[0]
        }
        None => 0.0,
    };
    if q_total <= 0.0 {
        return Ok(());
    }

    let nx = dom.mesh.nx;
    let kb = dom.mesh.kc_bot[nx];
    let k_srf = dom.mesh.k_srf;

    for oi in 0..dom.outlets.len() {
        let outlet = dom.outlets[oi].clone();
        let q_out = q_total * outlet.share;
        if q_out <= 0.0 {
            continue;
        }

        let weights = match mode {
            OutflowMode::Ndo => {
                let kc = profile::locate_by_elevation(dom, outlet.z_out, kb);
                let delta = profile::froude_thickness_axisymmetric(dom, q_out, outlet.froude, kc);
                let au = &dom.mesh.au;
                profile::gaussian_weights(dom, &|k| au[(nx, k)], outlet.z_out, delta, kb, kc)
            }
            OutflowMode::Edo => equal_gate_weights(dom, &outlet),
            OutflowMode::Ddd => density_jet_weights(dom, &outlet, q_out),
        };

        for k in kb..=k_srf {
            dom.src.q_east[k] += q_out * weights[k];
        }
        dom.src.q_out += q_out;
    }
    Ok(())
}

/// 东端开放：流速与标量复制进幽灵列
///
/// 开放东端的出流量不在这里猜测：耦合器在列流量步把自然列
/// 流量（东邻列的延拓）按面积分配到 `q_east`，闭库时恰为零。
fn apply_open_east(dom: &mut Domain) {
    dom.apply_open_east_boundary();
}

/// EDO：闸门区间内按面积等权
fn equal_gate_weights(dom: &Domain, outlet: &crate::domain::Outlet) -> Vec<Scalar> {
    let nx = dom.mesh.nx;
    let kb = dom.mesh.kc_bot[nx];
    let k_srf = dom.mesh.k_srf;
    let half = 0.5 * outlet.gate_height.max(1e-6);
    // 顶底裁剪
    let z_lo = (outlet.z_out - half).max(dom.mesh.z_bed[nx]);
    let z_hi = (outlet.z_out + half).min(dom.mesh.z_srf);

    let mut weights = vec![0.0; dom.mesh.nz + 1];
    let mut sum = 0.0;
    for (k, wk) in weights.iter_mut().enumerate().take(k_srf + 1).skip(kb) {
        let zc = dom.mesh.zc(k);
        if zc >= z_lo && zc <= z_hi {
            *wk = dom.mesh.au[(nx, k)].max(0.0);
            sum += *wk;
        }
    }
    if sum > 0.0 {
        for wk in &mut weights {
            *wk /= sum;
        }
    } else {
        let kc = profile::locate_by_elevation(dom, outlet.z_out, kb);
        weights[kc] = 1.0;
    }
    weights
}

/// DDD：密度依存双侧射流
///
/// 密度频率厚度 HSW = (OUTCOEF·Q/N)^(1/3)，N = sqrt(ε·g)；
/// KTOP/KBOT 由 z_out ± HSW（或用户强制高程）决定，权重
/// f(k) = 1 − ((ρ_avg(kc) − ρ_avg(k))/ΔρMax)²，裁剪 [0,1]，按 au 加权。
fn density_jet_weights(
    dom: &Domain,
    outlet: &crate::domain::Outlet,
    q_out: Scalar,
) -> Vec<Scalar> {
    let nx = dom.mesh.nx;
    let kb = dom.mesh.kc_bot[nx];
    let k_srf = dom.mesh.k_srf;
    let kc = profile::locate_by_elevation(dom, outlet.z_out, kb);

    // 近表层取水放大
    let coef = if dom.mesh.z_srf.abs() > 1e-10 && outlet.z_out / dom.mesh.z_srf > 0.9 {
        OUTCOEF
    } else {
        1.0
    };
    let eps = profile::density_gradient_eps(dom, kc);
    let n_freq = (eps * GRAVITY).sqrt().max(1e-6);
    let hsw = (coef * q_out / n_freq).powf(1.0 / 3.0);

    let k_top = match outlet.z_top_override {
        Some(z) => profile::locate_by_elevation(dom, z, kb),
        None => profile::locate_by_elevation(dom, outlet.z_out + hsw, kb),
    };
    let k_bot = match outlet.z_bot_override {
        Some(z) => profile::locate_by_elevation(dom, z, kb),
        None => profile::locate_by_elevation(dom, outlet.z_out - hsw, kb),
    };
    let (k_bot, k_top) = (k_bot.min(k_top), k_top.max(k_bot));

    // 区间内最大密度差
    let mut drho_max: Scalar = 1e-10;
    for k in k_bot..=k_top {
        drho_max = drho_max.max((dom.rho_avg[kc] - dom.rho_avg[k]).abs());
    }

    let mut weights = vec![0.0; dom.mesh.nz + 1];
    let mut sum = 0.0;
    for (k, wk) in weights.iter_mut().enumerate().take(k_top + 1).skip(k_bot) {
        let ratio = (dom.rho_avg[kc] - dom.rho_avg[k]) / drho_max;
        let f = (1.0 - ratio * ratio).clamp(0.0, 1.0);
        *wk = f * dom.mesh.au[(nx, k)].max(0.0);
        sum += *wk;
    }
    if sum > 0.0 {
        for wk in &mut weights {
            *wk /= sum;
        }
    } else {
        weights[kc] = 1.0;
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density;
    use crate::domain::test_support::box_input;
    use crate::forcing::ScheduleSeries;
    use lh_config::ParticleSpec;

    fn outlet_domain(mode_cfg: &str) -> Domain {
        let mut input = box_input(10, 20, 15.0);
        input.config.outlets = vec![serde_json::from_str(mode_cfg).unwrap()];
        input.config.outflow_schedule =
            Some(serde_json::from_str(r#"{ "constant": [4.0] }"#).unwrap());
        input.outflow_series = Some(ScheduleSeries::constant(vec![4.0]));
        let mut dom = Domain::new(1, input, &ParticleSpec::default()).unwrap();
        for i in 0..dom.t.ni() {
            for k in 0..dom.t.nk() {
                dom.t[(i, k)] = 6.0 + 0.9 * k as Scalar;
            }
        }
        density::update_density(&mut dom);
        density::update_column_avg_density(&mut dom);
        dom
    }

    #[test]
    fn test_ndo_integrates_to_q() {
        let mut dom = outlet_domain(r#"{ "z_out": 8.0, "gate_height": 2.0 }"#);
        apply_outlets(&mut dom, 0.0, OutflowMode::Ndo).unwrap();
        let sum: Scalar = dom.src.q_east.iter().sum();
        assert!((sum - 4.0).abs() < 1e-10);
        assert!((dom.src.q_out - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_edo_respects_gate() {
        let mut dom = outlet_domain(r#"{ "z_out": 8.0, "gate_height": 4.0 }"#);
        apply_outlets(&mut dom, 0.0, OutflowMode::Edo).unwrap();
        // 闸门区间 [6, 10] 之外无出流
        for k in 1..=dom.mesh.nz {
            let zc = dom.mesh.zc(k);
            if (zc < 6.0 || zc > 10.0) && dom.src.q_east[k] > 0.0 {
                panic!("闸门外出流: k={} zc={}", k, zc);
            }
        }
        let sum: Scalar = dom.src.q_east.iter().sum();
        assert!((sum - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_ddd_peak_at_outlet_density() {
        let mut dom = outlet_domain(r#"{ "z_out": 8.0, "gate_height": 2.0 }"#);
        apply_outlets(&mut dom, 0.0, OutflowMode::Ddd).unwrap();
        let sum: Scalar = dom.src.q_east.iter().sum();
        assert!((sum - 4.0).abs() < 1e-10);
        // 峰值位于取水口层附近
        let peak = (1..=dom.mesh.nz)
            .max_by(|&a, &b| dom.src.q_east[a].partial_cmp(&dom.src.q_east[b]).unwrap())
            .unwrap();
        let kc = profile::locate_by_elevation(&dom, 8.0, 1);
        assert!((peak as isize - kc as isize).abs() <= 1);
    }

    #[test]
    fn test_ddd_override_span() {
        let mut dom = outlet_domain(
            r#"{ "z_out": 8.0, "gate_height": 2.0,
                 "z_top_override": 9.0, "z_bot_override": 7.0 }"#,
        );
        apply_outlets(&mut dom, 0.0, OutflowMode::Ddd).unwrap();
        for k in 1..=dom.mesh.nz {
            if dom.src.q_east[k] > 0.0 {
                let zc = dom.mesh.zc(k);
                assert!((6.0..=10.0).contains(&zc), "强制区间外出流 k={}", k);
            }
        }
    }

    #[test]
    fn test_open_east_copies_neighbor() {
        let input = box_input(10, 20, 15.0);
        let mut dom = Domain::new(1, input, &ParticleSpec::default()).unwrap();
        // 设一个非零东向流场
        for k in 1..=dom.mesh.k_srf {
            dom.u[(dom.mesh.nx - 1, k)] = 0.1;
            dom.t[(dom.mesh.nx - 1, k)] = 13.0;
        }
        apply_outlets(&mut dom, 0.0, OutflowMode::Ndo).unwrap();
        let k = 5;
        // 开放东端：流速与标量复制进边界与幽灵列
        assert!((dom.u[(dom.mesh.nx, k)] - 0.1).abs() < 1e-12);
        assert!(
            (dom.t[(dom.mesh.nx + 1, k)] - dom.t[(dom.mesh.nx - 1, k)]).abs() < 1e-12
        );
        // 出流量留给耦合器的列流量步决定
        assert!(dom.src.q_east.iter().all(|&q| q == 0.0));
    }
}
