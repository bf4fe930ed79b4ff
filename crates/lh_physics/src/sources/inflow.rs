// crates/lh_physics/src/sources/inflow.rs

//! 上游入流口分配
//!
//! 三种模式：
//! - EDI：等密度高程定位 + 高斯剖面（下限高程 z_in_low）
//! - RID：中点水深定位，剖面覆盖平均水深
//! - RI1：单层密度选择；表层偏薄时与下层对半分

use super::profile;
use crate::density::turbid_density;
use crate::domain::Domain;
use lh_config::InflowMode;
use lh_foundation::{LhResult, Scalar};

/// 入流注入的目标列（上游端第一列）
const INLET_COLUMN: usize = 1;

/// 表层偏薄判据：dz_srf/dz0 低于该值时 RI1 对半分到下层
const THIN_SURFACE_RATIO: Scalar = 0.7;

/// 应用入流口源项
pub fn apply_inlet(dom: &mut Domain, time_day: Scalar, mode: InflowMode) -> LhResult<()> {
    let Some(inlet) = dom.inlet.as_mut() else {
        return Ok(());
    };
    let row = {
        let cursor = &mut inlet.cursor;
        inlet.series.sample(time_day, cursor)?
    };
    let (froude, width, angle, z_in_low) = {
        let inlet = dom.inlet.as_ref().unwrap();
        (inlet.froude, inlet.width, inlet.angle, inlet.z_in_low)
    };

    let q = row[0];
    if q <= 0.0 {
        return Ok(());
    }
    let t_in = row.get(1).copied().unwrap_or(0.0);
    let nps = dom.nps();
    let c_in: Vec<Scalar> = (0..nps)
        .map(|l| row.get(2 + l).copied().unwrap_or(0.0))
        .collect();

    let kb = dom.mesh.kc_bot[INLET_COLUMN];
    let k_srf = dom.mesh.k_srf;
    let c_total: Scalar = c_in.iter().sum();
    let rho_in = turbid_density(t_in, c_total, dom.particles.rho_ss);

    match mode {
        InflowMode::Edi => {
            let kc = profile::locate_by_density(dom, rho_in, kb)?;
            let z_src = dom.mesh.zc(kc).max(z_in_low);
            let delta = profile::froude_thickness(dom, q, froude, width, kc);
            let au = &dom.mesh.au;
            let weights = profile::gaussian_weights(dom, &|k| au[(0, k)], z_src, delta, kb, kc);
            super::inject_distributed(dom, INLET_COLUMN, q, t_in, &c_in, &weights, angle, width);
        }
        InflowMode::Rid => {
            // 河川入流：中点水深，剖面铺满平均水深
            let z_src = 0.5 * (dom.mesh.z_srf + dom.mesh.z_bed[0]);
            let kc = profile::locate_by_elevation(dom, z_src, kb);
            let depth = (dom.mesh.z_srf - dom.mesh.z_bed[0]).max(2.0 * dom.mesh.dz0[kc]);
            let au = &dom.mesh.au;
            let weights = profile::gaussian_weights(dom, &|k| au[(0, k)], z_src, depth, kb, kc);
            super::inject_distributed(dom, INLET_COLUMN, q, t_in, &c_in, &weights, angle, width);
        }
        InflowMode::Ri1 => {
            let kc = profile::locate_by_density(dom, rho_in, kb)?;
            let mut weights = vec![0.0; dom.mesh.nz + 1];
            let thin_surface = kc == k_srf
                && dom.mesh.dz_srf / dom.mesh.dz0[k_srf] < THIN_SURFACE_RATIO
                && k_srf > kb;
            if thin_surface {
                weights[k_srf] = 0.5;
                weights[k_srf - 1] = 0.5;
            } else {
                weights[kc] = 1.0;
            }
            super::inject_distributed(dom, INLET_COLUMN, q, t_in, &c_in, &weights, angle, width);
        }
    }

    dom.src.q_inlet += q;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density;
    use crate::domain::test_support::box_input;
    use crate::forcing::ScheduleSeries;
    use lh_config::ParticleSpec;

    fn inlet_domain(q: Scalar, t_in: Scalar) -> Domain {
        let mut input = box_input(10, 20, 15.0);
        input.config.inlet = Some(
            serde_json::from_str(r#"{ "schedule": { "constant": [0.0] }, "width": 40.0 }"#)
                .unwrap(),
        );
        input.inlet_series = Some(ScheduleSeries::constant(vec![q, t_in]));
        Domain::new(1, input, &ParticleSpec::default()).unwrap()
    }

    fn stratify(dom: &mut Domain) {
        for i in 0..dom.t.ni() {
            for k in 0..dom.t.nk() {
                dom.t[(i, k)] = 6.0 + 0.9 * k as Scalar;
            }
        }
        density::update_density(dom);
        density::update_column_avg_density(dom);
    }

    #[test]
    fn test_edi_targets_matching_density() {
        let mut dom = inlet_domain(2.0, 10.0);
        stratify(&mut dom);
        apply_inlet(&mut dom, 0.0, InflowMode::Edi).unwrap();

        // 冷水入流峰值应在水柱下部
        let peak_k = (1..=dom.mesh.nz)
            .max_by(|&a, &b| {
                dom.src.q_src[(1, a)]
                    .partial_cmp(&dom.src.q_src[(1, b)])
                    .unwrap()
            })
            .unwrap();
        let rho_in = density::water_density(10.0);
        let kc = profile::locate_by_density(&dom, rho_in, 1).unwrap();
        assert!((peak_k as isize - kc as isize).abs() <= 1);
    }

    #[test]
    fn test_ri1_single_layer() {
        let mut dom = inlet_domain(3.0, 10.0);
        stratify(&mut dom);
        apply_inlet(&mut dom, 0.0, InflowMode::Ri1).unwrap();
        let active: Vec<usize> = (1..=dom.mesh.nz)
            .filter(|&k| dom.src.q_src[(1, k)] > 0.0)
            .collect();
        assert_eq!(active.len(), 1);
        assert!((dom.src.q_src[(1, active[0])] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ri1_thin_surface_split() {
        let mut input = box_input(10, 20, 14.3); // dz_srf = 0.3 < 0.7·dz0
        input.config.inlet = Some(
            serde_json::from_str(r#"{ "schedule": { "constant": [0.0] }, "width": 40.0 }"#)
                .unwrap(),
        );
        input.inlet_series = Some(ScheduleSeries::constant(vec![2.0, 25.0]));
        let mut dom = Domain::new(1, input, &ParticleSpec::default()).unwrap();
        // 暖水（轻）→ 表层，表层偏薄 → 对半分
        apply_inlet(&mut dom, 0.0, InflowMode::Ri1).unwrap();
        let ks = dom.mesh.k_srf;
        assert!((dom.src.q_src[(1, ks)] - 1.0).abs() < 1e-12);
        assert!((dom.src.q_src[(1, ks - 1)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rid_spans_depth() {
        let mut dom = inlet_domain(10.0, 20.0);
        apply_inlet(&mut dom, 0.0, InflowMode::Rid).unwrap();
        let active = (1..=dom.mesh.nz)
            .filter(|&k| dom.src.q_src[(1, k)] > 0.0)
            .count();
        // 中点水深高斯应覆盖多层
        assert!(active >= 3);
    }

    #[test]
    fn test_zero_flow_is_noop() {
        let mut dom = inlet_domain(0.0, 20.0);
        apply_inlet(&mut dom, 0.0, InflowMode::Edi).unwrap();
        assert_eq!(dom.src.q_inlet, 0.0);
        assert!(dom.src.q_src.as_slice().iter().all(|&v| v == 0.0));
    }
}
