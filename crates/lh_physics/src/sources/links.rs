// crates/lh_physics/src/sources/links.rs

//! 支流、汇流、水管与点源
//!
//! 全部复用密度选择高斯机制。跨域量（汇流来水、水管来水的
//! 温度/浓度）由耦合器在上一步单线程阶段写入各描述符的滞后
//! 字段，本模块构建时只读本域，保证跨域并行安全。
//!
//! 水管流量的时序由 id 较小的域持有读数；两侧各自采样同一时序，
//! id 较大的一侧取相反数，符号约定因此自动互补。

use super::profile;
use crate::density::turbid_density;
use crate::domain::Domain;
use lh_foundation::{LhResult, Scalar};

/// 支流入汇
pub fn apply_tributaries(dom: &mut Domain, time_day: Scalar) -> LhResult<()> {
    let nps = dom.nps();
    for ti in 0..dom.tributaries.len() {
        let row = {
            let trb = &mut dom.tributaries[ti];
            let cursor = &mut trb.cursor;
            trb.series.sample(time_day, cursor)?
        };
        let (i_cell, froude, width, angle) = {
            let trb = &dom.tributaries[ti];
            (trb.i_cell, trb.froude, trb.width, trb.angle)
        };
        let q = row[0];
        if q <= 0.0 {
            continue;
        }
        let t_in = row.get(1).copied().unwrap_or(0.0);
        let c_in: Vec<Scalar> = (0..nps)
            .map(|l| row.get(2 + l).copied().unwrap_or(0.0))
            .collect();

        inject_density_selective(dom, i_cell, q, t_in, &c_in, froude, width, angle)?;
        dom.src.q_trb += q;
    }
    Ok(())
}

/// 汇流（干流侧）：注入对端支汊上一步送来的流量
pub fn apply_confluences(dom: &mut Domain) -> LhResult<()> {
    for ci in 0..dom.confluences.len() {
        let (is_branch, i_cell, q, t_in, c_in) = {
            let cnf = &dom.confluences[ci];
            (
                cnf.is_branch,
                cnf.i_cell,
                cnf.q_last,
                cnf.t_last,
                cnf.c_last.clone(),
            )
        };
        if is_branch {
            // 支汊侧：上一步送往干流的流量计为负的汇流项，
            // 水量预算与干流侧的 +q_cnf 互补
            dom.src.q_cnf -= q;
            continue;
        }
        if q <= 0.0 {
            continue;
        }
        // 来水宽度取汇流单元的局地水面宽
        let width = local_surface_width(dom, i_cell);
        inject_density_selective(dom, i_cell, q, t_in, &c_in, 0.2, width, 0.0)?;
        dom.src.q_cnf += q;
    }
    Ok(())
}

/// 跨域水管
pub fn apply_pipes(dom: &mut Domain, time_day: Scalar) -> LhResult<()> {
    for pi in 0..dom.pipes.len() {
        let raw = {
            let pipe = &mut dom.pipes[pi];
            let cursor = &mut pipe.cursor;
            pipe.series.sample(time_day, cursor)?[0]
        };
        let (partner_id, i_cell, z_pos, aperture, froude, t_in, c_in) = {
            let pipe = &dom.pipes[pi];
            (
                pipe.partner_id,
                pipe.i_cell,
                pipe.z_pos,
                pipe.aperture,
                pipe.froude,
                pipe.t_last,
                pipe.c_last.clone(),
            )
        };
        // 正值 = 从小 id 域流向大 id 域
        let q = if dom.id < partner_id { -raw } else { raw };

        if q > 0.0 {
            // 来水：按管口高程密度选择注入
            let kb = dom.mesh.kc_bot[i_cell];
            let kc = profile::locate_by_elevation(dom, z_pos, kb);
            let delta = profile::froude_thickness(dom, q, froude, aperture, kc);
            let weights =
                profile::gaussian_weights(dom, &|_| 1.0, dom.mesh.zc(kc), delta, kb, kc);
            super::inject_distributed(dom, i_cell, q, t_in, &c_in, &weights, 0.0, aperture);
            dom.src.q_wtp += q;
        } else if q < 0.0 {
            // 出水：管口高程处取水
            let q_abs = -q;
            let kb = dom.mesh.kc_bot[i_cell];
            let kc = profile::locate_by_elevation(dom, z_pos, kb);
            let delta = profile::froude_thickness(dom, q_abs, froude, aperture, kc);
            let weights =
                profile::gaussian_weights(dom, &|_| 1.0, dom.mesh.zc(kc), delta, kb, kc);
            super::extract_distributed(dom, i_cell, q_abs, &weights);
            dom.src.q_wtp -= q_abs;
        }
    }
    Ok(())
}

/// 点状入流与点状取水
pub fn apply_point_sources(dom: &mut Domain, time_day: Scalar) -> LhResult<()> {
    let nps = dom.nps();
    for pi in 0..dom.point_inflows.len() {
        let row = {
            let pin = &mut dom.point_inflows[pi];
            let cursor = &mut pin.cursor;
            pin.series.sample(time_day, cursor)?
        };
        let (i_cell, z_pos, froude, width) = {
            let pin = &dom.point_inflows[pi];
            (pin.i_cell, pin.z_pos, pin.froude, pin.width)
        };
        let q = row[0];
        if q <= 0.0 {
            continue;
        }
        let t_in = row.get(1).copied().unwrap_or(0.0);
        let c_in: Vec<Scalar> = (0..nps)
            .map(|l| row.get(2 + l).copied().unwrap_or(0.0))
            .collect();

        let kb = dom.mesh.kc_bot[i_cell];
        let kc = profile::locate_by_elevation(dom, z_pos, kb);
        let delta = profile::froude_thickness(dom, q, froude, width, kc);
        let weights = profile::gaussian_weights(dom, &|_| 1.0, z_pos, delta, kb, kc);
        super::inject_distributed(dom, i_cell, q, t_in, &c_in, &weights, 0.0, width);
        dom.src.q_pin += q;
    }

    for po in 0..dom.point_outflows.len() {
        let q = {
            let pout = &mut dom.point_outflows[po];
            let cursor = &mut pout.cursor;
            pout.series.sample(time_day, cursor)?[0]
        };
        if q <= 0.0 {
            continue;
        }
        let (i_cell, z_pos, froude, aperture) = {
            let pout = &dom.point_outflows[po];
            (pout.i_cell, pout.z_pos, pout.froude, pout.aperture)
        };
        let kb = dom.mesh.kc_bot[i_cell];
        let kc = profile::locate_by_elevation(dom, z_pos, kb);
        let delta = profile::froude_thickness(dom, q, froude, aperture, kc);
        let weights = profile::gaussian_weights(dom, &|_| 1.0, z_pos, delta, kb, kc);
        super::extract_distributed(dom, i_cell, q, &weights);
        dom.src.q_pout += q;
    }
    Ok(())
}

/// 等密度高程定位的通用注入（支流/汇流共用）
#[allow(clippy::too_many_arguments)]
fn inject_density_selective(
    dom: &mut Domain,
    i_cell: usize,
    q: Scalar,
    t_in: Scalar,
    c_in: &[Scalar],
    froude: Scalar,
    width: Scalar,
    angle: Scalar,
) -> LhResult<()> {
    let c_total: Scalar = c_in.iter().sum();
    let rho_in = turbid_density(t_in, c_total, dom.particles.rho_ss);
    let kb = dom.mesh.kc_bot[i_cell];
    let kc = profile::locate_by_density(dom, rho_in, kb)?;
    let z_src = dom.mesh.zc(kc);
    let delta = profile::froude_thickness(dom, q, froude, width, kc);
    let au = &dom.mesh.au;
    let i_face = i_cell.min(dom.mesh.nx - 1);
    let weights = profile::gaussian_weights(dom, &|k| au[(i_face, k)], z_src, delta, kb, kc);
    super::inject_distributed(dom, i_cell, q, t_in, c_in, &weights, angle, width);
    Ok(())
}

/// 单元处的局地水面宽 [m]
fn local_surface_width(dom: &Domain, i_cell: usize) -> Scalar {
    let k_srf = dom.mesh.k_srf;
    (0.5 * (dom.mesh.b[(i_cell - 1, k_srf)] + dom.mesh.b[(i_cell, k_srf)])).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::box_input;
    use crate::forcing::ScheduleSeries;
    use lh_config::ParticleSpec;

    #[test]
    fn test_tributary_injects_at_position() {
        let mut input = box_input(10, 20, 15.0);
        input.config.tributaries = vec![serde_json::from_str(
            r#"{ "x_pos": 450.0, "schedule": { "constant": [0.0] }, "width": 20.0 }"#,
        )
        .unwrap()];
        input.tributary_series = vec![ScheduleSeries::constant(vec![2.0, 18.0])];
        let mut dom = Domain::new(1, input, &ParticleSpec::default()).unwrap();
        apply_tributaries(&mut dom, 0.0).unwrap();

        assert!((dom.src.q_trb - 2.0).abs() < 1e-12);
        // x=450 落在第 5 个单元
        let mut q_col5 = 0.0;
        for k in 1..=dom.mesh.nz {
            q_col5 += dom.src.q_src[(5, k)];
        }
        assert!((q_col5 - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_pipe_sign_flip() {
        // 同一时序在两个域：小 id 流出（负），大 id 流入（正）
        let make = |id: usize, partner: usize| {
            let mut input = box_input(6, 10, 8.0);
            input.config.pipes = vec![serde_json::from_str(&format!(
                r#"{{ "partner_id": {}, "x_pos": 250.0, "z_pos": 4.0,
                     "schedule": {{ "constant": [0.0] }} }}"#,
                partner
            ))
            .unwrap()];
            input.pipe_series = vec![ScheduleSeries::constant(vec![1.5])];
            Domain::new(id, input, &ParticleSpec::default()).unwrap()
        };
        let mut lo = make(1, 2);
        let mut hi = make(2, 1);
        apply_pipes(&mut lo, 0.0).unwrap();
        apply_pipes(&mut hi, 0.0).unwrap();
        // 正读数：小 id 侧出水，大 id 侧进水
        assert!((lo.src.q_wtp + 1.5).abs() < 1e-12);
        assert!((hi.src.q_wtp - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_point_outflow_becomes_sink() {
        let mut input = box_input(6, 10, 8.0);
        input.config.point_outflows = vec![serde_json::from_str(
            r#"{ "x_pos": 150.0, "z_pos": 4.0, "schedule": { "constant": [0.8] } }"#,
        )
        .unwrap()];
        input.point_outflow_series = vec![ScheduleSeries::constant(vec![0.8])];
        let mut dom = Domain::new(1, input, &ParticleSpec::default()).unwrap();
        apply_point_sources(&mut dom, 0.0).unwrap();

        assert!((dom.src.q_pout - 0.8).abs() < 1e-12);
        let snk_sum: Scalar = dom.src.q_snk.as_slice().iter().sum();
        assert!((snk_sum - 0.8).abs() < 1e-10);
    }

    #[test]
    fn test_confluence_main_side_injects_lagged() {
        let mut input = box_input(10, 20, 15.0);
        input.config.confluences = vec![serde_json::from_str(
            r#"{ "partner_id": 2, "x_pos": 650.0 }"#,
        )
        .unwrap()];
        let mut dom = Domain::new(1, input, &ParticleSpec::default()).unwrap();
        dom.confluences[0].q_last = 3.0;
        dom.confluences[0].t_last = 15.0;
        apply_confluences(&mut dom).unwrap();
        assert!((dom.src.q_cnf - 3.0).abs() < 1e-12);
        let total: Scalar = dom.src.q_src.as_slice().iter().sum();
        assert!((total - 3.0).abs() < 1e-10);
    }
}
