// crates/lh_physics/src/sources/mod.rs

//! 边界源构建器
//!
//! 每步把全部取排水描述符换算为源项场：
//! - 入流口（EDI/RID/RI1）与出水口（NDO/EDO/DDD）
//! - 支流、汇流、跨域水管、点状入流/取水
//! - 阻流幕（置零约束，供积分器查询）
//!
//! 非点状源均通过 [`profile`] 的密度选择高斯机制分配到垂向剖面。
//! 构建只读写本域状态（跨域量使用耦合器上一步写入的滞后值），
//! 因而可以跨域并行。

pub mod fence;
pub mod inflow;
pub mod links;
pub mod outflow;
pub mod profile;

use crate::domain::Domain;
use lh_config::{InflowMode, OutflowMode};
use lh_foundation::{LhResult, Scalar};

/// 构建本步全部源项
///
/// `time_day` 为当前模拟时刻 [day]。时序越界等错误原样上抛，
/// 由模拟循环附加域 id 与步号。
pub fn build_sources(
    dom: &mut Domain,
    time_day: Scalar,
    inflow_mode: InflowMode,
    outflow_mode: OutflowMode,
) -> LhResult<()> {
    dom.src.clear();
    inflow::apply_inlet(dom, time_day, inflow_mode)?;
    outflow::apply_outlets(dom, time_day, outflow_mode)?;
    links::apply_tributaries(dom, time_day)?;
    links::apply_confluences(dom)?;
    links::apply_pipes(dom, time_day)?;
    links::apply_point_sources(dom, time_day)?;
    finalize_weighted_fields(dom);
    Ok(())
}

/// 把一股流量按权重注入某一列
///
/// `weights` 为 [`profile::gaussian_weights`] 的归一化分配；
/// `u_src`/`t_src`/`c_src` 先累加流量加权分子，
/// [`finalize_weighted_fields`] 统一除以流量。
pub(crate) fn inject_distributed(
    dom: &mut Domain,
    i_cell: usize,
    q: Scalar,
    t_in: Scalar,
    c_in: &[Scalar],
    weights: &[Scalar],
    angle: Scalar,
    width: Scalar,
) {
    let kb = dom.mesh.kc_bot[i_cell];
    let k_srf = dom.mesh.k_srf;
    for k in kb..=k_srf {
        let qk = q * weights[k];
        if qk <= 0.0 {
            continue;
        }
        dom.src.q_src[(i_cell, k)] += qk;
        // 射流水平分速：孔口面积 = 宽 × 层厚
        let a_jet = (width * dom.mesh.dz[k]).max(1e-6);
        let u_jet = qk / a_jet * angle.cos();
        dom.src.u_src[(i_cell, k)] += u_jet * qk;
        dom.src.t_src[(i_cell, k)] += t_in * qk;
        for (l, c_field) in dom.src.c_src.iter_mut().enumerate() {
            let c_val = c_in.get(l).copied().unwrap_or(0.0);
            c_field[(i_cell, k)] += c_val * qk;
        }
    }
}

/// 点状取水按权重汇入汇项
pub(crate) fn extract_distributed(
    dom: &mut Domain,
    i_cell: usize,
    q: Scalar,
    weights: &[Scalar],
) {
    let kb = dom.mesh.kc_bot[i_cell];
    let k_srf = dom.mesh.k_srf;
    for k in kb..=k_srf {
        let qk = q * weights[k];
        if qk > 0.0 {
            dom.src.q_snk[(i_cell, k)] += qk;
        }
    }
}

/// 流量加权场归一化（构建末尾调用一次）
fn finalize_weighted_fields(dom: &mut Domain) {
    let nx = dom.mesh.nx;
    let nz = dom.mesh.nz;
    for i in 1..=nx {
        for k in 1..=nz {
            let q = dom.src.q_src[(i, k)];
            if q > 0.0 {
                dom.src.u_src[(i, k)] /= q;
                dom.src.t_src[(i, k)] /= q;
                for c_field in &mut dom.src.c_src {
                    c_field[(i, k)] /= q;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::box_input;
    use crate::forcing::ScheduleSeries;
    use lh_config::ParticleSpec;

    #[test]
    fn test_gaussian_source_integrates_to_q() {
        let mut input = box_input(10, 20, 15.0);
        input.config.inlet = Some(
            serde_json::from_str(
                r#"{ "schedule": { "constant": [5.0, 12.0] }, "width": 40.0 }"#,
            )
            .unwrap(),
        );
        input.inlet_series = Some(ScheduleSeries::constant(vec![5.0, 12.0]));
        let mut dom = Domain::new(1, input, &ParticleSpec::default()).unwrap();
        build_sources(&mut dom, 0.0, InflowMode::Edi, OutflowMode::Ndo).unwrap();

        let mut q_sum = 0.0;
        for k in 1..=dom.mesh.nz {
            q_sum += dom.src.q_src[(1, k)];
        }
        assert!((q_sum - 5.0).abs() < 1e-10, "q_sum={}", q_sum);
        assert!((dom.src.q_inlet - 5.0).abs() < 1e-12);
        // 加权温度回到源值
        for k in 1..=dom.mesh.nz {
            if dom.src.q_src[(1, k)] > 0.0 {
                assert!((dom.src.t_src[(1, k)] - 12.0).abs() < 1e-10);
            }
        }
    }
}
