// crates/lh_physics/src/coupler.rs

//! 多域耦合器
//!
//! 每步单线程执行（见模块级执行调度）：
//! 1. 体积平衡：total_vol ← total_vol + dt·q_total_vol
//! 2. 水面反演：vol_hgt⁻¹；汇流相连的域共享同一水面
//!    （体积表逐层相加后统一反演）
//! 3. 表层重建与浮幕随动，w_srf = Δz_srf/dt
//! 4. 列流量目标 q_col：自上游面累积源汇，扣除按表层面积
//!    比例分摊的水面强迫；东端等于全部出流
//! 5. 跨域滞后量交换：支汊东端送出的流量与标量写入干流侧
//!    汇流记录；水管两端互写对端管口水温/浓度
//!
//! 汇流相连的域要求垂向网格一致（装配时校验），因此共享水面的
//! 合并体积表可以逐层相加。

use crate::domain::Domain;
use crate::error::{SolverError, SolverResult};
use lh_foundation::Scalar;

/// 蓄水体积下限 [m³]
const TOTAL_VOL_MIN: Scalar = 1.0e-3;

/// 执行一步耦合（体积平衡 → 水面 → 列流量 → 跨域交换）
pub fn update(doms: &mut [Domain], dt: Scalar, step: usize) -> SolverResult<()> {
    // ---- 1. 体积平衡 ----
    let mut vol_before = Vec::with_capacity(doms.len());
    for dom in doms.iter_mut() {
        vol_before.push(dom.total_vol);
        dom.q_total_vol = dom.src.net_volume_forcing();
        dom.total_vol += dt * dom.q_total_vol;
    }

    // ---- 2. 水面反演（共享水面按组合并）----
    let groups = surface_groups(doms);
    for group in &groups {
        let z_new = invert_group_surface(doms, group, step)?;
        for &di in group {
            let dom = &mut doms[di];
            let z_old = dom.mesh.z_srf;
            dom.w_srf = (z_new - z_old) / dt;
            dom.mesh
                .update_surface_layer(z_new)
                .map_err(|e| SolverError::in_domain(dom.id, step, e))?;
            // 共享水面把合并体积在组内重新分配；单域保持预算值，
            // 避免往返插值的舍入蚕食体积守恒
            if group.len() > 1 {
                dom.total_vol = dom
                    .mesh
                    .surface_to_volume(z_new)
                    .map_err(|e| SolverError::in_domain(dom.id, step, e))?;
            }
            dom.update_floating_fences();
        }
    }

    // ---- 3. 列流量目标 ----
    // 表层升降用实际实现量（共享水面把体积在组内重新分配，
    // 预算值与之可能不同）
    for (di, dom) in doms.iter_mut().enumerate() {
        let q_realized = (dom.total_vol - vol_before[di]) / dt;
        compute_column_targets(dom, q_realized);
    }

    // ---- 4. 跨域滞后量交换 ----
    exchange_confluences(doms);
    exchange_pipe_scalars(doms);
    Ok(())
}

/// 汇流连通分量（域下标集合）
fn surface_groups(doms: &[Domain]) -> Vec<Vec<usize>> {
    let n = doms.len();
    let mut assigned = vec![usize::MAX; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for start in 0..n {
        if assigned[start] != usize::MAX {
            continue;
        }
        let gi = groups.len();
        let mut stack = vec![start];
        let mut members = Vec::new();
        assigned[start] = gi;
        while let Some(di) = stack.pop() {
            members.push(di);
            for cnf in &doms[di].confluences {
                let pj = cnf.partner_id - 1;
                if pj < n && assigned[pj] == usize::MAX {
                    assigned[pj] = gi;
                    stack.push(pj);
                }
            }
        }
        members.sort_unstable();
        groups.push(members);
    }
    groups
}

/// 组内水面反演：合并体积表后求共享水面高程
fn invert_group_surface(doms: &[Domain], group: &[usize], step: usize) -> SolverResult<Scalar> {
    let first = &doms[group[0]];
    if group.len() == 1 {
        let dom = first;
        check_capacity(dom, step)?;
        return dom
            .mesh
            .volume_to_surface(dom.total_vol)
            .map_err(|e| SolverError::in_domain(dom.id, step, e));
    }

    // 垂向网格一致（装配时已校验），体积表逐层相加
    let nz = first.mesh.nz;
    let mut vol_sum: Scalar = 0.0;
    let mut vol_hgt = vec![0.0; nz + 1];
    let mut capacity = 0.0;
    for &di in group {
        let dom = &doms[di];
        vol_sum += dom.total_vol;
        for k in 0..=nz {
            vol_hgt[k] += dom.mesh.vol_hgt[k];
        }
        capacity += dom.mesh.vol_hgt[nz];
    }
    if vol_sum > capacity || vol_sum < TOTAL_VOL_MIN {
        return Err(SolverError::Capacity {
            dom: first.id,
            step,
            volume: vol_sum,
            min: TOTAL_VOL_MIN,
            max: capacity,
        });
    }

    let z = &first.mesh.z;
    for k in 1..=nz {
        if vol_sum <= vol_hgt[k] {
            if vol_hgt[k] - vol_hgt[k - 1] < 1e-300 {
                continue;
            }
            return Ok(lh_foundation::lerp(
                vol_sum,
                vol_hgt[k - 1],
                vol_hgt[k],
                z[k - 1],
                z[k],
            ));
        }
    }
    Ok(z[nz])
}

/// 库容范围检查
fn check_capacity(dom: &Domain, step: usize) -> SolverResult<()> {
    let capacity = dom.mesh.vol_hgt[dom.mesh.nz];
    if dom.total_vol > capacity || dom.total_vol < TOTAL_VOL_MIN {
        return Err(SolverError::Capacity {
            dom: dom.id,
            step,
            volume: dom.total_vol,
            min: TOTAL_VOL_MIN,
            max: capacity,
        });
    }
    Ok(())
}

/// 列流量目标：自上游累积源汇，扣除表层面积分摊的水面强迫
///
/// `q_realized` 为本步实际实现的蓄水变化率 [m³/s]。有出水口时
/// 东端严格等于出流分配之和；东端开放（支汊或闭库）时取走步
/// 的自然延拓值，并把它按面积分配成东端面出流供动量边界使用。
fn compute_column_targets(dom: &mut Domain, q_realized: Scalar) {
    let nx = dom.mesh.nx;
    let k_srf = dom.mesh.k_srf;

    // 表层面积份额
    let mut area_total = 0.0;
    for i in 1..=nx {
        area_total += dom.mesh.aw[(i, k_srf)];
    }

    dom.q_col[0] = 0.0;
    for i in 1..=nx {
        let mut q_cell = 0.0;
        for k in dom.mesh.kc_bot[i].min(k_srf)..=k_srf {
            q_cell += dom.src.q_src[(i, k)] - dom.src.q_snk[(i, k)];
        }
        let share = if area_total > 0.0 {
            dom.mesh.aw[(i, k_srf)] / area_total
        } else {
            0.0
        };
        dom.q_col[i] = dom.q_col[i - 1] + q_cell - q_realized * share;
    }

    if dom.outlets.is_empty() {
        // 开放东端：自然延拓值分配到东端面
        let q_east_total = dom.q_col[nx];
        let kb = dom.mesh.kc_bot[nx];
        let mut au_sum = 0.0;
        for k in kb..=k_srf {
            au_sum += dom.mesh.au[(nx, k)];
        }
        dom.src.q_east.fill(0.0);
        if au_sum > 0.0 {
            for k in kb..=k_srf {
                dom.src.q_east[k] = q_east_total * dom.mesh.au[(nx, k)] / au_sum;
            }
        }
    } else {
        // 东端严格等于全部出流
        dom.q_col[nx] = dom.src.q_east.iter().sum();
    }
}

/// 支汊东端 → 干流汇流记录
fn exchange_confluences(doms: &mut [Domain]) {
    let n = doms.len();
    // 先只读收集支汊输出
    struct Sent {
        from_id: usize,
        to_idx: usize,
        q: Scalar,
        t: Scalar,
        c: Vec<Scalar>,
    }
    let mut messages = Vec::new();
    for dom in doms.iter() {
        for cnf in &dom.confluences {
            if !cnf.is_branch {
                continue;
            }
            let nx = dom.mesh.nx;
            let q_sent = dom.q_col[nx];
            // 流量加权的东端断面标量
            let mut t_num = 0.0;
            let mut c_num = vec![0.0; dom.nps()];
            let mut q_abs = 0.0;
            for k in dom.mesh.kc_bot[nx]..=dom.mesh.k_srf {
                let qk = dom.src.q_east[k].max(0.0);
                if qk <= 0.0 {
                    continue;
                }
                t_num += dom.t[(nx, k)] * qk;
                for (l, cn) in c_num.iter_mut().enumerate() {
                    *cn += dom.c[l][(nx, k)] * qk;
                }
                q_abs += qk;
            }
            let t_sent = if q_abs > 0.0 { t_num / q_abs } else { 0.0 };
            let c_sent: Vec<Scalar> = if q_abs > 0.0 {
                c_num.iter().map(|v| v / q_abs).collect()
            } else {
                vec![0.0; dom.nps()]
            };
            let to_idx = cnf.partner_id - 1;
            if to_idx < n {
                messages.push(Sent {
                    from_id: dom.id,
                    to_idx,
                    q: q_sent,
                    t: t_sent,
                    c: c_sent,
                });
            }
        }
    }
    // 写入干流侧记录；支汊自己的记录保存送出量（预算用）
    for msg in messages {
        let target = &mut doms[msg.to_idx];
        for cnf in &mut target.confluences {
            if cnf.partner_id == msg.from_id && !cnf.is_branch {
                cnf.q_last = msg.q;
                cnf.t_last = msg.t;
                cnf.c_last.clone_from(&msg.c);
            }
        }
        let from_idx = msg.from_id - 1;
        for cnf in &mut doms[from_idx].confluences {
            if cnf.is_branch && cnf.partner_id == msg.to_idx + 1 {
                cnf.q_last = msg.q;
            }
        }
    }
}

/// 水管两端互写对端管口的水温/浓度（来水标量的滞后值）
fn exchange_pipe_scalars(doms: &mut [Domain]) {
    let n = doms.len();
    struct Mouth {
        dom_idx: usize,
        pipe_idx: usize,
        t: Scalar,
        c: Vec<Scalar>,
    }
    let mut readings = Vec::new();
    for (di, dom) in doms.iter().enumerate() {
        for (pi, pipe) in dom.pipes.iter().enumerate() {
            let pj = pipe.partner_id - 1;
            if pj >= n {
                continue;
            }
            let partner = &doms[pj];
            // 对端第一条指回本域的水管确定取样位置
            let Some(p_pipe) = partner.pipes.iter().find(|p| p.partner_id == dom.id) else {
                continue;
            };
            let k_p = partner
                .mesh
                .layer_of_z(p_pipe.z_pos)
                .clamp(1, partner.mesh.k_srf);
            let i_p = p_pipe.i_cell;
            let t = partner.t[(i_p, k_p)];
            let c: Vec<Scalar> = (0..partner.nps())
                .map(|l| partner.c[l][(i_p, k_p)])
                .collect();
            readings.push(Mouth {
                dom_idx: di,
                pipe_idx: pi,
                t,
                c,
            });
        }
    }
    for m in readings {
        let pipe = &mut doms[m.dom_idx].pipes[m.pipe_idx];
        pipe.t_last = m.t;
        pipe.c_last = m.c;
    }
}
