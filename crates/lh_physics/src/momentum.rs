// crates/lh_physics/src/momentum.rs

//! 动量积分器
//!
//! u 的显式欧拉推进：一阶迎风对流 + 中心差分扩散 + 静水压梯度
//! + 床面坡度重力 + 源项耦合。更新后整列缩放到耦合器给定的
//! 列流量目标，再由局地连续性自底向上重建 w。
//!
//! 压力梯度项可选时间滤波：原始值超过阈值时改用中心差分，
//! 并按 PGX ← β·PGX_old + (1−β)·PGX_raw 平滑。
//!
//! 西端面（i=0）为固壁，入流以源项形式进入第一列；东端面由
//! 出流分配（或开放边界复制）给定。

use crate::domain::Domain;
use crate::sources::fence;
use lh_config::MomentumOptions;
use lh_foundation::{Field2, Scalar, GRAVITY, RHO_WATER};

/// 推进一个时间步
pub fn advance(dom: &mut Domain, dt: Scalar, opts: &MomentumOptions) {
    let nx = dom.mesh.nx;
    let k_srf = dom.mesh.k_srf;
    let u_old = dom.u.clone();
    let mut u_new = u_old.clone();

    for i in 1..nx {
        let kb = dom.mesh.k_bot[i];
        if kb > k_srf {
            continue;
        }
        for k in kb..=k_srf {
            let vols = dom.mesh.vols[(i, k)];
            if vols <= 0.0 {
                continue;
            }
            let mut rhs = 0.0;

            // ---- 对流：u 控制体 x 面（单元中心 i 与 i+1）----
            let uc_w = 0.5 * (u_old[(i - 1, k)] + u_old[(i, k)]);
            let flux_w = uc_w * dom.mesh.aus[(i, k)];
            let upw_w = if flux_w >= 0.0 {
                u_old[(i - 1, k)]
            } else {
                u_old[(i, k)]
            };
            rhs += flux_w * upw_w;

            let uc_e = 0.5 * (u_old[(i, k)] + u_old[(i + 1, k)]);
            let flux_e = uc_e * dom.mesh.aus[(i + 1, k)];
            let upw_e = if flux_e >= 0.0 {
                u_old[(i, k)]
            } else {
                u_old[(i + 1, k)]
            };
            rhs -= flux_e * upw_e;

            // ---- 对流：u 控制体 z 面（交错 w 面）----
            if k > kb {
                let ws = 0.5 * (dom.w[(i, k - 1)] + dom.w[(i + 1, k - 1)]);
                let flux_b = ws * dom.mesh.aws[(i, k - 1)];
                let upw_b = if flux_b >= 0.0 {
                    u_old[(i, k - 1)]
                } else {
                    u_old[(i, k)]
                };
                rhs += flux_b * upw_b;
            }
            if k < k_srf {
                let ws = 0.5 * (dom.w[(i, k)] + dom.w[(i + 1, k)]);
                let flux_t = ws * dom.mesh.aws[(i, k)];
                let upw_t = if flux_t >= 0.0 {
                    u_old[(i, k)]
                } else {
                    u_old[(i, k + 1)]
                };
                rhs -= flux_t * upw_t;
            }

            // ---- 扩散 ----
            let dmx_w = 0.5 * (dom.dmx[(i - 1, k)] + dom.dmx[(i, k)]);
            rhs += dmx_w * (u_old[(i - 1, k)] - u_old[(i, k)]) / dom.mesh.dx[i]
                * dom.mesh.aus[(i, k)];
            let dmx_e = 0.5 * (dom.dmx[(i, k)] + dom.dmx[(i + 1, k)]);
            rhs += dmx_e * (u_old[(i + 1, k)] - u_old[(i, k)]) / dom.mesh.dx[i + 1]
                * dom.mesh.aus[(i + 1, k)];

            if k > kb {
                let dmz_b = 0.5 * (dom.dmz[(i, k - 1)] + dom.dmz[(i + 1, k - 1)]);
                rhs += dmz_b * (u_old[(i, k - 1)] - u_old[(i, k)]) / dom.mesh.dzs[k - 1]
                    * dom.mesh.aws[(i, k - 1)];
            }
            if k < k_srf {
                let dmz_t = 0.5 * (dom.dmz[(i, k)] + dom.dmz[(i + 1, k)]);
                rhs += dmz_t * (u_old[(i, k + 1)] - u_old[(i, k)]) / dom.mesh.dzs[k]
                    * dom.mesh.aws[(i, k)];
            }

            // ---- 静水压梯度 ----
            if opts.pressure_grad {
                rhs -= pressure_gradient(dom, i, k, opts);
            }

            // ---- 床面坡度重力 ----
            if opts.gravity_slope {
                let slope = (dom.mesh.z_bed[i - 1] - dom.mesh.z_bed[i + 1])
                    / (2.0 * dom.mesh.dxs[i]);
                let slope_eff = slope.max(opts.init_slope);
                rhs += GRAVITY * slope_eff.atan().sin() * vols;
            }

            // ---- 源项耦合 ----
            rhs += source_coupling(dom, &u_old, i, k);

            u_new[(i, k)] = u_old[(i, k)] + dt * rhs / vols;
        }
    }

    // 东端面：出流分配给定；西端面固壁
    for k in 1..=k_srf {
        let au_e = dom.mesh.au[(nx, k)];
        u_new[(nx, k)] = if au_e > 0.0 {
            dom.src.q_east[k] / au_e
        } else {
            0.0
        };
        u_new[(0, k)] = 0.0;
    }

    dom.u = u_new;
    dom.pgx_old.copy_from(&dom.pgx);

    // 幕面置零，然后整列缩放到列流量目标
    fence::apply_to_momentum(dom);
    rescale_columns(dom);
    fence::apply_to_momentum(dom);

    reconstruct_vertical_velocity(dom);
}

/// 压力梯度项（含异常阈值替换与时间滤波）
fn pressure_gradient(dom: &mut Domain, i: usize, k: usize, opts: &MomentumOptions) -> Scalar {
    let mesh = &dom.mesh;
    let k_srf = mesh.k_srf;
    let vols = mesh.vols[(i, k)];
    let denom = RHO_WATER * mesh.dxs[i];

    // 表层行以下与上一行平均
    let mut dp = dom.p[(i + 1, k)] - dom.p[(i, k)];
    if k < k_srf {
        dp = 0.5 * (dp + (dom.p[(i + 1, k + 1)] - dom.p[(i, k + 1)]));
    }
    let mut raw = dp / denom * vols;

    // 异常值改用中心差分
    if raw.abs() > opts.threshold_pgx && i > 1 {
        raw = 0.5 * (dom.p[(i + 1, k)] - dom.p[(i - 1, k)]) / denom * vols;
    }
    dom.pgx_raw[(i, k)] = raw;

    let filtered = if opts.smooth_pgx {
        opts.beta_pgx * dom.pgx_old[(i, k)] + (1.0 - opts.beta_pgx) * raw
    } else {
        raw
    };
    dom.pgx[(i, k)] = filtered;
    filtered
}

/// 源项动量耦合
///
/// 邻接单元的源按其水平分速符号挂到对应面：东向射流推本单元
/// 东面，西向射流推西面，垂直注入对两侧各半稀释动量。
fn source_coupling(dom: &Domain, u_old: &Field2, i: usize, k: usize) -> Scalar {
    let mut rhs = 0.0;
    let u_here = u_old[(i, k)];
    // 西侧单元 i（其东面即本面）
    let q_w = dom.src.q_src[(i, k)];
    if q_w > 0.0 {
        let us = dom.src.u_src[(i, k)];
        if us > 0.0 {
            rhs += (us - u_here) * q_w;
        } else if us == 0.0 {
            rhs += (0.0 - u_here) * q_w * 0.5;
        }
    }
    // 东侧单元 i+1（其西面即本面）
    if i + 1 <= dom.mesh.nx {
        let q_e = dom.src.q_src[(i + 1, k)];
        if q_e > 0.0 {
            let us = dom.src.u_src[(i + 1, k)];
            if us < 0.0 {
                rhs += (us - u_here) * q_e;
            } else if us == 0.0 {
                rhs += (0.0 - u_here) * q_e * 0.5;
            }
        }
    }
    rhs
}

/// 整列缩放：令 Σ_k au·u = q_col[i]
///
/// 均匀加性修正（列流量为零时仍然良定），幕面排除在外。
fn rescale_columns(dom: &mut Domain) {
    let nx = dom.mesh.nx;
    let k_srf = dom.mesh.k_srf;
    for i in 1..nx {
        let kb = dom.mesh.k_bot[i];
        if kb > k_srf {
            continue;
        }
        let mut flux = 0.0;
        let mut area = 0.0;
        for k in kb..=k_srf {
            let au = dom.mesh.au[(i, k)];
            if au <= 0.0 || fence::blocks_u_face(dom, i, k) {
                continue;
            }
            flux += au * dom.u[(i, k)];
            area += au;
        }
        if area <= 0.0 {
            continue;
        }
        let du = (dom.q_col[i] - flux) / area;
        for k in kb..=k_srf {
            let au = dom.mesh.au[(i, k)];
            if au > 0.0 && !fence::blocks_u_face(dom, i, k) {
                dom.u[(i, k)] += du;
            }
        }
    }
}

/// 由局地连续性自底向上重建 w
///
/// w(i,k)·aw(i,k) = w(i,k−1)·aw(i,k−1) + q_cell(i,k)
///                  − (u(i,k)·au(i,k) − u(i−1,k)·au(i−1,k))
pub fn reconstruct_vertical_velocity(dom: &mut Domain) {
    let nx = dom.mesh.nx;
    let nz = dom.mesh.nz;
    let k_srf = dom.mesh.k_srf;
    for i in 1..=nx {
        let kb = dom.mesh.kc_bot[i];
        // 床面无通量
        dom.w[(i, kb - 1)] = 0.0;
        let mut flux_below = 0.0;
        for k in kb..=k_srf {
            let q_cell = dom.src.q_src[(i, k)] - dom.src.q_snk[(i, k)];
            let du_flux =
                dom.u[(i, k)] * dom.mesh.au[(i, k)] - dom.u[(i - 1, k)] * dom.mesh.au[(i - 1, k)];
            let flux = flux_below + q_cell - du_flux;
            let aw = dom.mesh.aw[(i, k)];
            dom.w[(i, k)] = if aw > 0.0 { flux / aw } else { 0.0 };
            flux_below = flux;
        }
        // 表层上镜像
        if k_srf < nz {
            dom.w[(i, k_srf + 1)] = dom.w[(i, k_srf)];
        }
        for k in (k_srf + 2)..=nz {
            dom.w[(i, k)] = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::box_input;
    use lh_config::ParticleSpec;

    fn still_domain() -> Domain {
        Domain::new(1, box_input(10, 20, 15.0), &ParticleSpec::default()).unwrap()
    }

    #[test]
    fn test_still_water_stays_still() {
        let mut dom = still_domain();
        let opts = MomentumOptions::default();
        for _ in 0..10 {
            advance(&mut dom, 60.0, &opts);
        }
        for i in 0..=dom.mesh.nx {
            for k in 1..=dom.mesh.k_srf {
                assert!(
                    dom.u[(i, k)].abs() < 1e-12,
                    "u[{},{}]={}",
                    i,
                    k,
                    dom.u[(i, k)]
                );
            }
        }
        for i in 1..=dom.mesh.nx {
            for k in 1..=dom.mesh.k_srf {
                assert!(dom.w[(i, k)].abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_column_rescale_hits_target() {
        let mut dom = still_domain();
        // 人为给定列流量目标
        for i in 1..dom.mesh.nx {
            dom.q_col[i] = 2.5;
        }
        let opts = MomentumOptions::default();
        advance(&mut dom, 60.0, &opts);
        for i in 1..dom.mesh.nx {
            let mut flux = 0.0;
            for k in 1..=dom.mesh.k_srf {
                flux += dom.mesh.au[(i, k)] * dom.u[(i, k)];
            }
            assert!((flux - 2.5).abs() < 1e-8, "列 {} 流量 {}", i, flux);
        }
    }

    #[test]
    fn test_continuity_reconstruction_uniform_flow() {
        let mut dom = still_domain();
        // 均匀水平流：无辐散 → w 恒零
        for i in 0..=dom.mesh.nx {
            for k in 1..=dom.mesh.k_srf {
                dom.u[(i, k)] = 0.2;
            }
        }
        reconstruct_vertical_velocity(&mut dom);
        for i in 1..=dom.mesh.nx {
            for k in 1..=dom.mesh.k_srf {
                assert!(dom.w[(i, k)].abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_source_drives_upwelling() {
        let mut dom = still_domain();
        // 底层点源 → 上方各面 w > 0
        dom.src.q_src[(5, 2)] = 1.0;
        reconstruct_vertical_velocity(&mut dom);
        for k in 2..=dom.mesh.k_srf {
            assert!(dom.w[(5, k)] > 0.0, "w[5,{}]", k);
        }
        // 邻列不受影响
        assert!(dom.w[(4, 5)].abs() < 1e-15);
    }

    #[test]
    fn test_fence_zeroes_and_rescale_respects() {
        let mut input = box_input(10, 20, 15.0);
        input.config.fences = vec![serde_json::from_str(
            r#"{ "x_pos": 500.0, "kind": { "fixed": { "z_low": 0.0, "z_high": 20.0 } } }"#,
        )
        .unwrap()];
        let mut dom = Domain::new(1, input, &ParticleSpec::default()).unwrap();
        for i in 1..dom.mesh.nx {
            dom.q_col[i] = 1.0;
        }
        let opts = MomentumOptions::default();
        advance(&mut dom, 60.0, &opts);
        // 全水深幕：该面流速恒零
        for k in 1..=dom.mesh.k_srf {
            assert_eq!(dom.u[(5, k)], 0.0);
        }
    }
}
