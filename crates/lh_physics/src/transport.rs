// crates/lh_physics/src/transport.rs

//! 标量输运核心
//!
//! 热量与各粒径类浓度共用同一个对流-扩散核：一阶迎风对流、
//! 中心差分扩散、显式欧拉，按单元体积推进。两者只在通道参数上
//! 不同（扩散增幅、沉速偏移、源浓度场、床面沉积回收），避免
//! 为额外标量复制代码路径。
//!
//! 迎风格式本身不守恒于辐散流场（表层升降、源汇），用
//! `+ T·(水流场净出通量)` 的离散散度修正补偿：均一场在任意
//! 流场与源汇下保持不变，汇以局地浓度带走水量而不改浓度。
//!
//! 阻流幕同时阻断跨幕面的对流与扩散通量。

use crate::domain::Domain;
use crate::sources::fence;
use lh_foundation::{Field2, Scalar};

/// 单个标量通道的参数
pub struct ChannelSpec<'a> {
    /// 扩散增幅系数（alpha_heat / alpha_ss）
    pub alpha: Scalar,
    /// 沉速偏移 [m/s]（热量为 0；浓度为 w_ss，正值向下）
    pub settling: Scalar,
    /// 源浓度场（流量加权后）
    pub src_value: &'a Field2,
    /// 水平扩散系数场
    pub diff_x: &'a Field2,
    /// 垂向扩散系数场
    pub diff_z: &'a Field2,
    /// 附加单元源（辐射加热等，量纲 [值·m³/s]）
    pub extra_rhs: Option<&'a Field2>,
}

/// 推进一个通道
///
/// 返回新场（幽灵带未镜像，调用方统一处理）与床面沉积速率
/// [g/s]（热量通道恒零）。
pub fn advance_channel(
    dom: &Domain,
    dt: Scalar,
    old: &Field2,
    spec: &ChannelSpec<'_>,
) -> (Field2, Vec<Scalar>) {
    let mesh = &dom.mesh;
    let nx = mesh.nx;
    let k_srf = mesh.k_srf;
    let mut new = old.clone();
    let mut deposit = vec![0.0; nx + 1];

    for i in 1..=nx {
        let kb = mesh.kc_bot[i];
        if kb > k_srf {
            continue;
        }
        for k in kb..=k_srf {
            let vol = mesh.vol[(i, k)];
            if vol <= 0.0 {
                continue;
            }
            let v_here = old[(i, k)];
            let mut rhs = 0.0;
            let mut net_out = 0.0;

            // ---- 水平对流 + 扩散（u 面）----
            // 西面 i-1
            if !fence::blocks_u_face(dom, i - 1, k) {
                let flux = dom.u[(i - 1, k)] * mesh.au[(i - 1, k)];
                let upwind = if flux >= 0.0 { old[(i - 1, k)] } else { v_here };
                rhs += flux * upwind;
                net_out -= flux;
                if i > 1 {
                    rhs += spec.alpha * spec.diff_x[(i - 1, k)]
                        * (old[(i - 1, k)] - v_here)
                        / mesh.dxs[i - 1]
                        * mesh.au[(i - 1, k)];
                }
            }
            // 东面 i
            if !fence::blocks_u_face(dom, i, k) {
                let flux = dom.u[(i, k)] * mesh.au[(i, k)];
                let upwind = if flux >= 0.0 { v_here } else { old[(i + 1, k)] };
                rhs -= flux * upwind;
                net_out += flux;
                if i < nx {
                    rhs += spec.alpha * spec.diff_x[(i, k)] * (old[(i + 1, k)] - v_here)
                        / mesh.dxs[i]
                        * mesh.au[(i, k)];
                }
            }

            // ---- 垂向（w 面）----
            // 对流速度含沉速偏移 (w − w_ss)；散度修正只计水流场 w，
            // 床面沉降通量因此真实扣减浓度并转入床面沉积。
            // 底面 k-1
            {
                let aw = mesh.aw[(i, k - 1)];
                if k > kb {
                    let w_adv = dom.w[(i, k - 1)] - spec.settling;
                    let flux = w_adv * aw;
                    let upwind = if flux >= 0.0 { old[(i, k - 1)] } else { v_here };
                    rhs += flux * upwind;
                    net_out -= dom.w[(i, k - 1)] * aw;
                    rhs += spec.alpha * spec.diff_z[(i, k - 1)] * (old[(i, k - 1)] - v_here)
                        / mesh.dzs[k - 1]
                        * aw;
                } else if spec.settling > 0.0 && aw > 0.0 {
                    // 床面：沉降通量离开水柱，进入床面沉积
                    let settle = spec.settling * aw * v_here;
                    rhs -= settle;
                    deposit[i] += settle;
                }
            }
            // 顶面 k（表层顶面随水面移动，幽灵行镜像 → 无交换）
            if k < k_srf {
                let aw = mesh.aw[(i, k)];
                let w_adv = dom.w[(i, k)] - spec.settling;
                let flux = w_adv * aw;
                let upwind = if flux >= 0.0 { v_here } else { old[(i, k + 1)] };
                rhs -= flux * upwind;
                net_out += dom.w[(i, k)] * aw;
                rhs += spec.alpha * spec.diff_z[(i, k)] * (old[(i, k + 1)] - v_here)
                    / mesh.dzs[k]
                    * aw;
            }

            // ---- 源耦合（汇以局地浓度带走，浓度本身不变）----
            let q_src = dom.src.q_src[(i, k)];
            if q_src > 0.0 {
                rhs += (spec.src_value[(i, k)] - v_here) * q_src;
            }

            // ---- 散度修正 ----
            rhs += v_here * net_out;

            // ---- 附加源（辐射等）----
            if let Some(extra) = spec.extra_rhs {
                rhs += extra[(i, k)];
            }

            new[(i, k)] = v_here + dt * rhs / vol;
        }
    }
    (new, deposit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::box_input;
    use lh_config::ParticleSpec;

    fn still_domain() -> Domain {
        Domain::new(1, box_input(10, 20, 15.0), &ParticleSpec::default()).unwrap()
    }

    fn uniform_spec<'a>(dom: &'a Domain, src: &'a Field2) -> ChannelSpec<'a> {
        ChannelSpec {
            alpha: 1.0,
            settling: 0.0,
            src_value: src,
            diff_x: &dom.dhx,
            diff_z: &dom.dhz,
            extra_rhs: None,
        }
    }

    #[test]
    fn test_uniform_field_invariant_under_flow() {
        let mut dom = still_domain();
        // 任意流场 + 均一标量 → 不变（散度修正的意义）
        for i in 0..=dom.mesh.nx {
            for k in 1..=dom.mesh.k_srf {
                dom.u[(i, k)] = 0.1 * ((i + k) % 3) as Scalar;
            }
        }
        crate::momentum::reconstruct_vertical_velocity(&mut dom);
        let old = Field2::filled(dom.t.ni(), dom.t.nk(), 17.0);
        let src = Field2::zeros(dom.mesh.nx + 1, dom.mesh.nz + 1);
        let spec = uniform_spec(&dom, &src);
        let (new, _) = advance_channel(&dom, 60.0, &old, &spec);
        for i in 1..=dom.mesh.nx {
            for k in dom.mesh.kc_bot[i]..=dom.mesh.k_srf {
                assert!(
                    (new[(i, k)] - 17.0).abs() < 1e-10,
                    "[{}, {}] = {}",
                    i,
                    k,
                    new[(i, k)]
                );
            }
        }
    }

    #[test]
    fn test_diffusion_smooths_step() {
        let dom = still_domain();
        let mut old = Field2::filled(dom.t.ni(), dom.t.nk(), 10.0);
        // 垂向阶跃
        for i in 0..old.ni() {
            for k in 8..old.nk() {
                old[(i, k)] = 20.0;
            }
        }
        let src = Field2::zeros(dom.mesh.nx + 1, dom.mesh.nz + 1);
        // 给出可观的垂向扩散
        let mut dom2 = still_domain();
        dom2.dhz.fill(1e-4);
        let spec2 = ChannelSpec {
            alpha: 1.0,
            settling: 0.0,
            src_value: &src,
            diff_x: &dom2.dhx,
            diff_z: &dom2.dhz,
            extra_rhs: None,
        };
        let (new, _) = advance_channel(&dom2, 600.0, &old, &spec2);
        // 阶跃两侧向中间靠拢
        assert!(new[(5, 7)] > 10.0);
        assert!(new[(5, 8)] < 20.0);
    }

    #[test]
    fn test_settling_deposits_at_bed() {
        let dom = still_domain();
        let old = Field2::filled(dom.t.ni(), dom.t.nk(), 100.0);
        let src = Field2::zeros(dom.mesh.nx + 1, dom.mesh.nz + 1);
        let spec = ChannelSpec {
            alpha: 1.0,
            settling: 1e-4,
            src_value: &src,
            diff_x: &dom.dcx,
            diff_z: &dom.dcz,
            extra_rhs: None,
        };
        let (new, deposit) = advance_channel(&dom, 60.0, &old, &spec);
        // 均匀浓度下沉降像传送带：表层先亏，内部暂持平
        let kb = dom.mesh.kc_bot[5];
        let ks = dom.mesh.k_srf;
        assert!(new[(5, ks)] < 100.0);
        assert!((new[(5, kb)] - 100.0).abs() < 1e-10);
        // 床面沉积速率 = w_ss·aw·c
        let expected = 1e-4 * dom.mesh.aw[(5, kb - 1)] * 100.0;
        assert!((deposit[5] - expected).abs() < 1e-10);
    }

    #[test]
    fn test_settling_column_mass_budget() {
        // 一步内：水柱质量损失 == 床面沉积
        let dom = still_domain();
        let mut old = Field2::filled(dom.t.ni(), dom.t.nk(), 0.0);
        for k in 0..old.nk() {
            for i in 0..old.ni() {
                old[(i, k)] = 50.0 + 3.0 * k as Scalar;
            }
        }
        let src = Field2::zeros(dom.mesh.nx + 1, dom.mesh.nz + 1);
        let spec = ChannelSpec {
            alpha: 0.0,
            settling: 2e-4,
            src_value: &src,
            diff_x: &dom.dcx,
            diff_z: &dom.dcz,
            extra_rhs: None,
        };
        let dt = 60.0;
        let (new, deposit) = advance_channel(&dom, dt, &old, &spec);
        let i = 5;
        let mut before = 0.0;
        let mut after = 0.0;
        for k in dom.mesh.kc_bot[i]..=dom.mesh.k_srf {
            before += old[(i, k)] * dom.mesh.vol[(i, k)];
            after += new[(i, k)] * dom.mesh.vol[(i, k)];
        }
        let lost = before - after;
        assert!(
            (lost - deposit[i] * dt).abs() < 1e-9 * before.max(1.0),
            "lost={} deposited={}",
            lost,
            deposit[i] * dt
        );
    }

    #[test]
    fn test_source_pulls_toward_src_value() {
        let mut dom = still_domain();
        dom.src.q_src[(3, 5)] = 2.0;
        let old = Field2::filled(dom.t.ni(), dom.t.nk(), 10.0);
        let mut src = Field2::zeros(dom.mesh.nx + 1, dom.mesh.nz + 1);
        src[(3, 5)] = 30.0;
        let spec = uniform_spec(&dom, &src);
        let (new, _) = advance_channel(&dom, 60.0, &old, &spec);
        assert!(new[(3, 5)] > 10.0);
        // 其他单元不动
        assert!((new[(4, 5)] - 10.0).abs() < 1e-12);
    }
}
