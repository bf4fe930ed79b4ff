// crates/lh_physics/src/solids.rs

//! 悬浮颗粒积分器
//!
//! 每个粒径类走同一输运核心，差异只有三处：垂向对流速度带
//! Stokes 沉速偏移、床面沉降通量累入 `c_sed`、扩散增幅取
//! alpha_ss。浓度下限钳为零（迎风格式下仅数值噪声级的负值）。

use crate::domain::Domain;
use crate::transport::{advance_channel, ChannelSpec};
use lh_foundation::Scalar;

/// 推进全部粒径类一个时间步
pub fn advance(dom: &mut Domain, dt: Scalar) {
    let nps = dom.nps();
    let alpha = dom.particles.alpha_ss;
    for l in 0..nps {
        let old = dom.c[l].clone();
        let spec = ChannelSpec {
            alpha,
            settling: dom.w_ss[l],
            src_value: &dom.src.c_src[l],
            diff_x: &dom.dcx,
            diff_z: &dom.dcz,
            extra_rhs: None,
        };
        let (mut new, deposit) = advance_channel(dom, dt, &old, &spec);
        for v in new.as_mut_slice() {
            if *v < 0.0 {
                *v = 0.0;
            }
        }
        dom.c[l] = new;
        for i in 1..=dom.mesh.nx {
            dom.c_sed[l][i] += deposit[i] * dt;
        }
    }
    if nps > 0 {
        dom.mirror_ghost_bands();
    }
}
