// crates/lh_physics/src/turbulence/mod.rs

//! 湍流闭合
//!
//! 每个域可选两种闭合：
//! - [`richardson`]: 局地梯度 Richardson 数经验公式（默认）
//! - [`k_epsilon`]: k-ε 两方程模型，显式或逐列半隐式推进
//!
//! 两种模式共用水平扩散系数公式（网格尺度 + 分子物性下限）。
//! 闭合读取密度场，必须在密度更新之后调用。

pub mod k_epsilon;
pub mod richardson;

use crate::domain::Domain;
use lh_config::TurbulenceMode;
use lh_foundation::Scalar;

/// 湍动能下限 [m²/s²]
pub const TKE_MIN: Scalar = 1.25e-7;
/// 湍动能上限 [m²/s²]
pub const TKE_MAX: Scalar = 10.0;
/// 耗散率下限 [m²/s³]
pub const EPS_MIN: Scalar = 1.0e-9;
/// 涡粘性上限 [m²/s]
pub const NUT_MAX: Scalar = 0.2;
/// 垂向动量扩散下限 [m²/s]
pub const DMZ_MIN: Scalar = 1.4e-6;
/// 垂向热/浓度扩散下限 [m²/s]
pub const DHZ_MIN: Scalar = 1.4e-7;
/// Cμ（Launder-Spalding 标准值）
pub const C_MU: Scalar = 0.09;
/// c₁
pub const C_1: Scalar = 1.44;
/// c₂
pub const C_2: Scalar = 1.92;
/// σ_k
pub const SIGMA_K: Scalar = 1.0;
/// σ_ε
pub const SIGMA_EPS: Scalar = 1.3;
/// von Karman 常数
pub const KAPPA: Scalar = 0.41;
/// 粗糙长度 [m]
pub const Z0: Scalar = 1.0e-4;

/// 按域配置的模式更新全部涡扩散系数
///
/// `wind` 为水面风速 [m/s]（k-ε 表面边界用）。
pub fn update(dom: &mut Domain, dt: Scalar, wind: Scalar) {
    update_horizontal(dom);
    match dom.turbulence.mode {
        TurbulenceMode::Richardson => richardson::update_vertical(dom),
        TurbulenceMode::KEpsilon => k_epsilon::update_vertical(dom, dt, wind),
    }
}

/// 水平扩散系数：分子物性 + 网格尺度项
///
/// dmx = ν + (dmx0/86400)·dxs²，dhx/dcx 同形（α 为热扩散分子值）。
/// 系数置于 u 面（i = 1..nx-1），端面继承相邻值。
fn update_horizontal(dom: &mut Domain) {
    let mesh = &dom.mesh;
    let cfg = &dom.turbulence;
    let per_day = 1.0 / lh_foundation::SECONDS_PER_DAY;
    for i in 1..mesh.nx {
        let dxs2 = mesh.dxs[i] * mesh.dxs[i];
        for k in 1..=mesh.k_srf {
            let t_face = 0.5 * (dom.t[(i, k)] + dom.t[(i + 1, k)]);
            let nu = crate::density::kinematic_viscosity(t_face);
            let alpha = crate::density::thermal_diffusivity(t_face);
            dom.dmx[(i, k)] = nu + cfg.dmx0 * per_day * dxs2;
            dom.dhx[(i, k)] = alpha + cfg.dhx0 * per_day * dxs2;
            dom.dcx[(i, k)] = nu + cfg.dcx0 * per_day * dxs2;
        }
    }
    for k in 1..=mesh.k_srf {
        dom.dmx[(0, k)] = dom.dmx[(1, k)];
        dom.dhx[(0, k)] = dom.dhx[(1, k)];
        dom.dcx[(0, k)] = dom.dcx[(1, k)];
        dom.dmx[(mesh.nx, k)] = dom.dmx[(mesh.nx - 1, k)];
        dom.dhx[(mesh.nx, k)] = dom.dhx[(mesh.nx - 1, k)];
        dom.dcx[(mesh.nx, k)] = dom.dcx[(mesh.nx - 1, k)];
    }
}

/// w 面处的单元平均流速垂向梯度 [1/s]
#[inline]
pub(crate) fn du_dz(dom: &Domain, i: usize, k: usize) -> Scalar {
    let mesh = &dom.mesh;
    let u_lo = 0.5 * (dom.u[(i - 1, k)] + dom.u[(i, k)]);
    let u_hi = 0.5 * (dom.u[(i - 1, k + 1)] + dom.u[(i, k + 1)]);
    let dzs = mesh.dzs[k].max(1e-10);
    (u_hi - u_lo) / dzs
}
