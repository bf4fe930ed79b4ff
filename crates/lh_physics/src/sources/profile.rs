// crates/lh_physics/src/sources/profile.rs

//! 密度选择性分布核心
//!
//! 所有非点状取排水共用的垂向分配机制：
//! 1. 在 `rho_avg` 剖面上定位与源水等密度的层 `kc`（或按给定高程）
//! 2. 由内部 Froude 数匹配求射流厚度 δ
//! 3. 以 3.92σ 高斯权重在 [z_src−δ/2, z_src+δ/2] 内分配流量，
//!    面积加权并归一化，保证面积分流量恰为 Q
//!
//! ```text
//! ε = max(−(ρ_avg(kc) − ρ_avg(kc−1))/(z(kc) − z(kc−1))/ρ_w, 1e-6)
//! δ = clamp(sqrt(|Q|/(Fr·b·sqrt(ε·g))), 2·dz(kc), z(nz)−z(0))
//! f(k) = exp(−0.5·(ζ·3.92)²),  ζ = (zc(k)−z_src)/δ ∈ [−0.5, 0.5]
//! ```

use crate::domain::Domain;
use lh_foundation::{LhError, LhResult, Scalar, GRAVITY, RHO_WATER};

/// 高斯宽度常数：ζ=±0.5 处恰为半功率点
const GAUSS_SCALE: Scalar = 3.92;

/// 密度剖面定位：返回与 `rho_src` 等密度的层索引 kc
///
/// 自表层向下扫描 `rho_avg` 找包含 `rho_src` 的密度区间；
/// 比底部更重落到底层，比表层更轻落到表层。水柱无湿层时报错。
pub fn locate_by_density(dom: &Domain, rho_src: Scalar, kb: usize) -> LhResult<usize> {
    let k_srf = dom.mesh.k_srf;
    if kb > k_srf {
        return Err(LhError::invalid_input("水柱无湿层，无法定位等密度层"));
    }
    if !rho_src.is_finite() {
        return Err(LhError::invalid_input(format!("源水密度非有限值: {}", rho_src)));
    }
    // rho_avg 随高度单调不增（稳定分层）；自上而下找首个更重的面
    if rho_src <= dom.rho_avg[k_srf] {
        return Ok(k_srf);
    }
    for kc in (kb..=k_srf).rev() {
        // 层 kc 介于面 kc-1（下）与 kc（上）之间
        if rho_src <= dom.rho_avg[kc - 1] && rho_src >= dom.rho_avg[kc] {
            return Ok(kc);
        }
    }
    Ok(kb)
}

/// 按高程定位层索引（限制在湿层范围内）
pub fn locate_by_elevation(dom: &Domain, z: Scalar, kb: usize) -> usize {
    dom.mesh.layer_of_z(z).clamp(kb, dom.mesh.k_srf)
}

/// Froude 匹配射流厚度 δ [m]（平面射流）
pub fn froude_thickness(dom: &Domain, q: Scalar, froude: Scalar, width: Scalar, kc: usize) -> Scalar {
    let mesh = &dom.mesh;
    let eps = density_gradient_eps(dom, kc);
    let b = width.max(1e-6);
    let fr = froude.max(1e-6);
    let raw = (q.abs() / (fr * b * (eps * GRAVITY).sqrt())).sqrt();
    let z_range = mesh.z[mesh.nz] - mesh.z[0];
    raw.clamp(2.0 * mesh.dz0[kc], z_range)
}

/// Froude 匹配射流厚度 δ [m]（轴对称取水口，体积立方根尺度）
pub fn froude_thickness_axisymmetric(
    dom: &Domain,
    q: Scalar,
    froude: Scalar,
    kc: usize,
) -> Scalar {
    let mesh = &dom.mesh;
    let eps = density_gradient_eps(dom, kc);
    let fr = froude.max(1e-6);
    let raw = (q.abs() / (fr * (eps * GRAVITY).sqrt())).powf(1.0 / 3.0);
    let z_range = mesh.z[mesh.nz] - mesh.z[0];
    raw.clamp(2.0 * mesh.dz0[kc], z_range)
}

/// kc 处的无量纲密度梯度 ε（下限 1e-6）
pub fn density_gradient_eps(dom: &Domain, kc: usize) -> Scalar {
    let mesh = &dom.mesh;
    let dz = (mesh.z[kc] - mesh.z[kc - 1]).max(1e-10);
    let drho = dom.rho_avg[kc] - dom.rho_avg[kc - 1];
    (-(drho) / dz / RHO_WATER).max(1e-6)
}

/// 高斯权重分配
///
/// 权重 `f(k)·area[k]` 在 `kb..=k_srf` 上归一化；全零（源高程
/// 落在干区）时退化为 kc 单层。返回长度 `nz+1` 的分配系数，
/// 和为 1。
pub fn gaussian_weights(
    dom: &Domain,
    areas: &dyn Fn(usize) -> Scalar,
    z_src: Scalar,
    delta: Scalar,
    kb: usize,
    kc: usize,
) -> Vec<Scalar> {
    let mesh = &dom.mesh;
    let k_srf = mesh.k_srf;
    let mut weights = vec![0.0; mesh.nz + 1];
    let delta = delta.max(1e-6);
    let mut sum = 0.0;
    for (k, wk) in weights.iter_mut().enumerate().take(k_srf + 1).skip(kb) {
        let zeta = (mesh.zc(k) - z_src) / delta;
        if !(-0.5..=0.5).contains(&zeta) {
            continue;
        }
        let f = (-0.5 * (zeta * GAUSS_SCALE) * (zeta * GAUSS_SCALE)).exp();
        *wk = f * areas(k).max(0.0);
        sum += *wk;
    }
    if sum > 0.0 {
        for wk in &mut weights {
            *wk /= sum;
        }
    } else {
        weights[kc.clamp(kb, k_srf)] = 1.0;
    }
    weights
}
