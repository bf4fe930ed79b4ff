// crates/lh_physics/src/density.rs

//! 密度与静水压
//!
//! - 状态方程：水温三次多项式 + 浊度修正
//! - 静水压：表层起算、逐层向下积分
//! - `rho_avg`：w 面处的体积加权层平均密度，供密度选择性
//!   取排水定位使用
//!
//! 分子物性多项式（粘性、导热）也放在本模块，Richardson 闭合与
//! Stokes 沉速共用。

use crate::domain::Domain;
use lh_foundation::{Scalar, GRAVITY};

/// 清水密度 [kg/m³]
///
/// ρ(T) = 4e-5·T³ − 7.84e-3·T² + 5.817e-2·T + 999.855
#[inline]
pub fn water_density(t: Scalar) -> Scalar {
    ((4.0e-5 * t - 7.84e-3) * t + 5.817e-2) * t + 999.855
}

/// 浊水密度 [kg/m³]
///
/// ρ' = ρ + c/1000·(1 − ρ/ρ_ss)，c 为全粒径类浓度之和 [g/m³]
#[inline]
pub fn turbid_density(t: Scalar, c_total: Scalar, rho_ss: Scalar) -> Scalar {
    let rho = water_density(t);
    rho + c_total / 1000.0 * (1.0 - rho / rho_ss)
}

/// 动力粘性系数 [Pa·s]
///
/// μ(T) = 4.486e-7·T² − 4.597e-5·T + 1.756e-3
#[inline]
pub fn dynamic_viscosity(t: Scalar) -> Scalar {
    (4.486e-7 * t - 4.597e-5) * t + 1.756e-3
}

/// 运动粘性系数 [m²/s]
#[inline]
pub fn kinematic_viscosity(t: Scalar) -> Scalar {
    dynamic_viscosity(t) / water_density(t)
}

/// 导热系数 [W/(m·K)]
///
/// λ(T) = 4.1e-8·T⁴ − 5.2e-6·T³ + 2.1e-4·T² − 1.77e-3·T + 0.5818
#[inline]
pub fn thermal_conductivity(t: Scalar) -> Scalar {
    (((4.1e-8 * t - 5.2e-6) * t + 2.1e-4) * t - 1.77e-3) * t + 0.5818
}

/// 水的比热 [J/(kg·K)]
pub const SPECIFIC_HEAT: Scalar = 4186.0;

/// 热扩散系数 [m²/s]（λ/(ρ·cp)）
#[inline]
pub fn thermal_diffusivity(t: Scalar) -> Scalar {
    thermal_conductivity(t) / (water_density(t) * SPECIFIC_HEAT)
}

// ============================================================
// 场更新
// ============================================================

/// 由温度场与浓度场更新密度场
pub fn update_density(dom: &mut Domain) {
    let mesh = &dom.mesh;
    let rho_ss = dom.particles.rho_ss;
    for i in 1..=mesh.nx {
        for k in mesh.kc_bot[i]..=mesh.k_srf {
            let mut c_total = 0.0;
            for c in &dom.c {
                c_total += c[(i, k)];
            }
            dom.rho[(i, k)] = turbid_density(dom.t[(i, k)], c_total, rho_ss);
        }
        // 幽灵层（表层上一行）镜像，供垂向梯度计算
        dom.rho[(i, mesh.k_srf + 1)] = dom.rho[(i, mesh.k_srf)];
    }
}

/// 静水压柱更新 [Pa]
///
/// 表层：p = ρ·g·(z_srf − zc(k_srf))；向下逐层
/// p(k) = p(k+1) + (ρ(k)+ρ(k+1))/2·g·dzs(k)
pub fn update_pressure(dom: &mut Domain) {
    let mesh = &dom.mesh;
    let k_srf = mesh.k_srf;
    for i in 1..=mesh.nx {
        dom.p[(i, k_srf)] = dom.rho[(i, k_srf)] * GRAVITY * (mesh.z_srf - mesh.zc(k_srf));
        if k_srf > 1 {
            for k in (mesh.kc_bot[i]..k_srf).rev() {
                let rho_face = 0.5 * (dom.rho[(i, k)] + dom.rho[(i, k + 1)]);
                dom.p[(i, k)] = dom.p[(i, k + 1)] + rho_face * GRAVITY * mesh.dzs[k];
            }
        }
    }
}

/// w 面处的层平均密度（体积加权、全断面聚合）
///
/// rho_avg[k] 表示高程 z(k) 处整个断面的代表密度，
/// 取排水选层扫描的就是这条垂线。
pub fn update_column_avg_density(dom: &mut Domain) {
    let mesh = &dom.mesh;
    let k_srf = mesh.k_srf;
    for k in 0..=mesh.nz {
        let mut weighted = 0.0;
        let mut weight = 0.0;
        for i in 1..=mesh.nx {
            // 面 k 两侧的湿单元参与加权
            if k >= mesh.kc_bot[i] && k <= k_srf {
                weighted += dom.rho[(i, k)] * mesh.vol[(i, k)];
                weight += mesh.vol[(i, k)];
            }
            if k + 1 >= mesh.kc_bot[i] && k + 1 <= k_srf {
                weighted += dom.rho[(i, k + 1)] * mesh.vol[(i, k + 1)];
                weight += mesh.vol[(i, k + 1)];
            }
        }
        if weight > 0.0 {
            dom.rho_avg[k] = weighted / weight;
        }
    }
    // 干面（表层以上、床面以下）延拓邻值，保证扫描时剖面连续
    for k in (0..k_srf.min(mesh.nz)).rev() {
        if dom.rho_avg[k] <= 0.0 {
            dom.rho_avg[k] = dom.rho_avg[k + 1];
        }
    }
    for k in (k_srf + 1)..=mesh.nz {
        dom.rho_avg[k] = dom.rho_avg[k - 1];
    }
    if k_srf <= mesh.nz {
        // 表层面本身由表层单元代表
        let mut weighted = 0.0;
        let mut weight = 0.0;
        for i in 1..=mesh.nx {
            if k_srf >= mesh.kc_bot[i] {
                weighted += dom.rho[(i, k_srf)] * mesh.vol[(i, k_srf)];
                weight += mesh.vol[(i, k_srf)];
            }
        }
        if weight > 0.0 {
            dom.rho_avg[k_srf] = weighted / weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eos_maximum_density_near_4c() {
        // 清水密度在 4°C 附近取极大
        let rho_4 = water_density(4.0);
        assert!(rho_4 > water_density(0.0));
        assert!(rho_4 > water_density(10.0));
        assert!((rho_4 - 1000.0).abs() < 0.1);
    }

    #[test]
    fn test_turbidity_increases_density() {
        let clear = turbid_density(20.0, 0.0, 2650.0);
        let turbid = turbid_density(20.0, 500.0, 2650.0);
        assert!(turbid > clear);
        // c = 500 g/m³ ⇒ Δρ ≈ 0.5·(1 − ρ/ρss) ≈ 0.31 kg/m³
        assert!((turbid - clear - 0.5 * (1.0 - clear / 2650.0)).abs() < 1e-10);
    }

    #[test]
    fn test_viscosity_decreases_with_temperature() {
        assert!(dynamic_viscosity(5.0) > dynamic_viscosity(25.0));
        // 20°C 时 μ ≈ 1.0e-3 Pa·s
        assert!((dynamic_viscosity(20.0) - 1.0e-3).abs() < 2e-4);
    }

    #[test]
    fn test_thermal_diffusivity_magnitude() {
        // 量级 1.4e-7 m²/s
        let alpha = thermal_diffusivity(20.0);
        assert!(alpha > 1.0e-7 && alpha < 2.0e-7);
    }
}
