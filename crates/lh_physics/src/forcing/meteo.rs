// crates/lh_physics/src/forcing/meteo.rs

//! 气象强迫与水面热通量
//!
//! 水面净热通量由三部分组成：
//! - 净短波 φ₀ = (1−ar)·solar，radiation 选项开启时仅表层吸收份额
//!   β·φ₀ 记入水面，其余按 Beer-Lambert 衰减穿透水体
//! - 长波收支：Swinbank 大气逆辐射 − 水面黑体辐射
//! - 蒸发/传导：Rohwer 蒸发公式 + Bowen 比传导
//!
//! 饱和水汽压采用 Murray (1966)，mbar 换算 mmHg（×0.75006）。

use lh_config::HeatOptions;
use lh_foundation::Scalar;
use serde::{Deserialize, Serialize};

/// Stefan-Boltzmann 常数 [W/(m²·K⁴)]
const STEFAN_BOLTZMANN: Scalar = 5.67e-8;

/// 水面发射率 [-]
const EMISSIVITY_WATER: Scalar = 0.97;

/// 蒸发潜热 [J/kg]
const LATENT_HEAT: Scalar = 2.45e6;

/// mbar → mmHg
const MBAR_TO_MMHG: Scalar = 0.75006;

/// 一组气象读数
///
/// 时序变量顺序：solar, t_air, e_air, wind, cloud
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MeteoRecord {
    /// 太阳短波辐射 [W/m²]
    pub solar: Scalar,
    /// 气温 [°C]
    pub t_air: Scalar,
    /// 大气水汽压 [mmHg]
    pub e_air: Scalar,
    /// 风速（观测高度处）[m/s]
    pub wind: Scalar,
    /// 云量 [0-1]
    pub cloud: Scalar,
}

impl MeteoRecord {
    /// 从时序行构造（列序固定）
    pub fn from_row(row: &[Scalar]) -> Self {
        Self {
            solar: row.first().copied().unwrap_or(0.0),
            t_air: row.get(1).copied().unwrap_or(15.0),
            e_air: row.get(2).copied().unwrap_or(10.0),
            wind: row.get(3).copied().unwrap_or(0.0),
            cloud: row.get(4).copied().unwrap_or(0.0),
        }
    }
}

/// Murray (1966) 饱和水汽压 [mmHg]
///
/// es = 6.1078·exp(17.2693882·T/(T+237.3)) [mbar]，×0.75006 换算
#[inline]
pub fn saturation_vapor_mmhg(t: Scalar) -> Scalar {
    6.1078 * (17.2693882 * t / (t + 237.3)).exp() * MBAR_TO_MMHG
}

/// Rohwer (1931) 蒸发热通量 [W/m²]（正值为失热）
///
/// 质量传输型风函数 f(W) = a + b·W，乘以水面-大气水汽压差 [mmHg]。
pub fn evaporation_flux(t_srf: Scalar, meteo: &MeteoRecord) -> Scalar {
    let es = saturation_vapor_mmhg(t_srf);
    let deficit = es - meteo.e_air;
    // Rohwer 风函数 [m/s per mmHg]，折算为蒸发速率
    let f_wind = 3.08e-9 + 1.85e-9 * meteo.wind;
    let evap_rate = f_wind * deficit; // [m/s]
    lh_foundation::RHO_WATER * LATENT_HEAT * evap_rate
}

/// Bowen 比传导热通量 [W/m²]（正值为失热）
pub fn conduction_flux(t_srf: Scalar, meteo: &MeteoRecord) -> Scalar {
    let es = saturation_vapor_mmhg(t_srf);
    let deficit = es - meteo.e_air;
    if deficit.abs() < 1e-12 {
        return 0.0;
    }
    let bowen = 0.46 * (t_srf - meteo.t_air) / deficit;
    bowen * evaporation_flux(t_srf, meteo)
}

/// Swinbank 大气长波逆辐射 [W/m²]（正值为得热）
///
/// φ_a = 0.97·9.37e-6·σ·Ta⁶·(1 + 0.17·C²)
pub fn atmospheric_longwave(meteo: &MeteoRecord) -> Scalar {
    let ta_k = meteo.t_air + 273.15;
    let cloud_amp = 1.0 + 0.17 * meteo.cloud * meteo.cloud;
    EMISSIVITY_WATER * 9.37e-6 * STEFAN_BOLTZMANN * ta_k.powi(6) * cloud_amp
}

/// 水面黑体辐射 [W/m²]（正值为失热）
pub fn back_radiation(t_srf: Scalar) -> Scalar {
    let ts_k = t_srf + 273.15;
    EMISSIVITY_WATER * STEFAN_BOLTZMANN * ts_k.powi(4)
}

/// 水面净热通量 [W/m²]（正值为入水）
///
/// radiation 开启时短波只计表层吸收份额 β·(1−ar)·solar，
/// 其余由 [`penetrating_flux`] 在水体内衰减吸收；关闭时短波
/// 全部记入水面。
pub fn surface_heat_flux(t_srf: Scalar, meteo: &MeteoRecord, opts: &HeatOptions) -> Scalar {
    let phi0 = (1.0 - opts.ar) * meteo.solar;
    let shortwave = if opts.radiation { opts.beta * phi0 } else { phi0 };
    shortwave + atmospheric_longwave(meteo)
        - back_radiation(t_srf)
        - evaporation_flux(t_srf, meteo)
        - conduction_flux(t_srf, meteo)
}

/// 水深 depth 处的穿透短波通量 [W/m²]
///
/// φ(d) = (1−β)·(1−ar)·solar·exp(−η·d)
pub fn penetrating_flux(depth: Scalar, solar: Scalar, opts: &HeatOptions) -> Scalar {
    if !opts.radiation || depth < 0.0 {
        return 0.0;
    }
    (1.0 - opts.beta) * (1.0 - opts.ar) * solar * (-opts.eta * depth).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calm_meteo() -> MeteoRecord {
        MeteoRecord {
            solar: 0.0,
            t_air: 20.0,
            e_air: saturation_vapor_mmhg(20.0),
            wind: 0.0,
            cloud: 0.0,
        }
    }

    #[test]
    fn test_saturation_vapor_reference_points() {
        // 0°C: 6.1078 mbar = 4.58 mmHg；20°C ≈ 17.5 mmHg
        assert!((saturation_vapor_mmhg(0.0) - 4.581).abs() < 0.01);
        assert!((saturation_vapor_mmhg(20.0) - 17.53).abs() < 0.1);
    }

    #[test]
    fn test_equilibrium_flux_sign() {
        // 水气同温、饱和湿度、无风无光：净通量应接近零
        // （长波收支在 Ta=Ts 时 Swinbank 与黑体辐射不严格抵消，
        //   容许小的残差）
        let meteo = calm_meteo();
        let flux = surface_heat_flux(20.0, &meteo, &HeatOptions::default());
        assert!(flux.abs() < 100.0);
    }

    #[test]
    fn test_warm_water_loses_heat() {
        let meteo = calm_meteo();
        let cold = surface_heat_flux(10.0, &meteo, &HeatOptions::default());
        let warm = surface_heat_flux(30.0, &meteo, &HeatOptions::default());
        assert!(warm < cold);
    }

    #[test]
    fn test_wind_increases_evaporation() {
        let mut meteo = calm_meteo();
        meteo.e_air = 5.0;
        let calm = evaporation_flux(25.0, &meteo);
        meteo.wind = 10.0;
        let windy = evaporation_flux(25.0, &meteo);
        assert!(windy > calm);
        assert!(calm > 0.0);
    }

    #[test]
    fn test_penetrating_flux_decay() {
        let opts = HeatOptions {
            radiation: true,
            ..Default::default()
        };
        let phi1 = penetrating_flux(1.0, 800.0, &opts);
        let phi5 = penetrating_flux(5.0, 800.0, &opts);
        assert!(phi1 > phi5);
        assert!(phi5 > 0.0);
        // 关闭 radiation 时无穿透
        let off = penetrating_flux(1.0, 800.0, &HeatOptions::default());
        assert!(off.abs() < 1e-12);
    }
}
