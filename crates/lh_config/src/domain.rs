// crates/lh_config/src/domain.rs

//! 域配置记录
//!
//! 每个域的几何路径、初始状态、湍流参数与边界描述符。
//! 边界描述符按坐标记录位置，索引在求解器初始化时由几何推导；
//! 跨域连接（汇流、水管）只记录对端域 id，不持有引用。

use crate::error::ConfigError;
use crate::records::{TurbulenceConfig, MAX_OUTLETS};
use lh_foundation::Scalar;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================
// 时序来源
// ============================================================

/// 边界时序来源：文件或常值行
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    /// 时序文件（表头行 + `t v1 … vN` 行）
    File(PathBuf),
    /// 常值（整个模拟期间不变的一行变量）
    Constant(Vec<Scalar>),
}

// ============================================================
// 初始状态
// ============================================================

/// 标量场初始化方式
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldInit {
    /// 全场均一值
    Uniform(Scalar),
    /// 垂向剖面文件（`z value` 行，线性插值）
    Profile(PathBuf),
}

impl Default for FieldInit {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}

/// 域初始状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialState {
    /// 初始水面高程 [m]
    pub z_srf: Scalar,

    /// 初始水温 [°C]
    #[serde(default = "default_t_init")]
    pub temperature: FieldInit,

    /// 初始浓度 [g/m³]（全部粒径类共用）
    #[serde(default)]
    pub concentration: FieldInit,
}

fn default_t_init() -> FieldInit {
    FieldInit::Uniform(20.0)
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            z_srf: 0.0,
            temperature: default_t_init(),
            concentration: FieldInit::default(),
        }
    }
}

// ============================================================
// 边界描述符
// ============================================================

/// 入流口（上游端）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InletConfig {
    /// 时序：Q [m³/s], T [°C], c₁..c_nps [g/m³]
    pub schedule: ScheduleSource,

    /// 内部 Froude 数参考值 [-]
    #[serde(default = "default_froude")]
    pub froude: Scalar,

    /// 入流口宽度 [m]
    pub width: Scalar,

    /// 注入角 [deg]（相对水平）
    #[serde(default)]
    pub angle: Scalar,

    /// 等密度入流的高程下限 [m]
    #[serde(default = "default_z_low")]
    pub z_in_low: Scalar,
}

fn default_froude() -> Scalar {
    0.2
}
fn default_z_low() -> Scalar {
    -1.0e30
}

/// 出水口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutletConfig {
    /// 取水口中心高程 [m]
    pub z_out: Scalar,

    /// 闸门开度/口径 [m]
    #[serde(default = "default_gate")]
    pub gate_height: Scalar,

    /// 内部 Froude 数参考值 [-]
    #[serde(default = "default_froude")]
    pub froude: Scalar,

    /// 本口占全出流的比例 [-]（各口之和应为 1）
    #[serde(default = "default_share")]
    pub share: Scalar,

    /// 密度依存出流的上缘高程强制值 [m]
    #[serde(default)]
    pub z_top_override: Option<Scalar>,

    /// 密度依存出流的下缘高程强制值 [m]
    #[serde(default)]
    pub z_bot_override: Option<Scalar>,
}

fn default_gate() -> Scalar {
    1.0
}
fn default_share() -> Scalar {
    1.0
}

/// 支流入汇
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TributaryConfig {
    /// 入汇位置 x 坐标 [m]
    pub x_pos: Scalar,

    /// 时序：Q, T, c₁..c_nps
    pub schedule: ScheduleSource,

    /// 内部 Froude 数参考值 [-]
    #[serde(default = "default_froude")]
    pub froude: Scalar,

    /// 入汇宽度 [m]
    pub width: Scalar,

    /// 注入角 [deg]
    #[serde(default)]
    pub angle: Scalar,
}

/// 汇流连接（两域共享水面）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfluenceConfig {
    /// 对端域 id（1 起）
    pub partner_id: usize,

    /// 汇流点在本域的 x 坐标 [m]
    pub x_pos: Scalar,

    /// 本域是否为支汊（支汊东端开放，流量交给干流）
    #[serde(default)]
    pub is_branch: bool,
}

/// 跨域水管
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipeConfig {
    /// 对端域 id（1 起）。id 较小的域持有时序读数，对端取其相反数
    pub partner_id: usize,

    /// 管口在本域的 x 坐标 [m]
    pub x_pos: Scalar,

    /// 管口中心高程 [m]
    pub z_pos: Scalar,

    /// 时序：Q [m³/s]（正值表示从小 id 域流向大 id 域）
    pub schedule: ScheduleSource,

    /// 管口口径 [m]
    #[serde(default = "default_gate")]
    pub aperture: Scalar,

    /// 内部 Froude 数参考值 [-]
    #[serde(default = "default_froude")]
    pub froude: Scalar,
}

/// 点状入流（岸边排水口等）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointInflowConfig {
    /// x 坐标 [m]
    pub x_pos: Scalar,

    /// 注入高程 [m]
    pub z_pos: Scalar,

    /// 时序：Q, T, c₁..c_nps
    pub schedule: ScheduleSource,

    /// 内部 Froude 数参考值 [-]
    #[serde(default = "default_froude")]
    pub froude: Scalar,

    /// 口宽 [m]
    #[serde(default = "default_gate")]
    pub width: Scalar,
}

/// 点状取水
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointOutflowConfig {
    /// x 坐标 [m]
    pub x_pos: Scalar,

    /// 取水高程 [m]
    pub z_pos: Scalar,

    /// 时序：Q [m³/s]（正值取水）
    pub schedule: ScheduleSource,

    /// 内部 Froude 数参考值 [-]
    #[serde(default = "default_froude")]
    pub froude: Scalar,

    /// 口径 [m]
    #[serde(default = "default_gate")]
    pub aperture: Scalar,
}

/// 阻流幕类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FenceKind {
    /// 固定幕：高程区间不随水面变化
    Fixed {
        /// 下缘高程 [m]
        z_low: Scalar,
        /// 上缘高程 [m]
        z_high: Scalar,
    },
    /// 浮幕：上缘贴水面，幕深固定
    Floating {
        /// 幕深 [m]
        depth: Scalar,
    },
}

/// 阻流幕
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FenceConfig {
    /// 幕所在 x 坐标 [m]（吸附到最近的 u 面）
    pub x_pos: Scalar,

    /// 幕类型
    pub kind: FenceKind,
}

/// 测点
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// x 坐标 [m]
    pub x: Scalar,
    /// 高程 [m]
    pub z: Scalar,
}

// ============================================================
// 域配置
// ============================================================

/// 单个域的配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// 域名（输出文件前缀）
    pub name: String,

    /// 几何文件路径
    pub geometry: PathBuf,

    /// 初始状态
    #[serde(default)]
    pub initial: InitialState,

    /// 湍流闭合参数
    #[serde(default)]
    pub turbulence: TurbulenceConfig,

    /// 上游入流口
    #[serde(default)]
    pub inlet: Option<InletConfig>,

    /// 出水口（最多 10 个；空表示东端开放）
    #[serde(default)]
    pub outlets: Vec<OutletConfig>,

    /// 全出流时序：Q [m³/s]（按各口 share 分配）
    #[serde(default)]
    pub outflow_schedule: Option<ScheduleSource>,

    /// 支流入汇
    #[serde(default)]
    pub tributaries: Vec<TributaryConfig>,

    /// 汇流连接
    #[serde(default)]
    pub confluences: Vec<ConfluenceConfig>,

    /// 跨域水管
    #[serde(default)]
    pub pipes: Vec<PipeConfig>,

    /// 点状入流
    #[serde(default)]
    pub point_inflows: Vec<PointInflowConfig>,

    /// 点状取水
    #[serde(default)]
    pub point_outflows: Vec<PointOutflowConfig>,

    /// 阻流幕
    #[serde(default)]
    pub fences: Vec<FenceConfig>,

    /// 测点
    #[serde(default)]
    pub probes: Vec<ProbeConfig>,
}

impl DomainConfig {
    /// 校验（`id` 为本域 1 起编号，`ndom` 为域总数）
    pub fn validate(&self, id: usize, ndom: usize) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::invalid("domain.name", id, "域名不能为空"));
        }
        if self.outlets.len() > MAX_OUTLETS {
            return Err(ConfigError::invalid(
                "domain.outlets",
                self.outlets.len(),
                "出水口不得超过 10 个",
            ));
        }
        if !self.outlets.is_empty() && self.outflow_schedule.is_none() {
            return Err(ConfigError::Missing(format!(
                "域 {} 配置了出水口但缺少 outflow_schedule",
                self.name
            )));
        }
        if !self.outlets.is_empty() {
            let share_sum: Scalar = self.outlets.iter().map(|o| o.share).sum();
            if (share_sum - 1.0).abs() > 1e-6 {
                return Err(ConfigError::invalid(
                    "outlets.share",
                    share_sum,
                    "各出水口份额之和必须为 1",
                ));
            }
        }
        for cnf in &self.confluences {
            if cnf.partner_id == 0 || cnf.partner_id > ndom || cnf.partner_id == id {
                return Err(ConfigError::invalid(
                    "confluences.partner_id",
                    cnf.partner_id,
                    "对端域 id 越界或指向自身",
                ));
            }
        }
        for wtp in &self.pipes {
            if wtp.partner_id == 0 || wtp.partner_id > ndom || wtp.partner_id == id {
                return Err(ConfigError::invalid(
                    "pipes.partner_id",
                    wtp.partner_id,
                    "对端域 id 越界或指向自身",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_domain() -> DomainConfig {
        serde_json::from_str(r#"{ "name": "main", "geometry": "geom.dat" }"#).unwrap()
    }

    #[test]
    fn test_minimal_domain_defaults() {
        let dom = minimal_domain();
        assert!(dom.inlet.is_none());
        assert!(dom.outlets.is_empty());
        assert!(dom.validate(1, 1).is_ok());
    }

    #[test]
    fn test_outlet_without_schedule() {
        let mut dom = minimal_domain();
        dom.outlets.push(OutletConfig {
            z_out: 10.0,
            gate_height: 2.0,
            froude: 0.2,
            share: 1.0,
            z_top_override: None,
            z_bot_override: None,
        });
        assert!(dom.validate(1, 1).is_err());

        dom.outflow_schedule = Some(ScheduleSource::Constant(vec![5.0]));
        assert!(dom.validate(1, 1).is_ok());
    }

    #[test]
    fn test_share_sum_check() {
        let mut dom = minimal_domain();
        dom.outflow_schedule = Some(ScheduleSource::Constant(vec![5.0]));
        for _ in 0..2 {
            dom.outlets.push(OutletConfig {
                z_out: 10.0,
                gate_height: 2.0,
                froude: 0.2,
                share: 0.7,
                z_top_override: None,
                z_bot_override: None,
            });
        }
        assert!(dom.validate(1, 1).is_err());
    }

    #[test]
    fn test_confluence_partner_bounds() {
        let mut dom = minimal_domain();
        dom.confluences.push(ConfluenceConfig {
            partner_id: 3,
            x_pos: 100.0,
            is_branch: true,
        });
        assert!(dom.validate(1, 2).is_err());
    }
}
