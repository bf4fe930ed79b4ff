// crates/lh_config/src/records.rs

//! 模拟控制记录
//!
//! 顶层控制、动量/热量选项、粒径谱与湍流参数。全部使用 f64 存储，
//! 通过 serde 默认值保证缺省字段可用，`validate()` 统一校验。

use crate::domain::DomainConfig;
use crate::error::ConfigError;
use lh_foundation::Scalar;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 域数量上限
pub const MAX_DOMAINS: usize = 10;

/// 粒径类数量上限
pub const MAX_PARTICLE_CLASSES: usize = 20;

/// 出水口数量上限（每个域）
pub const MAX_OUTLETS: usize = 10;

// ============================================================
// 顶层配置
// ============================================================

/// 模拟配置（顶层）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 各域配置（1 ~ 10 个，顺序即域 id）
    pub domains: Vec<DomainConfig>,

    /// 时间推进控制
    #[serde(default)]
    pub time: TimeControl,

    /// 重启控制
    #[serde(default)]
    pub restart: RestartControl,

    /// 输出控制
    #[serde(default)]
    pub output: OutputControl,

    /// 动量方程选项
    #[serde(default)]
    pub momentum: MomentumOptions,

    /// 热量方程选项
    #[serde(default)]
    pub heat: HeatOptions,

    /// 悬浮颗粒谱
    #[serde(default)]
    pub particles: ParticleSpec,

    /// 入流分配模式
    #[serde(default)]
    pub inflow_mode: InflowMode,

    /// 出流分配模式
    #[serde(default)]
    pub outflow_mode: OutflowMode,
}

impl SimulationConfig {
    /// 从 JSON 文件加载
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// 序列化为 JSON 字符串（配置回显用）
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 域数量
    pub fn ndom(&self) -> usize {
        self.domains.len()
    }

    /// 校验配置一致性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domains.is_empty() || self.domains.len() > MAX_DOMAINS {
            return Err(ConfigError::invalid(
                "domains",
                self.domains.len(),
                "域数量必须在 1~10 之间",
            ));
        }
        if self.time.dt_sec <= 0.0 {
            return Err(ConfigError::invalid("time.dt_sec", self.time.dt_sec, "必须为正"));
        }
        if self.time.it_max == 0 {
            return Err(ConfigError::invalid("time.it_max", self.time.it_max, "必须为正"));
        }
        self.particles.validate()?;
        self.heat.validate()?;
        for (idx, dom) in self.domains.iter().enumerate() {
            dom.validate(idx + 1, self.domains.len())?;
        }
        // 汇流与水管的对端 id 必须互相指认
        for (idx, dom) in self.domains.iter().enumerate() {
            let id = idx + 1;
            for cnf in &dom.confluences {
                let partner = &self.domains[cnf.partner_id - 1];
                if !partner.confluences.iter().any(|c| c.partner_id == id) {
                    return Err(ConfigError::invalid(
                        "confluences.partner_id",
                        cnf.partner_id,
                        "对端域未声明对应的汇流记录",
                    ));
                }
            }
            for wtp in &dom.pipes {
                let partner = &self.domains[wtp.partner_id - 1];
                if !partner.pipes.iter().any(|p| p.partner_id == id) {
                    return Err(ConfigError::invalid(
                        "pipes.partner_id",
                        wtp.partner_id,
                        "对端域未声明对应的水管记录",
                    ));
                }
            }
        }
        Ok(())
    }
}

// ============================================================
// 时间与输出控制
// ============================================================

/// 时间推进控制
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeControl {
    /// 固定时间步模式（true 时 dt 超稳定界即失败）
    #[serde(default = "default_true")]
    pub fixed_dt: bool,

    /// 时间步长 [s]
    #[serde(default = "default_dt_sec")]
    pub dt_sec: Scalar,

    /// 最大步数
    #[serde(default = "default_it_max")]
    pub it_max: usize,

    /// 起始时刻 [day]
    #[serde(default)]
    pub start_day: Scalar,
}

fn default_true() -> bool {
    true
}
fn default_dt_sec() -> Scalar {
    60.0
}
fn default_it_max() -> usize {
    10000
}

impl Default for TimeControl {
    fn default() -> Self {
        Self {
            fixed_dt: true,
            dt_sec: default_dt_sec(),
            it_max: default_it_max(),
            start_day: 0.0,
        }
    }
}

/// 重启控制
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestartControl {
    /// 是否从快照重启
    #[serde(default)]
    pub enabled: bool,

    /// 快照编号
    #[serde(default)]
    pub snapshot_id: usize,
}

/// 输出控制
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputControl {
    /// 快照输出间隔 [步]（0 表示不输出）
    #[serde(default = "default_snap_interval")]
    pub snap_interval: usize,

    /// 时序/测点输出间隔 [步]
    #[serde(default = "default_series_interval")]
    pub series_interval: usize,

    /// 输出目录
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

fn default_snap_interval() -> usize {
    1440
}
fn default_series_interval() -> usize {
    60
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for OutputControl {
    fn default() -> Self {
        Self {
            snap_interval: default_snap_interval(),
            series_interval: default_series_interval(),
            out_dir: default_out_dir(),
        }
    }
}

// ============================================================
// 动量与热量选项
// ============================================================

/// 动量方程选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumOptions {
    /// 是否计入压力梯度项
    #[serde(default = "default_true")]
    pub pressure_grad: bool,

    /// 是否对压力梯度做时间滤波
    #[serde(default)]
    pub smooth_pgx: bool,

    /// 压力梯度异常阈值 [m⁴/s²]
    #[serde(default = "default_threshold_pgx")]
    pub threshold_pgx: Scalar,

    /// 压力梯度滤波系数 β ∈ [0,1)
    #[serde(default = "default_beta_pgx")]
    pub beta_pgx: Scalar,

    /// 是否计入床面坡度重力分量
    #[serde(default)]
    pub gravity_slope: bool,

    /// 坡度下限 [-]
    #[serde(default)]
    pub init_slope: Scalar,
}

fn default_threshold_pgx() -> Scalar {
    1.0
}
fn default_beta_pgx() -> Scalar {
    0.9
}

impl Default for MomentumOptions {
    fn default() -> Self {
        Self {
            pressure_grad: true,
            smooth_pgx: false,
            threshold_pgx: default_threshold_pgx(),
            beta_pgx: default_beta_pgx(),
            gravity_slope: false,
            init_slope: 0.0,
        }
    }
}

/// 热量方程选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatOptions {
    /// 是否计入穿透性短波辐射
    #[serde(default)]
    pub radiation: bool,

    /// 水面反照率 [-]
    #[serde(default = "default_albedo")]
    pub ar: Scalar,

    /// 表层吸收率 β [-]（短波在表面立即吸收的份额）
    #[serde(default = "default_beta_sw")]
    pub beta: Scalar,

    /// 消光系数 η [1/m]
    #[serde(default = "default_eta")]
    pub eta: Scalar,

    /// 风速观测高度 [m]
    #[serde(default = "default_z_wind")]
    pub z_wind: Scalar,

    /// 热扩散增幅系数 [-]
    #[serde(default = "default_one")]
    pub alpha_heat: Scalar,

    /// 气象时序文件
    #[serde(default)]
    pub meteo_file: Option<PathBuf>,
}

fn default_albedo() -> Scalar {
    0.06
}
fn default_beta_sw() -> Scalar {
    0.45
}
fn default_eta() -> Scalar {
    0.35
}
fn default_z_wind() -> Scalar {
    10.0
}
fn default_one() -> Scalar {
    1.0
}

impl Default for HeatOptions {
    fn default() -> Self {
        Self {
            radiation: false,
            ar: default_albedo(),
            beta: default_beta_sw(),
            eta: default_eta(),
            z_wind: default_z_wind(),
            alpha_heat: 1.0,
            meteo_file: None,
        }
    }
}

impl HeatOptions {
    /// 校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.ar) {
            return Err(ConfigError::invalid("heat.ar", self.ar, "反照率必须在 [0,1]"));
        }
        if !(0.0..=1.0).contains(&self.beta) {
            return Err(ConfigError::invalid("heat.beta", self.beta, "表层吸收率必须在 [0,1]"));
        }
        if self.eta < 0.0 {
            return Err(ConfigError::invalid("heat.eta", self.eta, "消光系数必须非负"));
        }
        Ok(())
    }
}

// ============================================================
// 粒径谱
// ============================================================

/// 单个粒径类
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParticleClass {
    /// 粒径 [m]
    pub diameter: Scalar,
}

/// 悬浮颗粒谱
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSpec {
    /// 粒径类（最多 20 类）
    #[serde(default)]
    pub classes: Vec<ParticleClass>,

    /// 颗粒密度 [kg/m³]
    #[serde(default = "default_rho_ss")]
    pub rho_ss: Scalar,

    /// 浓度扩散增幅系数 [-]
    #[serde(default = "default_one")]
    pub alpha_ss: Scalar,
}

fn default_rho_ss() -> Scalar {
    2650.0
}

impl Default for ParticleSpec {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            rho_ss: default_rho_ss(),
            alpha_ss: 1.0,
        }
    }
}

impl ParticleSpec {
    /// 粒径类数量
    pub fn nps(&self) -> usize {
        self.classes.len()
    }

    /// 校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classes.len() > MAX_PARTICLE_CLASSES {
            return Err(ConfigError::invalid(
                "particles.classes",
                self.classes.len(),
                "粒径类不得超过 20",
            ));
        }
        for (l, class) in self.classes.iter().enumerate() {
            if class.diameter <= 0.0 {
                return Err(ConfigError::invalid(
                    "particles.diameter",
                    format!("class {}: {}", l + 1, class.diameter),
                    "粒径必须为正",
                ));
            }
        }
        if self.rho_ss <= 1000.0 {
            return Err(ConfigError::invalid(
                "particles.rho_ss",
                self.rho_ss,
                "颗粒密度必须大于水密度",
            ));
        }
        Ok(())
    }
}

// ============================================================
// 分配模式
// ============================================================

/// 入流分配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InflowMode {
    /// 等密度高程正态分布入流
    #[default]
    Edi,
    /// 平均水深分布的河川入流
    Rid,
    /// 单层密度选择入流
    Ri1,
}

/// 出流分配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutflowMode {
    /// 取水口高程正态分布出流
    #[default]
    Ndo,
    /// 闸门高度等分出流
    Edo,
    /// 密度依存双侧射流出流
    Ddd,
}

// ============================================================
// 湍流参数
// ============================================================

/// 湍流闭合模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurbulenceMode {
    /// Richardson 数经验闭合
    #[default]
    Richardson,
    /// k-ε 两方程闭合
    KEpsilon,
}

/// 湍流闭合参数（每域）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurbulenceConfig {
    /// 闭合模式
    #[serde(default)]
    pub mode: TurbulenceMode,

    /// 水平动量扩散系数因子 [1/day]
    #[serde(default = "default_one")]
    pub dmx0: Scalar,

    /// 水平热扩散系数因子 [1/day]
    #[serde(default = "default_one")]
    pub dhx0: Scalar,

    /// 水平浓度扩散系数因子 [1/day]
    #[serde(default = "default_one")]
    pub dcx0: Scalar,

    /// 垂向动量涡粘性基值 [m²/s]
    #[serde(default = "default_dmz0")]
    pub dmz0: Scalar,

    /// 垂向热扩散基值 [m²/s]
    #[serde(default = "default_dhz0")]
    pub dhz0: Scalar,

    /// 垂向浓度扩散基值 [m²/s]
    #[serde(default = "default_dhz0")]
    pub dcz0: Scalar,

    /// 动量 Richardson 衰减指数 [-]
    #[serde(default = "default_ri_decay")]
    pub ll: Scalar,

    /// 热量 Richardson 衰减指数 [-]
    #[serde(default = "default_ri_decay")]
    pub mm: Scalar,

    /// 浓度 Richardson 衰减指数 [-]
    #[serde(default = "default_ri_decay")]
    pub nn: Scalar,

    /// 不稳定分层强制混合系数 [m²/s]
    #[serde(default = "default_dmix")]
    pub dmix: Scalar,

    /// k-ε 使用逐列半隐式三对角步（false 时显式迎风）
    #[serde(default = "default_true")]
    pub semi_implicit: bool,

    /// 自由滑移（k-ε 模式下底面/水面涡粘性置零）
    #[serde(default)]
    pub freeslip: bool,
}

fn default_dmz0() -> Scalar {
    1.0e-4
}
fn default_dhz0() -> Scalar {
    1.0e-5
}
fn default_ri_decay() -> Scalar {
    1.3
}
fn default_dmix() -> Scalar {
    1.0e-3
}

impl Default for TurbulenceConfig {
    fn default() -> Self {
        Self {
            mode: TurbulenceMode::Richardson,
            dmx0: 1.0,
            dhx0: 1.0,
            dcx0: 1.0,
            dmz0: default_dmz0(),
            dhz0: default_dhz0(),
            dcz0: default_dhz0(),
            ll: default_ri_decay(),
            mm: default_ri_decay(),
            nn: default_ri_decay(),
            dmix: default_dmix(),
            semi_implicit: true,
            freeslip: false,
        }
    }
}
