// crates/lh_physics/src/domain.rs

//! 域实体
//!
//! 模拟的主实体：一次模拟持有 1~10 个按 id 排序的域。每个域独占
//! 自己的网格与场数组；跨域连接（汇流、水管）只记录对端域 id，
//! 由耦合器按 id 顺序访问，不形成所有权环。
//!
//! 原始模型中对域数组的裸别名在这里表达为方法内的局部借用，
//! 所有权始终归域本身。

use crate::density;
use crate::forcing::{ScheduleCursor, ScheduleSeries};
use crate::mesh::{GeometryData, StaggeredMesh};
use lh_config::{
    DomainConfig, FenceKind, FieldInit, ParticleSpec, TurbulenceConfig,
};
use lh_foundation::{lerp, Field2, LhError, LhResult, Scalar, GRAVITY};

// ============================================================
// 运行时边界描述符
// ============================================================

/// 入流口（运行时）
#[derive(Debug, Clone)]
pub struct Inlet {
    /// 内部 Froude 数参考值
    pub froude: Scalar,
    /// 口宽 [m]
    pub width: Scalar,
    /// 注入角 [rad]
    pub angle: Scalar,
    /// 等密度入流高程下限 [m]
    pub z_in_low: Scalar,
    /// 时序：Q, T, c₁..c_nps
    pub series: ScheduleSeries,
    /// 查找游标
    pub cursor: ScheduleCursor,
}

/// 出水口（运行时）
#[derive(Debug, Clone)]
pub struct Outlet {
    /// 取水口中心高程 [m]
    pub z_out: Scalar,
    /// 闸门开度 [m]
    pub gate_height: Scalar,
    /// 内部 Froude 数参考值
    pub froude: Scalar,
    /// 占全出流比例
    pub share: Scalar,
    /// 密度依存出流上缘强制高程
    pub z_top_override: Option<Scalar>,
    /// 密度依存出流下缘强制高程
    pub z_bot_override: Option<Scalar>,
}

/// 支流入汇（运行时）
#[derive(Debug, Clone)]
pub struct Tributary {
    /// 入汇单元纵向索引
    pub i_cell: usize,
    /// 内部 Froude 数参考值
    pub froude: Scalar,
    /// 入汇宽度 [m]
    pub width: Scalar,
    /// 注入角 [rad]
    pub angle: Scalar,
    /// 时序：Q, T, c₁..c_nps
    pub series: ScheduleSeries,
    /// 查找游标
    pub cursor: ScheduleCursor,
}

/// 汇流连接（运行时）
#[derive(Debug, Clone)]
pub struct Confluence {
    /// 对端域 id（1 起）
    pub partner_id: usize,
    /// 汇流点单元索引
    pub i_cell: usize,
    /// 本域是否为支汊
    pub is_branch: bool,
    /// 上一步对端送入的流量 [m³/s]（干流侧使用）
    pub q_last: Scalar,
    /// 上一步对端送入的水温 [°C]
    pub t_last: Scalar,
    /// 上一步对端送入的浓度 [g/m³]
    pub c_last: Vec<Scalar>,
}

/// 跨域水管（运行时）
#[derive(Debug, Clone)]
pub struct Pipe {
    /// 对端域 id（1 起）
    pub partner_id: usize,
    /// 管口单元索引
    pub i_cell: usize,
    /// 管口中心高程 [m]
    pub z_pos: Scalar,
    /// 口径 [m]
    pub aperture: Scalar,
    /// 内部 Froude 数参考值
    pub froude: Scalar,
    /// 时序：Q（正值从小 id 域流向大 id 域）
    pub series: ScheduleSeries,
    /// 查找游标
    pub cursor: ScheduleCursor,
    /// 上一步对端送入的水温 [°C]
    pub t_last: Scalar,
    /// 上一步对端送入的浓度 [g/m³]
    pub c_last: Vec<Scalar>,
}

/// 点状入流（运行时）
#[derive(Debug, Clone)]
pub struct PointInflow {
    /// 单元纵向索引
    pub i_cell: usize,
    /// 注入高程 [m]
    pub z_pos: Scalar,
    /// 内部 Froude 数参考值
    pub froude: Scalar,
    /// 口宽 [m]
    pub width: Scalar,
    /// 时序：Q, T, c₁..c_nps
    pub series: ScheduleSeries,
    /// 查找游标
    pub cursor: ScheduleCursor,
}

/// 点状取水（运行时）
#[derive(Debug, Clone)]
pub struct PointOutflow {
    /// 单元纵向索引
    pub i_cell: usize,
    /// 取水高程 [m]
    pub z_pos: Scalar,
    /// 内部 Froude 数参考值
    pub froude: Scalar,
    /// 口径 [m]
    pub aperture: Scalar,
    /// 时序：Q
    pub series: ScheduleSeries,
    /// 查找游标
    pub cursor: ScheduleCursor,
}

/// 阻流幕（运行时）
#[derive(Debug, Clone)]
pub struct Fence {
    /// 幕所在 u 面索引
    pub i_fnc: usize,
    /// 下缘层索引
    pub k_low: usize,
    /// 上缘层索引
    pub k_high: usize,
    /// 类型（浮幕随水面更新跨度）
    pub kind: FenceKind,
}

/// 测点（运行时）
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    /// x 坐标 [m]
    pub x: Scalar,
    /// 高程 [m]
    pub z: Scalar,
    /// 单元纵向索引
    pub i_cell: usize,
}

// ============================================================
// 源项
// ============================================================

/// 每步由边界源构建器重建的源项场
#[derive(Debug, Clone)]
pub struct SourceTerms {
    /// 单元体积入流 [m³/s]（恒 ≥ 0）
    pub q_src: Field2,
    /// 流量加权的源水平流速 [m/s]
    pub u_src: Field2,
    /// 流量加权的源水温 [°C]
    pub t_src: Field2,
    /// 流量加权的源浓度 [g/m³]（每粒径类）
    pub c_src: Vec<Field2>,
    /// 单元体积取水 [m³/s]（恒 ≥ 0，点状取水与管道流出）
    pub q_snk: Field2,
    /// 东端面出流分配 [m³/s]（按 k，恒 ≥ 0）
    pub q_east: Vec<Scalar>,

    /// 入流口流量合计 [m³/s]
    pub q_inlet: Scalar,
    /// 支流流量合计
    pub q_trb: Scalar,
    /// 汇流流量合计（干流侧为正）
    pub q_cnf: Scalar,
    /// 水管流量合计（入为正）
    pub q_wtp: Scalar,
    /// 点状入流合计
    pub q_pin: Scalar,
    /// 点状取水合计（正值）
    pub q_pout: Scalar,
    /// 出水口流量合计（正值）
    pub q_out: Scalar,
}

impl SourceTerms {
    /// 按网格尺寸分配
    pub fn zeros(nx: usize, nz: usize, nps: usize) -> Self {
        Self {
            q_src: Field2::zeros(nx + 1, nz + 1),
            u_src: Field2::zeros(nx + 1, nz + 1),
            t_src: Field2::zeros(nx + 1, nz + 1),
            c_src: (0..nps).map(|_| Field2::zeros(nx + 1, nz + 1)).collect(),
            q_snk: Field2::zeros(nx + 1, nz + 1),
            q_east: vec![0.0; nz + 1],
            q_inlet: 0.0,
            q_trb: 0.0,
            q_cnf: 0.0,
            q_wtp: 0.0,
            q_pin: 0.0,
            q_pout: 0.0,
            q_out: 0.0,
        }
    }

    /// 清零（步首调用）
    pub fn clear(&mut self) {
        self.q_src.fill(0.0);
        self.u_src.fill(0.0);
        self.t_src.fill(0.0);
        for c in &mut self.c_src {
            c.fill(0.0);
        }
        self.q_snk.fill(0.0);
        self.q_east.fill(0.0);
        self.q_inlet = 0.0;
        self.q_trb = 0.0;
        self.q_cnf = 0.0;
        self.q_wtp = 0.0;
        self.q_pin = 0.0;
        self.q_pout = 0.0;
        self.q_out = 0.0;
    }

    /// 水面体积强迫合计 [m³/s]
    pub fn net_volume_forcing(&self) -> Scalar {
        self.q_inlet + self.q_trb + self.q_cnf + self.q_wtp + self.q_pin
            - self.q_pout
            - self.q_out
    }
}

// ============================================================
// 域
// ============================================================

/// 单个模拟域（网格 + 场 + 边界描述符）
#[derive(Debug, Clone)]
pub struct Domain {
    /// 域 id（1 起，即在序列中的次序）
    pub id: usize,
    /// 域名
    pub name: String,
    /// 交错网格
    pub mesh: StaggeredMesh,

    // ---- 主场 ----
    /// 水平流速 [m/s]（u 面：(0..=nx) × (1..=nz)）
    pub u: Field2,
    /// 垂向流速 [m/s]（w 面：(1..=nx) × (0..=nz)）
    pub w: Field2,
    /// 水温 [°C]（含幽灵带：(0..=nx+1) × (0..=nz+1)）
    pub t: Field2,
    /// 悬浮物浓度 [g/m³]（每粒径类，含幽灵带）
    pub c: Vec<Field2>,

    // ---- 导出场 ----
    /// 压力 [Pa]
    pub p: Field2,
    /// 密度 [kg/m³]
    pub rho: Field2,
    /// w 面层平均密度 [kg/m³]（0..=nz）
    pub rho_avg: Vec<Scalar>,
    /// 水平动量扩散 [m²/s]
    pub dmx: Field2,
    /// 垂向动量扩散 [m²/s]（w 面）
    pub dmz: Field2,
    /// 水平热扩散 [m²/s]
    pub dhx: Field2,
    /// 垂向热扩散 [m²/s]（w 面）
    pub dhz: Field2,
    /// 水平浓度扩散 [m²/s]
    pub dcx: Field2,
    /// 垂向浓度扩散 [m²/s]（w 面）
    pub dcz: Field2,
    /// 湍动能 [m²/s²]（k-ε 模式）
    pub tke: Field2,
    /// 耗散率 [m²/s³]（k-ε 模式）
    pub td_eps: Field2,
    /// 涡粘性 [m²/s]（k-ε 模式）
    pub nut: Field2,
    /// 滤波后的压力梯度项
    pub pgx: Field2,
    /// 未滤波压力梯度项
    pub pgx_raw: Field2,
    /// 上一步压力梯度项
    pub pgx_old: Field2,

    // ---- 水面状态 ----
    /// 蓄水体积 [m³]
    pub total_vol: Scalar,
    /// 水面体积强迫 [m³/s]
    pub q_total_vol: Scalar,
    /// 水面升降速度 [m/s]
    pub w_srf: Scalar,

    // ---- 源项与列流量 ----
    /// 本步源项
    pub src: SourceTerms,
    /// 列流量目标 [m³/s]（u 面：0..=nx）
    pub q_col: Vec<Scalar>,

    // ---- 边界描述符 ----
    /// 上游入流口
    pub inlet: Option<Inlet>,
    /// 出水口
    pub outlets: Vec<Outlet>,
    /// 全出流时序
    pub outflow_series: Option<ScheduleSeries>,
    /// 全出流时序游标
    pub outflow_cursor: ScheduleCursor,
    /// 支流
    pub tributaries: Vec<Tributary>,
    /// 汇流连接
    pub confluences: Vec<Confluence>,
    /// 跨域水管
    pub pipes: Vec<Pipe>,
    /// 点状入流
    pub point_inflows: Vec<PointInflow>,
    /// 点状取水
    pub point_outflows: Vec<PointOutflow>,
    /// 阻流幕
    pub fences: Vec<Fence>,
    /// 测点
    pub probes: Vec<Probe>,

    // ---- 参数 ----
    /// 湍流闭合参数
    pub turbulence: TurbulenceConfig,
    /// 粒径谱
    pub particles: ParticleSpec,
    /// 各粒径类 Stokes 沉速 [m/s]
    pub w_ss: Vec<Scalar>,

    // ---- 累积量与诊断 ----
    /// 床面沉积量 [g]（[粒径类][i]）
    pub c_sed: Vec<Vec<Scalar>>,
    /// 涡粘性超限单元标记（exceed 日志只记首次越限）
    pub exceed_flagged: Vec<bool>,
    /// 数值异常复位是否已告警
    pub anomaly_warned: bool,
}

/// 域装配输入：配置 + 几何 + 已解析的时序
#[derive(Debug, Clone)]
pub struct DomainInput {
    /// 域配置
    pub config: DomainConfig,
    /// 几何数据
    pub geometry: GeometryData,
    /// 入流口时序
    pub inlet_series: Option<ScheduleSeries>,
    /// 全出流时序
    pub outflow_series: Option<ScheduleSeries>,
    /// 支流时序（与配置逐一对应）
    pub tributary_series: Vec<ScheduleSeries>,
    /// 水管时序
    pub pipe_series: Vec<ScheduleSeries>,
    /// 点状入流时序
    pub point_inflow_series: Vec<ScheduleSeries>,
    /// 点状取水时序
    pub point_outflow_series: Vec<ScheduleSeries>,
    /// 初始水温垂向剖面（高程, 值），替代 Uniform 时使用
    pub t_profile: Option<Vec<(Scalar, Scalar)>>,
    /// 初始浓度垂向剖面
    pub c_profile: Option<Vec<(Scalar, Scalar)>>,
}

impl Domain {
    /// 装配域：构建网格、分配场、设定初始状态
    pub fn new(id: usize, input: DomainInput, particles: &ParticleSpec) -> LhResult<Self> {
        let cfg = &input.config;
        let mesh = StaggeredMesh::build(&input.geometry, cfg.initial.z_srf)?;
        let nx = mesh.nx;
        let nz = mesh.nz;
        let nps = particles.nps();

        // 粒径类沉速与颗粒雷诺数检查
        let w_ss = stokes_settling_velocities(particles)?;

        // 初始标量场
        let mut t = Field2::zeros(nx + 2, nz + 2);
        fill_scalar_field(&mut t, &mesh, &cfg.initial.temperature, &input.t_profile)?;
        let mut c = Vec::with_capacity(nps);
        for _ in 0..nps {
            let mut field = Field2::zeros(nx + 2, nz + 2);
            fill_scalar_field(&mut field, &mesh, &cfg.initial.concentration, &input.c_profile)?;
            c.push(field);
        }

        let total_vol = mesh.surface_to_volume(mesh.z_srf)?;

        // 边界描述符解析（坐标 → 索引）
        let inlet = match (&cfg.inlet, input.inlet_series) {
            (Some(ic), Some(series)) => Some(Inlet {
                froude: ic.froude,
                width: ic.width,
                angle: ic.angle.to_radians(),
                z_in_low: ic.z_in_low,
                series,
                cursor: ScheduleCursor::default(),
            }),
            (Some(_), None) => {
                return Err(LhError::invalid_input(format!("域 {} 的入流口缺少时序", id)))
            }
            _ => None,
        };
        let outlets = cfg
            .outlets
            .iter()
            .map(|oc| Outlet {
                z_out: oc.z_out,
                gate_height: oc.gate_height,
                froude: oc.froude,
                share: oc.share,
                z_top_override: oc.z_top_override,
                z_bot_override: oc.z_bot_override,
            })
            .collect();
        let tributaries = cfg
            .tributaries
            .iter()
            .zip(input.tributary_series)
            .map(|(tc, series)| Tributary {
                i_cell: mesh.cell_of_x(tc.x_pos),
                froude: tc.froude,
                width: tc.width,
                angle: tc.angle.to_radians(),
                series,
                cursor: ScheduleCursor::default(),
            })
            .collect();
        let confluences = cfg
            .confluences
            .iter()
            .map(|cc| Confluence {
                partner_id: cc.partner_id,
                i_cell: mesh.cell_of_x(cc.x_pos),
                is_branch: cc.is_branch,
                q_last: 0.0,
                t_last: 0.0,
                c_last: vec![0.0; nps],
            })
            .collect();
        let pipes = cfg
            .pipes
            .iter()
            .zip(input.pipe_series)
            .map(|(pc, series)| Pipe {
                partner_id: pc.partner_id,
                i_cell: mesh.cell_of_x(pc.x_pos),
                z_pos: pc.z_pos,
                aperture: pc.aperture,
                froude: pc.froude,
                series,
                cursor: ScheduleCursor::default(),
                t_last: 0.0,
                c_last: vec![0.0; nps],
            })
            .collect();
        let point_inflows = cfg
            .point_inflows
            .iter()
            .zip(input.point_inflow_series)
            .map(|(pc, series)| PointInflow {
                i_cell: mesh.cell_of_x(pc.x_pos),
                z_pos: pc.z_pos,
                froude: pc.froude,
                width: pc.width,
                series,
                cursor: ScheduleCursor::default(),
            })
            .collect();
        let point_outflows = cfg
            .point_outflows
            .iter()
            .zip(input.point_outflow_series)
            .map(|(pc, series)| PointOutflow {
                i_cell: mesh.cell_of_x(pc.x_pos),
                z_pos: pc.z_pos,
                froude: pc.froude,
                aperture: pc.aperture,
                series,
                cursor: ScheduleCursor::default(),
            })
            .collect();
        let fences = cfg
            .fences
            .iter()
            .map(|fc| {
                let i_fnc = mesh.nearest_face(fc.x_pos).clamp(1, nx.saturating_sub(1));
                let (k_low, k_high) = fence_span(&mesh, &fc.kind);
                Fence {
                    i_fnc,
                    k_low,
                    k_high,
                    kind: fc.kind,
                }
            })
            .collect();
        let probes = cfg
            .probes
            .iter()
            .map(|pc| Probe {
                x: pc.x,
                z: pc.z,
                i_cell: mesh.cell_of_x(pc.x),
            })
            .collect();

        let mut dom = Self {
            id,
            name: cfg.name.clone(),
            u: Field2::zeros(nx + 1, nz + 1),
            w: Field2::zeros(nx + 1, nz + 1),
            t,
            c,
            p: Field2::zeros(nx + 1, nz + 1),
            rho: Field2::zeros(nx + 2, nz + 2),
            rho_avg: vec![0.0; nz + 1],
            dmx: Field2::zeros(nx + 1, nz + 1),
            dmz: Field2::zeros(nx + 1, nz + 1),
            dhx: Field2::zeros(nx + 1, nz + 1),
            dhz: Field2::zeros(nx + 1, nz + 1),
            dcx: Field2::zeros(nx + 1, nz + 1),
            dcz: Field2::zeros(nx + 1, nz + 1),
            tke: Field2::filled(nx + 1, nz + 1, crate::turbulence::TKE_MIN),
            td_eps: Field2::filled(nx + 1, nz + 1, crate::turbulence::EPS_MIN),
            nut: Field2::zeros(nx + 1, nz + 1),
            pgx: Field2::zeros(nx + 1, nz + 1),
            pgx_raw: Field2::zeros(nx + 1, nz + 1),
            pgx_old: Field2::zeros(nx + 1, nz + 1),
            total_vol,
            q_total_vol: 0.0,
            w_srf: 0.0,
            src: SourceTerms::zeros(nx, nz, nps),
            q_col: vec![0.0; nx + 1],
            inlet,
            outlets,
            outflow_series: input.outflow_series,
            outflow_cursor: ScheduleCursor::default(),
            tributaries,
            confluences,
            pipes,
            point_inflows,
            point_outflows,
            fences,
            probes,
            turbulence: cfg.turbulence.clone(),
            particles: particles.clone(),
            w_ss,
            c_sed: vec![vec![0.0; nx + 1]; nps],
            exceed_flagged: vec![false; (nx + 1) * (nz + 1)],
            anomaly_warned: false,
            mesh,
        };

        density::update_density(&mut dom);
        density::update_column_avg_density(&mut dom);
        density::update_pressure(&mut dom);
        dom.mirror_ghost_bands();
        Ok(dom)
    }

    /// 粒径类数量
    pub fn nps(&self) -> usize {
        self.c.len()
    }

    /// 标量幽灵带同步
    ///
    /// 表层上一行镜像表层；东西端幽灵列复制相邻内部列。
    pub fn mirror_ghost_bands(&mut self) {
        let nx = self.mesh.nx;
        let nz = self.mesh.nz;
        let k_srf = self.mesh.k_srf;
        for i in 0..=(nx + 1) {
            if k_srf < nz + 1 {
                self.t[(i, k_srf + 1)] = self.t[(i, k_srf)];
            }
            let kb = 1;
            self.t[(i, kb - 1)] = self.t[(i, kb)];
        }
        for k in 0..=(nz + 1) {
            self.t[(0, k)] = self.t[(1, k)];
            self.t[(nx + 1, k)] = self.t[(nx, k)];
        }
        for c in &mut self.c {
            for i in 0..=(nx + 1) {
                if k_srf < nz + 1 {
                    c[(i, k_srf + 1)] = c[(i, k_srf)];
                }
                c[(i, 0)] = c[(i, 1)];
            }
            for k in 0..=(nz + 1) {
                c[(0, k)] = c[(1, k)];
                c[(nx + 1, k)] = c[(nx, k)];
            }
        }
    }

    /// 东端开放边界：把 i=nx−1 列的 u 与标量复制到 nx 与幽灵列
    pub fn apply_open_east_boundary(&mut self) {
        let nx = self.mesh.nx;
        let nz = self.mesh.nz;
        for k in 1..=nz {
            self.u[(nx, k)] = self.u[(nx - 1, k)];
        }
        for k in 0..=(nz + 1) {
            self.t[(nx, k)] = self.t[(nx - 1, k)];
            self.t[(nx + 1, k)] = self.t[(nx - 1, k)];
            for c in &mut self.c {
                c[(nx, k)] = c[(nx - 1, k)];
                c[(nx + 1, k)] = c[(nx - 1, k)];
            }
        }
    }

    /// 浮幕跨度随水面更新；固定幕保持初始层位
    pub fn update_floating_fences(&mut self) {
        let mesh = &self.mesh;
        for fence in &mut self.fences {
            if let FenceKind::Floating { depth } = fence.kind {
                fence.k_high = mesh.k_srf;
                fence.k_low = mesh.layer_of_z(mesh.z_srf - depth);
            }
        }
    }

    /// 场中出现 NaN/Inf 时返回出错的场名
    pub fn find_non_finite(&self) -> Option<&'static str> {
        if self.u.has_non_finite() {
            return Some("u");
        }
        if self.w.has_non_finite() {
            return Some("w");
        }
        if self.t.has_non_finite() {
            return Some("t");
        }
        for c in &self.c {
            if c.has_non_finite() {
                return Some("c");
            }
        }
        if self.rho.has_non_finite() {
            return Some("rho");
        }
        None
    }
}

/// Stokes 沉速与颗粒雷诺数检查（初始化时执行，超限即致命）
///
/// w_ss = g·(ρ_ss − ρ_w)·d²/(18·μ_w)，Rep = w_ss·d·ρ_w/μ_w < 1.5
fn stokes_settling_velocities(particles: &ParticleSpec) -> LhResult<Vec<Scalar>> {
    let t_ref = 20.0;
    let mu = density::dynamic_viscosity(t_ref);
    let rho_w = density::water_density(t_ref);
    let mut w_ss = Vec::with_capacity(particles.nps());
    for (l, class) in particles.classes.iter().enumerate() {
        let d = class.diameter;
        let ws = GRAVITY * (particles.rho_ss - rho_w) * d * d / (18.0 * mu);
        let rep = ws * d * rho_w / mu;
        if rep >= 1.5 {
            return Err(LhError::invalid_input(format!(
                "粒径类 {} 的颗粒雷诺数 {:.3} 超出 Stokes 区（< 1.5），粒径 {} m 过大",
                l + 1,
                rep,
                d
            )));
        }
        w_ss.push(ws);
    }
    Ok(w_ss)
}

/// 幕的初始层跨度
fn fence_span(mesh: &StaggeredMesh, kind: &FenceKind) -> (usize, usize) {
    match *kind {
        FenceKind::Fixed { z_low, z_high } => {
            (mesh.layer_of_z(z_low), mesh.layer_of_z(z_high))
        }
        FenceKind::Floating { depth } => {
            (mesh.layer_of_z(mesh.z_srf - depth), mesh.k_srf)
        }
    }
}

/// 按初始化方式填充标量场（中心 1..=nx × 1..=nz，幽灵带后续镜像）
fn fill_scalar_field(
    field: &mut Field2,
    mesh: &StaggeredMesh,
    init: &FieldInit,
    profile: &Option<Vec<(Scalar, Scalar)>>,
) -> LhResult<()> {
    match init {
        FieldInit::Uniform(value) => {
            field.fill(*value);
            Ok(())
        }
        FieldInit::Profile(path) => {
            let points = profile.as_ref().ok_or_else(|| {
                LhError::invalid_input(format!("剖面初始化缺少数据: {}", path.display()))
            })?;
            if points.is_empty() {
                return Err(LhError::invalid_input("初始剖面为空"));
            }
            for i in 0..field.ni() {
                for k in 1..=mesh.nz {
                    let zc = mesh.zc(k.min(mesh.k_srf).max(1));
                    field[(i, k)] = interp_profile(points, zc);
                }
                field[(i, 0)] = field[(i, 1)];
                if mesh.nz + 1 < field.nk() {
                    field[(i, mesh.nz + 1)] = field[(i, mesh.nz)];
                }
            }
            Ok(())
        }
    }
}

/// 剖面插值（范围外取端值）
fn interp_profile(points: &[(Scalar, Scalar)], z: Scalar) -> Scalar {
    if z <= points[0].0 {
        return points[0].1;
    }
    let last = points[points.len() - 1];
    if z >= last.0 {
        return last.1;
    }
    for w in points.windows(2) {
        if z <= w[1].0 {
            return lerp(z, w[0].0, w[1].0, w[0].1, w[1].1);
        }
    }
    last.1
}

/// 测试共用的域装配
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// 矩形试验库的装配输入（静水、均温 20°C）
    pub(crate) fn box_input(nx: usize, nz: usize, z_srf: Scalar) -> DomainInput {
        let geometry = crate::mesh::test_support::box_geometry(nx, nz, 50.0);
        let config: DomainConfig = serde_json::from_str(&format!(
            r#"{{ "name": "test", "geometry": "geom.dat",
                 "initial": {{ "z_srf": {}, "temperature": {{ "uniform": 20.0 }} }} }}"#,
            z_srf
        ))
        .unwrap();
        DomainInput {
            config,
            geometry,
            inlet_series: None,
            outflow_series: None,
            tributary_series: vec![],
            pipe_series: vec![],
            point_inflow_series: vec![],
            point_outflow_series: vec![],
            t_profile: None,
            c_profile: None,
        }
    }
}
