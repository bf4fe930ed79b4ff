// crates/lh_physics/src/mesh.rs

//! 交错网格与表层
//!
//! 纵向-垂向二维交错有限体积网格：
//! - u 存放在 x 法向面（u 面），w 存放在 z 法向面（w 面），
//!   标量（T, c, ρ, p）存放在单元中心
//! - 面编号 0..nx / 0..nz，中心编号 1..nx / 1..nz（0 号位不用）
//! - 宽度 `b` 定义在节点上，床面以下的节点继承上方最近湿节点的宽度
//! - 参考表 `*0` 冻结不动水面几何；工作表仅表层行随自由水面移动
//!
//! # 高程表
//!
//! `vol_hgt[k]` 为高程 z(k) 以下的累积体积，单调不减，与
//! `surface_to_volume`/`volume_to_surface` 互为反函数（线性插值）。
//! 为保证"表层重建后湿单元体积之和 == total_vol"，表层行体积按
//! `dz_srf/dz0` 的线性比例取自参考体积，而面积采用宽度插值。

use lh_foundation::{lerp, Field2, LhError, LhResult, Scalar};

/// 几何原始数据（几何文件解析结果）
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// 纵向单元数
    pub nx: usize,
    /// 垂向单元数
    pub nz: usize,
    /// 纵向节点坐标 [m]（0..=nx，严格递增）
    pub x: Vec<Scalar>,
    /// 垂向节点高程 [m]（0..=nz，严格递增）
    pub z: Vec<Scalar>,
    /// 床面高程 [m]（0..=nx）
    pub z_bed: Vec<Scalar>,
    /// 节点宽度 [m]（(nx+1) × (nz+1)）
    pub b: Field2,
}

impl GeometryData {
    /// 校验坐标单调性与尺寸
    pub fn validate(&self) -> LhResult<()> {
        LhError::check_size("x", self.nx + 1, self.x.len())?;
        LhError::check_size("z", self.nz + 1, self.z.len())?;
        LhError::check_size("z_bed", self.nx + 1, self.z_bed.len())?;
        LhError::check_size("b.ni", self.nx + 1, self.b.ni())?;
        LhError::check_size("b.nk", self.nz + 1, self.b.nk())?;
        for i in 1..self.x.len() {
            if self.x[i] <= self.x[i - 1] {
                return Err(LhError::invalid_input(format!(
                    "x 坐标必须严格递增: x[{}]={} <= x[{}]={}",
                    i,
                    self.x[i],
                    i - 1,
                    self.x[i - 1]
                )));
            }
        }
        for k in 1..self.z.len() {
            if self.z[k] <= self.z[k - 1] {
                return Err(LhError::invalid_input(format!(
                    "z 高程必须严格递增: z[{}]={} <= z[{}]={}",
                    k,
                    self.z[k],
                    k - 1,
                    self.z[k - 1]
                )));
            }
        }
        Ok(())
    }
}

/// 交错网格（几何表 + 移动表层）
#[derive(Debug, Clone)]
pub struct StaggeredMesh {
    /// 纵向单元数
    pub nx: usize,
    /// 垂向单元数
    pub nz: usize,

    /// 纵向节点坐标 [m]（0..=nx）
    pub x: Vec<Scalar>,
    /// 垂向节点高程 [m]（0..=nz）
    pub z: Vec<Scalar>,
    /// 床面高程 [m]（0..=nx）
    pub z_bed: Vec<Scalar>,

    /// 单元宽度 [m]（1..=nx，0 号不用）
    pub dx: Vec<Scalar>,
    /// 层厚 [m]（1..=nz；表层行为工作值）
    pub dz: Vec<Scalar>,
    /// 交错宽度 [m]（1..=nx-1）
    pub dxs: Vec<Scalar>,
    /// 交错层厚 [m]（1..=nz-1）
    pub dzs: Vec<Scalar>,

    /// 节点宽度 [m]（床下已钳制）
    pub b: Field2,

    /// u 面面积 [m²]（(0..=nx) × (1..=nz)）
    pub au: Field2,
    /// w 面面积 [m²]（(1..=nx) × (0..=nz)）
    pub aw: Field2,
    /// 单元中心处的 u 面面积 [m²]（1..=nx）
    pub aus: Field2,
    /// u 控制体的 w 面面积 [m²]（1..=nx-1）
    pub aws: Field2,
    /// 单元体积 [m³]（(1..=nx) × (1..=nz)）
    pub vol: Field2,
    /// u 控制体体积 [m³]（1..=nx-1）
    pub vols: Field2,

    /// 参考层厚（不动水面）
    pub dz0: Vec<Scalar>,
    /// 参考 u 面面积
    pub au0: Field2,
    /// 参考 w 面面积
    pub aw0: Field2,
    /// 参考中心 u 面面积
    pub aus0: Field2,
    /// 参考交错 w 面面积
    pub aws0: Field2,
    /// 参考单元体积
    pub vol0: Field2,
    /// 参考交错体积
    pub vols0: Field2,

    /// 面处底层索引（0..=nx）
    pub k_bot: Vec<usize>,
    /// 中心处底层索引（1..=nx）
    pub kc_bot: Vec<usize>,

    /// 高程-累积体积表 [m³]（0..=nz）
    pub vol_hgt: Vec<Scalar>,
    /// 高程-水面面积表 [m²]（0..=nz）
    pub area_hgt: Vec<Scalar>,
    /// 高程-有效库长表 [m]（0..=nz）
    pub len_hgt: Vec<Scalar>,

    /// 自由水面高程 [m]
    pub z_srf: Scalar,
    /// 表层单元垂向索引
    pub k_srf: usize,
    /// 表层单元厚度 [m]
    pub dz_srf: Scalar,
}

impl StaggeredMesh {
    // ========================================================
    // 构建
    // ========================================================

    /// 从几何数据构建全部几何表，表层置于 z_srf
    pub fn build(geom: &GeometryData, z_srf: Scalar) -> LhResult<Self> {
        geom.validate()?;
        let nx = geom.nx;
        let nz = geom.nz;
        let x = geom.x.clone();
        let z = geom.z.clone();
        let z_bed = geom.z_bed.clone();

        // 单元与交错宽度
        let mut dx = vec![0.0; nx + 1];
        for i in 1..=nx {
            dx[i] = x[i] - x[i - 1];
        }
        let mut dz0 = vec![0.0; nz + 1];
        for k in 1..=nz {
            dz0[k] = z[k] - z[k - 1];
        }
        let mut dxs = vec![0.0; nx + 1];
        for i in 1..nx {
            dxs[i] = 0.5 * (dx[i] + dx[i + 1]);
        }
        let mut dzs = vec![0.0; nz + 1];
        for k in 1..nz {
            dzs[k] = 0.5 * (dz0[k] + dz0[k + 1]);
        }

        // 床下宽度钳制：自最高湿节点向下继承
        let mut b = geom.b.clone();
        for i in 0..=nx {
            for k in (0..nz).rev() {
                if z[k] < z_bed[i] {
                    let inherit = b[(i, k + 1)];
                    b[(i, k)] = inherit.max(0.0);
                } else if b[(i, k)] < 0.0 {
                    b[(i, k)] = 0.0;
                }
            }
        }

        // 底层索引
        let zc = |k: usize| 0.5 * (z[k - 1] + z[k]);
        let mut k_bot = vec![1usize; nx + 1];
        for i in 0..=nx {
            let mut kb = nz;
            for k in 1..=nz {
                if zc(k) >= z_bed[i] {
                    kb = k;
                    break;
                }
            }
            k_bot[i] = kb;
        }
        let mut kc_bot = vec![1usize; nx + 1];
        for i in 1..=nx {
            kc_bot[i] = k_bot[i - 1].min(k_bot[i]);
        }

        // 参考面积与体积
        let mut au0 = Field2::zeros(nx + 1, nz + 1);
        for i in 0..=nx {
            for k in k_bot[i]..=nz {
                au0[(i, k)] = dz0[k] * 0.5 * (b[(i, k - 1)] + b[(i, k)]);
            }
        }
        let mut aw0 = Field2::zeros(nx + 1, nz + 1);
        for i in 1..=nx {
            for k in (kc_bot[i] - 1)..=nz {
                aw0[(i, k)] = dx[i] * 0.5 * (b[(i - 1, k)] + b[(i, k)]);
            }
        }
        let mut vol0 = Field2::zeros(nx + 1, nz + 1);
        for i in 1..=nx {
            for k in kc_bot[i]..=nz {
                let bc = 0.25
                    * (b[(i - 1, k - 1)] + b[(i, k - 1)] + b[(i - 1, k)] + b[(i, k)]);
                vol0[(i, k)] = dx[i] * dz0[k] * bc;
            }
        }
        let mut aus0 = Field2::zeros(nx + 1, nz + 1);
        for i in 1..=nx {
            for k in kc_bot[i]..=nz {
                aus0[(i, k)] = 0.5 * (au0[(i - 1, k)] + au0[(i, k)]);
            }
        }
        let mut aws0 = Field2::zeros(nx + 1, nz + 1);
        for i in 1..nx {
            for k in (k_bot[i] - 1)..=nz {
                aws0[(i, k)] = 0.5 * (aw0[(i, k)] + aw0[(i + 1, k)]);
            }
        }
        let mut vols0 = Field2::zeros(nx + 1, nz + 1);
        for i in 1..nx {
            for k in k_bot[i]..=nz {
                vols0[(i, k)] = 0.5 * (vol0[(i, k)] + vol0[(i + 1, k)]);
            }
        }

        // 高程表
        let mut vol_hgt = vec![0.0; nz + 1];
        let mut area_hgt = vec![0.0; nz + 1];
        let mut len_hgt = vec![0.0; nz + 1];
        for k in 1..=nz {
            let mut layer = 0.0;
            for i in 1..=nx {
                layer += vol0[(i, k)];
            }
            vol_hgt[k] = vol_hgt[k - 1] + layer;
        }
        for k in 0..=nz {
            let mut area = 0.0;
            for i in 1..=nx {
                if k + 1 >= kc_bot[i] {
                    area += dx[i] * 0.5 * (b[(i - 1, k)] + b[(i, k)]);
                }
            }
            area_hgt[k] = area;
            len_hgt[k] = Self::length_at_elevation(&x, &z_bed, z[k]);
        }

        let mut mesh = Self {
            nx,
            nz,
            x,
            z,
            z_bed,
            dx,
            dz: dz0.clone(),
            dxs,
            dzs,
            b,
            au: au0.clone(),
            aw: aw0.clone(),
            aus: aus0.clone(),
            aws: aws0.clone(),
            vol: vol0.clone(),
            vols: vols0.clone(),
            dz0,
            au0,
            aw0,
            aus0,
            aws0,
            vol0,
            vols0,
            k_bot,
            kc_bot,
            vol_hgt,
            area_hgt,
            len_hgt,
            z_srf: 0.0,
            k_srf: nz,
            dz_srf: 0.0,
        };
        mesh.update_surface_layer(z_srf)?;
        Ok(mesh)
    }

    /// 床面与高程 z 的首个交点之后的库长
    fn length_at_elevation(x: &[Scalar], z_bed: &[Scalar], zk: Scalar) -> Scalar {
        let nx = x.len() - 1;
        if z_bed[0] <= zk {
            return x[nx] - x[0];
        }
        for i in 1..=nx {
            if z_bed[i - 1] > zk && z_bed[i] <= zk {
                let x_cross = lerp(zk, z_bed[i - 1], z_bed[i], x[i - 1], x[i]);
                return x[nx] - x_cross;
            }
        }
        0.0
    }

    // ========================================================
    // 坐标访问
    // ========================================================

    /// 单元中心 x 坐标 [m]（1..=nx）
    #[inline]
    pub fn xc(&self, i: usize) -> Scalar {
        0.5 * (self.x[i - 1] + self.x[i])
    }

    /// 单元中心高程 [m]（1..=nz；表层行随水面移动）
    #[inline]
    pub fn zc(&self, k: usize) -> Scalar {
        if k == self.k_srf {
            self.z[k - 1] + 0.5 * self.dz_srf
        } else {
            0.5 * (self.z[k - 1] + self.z[k])
        }
    }

    /// x 坐标吸附到最近的 u 面索引
    pub fn nearest_face(&self, x_pos: Scalar) -> usize {
        let mut best = 0;
        let mut best_d = Scalar::INFINITY;
        for i in 0..=self.nx {
            let d = (self.x[i] - x_pos).abs();
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        best
    }

    /// x 坐标所在单元中心索引（1..=nx）
    pub fn cell_of_x(&self, x_pos: Scalar) -> usize {
        for i in 1..=self.nx {
            if x_pos <= self.x[i] {
                return i;
            }
        }
        self.nx
    }

    /// 高程所在层索引（1..=nz），限制在 [1, k_srf]
    pub fn layer_of_z(&self, z_pos: Scalar) -> usize {
        for k in 1..=self.nz {
            if z_pos <= self.z[k] {
                return k.min(self.k_srf).max(1);
            }
        }
        self.k_srf
    }

    // ========================================================
    // 表层重建
    // ========================================================

    /// 重建表层行几何
    ///
    /// 仅表层行 `k_srf` 的 au/aus/aw/aws/vol/vols 被重算，其余行
    /// 从参考表恢复；表层以上各行清零。同一 z_srf 重复调用幂等。
    pub fn update_surface_layer(&mut self, z_srf: Scalar) -> LhResult<()> {
        let nz = self.nz;
        if z_srf > self.z[nz] {
            return Err(LhError::invalid_input(format!(
                "水面高程 {} 超出网格顶 {}",
                z_srf, self.z[nz]
            )));
        }
        if z_srf <= 0.5 * (self.z[0] + self.z[1]) {
            return Err(LhError::invalid_input(format!(
                "水面高程 {} 低于首层中心",
                z_srf
            )));
        }

        // 定位表层：z(k_srf-1) < z_srf <= z(k_srf)
        let mut k_srf = nz;
        for k in 1..=nz {
            if z_srf <= self.z[k] {
                k_srf = k;
                break;
            }
        }
        let dz_srf = z_srf - self.z[k_srf - 1];

        // 从参考表全量恢复，表层以上清零
        self.dz.copy_from_slice(&self.dz0);
        self.au.copy_from(&self.au0);
        self.aw.copy_from(&self.aw0);
        self.aus.copy_from(&self.aus0);
        self.aws.copy_from(&self.aws0);
        self.vol.copy_from(&self.vol0);
        self.vols.copy_from(&self.vols0);
        for k in (k_srf + 1)..=nz {
            for i in 0..=self.nx {
                self.au[(i, k)] = 0.0;
                self.aus[(i, k)] = 0.0;
                self.vol[(i, k)] = 0.0;
                self.vols[(i, k)] = 0.0;
                self.aw[(i, k)] = 0.0;
                self.aws[(i, k)] = 0.0;
            }
        }

        self.dz[k_srf] = dz_srf;
        let frac = dz_srf / self.dz0[k_srf];

        // 表层宽度：节点宽度沿层厚线性插值
        let nx = self.nx;
        let mut b_srf = vec![0.0; nx + 1];
        for (i, bs) in b_srf.iter_mut().enumerate() {
            *bs = self.b[(i, k_srf - 1)] + frac * (self.b[(i, k_srf)] - self.b[(i, k_srf - 1)]);
        }

        // 表层行面积：宽度插值；体积：参考体积的线性比例
        // （与 vol_hgt 的线性插值反函数严格一致）
        for i in 0..=nx {
            if k_srf >= self.k_bot[i] {
                self.au[(i, k_srf)] = dz_srf * 0.5 * (self.b[(i, k_srf - 1)] + b_srf[i]);
            } else {
                self.au[(i, k_srf)] = 0.0;
            }
        }
        for i in 1..=nx {
            if k_srf + 1 >= self.kc_bot[i] {
                self.aw[(i, k_srf)] = self.dx[i] * 0.5 * (b_srf[i - 1] + b_srf[i]);
            }
            self.vol[(i, k_srf)] = frac * self.vol0[(i, k_srf)];
            self.aus[(i, k_srf)] = 0.5 * (self.au[(i - 1, k_srf)] + self.au[(i, k_srf)]);
        }
        for i in 1..nx {
            self.aws[(i, k_srf)] = 0.5 * (self.aw[(i, k_srf)] + self.aw[(i + 1, k_srf)]);
            self.vols[(i, k_srf)] = 0.5 * (self.vol[(i, k_srf)] + self.vol[(i + 1, k_srf)]);
        }

        self.z_srf = z_srf;
        self.k_srf = k_srf;
        self.dz_srf = dz_srf;
        Ok(())
    }

    // ========================================================
    // 体积-水位换算
    // ========================================================

    /// 水面高程 → 蓄水体积（vol_hgt 线性插值）
    pub fn surface_to_volume(&self, z_srf: Scalar) -> LhResult<Scalar> {
        if z_srf > self.z[self.nz] || z_srf < self.z[0] {
            return Err(LhError::invalid_input(format!(
                "水面高程 {} 超出高程表范围 [{}, {}]",
                z_srf, self.z[0], self.z[self.nz]
            )));
        }
        for k in 1..=self.nz {
            if z_srf <= self.z[k] {
                return Ok(lerp(
                    z_srf,
                    self.z[k - 1],
                    self.z[k],
                    self.vol_hgt[k - 1],
                    self.vol_hgt[k],
                ));
            }
        }
        Ok(self.vol_hgt[self.nz])
    }

    /// 蓄水体积 → 水面高程（vol_hgt 反插值）
    pub fn volume_to_surface(&self, total_vol: Scalar) -> LhResult<Scalar> {
        if total_vol > self.vol_hgt[self.nz] {
            return Err(LhError::invalid_input(format!(
                "蓄水体积 {} 超出库容 {}",
                total_vol, self.vol_hgt[self.nz]
            )));
        }
        if total_vol < 0.0 {
            return Err(LhError::invalid_input(format!("蓄水体积为负: {}", total_vol)));
        }
        for k in 1..=self.nz {
            if total_vol <= self.vol_hgt[k] {
                // 空层（全在床下）直接跨过
                if self.vol_hgt[k] - self.vol_hgt[k - 1] < 1e-300 {
                    continue;
                }
                return Ok(lerp(
                    total_vol,
                    self.vol_hgt[k - 1],
                    self.vol_hgt[k],
                    self.z[k - 1],
                    self.z[k],
                ));
            }
        }
        Ok(self.z[self.nz])
    }

    /// 湿单元体积之和（表层以下含表层）
    pub fn wet_volume(&self) -> Scalar {
        let mut acc = lh_foundation::KahanSum::new();
        for i in 1..=self.nx {
            for k in self.kc_bot[i]..=self.k_srf {
                acc.add(self.vol[(i, k)]);
            }
        }
        acc.total()
    }
}

/// 测试共用的几何构造
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// 矩形截面试验库：宽度常值、床面平坦，dx=100 m、dz=1 m
    pub(crate) fn box_geometry(nx: usize, nz: usize, width: Scalar) -> GeometryData {
        let x: Vec<Scalar> = (0..=nx).map(|i| 100.0 * i as Scalar).collect();
        let z: Vec<Scalar> = (0..=nz).map(|k| k as Scalar).collect();
        let z_bed = vec![0.0; nx + 1];
        let b = Field2::filled(nx + 1, nz + 1, width);
        GeometryData {
            nx,
            nz,
            x,
            z,
            z_bed,
            b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::box_geometry;
    use super::*;

    #[test]
    fn test_build_box() {
        let geom = box_geometry(10, 20, 50.0);
        let mesh = StaggeredMesh::build(&geom, 15.0).unwrap();
        assert_eq!(mesh.k_srf, 15);
        assert!((mesh.dz_srf - 1.0).abs() < 1e-12);
        // 矩形库：vol_hgt 每层增量 = nx·dx·dz·b
        let layer = 10.0 * 100.0 * 1.0 * 50.0;
        for k in 1..=20 {
            assert!(
                (mesh.vol_hgt[k] - layer * k as Scalar).abs() < 1e-6,
                "vol_hgt[{}]",
                k
            );
        }
    }

    #[test]
    fn test_vol_hgt_monotone() {
        let mut geom = box_geometry(8, 12, 30.0);
        // 倾斜床面
        for i in 0..=8 {
            geom.z_bed[i] = 6.0 - 0.75 * i as Scalar;
        }
        let mesh = StaggeredMesh::build(&geom, 11.5).unwrap();
        for k in 1..=12 {
            assert!(mesh.vol_hgt[k] >= mesh.vol_hgt[k - 1]);
        }
    }

    #[test]
    fn test_surface_volume_roundtrip() {
        let geom = box_geometry(10, 20, 50.0);
        let mesh = StaggeredMesh::build(&geom, 15.0).unwrap();
        for &zs in &[1.3, 5.0, 12.75, 19.999] {
            let v = mesh.surface_to_volume(zs).unwrap();
            let back = mesh.volume_to_surface(v).unwrap();
            assert!((back - zs).abs() < 1e-8, "roundtrip z={}", zs);
        }
    }

    #[test]
    fn test_wet_volume_matches_table() {
        let mut geom = box_geometry(10, 20, 50.0);
        // 变宽度截面（上宽下窄）
        for i in 0..=10 {
            for k in 0..=20 {
                geom.b[(i, k)] = 20.0 + 2.0 * k as Scalar;
            }
        }
        for &zs in &[7.0, 7.4, 15.9] {
            let mesh = StaggeredMesh::build(&geom, zs).unwrap();
            let from_table = mesh.surface_to_volume(zs).unwrap();
            let from_cells = mesh.wet_volume();
            assert!(
                (from_cells - from_table).abs() <= 1e-10 * from_table.max(1.0),
                "z={}: cells={} table={}",
                zs,
                from_cells,
                from_table
            );
        }
    }

    #[test]
    fn test_update_surface_idempotent() {
        let geom = box_geometry(6, 10, 40.0);
        let mut mesh = StaggeredMesh::build(&geom, 7.3).unwrap();
        let vol_first = mesh.vol.clone();
        mesh.update_surface_layer(7.3).unwrap();
        assert_eq!(mesh.vol, vol_first);
    }

    #[test]
    fn test_surface_out_of_range() {
        let geom = box_geometry(6, 10, 40.0);
        let mut mesh = StaggeredMesh::build(&geom, 7.3).unwrap();
        assert!(mesh.update_surface_layer(10.5).is_err());
        assert!(mesh.update_surface_layer(0.4).is_err());
    }

    #[test]
    fn test_surface_invariant_bracket() {
        let geom = box_geometry(6, 10, 40.0);
        let mut mesh = StaggeredMesh::build(&geom, 7.3).unwrap();
        for &zs in &[1.1, 2.0, 5.5, 9.99] {
            mesh.update_surface_layer(zs).unwrap();
            assert!(mesh.z[mesh.k_srf - 1] < zs && zs <= mesh.z[mesh.k_srf]);
            assert!((mesh.dz_srf - (zs - mesh.z[mesh.k_srf - 1])).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bed_width_clamp() {
        let mut geom = box_geometry(4, 8, 25.0);
        for i in 0..=4 {
            geom.z_bed[i] = 4.0;
        }
        // 床下宽度给负值，构建后应被继承/钳制
        for i in 0..=4 {
            for k in 0..=3 {
                geom.b[(i, k)] = -5.0;
            }
        }
        let mesh = StaggeredMesh::build(&geom, 7.0).unwrap();
        for i in 0..=4 {
            for k in 0..=8 {
                assert!(mesh.b[(i, k)] >= 0.0);
            }
        }
        // 床下节点继承上方湿节点宽度
        assert!((mesh.b[(2, 0)] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_kc_bot_consistency() {
        let mut geom = box_geometry(6, 10, 30.0);
        for i in 0..=6 {
            geom.z_bed[i] = 5.0 - 0.8 * i as Scalar;
        }
        let mesh = StaggeredMesh::build(&geom, 9.5).unwrap();
        for i in 1..=6 {
            assert_eq!(mesh.kc_bot[i], mesh.k_bot[i - 1].min(mesh.k_bot[i]));
        }
    }

    #[test]
    fn test_length_at_elevation() {
        let mut geom = box_geometry(4, 8, 25.0);
        // 床面从 4 m 线性降到 0 m，库长随高程缩短
        for i in 0..=4 {
            geom.z_bed[i] = 4.0 - i as Scalar;
        }
        let mesh = StaggeredMesh::build(&geom, 7.0).unwrap();
        // z=8: 全淹，库长 = 400
        assert!((mesh.len_hgt[8] - 400.0).abs() < 1e-9);
        // z=2: 床面在 x=200 处穿过高程 2
        assert!((mesh.len_hgt[2] - 200.0).abs() < 1e-9);
    }
}
