// crates/lh_io/src/snapshot.rs

//! 重启快照
//!
//! 每域一个文本文件：头部元组（时刻、蓄水体积、水面、表层索引、
//! 幕表）、粒径描述、网格尺寸，然后按固定顺序写稠密场：
//! `u, w, rho, p, t, c(各粒径类), c_sed(各粒径类), dhz, dmx, dmz`。
//!
//! 全精度（17 位有效数字）输出，重启后场求和与原状态按位一致
//! （浮点舍入以内）。绝对值低于 1e-30 的分量按分量自身判定后
//! 写作 0，避免非规格化数污染下游读取。

use crate::error::IoError;
use lh_foundation::{Field2, Scalar};
use lh_physics::Domain;
use std::fmt::Write as _;
use std::path::Path;

/// 小值钳制阈值
const TINY: Scalar = 1.0e-30;

/// 每行数值个数
const PER_LINE: usize = 5;

/// 写出单个域的快照
pub fn write_snapshot(dom: &Domain, time_day: Scalar, path: &Path) -> Result<(), IoError> {
    let mut text = String::new();
    let _ = writeln!(text, "# LimnoHydro snapshot");
    let _ = writeln!(text, "{}", dom.name);
    let _ = writeln!(
        text,
        "{:.17e} {:.17e} {:.17e} {}",
        time_day, dom.total_vol, dom.mesh.z_srf, dom.mesh.k_srf
    );
    // 幕表
    let _ = writeln!(text, "{}", dom.fences.len());
    for f in &dom.fences {
        let _ = writeln!(text, "{} {} {}", f.i_fnc, f.k_low, f.k_high);
    }
    // 粒径描述
    let _ = writeln!(text, "{} {:.17e}", dom.nps(), dom.particles.rho_ss);
    for class in &dom.particles.classes {
        let _ = writeln!(text, "{:.17e}", class.diameter);
    }
    let _ = writeln!(text, "{} {}", dom.mesh.nx, dom.mesh.nz);

    write_field(&mut text, &dom.u);
    write_field(&mut text, &dom.w);
    write_field(&mut text, &dom.rho);
    write_field(&mut text, &dom.p);
    write_field(&mut text, &dom.t);
    for c in &dom.c {
        write_field(&mut text, c);
    }
    for sed in &dom.c_sed {
        write_slice(&mut text, sed);
    }
    write_field(&mut text, &dom.dhz);
    write_field(&mut text, &dom.dmx);
    write_field(&mut text, &dom.dmz);

    std::fs::write(path, text).map_err(|e| IoError::file(path, e))
}

/// 读入快照并恢复域状态，返回快照时刻 [day]
pub fn read_snapshot(dom: &mut Domain, path: &Path) -> Result<Scalar, IoError> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
    let mut tokens = text
        .lines()
        .skip(2) // 注释行 + 域名行
        .flat_map(|l| l.split_whitespace());

    let mut next = |what: &str| -> Result<Scalar, IoError> {
        let tok = tokens
            .next()
            .ok_or_else(|| IoError::parse(path, 0, format!("数据提前结束，期望 {}", what)))?;
        tok.parse()
            .map_err(|_| IoError::parse(path, 0, format!("期望数值（{}），得到 '{}'", what, tok)))
    };

    let time_day = next("time_day")?;
    let total_vol = next("total_vol")?;
    let z_srf = next("z_srf")?;
    let _k_srf = next("k_srf")? as usize;

    let n_fnc = next("n_fnc")? as usize;
    if n_fnc != dom.fences.len() {
        return Err(IoError::Invalid {
            path: path.to_path_buf(),
            reason: format!("幕数量不一致: 快照 {}, 配置 {}", n_fnc, dom.fences.len()),
        });
    }
    for fi in 0..n_fnc {
        let i_fnc = next("i_fnc")? as usize;
        let k_low = next("k_low")? as usize;
        let k_high = next("k_high")? as usize;
        let f = &mut dom.fences[fi];
        f.i_fnc = i_fnc;
        f.k_low = k_low;
        f.k_high = k_high;
    }

    let nps = next("nps")? as usize;
    let _rho_ss = next("rho_ss")?;
    if nps != dom.nps() {
        return Err(IoError::Invalid {
            path: path.to_path_buf(),
            reason: format!("粒径类数不一致: 快照 {}, 配置 {}", nps, dom.nps()),
        });
    }
    for _ in 0..nps {
        let _ = next("diameter")?;
    }

    let nx = next("nx")? as usize;
    let nz = next("nz")? as usize;
    if nx != dom.mesh.nx || nz != dom.mesh.nz {
        return Err(IoError::Invalid {
            path: path.to_path_buf(),
            reason: format!(
                "网格尺寸不一致: 快照 {}×{}, 几何 {}×{}",
                nx, nz, dom.mesh.nx, dom.mesh.nz
            ),
        });
    }

    read_field(&mut next, &mut dom.u)?;
    read_field(&mut next, &mut dom.w)?;
    read_field(&mut next, &mut dom.rho)?;
    read_field(&mut next, &mut dom.p)?;
    read_field(&mut next, &mut dom.t)?;
    for l in 0..nps {
        read_field(&mut next, &mut dom.c[l])?;
    }
    for l in 0..nps {
        for v in dom.c_sed[l].iter_mut() {
            *v = next("c_sed")?;
        }
    }
    read_field(&mut next, &mut dom.dhz)?;
    read_field(&mut next, &mut dom.dmx)?;
    read_field(&mut next, &mut dom.dmz)?;

    // 表层几何与蓄水量
    dom.total_vol = total_vol;
    dom.mesh.update_surface_layer(z_srf).map_err(|e| IoError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(time_day)
}

fn write_field(text: &mut String, field: &Field2) {
    write_slice(text, field.as_slice());
}

fn write_slice(text: &mut String, values: &[Scalar]) {
    for chunk in values.chunks(PER_LINE) {
        let mut first = true;
        for &v in chunk {
            let v = if v.abs() < TINY { 0.0 } else { v };
            if first {
                let _ = write!(text, "{:.17e}", v);
                first = false;
            } else {
                let _ = write!(text, " {:.17e}", v);
            }
        }
        let _ = writeln!(text);
    }
}

fn read_field(
    next: &mut impl FnMut(&str) -> Result<Scalar, IoError>,
    field: &mut Field2,
) -> Result<(), IoError> {
    for v in field.as_mut_slice() {
        *v = next("field value")?;
    }
    Ok(())
}
