// crates/lh_physics/src/sources/fence.rs

//! 阻流幕约束
//!
//! 幕是内部零通量屏障：所在 u 面的流速置零，跨越该面的标量
//! 对流/扩散通量同样被阻断。浮幕的层跨度随水面更新（耦合器
//! 调用 [`crate::domain::Domain::update_floating_fences`]）。

use crate::domain::Domain;

/// 幕面置零：把各幕跨度内的 u 钳为零
pub fn apply_to_momentum(dom: &mut Domain) {
    for fi in 0..dom.fences.len() {
        let (i_fnc, k_low, k_high) = {
            let f = &dom.fences[fi];
            (f.i_fnc, f.k_low, f.k_high)
        };
        for k in k_low..=k_high.min(dom.mesh.nz) {
            dom.u[(i_fnc, k)] = 0.0;
        }
    }
}

/// 判定 u 面 (i, k) 是否被某个幕阻断
#[inline]
pub fn blocks_u_face(dom: &Domain, i: usize, k: usize) -> bool {
    dom.fences
        .iter()
        .any(|f| f.i_fnc == i && k >= f.k_low && k <= f.k_high)
}
