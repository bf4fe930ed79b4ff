// crates/lh_physics/src/numerics/tridiag.rs

//! 三对角求解（Thomas 算法）
//!
//! 逐列半隐式垂向扩散步专用。系统规模为单列层数（几十量级），
//! 不做并行化；系数在调用侧保证对角占优。

use lh_foundation::Scalar;

/// 求解三对角系统 a·x_{j-1} + b·x_j + c·x_{j+1} = d
///
/// `a[0]` 与 `c[n-1]` 不被读取。解写回 `d`。
/// 消元过程中对角元退化（|·| < 1e-300）时返回 false，调用方
/// 保留右端项原值作为回退。
pub fn solve_tridiagonal(
    a: &[Scalar],
    b: &[Scalar],
    c: &[Scalar],
    d: &mut [Scalar],
    scratch: &mut Vec<Scalar>,
) -> bool {
    let n = d.len();
    if n == 0 {
        return true;
    }
    debug_assert!(a.len() >= n && b.len() >= n && c.len() >= n);

    scratch.clear();
    scratch.resize(n, 0.0);

    if b[0].abs() < 1e-300 {
        return false;
    }
    scratch[0] = c[0] / b[0];
    d[0] /= b[0];
    for j in 1..n {
        let denom = b[j] - a[j] * scratch[j - 1];
        if denom.abs() < 1e-300 {
            return false;
        }
        scratch[j] = c[j] / denom;
        d[j] = (d[j] - a[j] * d[j - 1]) / denom;
    }
    for j in (0..n - 1).rev() {
        d[j] -= scratch[j] * d[j + 1];
    }
    true
}
