// crates/lh_foundation/src/field.rs

//! 列主序二维场数组
//!
//! 为纵向-垂向求解器提供稠密场存储。索引 `(i, k)`：
//! i 为纵向（沿库长），k 为垂向（沿水深）。同一列 (i 固定) 的
//! 数据在内存中连续，垂向扫描（静水压柱、三对角求解）具有
//! 最佳局部性。
//!
//! 多粒径浓度场按"通道数组"组织为 `Vec<Field2>`，每个粒径类
//! 一个通道，避免条件编译的重复代码路径。

use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// 稠密二维场（列主序）
///
/// `ni` × `nk` 个元素，`(i, k)` 以 `data[i * nk + k]` 寻址。
/// 边界带（幽灵单元）由调用方计入 `ni`/`nk`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field2 {
    ni: usize,
    nk: usize,
    data: Vec<Scalar>,
}

impl Field2 {
    /// 创建全零场
    pub fn zeros(ni: usize, nk: usize) -> Self {
        Self {
            ni,
            nk,
            data: vec![0.0; ni * nk],
        }
    }

    /// 创建常值场
    pub fn filled(ni: usize, nk: usize, value: Scalar) -> Self {
        Self {
            ni,
            nk,
            data: vec![value; ni * nk],
        }
    }

    /// 纵向尺寸
    #[inline]
    pub fn ni(&self) -> usize {
        self.ni
    }

    /// 垂向尺寸
    #[inline]
    pub fn nk(&self) -> usize {
        self.nk
    }

    /// 全场填充
    pub fn fill(&mut self, value: Scalar) {
        self.data.fill(value);
    }

    /// 底层切片（快照输出用，按列主序）
    pub fn as_slice(&self) -> &[Scalar] {
        &self.data
    }

    /// 底层可变切片（快照恢复用）
    pub fn as_mut_slice(&mut self) -> &mut [Scalar] {
        &mut self.data
    }

    /// 第 i 列的连续切片
    #[inline]
    pub fn column(&self, i: usize) -> &[Scalar] {
        debug_assert!(i < self.ni);
        &self.data[i * self.nk..(i + 1) * self.nk]
    }

    /// 第 i 列的可变切片
    #[inline]
    pub fn column_mut(&mut self, i: usize) -> &mut [Scalar] {
        debug_assert!(i < self.ni);
        &mut self.data[i * self.nk..(i + 1) * self.nk]
    }

    /// 是否含非有限值（NaN/Inf）
    pub fn has_non_finite(&self) -> bool {
        self.data.iter().any(|v| !v.is_finite())
    }

    /// 将另一个场整体拷入（尺寸必须一致）
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(self.ni, other.ni, "Field2 ni mismatch");
        assert_eq!(self.nk, other.nk, "Field2 nk mismatch");
        self.data.copy_from_slice(&other.data);
    }
}

impl Index<(usize, usize)> for Field2 {
    type Output = Scalar;

    #[inline]
    fn index(&self, (i, k): (usize, usize)) -> &Scalar {
        debug_assert!(i < self.ni && k < self.nk, "Field2[{}, {}] 越界", i, k);
        &self.data[i * self.nk + k]
    }
}

impl IndexMut<(usize, usize)> for Field2 {
    #[inline]
    fn index_mut(&mut self, (i, k): (usize, usize)) -> &mut Scalar {
        debug_assert!(i < self.ni && k < self.nk, "Field2[{}, {}] 越界", i, k);
        &mut self.data[i * self.nk + k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let mut f = Field2::zeros(4, 3);
        f[(2, 1)] = 7.5;
        assert!((f[(2, 1)] - 7.5).abs() < 1e-15);
        assert!((f[(2, 0)] - 0.0).abs() < 1e-15);
    }

    #[test]
    fn test_column_contiguity() {
        let mut f = Field2::zeros(3, 4);
        for k in 0..4 {
            f[(1, k)] = k as Scalar;
        }
        let col = f.column(1);
        assert_eq!(col, &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_filled_and_fill() {
        let mut f = Field2::filled(2, 2, 4.0);
        assert!((f[(0, 0)] - 4.0).abs() < 1e-15);
        f.fill(-1.0);
        assert!(f.as_slice().iter().all(|&v| (v + 1.0).abs() < 1e-15));
    }

    #[test]
    fn test_has_non_finite() {
        let mut f = Field2::zeros(2, 2);
        assert!(!f.has_non_finite());
        f[(1, 1)] = Scalar::NAN;
        assert!(f.has_non_finite());
    }
}
