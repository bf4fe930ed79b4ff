// crates/lh_foundation/src/kahan.rs

//! 补偿求和
//!
//! 体积平衡与颗粒质量审计需要对 O(nx·nz) 个量级差异很大的
//! 体元求和，朴素求和的舍入误差会污染 1e-8 级的守恒判据。
//! 采用 Kahan-Babuska 补偿算法。

use crate::scalar::Scalar;

/// Kahan 补偿累加器
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: Scalar,
    compensation: Scalar,
}

impl KahanSum {
    /// 创建零累加器
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一个值
    #[inline]
    pub fn add(&mut self, value: Scalar) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 当前总和
    #[inline]
    pub fn total(&self) -> Scalar {
        self.sum
    }
}

impl FromIterator<Scalar> for KahanSum {
    fn from_iter<I: IntoIterator<Item = Scalar>>(iter: I) -> Self {
        let mut acc = Self::new();
        for v in iter {
            acc.add(v);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sum() {
        let mut acc = KahanSum::new();
        for _ in 0..10 {
            acc.add(0.1);
        }
        assert!((acc.total() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_magnitude_spread() {
        // 大数吞噬小数的典型场景
        let mut acc = KahanSum::new();
        acc.add(1e16);
        for _ in 0..1000 {
            acc.add(1.0);
        }
        acc.add(-1e16);
        assert!((acc.total() - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_iterator() {
        let acc: KahanSum = (0..100).map(|i| i as Scalar).collect();
        assert!((acc.total() - 4950.0).abs() < 1e-12);
    }
}
