// crates/lh_physics/src/forcing/schedule.rs

//! 边界时序
//!
//! 行对齐的多变量时序：`time[0..nt]` 严格单调递增，每行携带
//! `nv` 个变量（入流为 Q, T, c₁..c_nps；出流为 Q）。游标由调用方
//! 持有，单调查询下保持线性时间。查询时刻超出数据范围是错误
//! （由上层附加域 id 与步号后作为致命错误上抛）。

use lh_foundation::{LhError, LhResult, Scalar};
use serde::{Deserialize, Serialize};

/// 时序查找游标
///
/// 由各边界描述符持有，避免重复二分查找。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScheduleCursor {
    /// 上次命中的区间索引
    pub last_index: usize,
}

/// 行对齐多变量时序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSeries {
    /// 时间点 [day]（严格单调递增）
    times: Vec<Scalar>,
    /// 变量行（与 times 对齐，每行 nv 个值）
    rows: Vec<Vec<Scalar>>,
    /// 每行变量数
    nv: usize,
}

impl ScheduleSeries {
    /// 从时间与变量行创建
    pub fn new(times: Vec<Scalar>, rows: Vec<Vec<Scalar>>) -> LhResult<Self> {
        if times.is_empty() {
            return Err(LhError::invalid_input("时序不能为空"));
        }
        LhError::check_size("schedule rows", times.len(), rows.len())?;
        let nv = rows[0].len();
        if nv == 0 {
            return Err(LhError::invalid_input("时序必须至少有一个变量列"));
        }
        for (r, row) in rows.iter().enumerate() {
            LhError::check_size("schedule row width", nv, row.len()).map_err(|_| {
                LhError::invalid_input(format!("第 {} 行变量数 {} 与首行 {} 不一致", r, row.len(), nv))
            })?;
        }
        for i in 1..times.len() {
            if times[i] <= times[i - 1] {
                return Err(LhError::invalid_input(format!(
                    "时序时间必须严格递增: t[{}]={} <= t[{}]={}",
                    i,
                    times[i],
                    i - 1,
                    times[i - 1]
                )));
            }
        }
        Ok(Self { times, rows, nv })
    }

    /// 常值时序（任意时刻返回同一行）
    pub fn constant(values: Vec<Scalar>) -> Self {
        let nv = values.len().max(1);
        let values = if values.is_empty() { vec![0.0] } else { values };
        Self {
            times: vec![0.0],
            rows: vec![values],
            nv,
        }
    }

    /// 变量数
    pub fn nv(&self) -> usize {
        self.nv
    }

    /// 数据行数
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// 是否为空（构造后恒 false，保留习惯接口）
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// 时间范围 [day]
    pub fn time_range(&self) -> (Scalar, Scalar) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// 查询 t 时刻的插值行
    ///
    /// 单点（常值）时序任意时刻可查；多点时序要求
    /// `times[0] <= t <= times[nt-1]`，否则报错。
    pub fn sample(&self, t: Scalar, cursor: &mut ScheduleCursor) -> LhResult<Vec<Scalar>> {
        let mut out = vec![0.0; self.nv];
        self.sample_into(t, cursor, &mut out)?;
        Ok(out)
    }

    /// 查询 t 时刻的插值行（写入外部缓冲）
    pub fn sample_into(
        &self,
        t: Scalar,
        cursor: &mut ScheduleCursor,
        out: &mut [Scalar],
    ) -> LhResult<()> {
        LhError::check_size("schedule sample buffer", self.nv, out.len())?;
        let n = self.times.len();
        if n == 1 {
            out.copy_from_slice(&self.rows[0]);
            return Ok(());
        }
        let t0 = self.times[0];
        let t1 = self.times[n - 1];
        if t < t0 || t > t1 {
            return Err(LhError::invalid_input(format!(
                "查询时刻 {} 超出时序范围 [{}, {}]",
                t, t0, t1
            )));
        }

        // 游标起步，向前线性推进（单调查询 O(1)）
        let mut idx = cursor.last_index.min(n - 2);
        if t < self.times[idx] {
            idx = 0;
        }
        while idx < n - 2 && t >= self.times[idx + 1] {
            idx += 1;
        }
        cursor.last_index = idx;

        let ta = self.times[idx];
        let tb = self.times[idx + 1];
        let frac = (t - ta) / (tb - ta);
        for v in 0..self.nv {
            let a = self.rows[idx][v];
            let b = self.rows[idx + 1][v];
            out[v] = a + frac * (b - a);
        }
        Ok(())
    }
}
