// crates/av_solution/src/field.rs

//! 场数组
//!
//! 以单元为中心的多场数组，形状为 (场数, nx, ny[, nz])。
//! 第 0 轴是场索引；空间存储为 x 主序（最后一个空间轴变化最快），
//! 与求解器输出的 C 序存储一致。
//!
//! # 设计说明
//!
//! 输出容器要求 x 变化最快的轴序，与本存储序互为转置，
//! 由 [`FieldArray::field_vtk_order`] 在导出时一次性完成。

use av_foundation::{AvError, AvResult};
use serde::{Deserialize, Serialize};

/// 以单元为中心的多场数组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldArray {
    /// 场数量
    n_fields: usize,
    /// 空间形状（长度 2 或 3）
    shape: Vec<usize>,
    /// 扁平数据，长度 = n_fields * 单元总数
    data: Vec<f64>,
}

impl FieldArray {
    /// 创建全零数组
    pub fn zeros(n_fields: usize, shape: &[usize]) -> Self {
        let n_cells: usize = shape.iter().product();
        Self {
            n_fields,
            shape: shape.to_vec(),
            data: vec![0.0; n_fields * n_cells],
        }
    }

    /// 从扁平数据创建，长度必须等于 n_fields * 单元总数
    pub fn from_vec(n_fields: usize, shape: &[usize], data: Vec<f64>) -> AvResult<Self> {
        let n_cells: usize = shape.iter().product();
        AvError::check_size("field_data", n_fields * n_cells, data.len())?;
        Ok(Self {
            n_fields,
            shape: shape.to_vec(),
            data,
        })
    }

    /// 场数量
    #[inline]
    pub fn n_fields(&self) -> usize {
        self.n_fields
    }

    /// 空间形状
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// 单元总数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.shape.iter().product()
    }

    /// 第 `f` 个场的只读切片（存储序）
    pub fn field(&self, f: usize) -> &[f64] {
        let n = self.n_cells();
        &self.data[f * n..(f + 1) * n]
    }

    /// 第 `f` 个场的可写切片（存储序）
    pub fn field_mut(&mut self, f: usize) -> &mut [f64] {
        let n = self.n_cells();
        &mut self.data[f * n..(f + 1) * n]
    }

    /// 读取单个单元值，`idx` 为逐轴空间索引
    pub fn get(&self, f: usize, idx: &[usize]) -> f64 {
        self.field(f)[self.flat_index(idx)]
    }

    /// 写入单个单元值，`idx` 为逐轴空间索引
    pub fn set(&mut self, f: usize, idx: &[usize], value: f64) {
        let flat = self.flat_index(idx);
        self.field_mut(f)[flat] = value;
    }

    /// 逐轴空间索引 -> 存储序扁平索引（x 主序）
    fn flat_index(&self, idx: &[usize]) -> usize {
        debug_assert_eq!(idx.len(), self.shape.len());
        let mut flat = 0;
        for (i, &x) in idx.iter().enumerate() {
            debug_assert!(x < self.shape[i]);
            flat = flat * self.shape[i] + x;
        }
        flat
    }

    /// 第 `f` 个场按输出容器轴序（x 变化最快）重排后的副本
    ///
    /// 即存储序 (x 主序) 的转置。
    pub fn field_vtk_order(&self, f: usize) -> Vec<f64> {
        let src = self.field(f);
        match self.shape.len() {
            2 => {
                let (nx, ny) = (self.shape[0], self.shape[1]);
                let mut out = vec![0.0; nx * ny];
                for ix in 0..nx {
                    for iy in 0..ny {
                        out[iy * nx + ix] = src[ix * ny + iy];
                    }
                }
                out
            }
            3 => {
                let (nx, ny, nz) = (self.shape[0], self.shape[1], self.shape[2]);
                let mut out = vec![0.0; nx * ny * nz];
                for ix in 0..nx {
                    for iy in 0..ny {
                        for iz in 0..nz {
                            out[(iz * ny + iy) * nx + ix] = src[(ix * ny + iy) * nz + iz];
                        }
                    }
                }
                out
            }
            n => unreachable!("不支持的空间维度: {n}"),
        }
    }

    /// 追加一个场，返回增广副本（原数组不变）
    ///
    /// `extra` 的长度必须等于单元总数；新场成为场轴上的最后一个槽位。
    pub fn with_appended_field(&self, extra: &[f64]) -> AvResult<FieldArray> {
        AvError::check_size("appended_field", self.n_cells(), extra.len())?;
        let mut data = Vec::with_capacity(self.data.len() + extra.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(extra);
        Ok(Self {
            n_fields: self.n_fields + 1,
            shape: self.shape.clone(),
            data,
        })
    }
}
