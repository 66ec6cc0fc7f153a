// crates/av_solution/src/patch.rs

//! 网格片几何
//!
//! 一个网格片（Patch）是某一加密层上的一块矩形结构网格。
//! 几何按维度判别存储：2D 网格片只保存 2 分量，3D 保存 3 分量；
//! 输出格式要求的固定 3 分量形式（补零原点、dz = dx、退化轴节点数为 0）
//! 只在显式转换方法中产生。
//!
//! # 坐标约定
//!
//! - `lower`: 网格片在全局域中的空间原点（左下角）
//! - `delta`: 逐轴单元间距
//! - `num_cells`: 逐轴单元数（整数，单元中心数据）
//! - 节点数 = 单元数 + 1（输出格式按节点索引几何）

use av_foundation::{AvError, AvResult, Dim};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// 单元数视为整数的容差
///
/// 求解器输出头以浮点形式携带单元数，超出该容差视为上游数据损坏。
const CELL_COUNT_TOL: f64 = 1e-9;

/// 网格片几何（维度判别表示）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatchExtent {
    /// 二维矩形网格片
    D2 {
        /// 全局空间原点
        lower: DVec2,
        /// 逐轴单元间距
        delta: DVec2,
        /// 逐轴单元数
        num_cells: [u64; 2],
    },
    /// 三维长方体网格片
    D3 {
        /// 全局空间原点
        lower: DVec3,
        /// 逐轴单元间距
        delta: DVec3,
        /// 逐轴单元数
        num_cells: [u64; 3],
    },
}

impl PatchExtent {
    /// 维度判别
    pub fn dim(&self) -> Dim {
        match self {
            PatchExtent::D2 { .. } => Dim::D2,
            PatchExtent::D3 { .. } => Dim::D3,
        }
    }

    /// 单元总数
    pub fn n_cells(&self) -> usize {
        match self {
            PatchExtent::D2 { num_cells, .. } => (num_cells[0] * num_cells[1]) as usize,
            PatchExtent::D3 { num_cells, .. } => {
                (num_cells[0] * num_cells[1] * num_cells[2]) as usize
            }
        }
    }

    /// 逐轴单元数（场数组形状，长度 2 或 3）
    pub fn shape(&self) -> Vec<usize> {
        match self {
            PatchExtent::D2 { num_cells, .. } => vec![num_cells[0] as usize, num_cells[1] as usize],
            PatchExtent::D3 { num_cells, .. } => vec![
                num_cells[0] as usize,
                num_cells[1] as usize,
                num_cells[2] as usize,
            ],
        }
    }

    /// 固定 3 分量原点：2D 补 z = 0
    pub fn origin3(&self) -> DVec3 {
        match self {
            PatchExtent::D2 { lower, .. } => DVec3::new(lower.x, lower.y, 0.0),
            PatchExtent::D3 { lower, .. } => *lower,
        }
    }

    /// 固定 3 分量间距：2D 按约定取 dz = dx
    pub fn spacing3(&self) -> DVec3 {
        match self {
            PatchExtent::D2 { delta, .. } => DVec3::new(delta.x, delta.y, delta.x),
            PatchExtent::D3 { delta, .. } => *delta,
        }
    }

    /// 固定 3 分量节点数：逐轴单元数 + 1
    ///
    /// 2D 的第三轴节点数为 0，表示输出格式中的退化轴（"该轴没有单元"），
    /// 与"该轴有一个单元"（节点数 2）及"单层节点"（节点数 1）均不同。
    pub fn node_count3(&self) -> [u64; 3] {
        match self {
            PatchExtent::D2 { num_cells, .. } => [num_cells[0] + 1, num_cells[1] + 1, 0],
            PatchExtent::D3 { num_cells, .. } => {
                [num_cells[0] + 1, num_cells[1] + 1, num_cells[2] + 1]
            }
        }
    }

    /// 单元中心的全局物理坐标
    ///
    /// `flat` 为场数组存储序下的扁平单元索引（x 主序，最后一个空间轴变化最快）。
    pub fn cell_center(&self, flat: usize) -> DVec3 {
        match self {
            PatchExtent::D2 {
                lower,
                delta,
                num_cells,
            } => {
                let ny = num_cells[1] as usize;
                let ix = flat / ny;
                let iy = flat % ny;
                DVec3::new(
                    lower.x + (ix as f64 + 0.5) * delta.x,
                    lower.y + (iy as f64 + 0.5) * delta.y,
                    0.0,
                )
            }
            PatchExtent::D3 {
                lower,
                delta,
                num_cells,
            } => {
                let ny = num_cells[1] as usize;
                let nz = num_cells[2] as usize;
                let ix = flat / (ny * nz);
                let iy = (flat / nz) % ny;
                let iz = flat % nz;
                DVec3::new(
                    lower.x + (ix as f64 + 0.5) * delta.x,
                    lower.y + (iy as f64 + 0.5) * delta.y,
                    lower.z + (iz as f64 + 0.5) * delta.z,
                )
            }
        }
    }

    /// 点是否落在网格片的物理范围内（半开区间，2D 忽略 z）
    pub fn contains(&self, p: DVec3) -> bool {
        match self {
            PatchExtent::D2 {
                lower,
                delta,
                num_cells,
            } => {
                let upper_x = lower.x + delta.x * num_cells[0] as f64;
                let upper_y = lower.y + delta.y * num_cells[1] as f64;
                p.x >= lower.x && p.x < upper_x && p.y >= lower.y && p.y < upper_y
            }
            PatchExtent::D3 {
                lower,
                delta,
                num_cells,
            } => {
                let upper = DVec3::new(
                    lower.x + delta.x * num_cells[0] as f64,
                    lower.y + delta.y * num_cells[1] as f64,
                    lower.z + delta.z * num_cells[2] as f64,
                );
                p.x >= lower.x
                    && p.x < upper.x
                    && p.y >= lower.y
                    && p.y < upper.y
                    && p.z >= lower.z
                    && p.z < upper.z
            }
        }
    }
}

/// 某一加密层上的一块矩形网格片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// 加密层编号（源编号从 1 起；输出层次结构归一化为从 0 起）
    pub level: u32,
    /// 网格片几何
    pub extent: PatchExtent,
}

impl Patch {
    /// 创建网格片
    pub fn new(level: u32, extent: PatchExtent) -> Self {
        Self { level, extent }
    }

    /// 从求解器输出头的原始浮点序列创建网格片
    ///
    /// `lower` / `delta` / `num_cells` 必须等长（2 或 3）。
    /// 单元数必须为整数且至少为 1，出现小数立即报错，不做截断。
    pub fn from_raw(level: u32, lower: &[f64], delta: &[f64], num_cells: &[f64]) -> AvResult<Self> {
        let n = lower.len();
        if n != delta.len() || n != num_cells.len() {
            return Err(AvError::size_mismatch("patch_axes", n, delta.len().max(num_cells.len())));
        }
        if n != 2 && n != 3 {
            return Err(AvError::invalid_input(format!("不支持的空间维度: {n}")));
        }

        const AXIS_NAMES: [&str; 3] = ["mx", "my", "mz"];
        let mut cells = [0u64; 3];
        for (i, &v) in num_cells.iter().enumerate() {
            if !v.is_finite() || (v - v.round()).abs() > CELL_COUNT_TOL {
                return Err(AvError::non_integral_cell_count(AXIS_NAMES[i], v));
            }
            let c = v.round();
            if c < 1.0 {
                return Err(AvError::invalid_input(format!(
                    "单元数必须至少为 1: {} = {}",
                    AXIS_NAMES[i], v
                )));
            }
            cells[i] = c as u64;
        }
        for (i, &d) in delta.iter().enumerate() {
            if !(d.is_finite() && d > 0.0) {
                return Err(AvError::invalid_input(format!(
                    "单元间距必须为正: 轴 {} = {}",
                    AXIS_NAMES[i], d
                )));
            }
        }

        let extent = if n == 2 {
            PatchExtent::D2 {
                lower: DVec2::new(lower[0], lower[1]),
                delta: DVec2::new(delta[0], delta[1]),
                num_cells: [cells[0], cells[1]],
            }
        } else {
            PatchExtent::D3 {
                lower: DVec3::new(lower[0], lower[1], lower[2]),
                delta: DVec3::new(delta[0], delta[1], delta[2]),
                num_cells: cells,
            }
        };
        Ok(Self::new(level, extent))
    }

    /// 维度判别
    pub fn dim(&self) -> Dim {
        self.extent.dim()
    }

    /// 单元总数
    pub fn n_cells(&self) -> usize {
        self.extent.n_cells()
    }
}
