// crates/av_foundation/src/dimension.rs

//! 维度判别
//!
//! 解的维度（2D 或 3D）来自求解器输出数据，在运行时才能确定，
//! 因此使用枚举做运行时分发，而不是类型参数。
//!
//! # 用法
//!
//! ```
//! use av_foundation::dimension::Dim;
//!
//! let dim = Dim::D2;
//! assert_eq!(dim.n_axes(), 2);
//! assert_eq!(dim.grid_description(), "XY");
//! ```
//!
//! # 设计说明
//!
//! 补第三轴的各种哨兵值（原点补 0、间距 dz = dx、节点数补 0）不在这里
//! 定义，由几何类型在转换为固定 3 分量输出形式时显式处理，避免补轴逻辑
//! 散落在多个组件中。

use serde::{Deserialize, Serialize};

/// 维度判别
///
/// 标识一个解（及其全部网格片）的空间维度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dim {
    /// 二维
    D2,
    /// 三维
    D3,
}

impl Dim {
    /// 空间轴数（2D=2, 3D=3）
    #[inline]
    pub fn n_axes(self) -> usize {
        match self {
            Dim::D2 => 2,
            Dim::D3 => 3,
        }
    }

    /// 维度名称（用于日志和错误信息）
    pub fn name(self) -> &'static str {
        match self {
            Dim::D2 => "2D",
            Dim::D3 => "3D",
        }
    }

    /// 输出容器的网格描述字符串
    ///
    /// 2D 数据的第三轴是退化轴，容器按 "XY" 平面网格处理。
    pub fn grid_description(self) -> &'static str {
        match self {
            Dim::D2 => "XY",
            Dim::D3 => "XYZ",
        }
    }

    /// 是否为 3D
    #[inline]
    pub fn is_3d(self) -> bool {
        matches!(self, Dim::D3)
    }
}
