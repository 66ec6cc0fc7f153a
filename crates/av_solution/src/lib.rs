// crates/av_solution/src/lib.rs

//! AmrViz 解数据模型
//!
//! 求解器侧的只读数据模型：AMR 解（Solution）由若干状态（State）组成，
//! 每个状态拥有一个矩形网格片（Patch）和一个以单元为中心的场数组（Q）。
//!
//! # 模块
//!
//! - [`patch`]: 网格片几何（2D/3D 判别表示）
//! - [`field`]: 场数组（场索引为第 0 轴的扁平存储）
//! - [`state`]: State 与 Solution
//! - [`overlap`]: 重叠标注（ghost 掩码）接口与默认实现
//!
//! # 设计说明
//!
//! 导出器对解只做一次显式的"标注"变换（追加重叠掩码场，返回增广副本），
//! 其余访问全部为只读，不修改调用方持有的数据。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod overlap;
pub mod patch;
pub mod state;

// 重导出常用类型
pub use field::FieldArray;
pub use overlap::{
    annotate_overlaps, OverlapDetector, RectangleOverlapDetector, GHOST_ACTIVE,
    GHOST_DUPLICATE_CELL,
};
pub use patch::{Patch, PatchExtent};
pub use state::{Solution, State};
