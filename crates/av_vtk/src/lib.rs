// crates/av_vtk/src/lib.rs

//! AmrViz VTK 容器模块
//!
//! 提供重叠 AMR（Overlapping AMR）两级容器及其 ASCII 写出。
//!
//! # 模块
//!
//! - [`amr`]: 容器结构（顶层容器 → 逐层 Block → 逐片 Box）
//! - [`writer`]: ASCII 写出器（`.vthb` 索引 + 逐 Box `.vti` 数据文件）
//! - [`error`]: 容器与写出错误类型
//!
//! # 构造协议
//!
//! 容器在构造时固定全局原点、层数与逐层 Box 数，之后不再扩容；
//! 每层的 Block 在构造时就知道自己最终的 Box 数。挂接超出声明数量、
//! 或在未挂满时写出，都是错误。
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use av_vtk::{AmrBlock, AmrBox, OverlappingAmr};
//!
//! let mut amr = OverlappingAmr::new(origin, Dim::D2, vec![1])?;
//! let mut block = AmrBlock::new(0, 1, spacing, origin);
//! let mut b = AmrBox::new(box_origin, [11, 11, 0])?;
//! b.set_cell_data(values, "q_0")?;
//! b.set_ghost_data(mask)?;
//! block.attach_box(b)?;
//! amr.attach_block(block)?;
//! amr.write_ascii("_output", "claw0000")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod amr;
pub mod error;
pub mod writer;

// 重导出常用类型
pub use amr::{AmrBlock, AmrBox, ArrayValues, CellArray, OverlappingAmr, GHOST_ARRAY_NAME};
pub use error::{VtkError, VtkResult};
pub use writer::AmrAsciiWriter;
