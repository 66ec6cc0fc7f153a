// crates/av_foundation/src/lib.rs

//! AmrViz Foundation Layer
//!
//! 零依赖基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`dimension`]: 2D/3D 维度判别
//!
//! # 设计原则
//!
//! 1. **零外部依赖**: 仅依赖 serde 和 thiserror
//! 2. **快速失败**: 契约违规立即报错，不做静默修复
//! 3. **运行时判别**: 解的维度来自数据而非类型参数

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dimension;
pub mod error;

// 重导出常用类型
pub use dimension::Dim;
pub use error::{AvError, AvResult};

/// 条件检查宏：条件不满足时返回给定错误
///
/// # 示例
///
/// ```
/// use av_foundation::{ensure, AvError, AvResult};
///
/// fn check(value: i32) -> AvResult<()> {
///     ensure!(value > 0, AvError::invalid_input("值必须为正"));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// Option 解包宏：None 时返回给定错误
///
/// # 示例
///
/// ```
/// use av_foundation::{require, AvError, AvResult};
///
/// fn first(values: &[f64]) -> AvResult<f64> {
///     let v = require!(values.first(), AvError::invalid_input("序列为空"));
///     Ok(*v)
/// }
/// ```
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::dimension::Dim;
    pub use crate::error::{AvError, AvResult};
    pub use crate::{ensure, require};
}
