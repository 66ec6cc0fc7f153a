// crates/av_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `AvError` 枚举和 `AvResult` 类型别名，用于整个项目的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，导出相关错误在 av_export 中定义
//! 2. **易用性**: 提供便捷的构造方法
//! 3. **不可恢复**: 所有错误向调用方传播，导出过程没有部分成功语义
//!
//! # 示例
//!
//! ```
//! use av_foundation::error::{AvError, AvResult};
//!
//! fn read_counts() -> AvResult<()> {
//!     Err(AvError::non_integral_cell_count("mx", 10.5))
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type AvResult<T> = Result<T, AvError>;

/// AmrViz 错误类型
///
/// 核心错误类型，用于整个项目。导出流水线相关的错误在 `av_export` 中扩展。
#[derive(Error, Debug)]
pub enum AvError {
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 单元数非整数
    ///
    /// 求解器输出头中的单元数按约定必须为整数，出现小数说明上游数据损坏，
    /// 不允许静默截断。
    #[error("单元数非整数: {axis} = {value}")]
    NonIntegralCellCount {
        /// 轴名称
        axis: &'static str,
        /// 实际读到的值
        value: f64,
    },

    /// 维度不匹配
    #[error("维度不匹配: 期望 {expected}, 实际 {actual}")]
    DimensionMismatch {
        /// 期望的维度名称
        expected: &'static str,
        /// 实际的维度名称
        actual: &'static str,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl AvError {
    /// 从IO错误创建
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 单元数非整数
    pub fn non_integral_cell_count(axis: &'static str, value: f64) -> Self {
        Self::NonIntegralCellCount { axis, value }
    }

    /// 维度不匹配
    pub fn dimension_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl AvError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> AvResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for AvError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================
