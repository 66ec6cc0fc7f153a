// crates/av_vtk/src/error.rs

//! 容器与写出错误类型
//!
//! 提供 VTK 模块的统一错误枚举，支持通过 thiserror 自动转换底层错误。
//! 所有错误最终可转换为 AvError 以实现跨层错误传递。

use av_foundation::AvError;
use thiserror::Error;

/// VTK 模块结果类型别名
pub type VtkResult<T> = Result<T, VtkError>;

/// VTK 容器与写出错误
#[derive(Error, Debug)]
pub enum VtkError {
    /// IO 错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// Box 数量与声明不符
    #[error("Box 数量与声明不符: 层 {level}, 声明 {declared}, 实际 {actual}")]
    BoxCountMismatch {
        /// 层索引
        level: usize,
        /// 构造时声明的数量
        declared: usize,
        /// 实际挂接的数量
        actual: usize,
    },

    /// 层索引超出容器声明的层数
    #[error("层索引越界: {level} 超出范围 0..{n_levels}")]
    LevelOutOfRange {
        /// 层索引
        level: usize,
        /// 容器层数
        n_levels: usize,
    },

    /// 同一层的 Block 重复挂接
    #[error("层 {level} 的 Block 已挂接")]
    DuplicateBlock {
        /// 层索引
        level: usize,
    },

    /// 写出时缺少某层的 Block
    #[error("层 {level} 的 Block 未挂接")]
    MissingBlock {
        /// 层索引
        level: usize,
    },

    /// 单元数据长度与 Box 单元数不符
    #[error("单元数据长度不符: {name} 期望 {expected}, 实际 {actual}")]
    DataLengthMismatch {
        /// 数组名称
        name: String,
        /// Box 单元总数
        expected: usize,
        /// 数组实际长度
        actual: usize,
    },

    /// Box 缺少 ghost 掩码数组
    #[error("层 {level} 第 {index} 个 Box 缺少 ghost 掩码数组")]
    GhostMissing {
        /// 层索引
        level: usize,
        /// 层内 Box 索引
        index: usize,
    },

    /// ghost 掩码数组重复设置
    #[error("ghost 掩码数组已设置")]
    DuplicateGhost,

    /// Box 原点未对齐到该层网格
    #[error("Box 原点未对齐到层网格: 轴 {axis}, 层内索引 {value}")]
    NonAlignedOrigin {
        /// 轴名称
        axis: &'static str,
        /// 换算出的非整数层内索引
        value: f64,
    },

    /// 无效数据
    #[error("无效数据: {0}")]
    InvalidData(String),
}

impl From<VtkError> for AvError {
    fn from(err: VtkError) -> Self {
        match err {
            VtkError::Io(e) => AvError::io_with_source("VTK 写出失败", e),
            other => AvError::serialization(other.to_string()),
        }
    }
}
