// crates/av_export/src/error.rs

//! 导出错误类型
//!
//! 按三类划分：契约违规（空解、层内间距不一致等）、协作方失败
//! （重叠标注产出与解不一致）、IO 失败（容器写出）。
//! 全部不在本地恢复，直接向调用方传播；没有部分写出语义。

use av_foundation::AvError;
use av_vtk::VtkError;
use glam::DVec3;
use thiserror::Error;

/// 导出结果类型别名
pub type ExportResult<T> = Result<T, ExportError>;

/// 导出错误枚举
#[derive(Error, Debug)]
pub enum ExportError {
    /// 解不包含任何网格片
    #[error("解不包含任何网格片")]
    EmptySolution,

    /// 同层网格片间距不一致
    ///
    /// 层的间距取自该层按源顺序的第一个网格片，后续网格片必须一致。
    #[error("层 {level} 的间距不一致: 首个网格片 {expected}, 后续网格片 {actual}")]
    SpacingMismatch {
        /// 归一化层索引
        level: usize,
        /// 该层首个网格片的间距
        expected: DVec3,
        /// 不一致网格片的间距
        actual: DVec3,
    },

    /// 重叠标注协作方失败
    #[error("重叠标注失败: {message}")]
    Collaborator {
        /// 失败原因
        message: String,
    },

    /// 数据模型错误
    #[error("数据模型错误: {0}")]
    Solution(#[from] AvError),

    /// 容器构造或写出错误
    #[error("VTK 容器错误: {0}")]
    Vtk(#[from] VtkError),
}

impl ExportError {
    /// 协作方失败
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator {
            message: message.into(),
        }
    }
}
