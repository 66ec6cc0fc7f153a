// crates/av_export/src/lib.rs

//! AmrViz 导出流水线
//!
//! 把一个 AMR 解的完整快照导出为重叠 AMR 可视化容器：
//! 顶层索引文件 `.vthb` 加上每个网格片一个 `.vti` 数据文件，
//! 可直接在 ParaView 中打开（选择 vthb 文件组，不是文件夹组；
//! 使用 WarpByScalar 等滤镜前可能需要先做 CellDataToPointData）。
//!
//! # 流水线
//!
//! 每个输出帧执行一次，四个阶段顺序运行：
//!
//! 1. 重叠标注: 为每个网格片追加逐单元 ghost 掩码（增广副本）
//! 2. 层聚合: 归一化层号，计算逐层数量、间距与全局原点
//! 3. 层次结构装配: 构造容器 → Block → Box 内存树
//! 4. 写出: 数据文件先写，索引最后写
//!
//! 整个导出在一次调用内同步完成；任一阶段失败即整体失败，
//! 没有部分写出语义。
//!
//! # 层级架构
//!
//! ```text
//! Layer 3: av_export     ─> 流水线与调用面 (本层)
//! Layer 2: av_vtk        ─> 容器与 ASCII 写出
//! Layer 2: av_solution   ─> 解数据模型与重叠标注
//! Layer 1: av_foundation ─> 错误类型与维度判别
//! ```
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use av_export::{export, ExportConfig};
//!
//! let config = ExportConfig::default();
//! for frame in 0..21 {
//!     let solution = load_frame(frame)?;
//!     export(&solution, frame, &config)?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assemble;
pub mod config;
pub mod error;
pub mod layout;

// 重导出常用类型
pub use assemble::assemble;
pub use config::ExportConfig;
pub use error::{ExportError, ExportResult};
pub use layout::{LevelInfo, LevelLayout};

// 重导出下层常用类型，调用方通常只需依赖本 crate
pub use av_solution::{
    annotate_overlaps, FieldArray, OverlapDetector, Patch, PatchExtent,
    RectangleOverlapDetector, Solution, State,
};
pub use av_vtk::{AmrAsciiWriter, OverlappingAmr};

use av_foundation::AvError;

/// 导出一个解的快照（使用几何参考重叠检测）
///
/// 在 `config.path` 下写出 `<prefix><frame:04>.vthb` 索引文件
/// 和同名子目录中的逐网格片数据文件。
pub fn export(solution: &Solution, frame: usize, config: &ExportConfig) -> ExportResult<()> {
    export_with(solution, frame, config, &RectangleOverlapDetector)
}

/// 导出一个解的快照，重叠检测由调用方注入
///
/// 求解器若自带逐单元覆盖标志，可实现 [`OverlapDetector`] 直接复用。
pub fn export_with(
    solution: &Solution,
    frame: usize,
    config: &ExportConfig,
    detector: &dyn OverlapDetector,
) -> ExportResult<()> {
    if solution.states.is_empty() {
        return Err(ExportError::EmptySolution);
    }
    solution.validate()?;

    // 阶段 1：重叠标注（纯变换，调用方的解不变）
    let annotated = annotate_overlaps(solution, detector).map_err(|e| match e {
        AvError::SizeMismatch {
            name: ("overlap_masks" | "overlap_mask_cells"),
            ..
        } => ExportError::collaborator(e.to_string()),
        other => ExportError::Solution(other),
    })?;

    // 阶段 2：层聚合
    let layout = LevelLayout::from_solution(&annotated)?;

    // 阶段 3：装配
    let amr = assemble(&annotated, &layout)?;

    // 阶段 4：写出
    let basename = config.basename(frame);
    log::debug!(
        "导出帧 {}: {} 层, {} 个网格片 -> {}/{}.vthb",
        frame,
        layout.n_levels(),
        solution.n_states(),
        config.path.display(),
        basename
    );
    let writer = AmrAsciiWriter::new().precision(config.precision);
    writer.write(&amr, &config.path, &basename)?;
    Ok(())
}
