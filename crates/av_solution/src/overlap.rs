// crates/av_solution/src/overlap.rs

//! 重叠标注
//!
//! 粗层网格片中被更细层网格片覆盖的单元在可视化中必须屏蔽，
//! 否则同一区域会被粗细两层重复渲染。本模块为每个网格片生成一张
//! 逐单元掩码（0 = 有效，8 = 被细层覆盖），并以增广副本的形式
//! 追加到场数组的最后一个槽位。
//!
//! # 设计说明
//!
//! 标注是纯变换：调用方持有的 Solution 不被修改。
//! 检测算法通过 [`OverlapDetector`] 接缝注入，求解器若自带逐单元
//! 标志可以实现该 trait；[`RectangleOverlapDetector`] 提供几何参考实现。

use av_foundation::{AvError, AvResult};

use crate::state::{Solution, State};

/// 有效单元的掩码值
pub const GHOST_ACTIVE: u8 = 0;

/// 被细层覆盖单元的掩码值（VTK 重复单元编码）
pub const GHOST_DUPLICATE_CELL: u8 = 8;

/// 重叠检测接缝
///
/// 实现者为解中的每个状态生成一张逐单元掩码，顺序与 `solution.states`
/// 一致，每张掩码长度等于对应网格片的单元总数。
pub trait OverlapDetector {
    /// 生成逐状态掩码
    fn detect(&self, solution: &Solution) -> AvResult<Vec<Vec<u8>>>;
}

/// 几何参考实现：单元中心落入任一更细层网格片的物理范围即视为被覆盖
///
/// "更细层"指源层号严格更大的网格片。网格片数量通常很小，
/// 双重循环足够。
#[derive(Debug, Clone, Copy, Default)]
pub struct RectangleOverlapDetector;

impl OverlapDetector for RectangleOverlapDetector {
    fn detect(&self, solution: &Solution) -> AvResult<Vec<Vec<u8>>> {
        let mut masks = Vec::with_capacity(solution.n_states());
        for state in &solution.states {
            masks.push(mask_for(state, solution));
        }
        Ok(masks)
    }
}

/// 单个状态的掩码
fn mask_for(state: &State, solution: &Solution) -> Vec<u8> {
    let extent = &state.patch.extent;
    let level = state.patch.level;

    let finer: Vec<_> = solution
        .states
        .iter()
        .filter(|s| s.patch.level > level)
        .collect();

    let n = extent.n_cells();
    if finer.is_empty() {
        return vec![GHOST_ACTIVE; n];
    }

    let mut mask = vec![GHOST_ACTIVE; n];
    let mut n_overlapped = 0usize;
    for (flat, slot) in mask.iter_mut().enumerate() {
        let center = extent.cell_center(flat);
        if finer.iter().any(|s| s.patch.extent.contains(center)) {
            *slot = GHOST_DUPLICATE_CELL;
            n_overlapped += 1;
        }
    }
    log::trace!(
        "层 {} 网格片: {}/{} 个单元被细层覆盖",
        level,
        n_overlapped,
        n
    );
    mask
}

/// 重叠标注：返回追加了掩码场的增广副本
///
/// 对每个状态，把检测器产出的掩码作为场轴上的最后一个槽位追加，
/// 场数量恰好增加 1。掩码数量或长度与解不一致视为检测器契约违规。
pub fn annotate_overlaps(
    solution: &Solution,
    detector: &dyn OverlapDetector,
) -> AvResult<Solution> {
    let masks = detector.detect(solution)?;
    AvError::check_size("overlap_masks", solution.n_states(), masks.len())?;

    let mut states = Vec::with_capacity(solution.n_states());
    for (state, mask) in solution.states.iter().zip(&masks) {
        AvError::check_size("overlap_mask_cells", state.q.n_cells(), mask.len())?;
        let mask_f64: Vec<f64> = mask.iter().map(|&v| v as f64).collect();
        let q = state.q.with_appended_field(&mask_f64)?;
        debug_assert_eq!(q.n_fields(), state.q.n_fields() + 1);
        states.push(State::new(state.patch.clone(), q));
    }
    Ok(Solution::new(states))
}
