// crates/av_export/src/layout.rs

//! 层聚合
//!
//! 导出的第一步纯计算：扫描解中全部网格片，把源层号归一化为
//! 从 0 起的连续输出层，得出逐层网格片数、逐层间距、层首偏移
//! 与全局原点。结果是后续装配阶段的全部尺寸信息，容器因此可以
//! 一次性按最终大小构造，不需要原地扩容。
//!
//! # 归一化规则
//!
//! 源层号从 1 起且允许有空洞（如 {1,3}）；输出层取"出现过的
//! 不同源层号"按升序的稠密重编号（{1,3} → {0,1}）。
//!
//! # 层内间距不变量
//!
//! 层的间距取自该层按源顺序的第一个网格片；后续网格片的间距
//! 必须在相对容差内一致，否则立即报错。

use av_solution::Solution;
use glam::DVec3;

use crate::error::{ExportError, ExportResult};

/// 层内间距比较的相对容差
const SPACING_REL_TOL: f64 = 1e-12;

/// 单个输出层的聚合信息
#[derive(Debug, Clone, PartialEq)]
pub struct LevelInfo {
    /// 该层的网格片数
    pub n_patches: usize,
    /// 该层的逐轴单元间距（3 分量，2D 时 dz = dx）
    pub spacing: DVec3,
    /// 该层首个网格片在排序序列中的偏移
    pub offset: usize,
}

/// 整个解的层聚合结果
#[derive(Debug, Clone)]
pub struct LevelLayout {
    /// 全局原点（基准网格片的左下角，所有层共享）
    pub global_origin: DVec3,
    /// 按输出层索引排列的逐层信息
    pub levels: Vec<LevelInfo>,
    /// 按归一化层稳定排序后的状态索引（层内保持源顺序）
    pub sorted_states: Vec<usize>,
}

impl LevelLayout {
    /// 从解计算层聚合
    pub fn from_solution(solution: &Solution) -> ExportResult<Self> {
        if solution.states.is_empty() {
            return Err(ExportError::EmptySolution);
        }
        solution.validate()?;

        let global_origin = solution.base_state()?.patch.extent.origin3();

        // 源层号 -> 稠密输出层索引
        let mut distinct: Vec<u32> = solution.states.iter().map(|s| s.patch.level).collect();
        distinct.sort_unstable();
        distinct.dedup();
        let dense = |level: u32| -> usize {
            distinct.binary_search(&level).expect("层号必定存在")
        };

        // 稳定排序：层内保持源顺序
        let mut sorted_states: Vec<usize> = (0..solution.n_states()).collect();
        sorted_states.sort_by_key(|&i| dense(solution.states[i].patch.level));

        // 逐层计数与间距；间距取自源顺序下该层的第一个网格片
        let mut counts = vec![0usize; distinct.len()];
        let mut spacings: Vec<Option<DVec3>> = vec![None; distinct.len()];
        for state in &solution.states {
            let level = dense(state.patch.level);
            counts[level] += 1;
            let spacing = state.patch.extent.spacing3();
            match spacings[level] {
                None => spacings[level] = Some(spacing),
                Some(expected) => {
                    if !spacing_matches(expected, spacing) {
                        return Err(ExportError::SpacingMismatch {
                            level,
                            expected,
                            actual: spacing,
                        });
                    }
                }
            }
        }

        let mut levels = Vec::with_capacity(distinct.len());
        let mut offset = 0usize;
        for (n_patches, spacing) in counts.iter().zip(&spacings) {
            levels.push(LevelInfo {
                n_patches: *n_patches,
                spacing: spacing.expect("每个存在的层至少有一个网格片"),
                offset,
            });
            offset += n_patches;
        }
        debug_assert_eq!(offset, solution.n_states());

        log::debug!(
            "层聚合: {} 层, 逐层网格片数 {:?}",
            levels.len(),
            counts
        );
        Ok(Self {
            global_origin,
            levels,
            sorted_states,
        })
    }

    /// 输出层数
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// 逐层网格片数
    pub fn boxes_per_level(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.n_patches).collect()
    }
}

/// 逐分量相对容差比较
fn spacing_matches(expected: DVec3, actual: DVec3) -> bool {
    let rel = |a: f64, b: f64| (a - b).abs() <= SPACING_REL_TOL * b.abs();
    rel(actual.x, expected.x) && rel(actual.y, expected.y) && rel(actual.z, expected.z)
}
