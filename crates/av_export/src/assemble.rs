// crates/av_export/src/assemble.rs

//! 层次结构装配
//!
//! 把标注后的解按层聚合结果装配成输出容器：每个输出层一个 Block
//! （尺寸、间距、全局原点在构造时给定），层内每个网格片一个 Box。
//! Box 携带命名单元场 `q_0..q_{F-1}`（按输出轴序转置）和一个
//! UInt8 ghost 掩码数组（场轴最后一个槽位）。
//!
//! 本阶段只构造内存中的树，不做任何磁盘 IO。

use av_solution::Solution;
use av_vtk::{AmrBlock, AmrBox, OverlappingAmr};

use crate::error::{ExportError, ExportResult};
use crate::layout::LevelLayout;

/// 掩码值视为整数的容差
const MASK_TOL: f64 = 1e-9;

/// 装配输出容器
///
/// `solution` 必须已经过重叠标注（每个状态的场轴最后一个槽位是掩码）。
pub fn assemble(solution: &Solution, layout: &LevelLayout) -> ExportResult<OverlappingAmr> {
    let dim = solution.dim()?;
    let mut amr = OverlappingAmr::new(layout.global_origin, dim, layout.boxes_per_level())?;

    for (level, info) in layout.levels.iter().enumerate() {
        let mut block = AmrBlock::new(level, info.n_patches, info.spacing, layout.global_origin);

        for k in 0..info.n_patches {
            let state = &solution.states[layout.sorted_states[info.offset + k]];
            let extent = &state.patch.extent;
            let mut amr_box = AmrBox::new(extent.origin3(), extent.node_count3())?;

            let n_fields = state.q.n_fields();
            if n_fields < 2 {
                return Err(ExportError::collaborator(format!(
                    "场数组只有 {n_fields} 个槽位, 缺少掩码场"
                )));
            }

            // 数据场：除最后一个槽位外的全部场
            for f in 0..n_fields - 1 {
                amr_box.set_cell_data(state.q.field_vtk_order(f), format!("q_{f}"))?;
            }
            // 最后一个槽位是 ghost 掩码
            let mask = mask_to_u8(&state.q.field_vtk_order(n_fields - 1))?;
            amr_box.set_ghost_data(mask)?;

            block.attach_box(amr_box)?;
        }
        amr.attach_block(block)?;
    }

    log::debug!(
        "装配完成: {} 层, 共 {} 个 Box",
        amr.n_levels(),
        layout.sorted_states.len()
    );
    Ok(amr)
}

/// 掩码场还原为 u8
///
/// 掩码按约定是 u8 语义的整数值；出现小数或越界说明标注协作方违约。
fn mask_to_u8(values: &[f64]) -> ExportResult<Vec<u8>> {
    values
        .iter()
        .map(|&v| {
            let r = v.round();
            if (v - r).abs() > MASK_TOL || !(0.0..=255.0).contains(&r) {
                Err(ExportError::collaborator(format!("掩码值 {v} 不是有效的 u8")))
            } else {
                Ok(r as u8)
            }
        })
        .collect()
}
