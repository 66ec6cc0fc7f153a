// crates/av_vtk/src/amr.rs

//! 重叠 AMR 容器结构
//!
//! 两级树：顶层容器（[`OverlappingAmr`]）按层持有 Block
//! （[`AmrBlock`]），每个 Block 持有若干 Box（[`AmrBox`]），
//! 一个 Box 对应一个网格片。
//!
//! 几何按节点索引：Box 的逐轴节点数 = 单元数 + 1；
//! 节点数为 0 的轴是退化轴（2D 数据的第三轴），表示该轴没有单元。
//!
//! # 构造协议
//!
//! 逐层 Box 数在容器构造时一次性给定，之后只做一致性检查，
//! 不做任何原地扩容。

use av_foundation::Dim;
use glam::DVec3;

use crate::error::{VtkError, VtkResult};

/// ghost 掩码数组的保留名称
pub const GHOST_ARRAY_NAME: &str = "vtkGhostType";

// ============================================================
// 单元数据数组
// ============================================================

/// 单元数据值（按输出格式的标量类型区分）
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    /// 双精度浮点场
    Float64(Vec<f64>),
    /// 8 位无符号整数场（ghost 掩码）
    UInt8(Vec<u8>),
}

impl ArrayValues {
    /// 数组长度
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::Float64(v) => v.len(),
            ArrayValues::UInt8(v) => v.len(),
        }
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 输出格式的类型名
    pub fn type_name(&self) -> &'static str {
        match self {
            ArrayValues::Float64(_) => "Float64",
            ArrayValues::UInt8(_) => "UInt8",
        }
    }
}

/// 命名单元数据数组
#[derive(Debug, Clone, PartialEq)]
pub struct CellArray {
    /// 数组名称
    pub name: String,
    /// 数组值
    pub values: ArrayValues,
}

// ============================================================
// Box：一个网格片的几何与数据
// ============================================================

/// 一个网格片对应的输出 Box
///
/// 由全局左下角与逐轴节点数构造，持有若干命名单元场
/// 和恰好一个 ghost 掩码数组。
#[derive(Debug, Clone)]
pub struct AmrBox {
    origin: DVec3,
    node_count: [u64; 3],
    data: Vec<CellArray>,
    ghost: Option<CellArray>,
}

impl AmrBox {
    /// 创建 Box
    ///
    /// 非退化轴的节点数必须至少为 2（即至少一个单元）；
    /// 节点数为 0 的轴视为退化轴。前两轴不允许退化。
    pub fn new(origin: DVec3, node_count: [u64; 3]) -> VtkResult<Self> {
        if node_count[0] < 2 || node_count[1] < 2 {
            return Err(VtkError::InvalidData(format!(
                "前两轴节点数必须至少为 2: {node_count:?}"
            )));
        }
        if node_count[2] == 1 {
            return Err(VtkError::InvalidData(
                "第三轴节点数为 1 没有意义: 退化轴用 0 表示".into(),
            ));
        }
        Ok(Self {
            origin,
            node_count,
            data: Vec::new(),
            ghost: None,
        })
    }

    /// 全局左下角
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// 逐轴节点数
    pub fn node_count(&self) -> [u64; 3] {
        self.node_count
    }

    /// 逐轴单元数（节点数 - 1；退化轴为 0）
    pub fn cell_counts(&self) -> [u64; 3] {
        self.node_count.map(|n| n.saturating_sub(1))
    }

    /// 单元总数（退化轴不参与乘积）
    pub fn n_cells(&self) -> usize {
        self.cell_counts()
            .iter()
            .filter(|&&c| c > 0)
            .product::<u64>() as usize
    }

    /// 挂接一个命名单元场（Float64）
    ///
    /// 数组长度必须等于单元总数。
    pub fn set_cell_data(&mut self, values: Vec<f64>, name: impl Into<String>) -> VtkResult<()> {
        let name = name.into();
        if values.len() != self.n_cells() {
            return Err(VtkError::DataLengthMismatch {
                name,
                expected: self.n_cells(),
                actual: values.len(),
            });
        }
        self.data.push(CellArray {
            name,
            values: ArrayValues::Float64(values),
        });
        Ok(())
    }

    /// 挂接 ghost 掩码数组（UInt8，保留名称，恰好一次）
    pub fn set_ghost_data(&mut self, values: Vec<u8>) -> VtkResult<()> {
        if self.ghost.is_some() {
            return Err(VtkError::DuplicateGhost);
        }
        if values.len() != self.n_cells() {
            return Err(VtkError::DataLengthMismatch {
                name: GHOST_ARRAY_NAME.into(),
                expected: self.n_cells(),
                actual: values.len(),
            });
        }
        self.ghost = Some(CellArray {
            name: GHOST_ARRAY_NAME.into(),
            values: ArrayValues::UInt8(values),
        });
        Ok(())
    }

    /// 命名单元场列表（不含 ghost）
    pub fn data(&self) -> &[CellArray] {
        &self.data
    }

    /// ghost 掩码数组
    pub fn ghost(&self) -> Option<&CellArray> {
        self.ghost.as_ref()
    }
}

// ============================================================
// Block：一层的全部 Box
// ============================================================

/// 一个加密层对应的 Block
///
/// 构造时即固定层索引、最终 Box 数、该层间距与全局原点。
#[derive(Debug, Clone)]
pub struct AmrBlock {
    level: usize,
    n_boxes: usize,
    spacing: DVec3,
    global_origin: DVec3,
    boxes: Vec<AmrBox>,
}

impl AmrBlock {
    /// 创建 Block，`n_boxes` 为该层最终的 Box 数
    pub fn new(level: usize, n_boxes: usize, spacing: DVec3, global_origin: DVec3) -> Self {
        Self {
            level,
            n_boxes,
            spacing,
            global_origin,
            boxes: Vec::with_capacity(n_boxes),
        }
    }

    /// 层索引（从 0 起）
    pub fn level(&self) -> usize {
        self.level
    }

    /// 声明的 Box 数
    pub fn declared_boxes(&self) -> usize {
        self.n_boxes
    }

    /// 该层的逐轴单元间距
    pub fn spacing(&self) -> DVec3 {
        self.spacing
    }

    /// 全局原点
    pub fn global_origin(&self) -> DVec3 {
        self.global_origin
    }

    /// 已挂接的 Box
    pub fn boxes(&self) -> &[AmrBox] {
        &self.boxes
    }

    /// 挂接一个 Box，超出声明数量报错
    pub fn attach_box(&mut self, amr_box: AmrBox) -> VtkResult<()> {
        if self.boxes.len() >= self.n_boxes {
            return Err(VtkError::BoxCountMismatch {
                level: self.level,
                declared: self.n_boxes,
                actual: self.boxes.len() + 1,
            });
        }
        self.boxes.push(amr_box);
        Ok(())
    }
}

// ============================================================
// 顶层容器
// ============================================================

/// 重叠 AMR 顶层容器
///
/// 由全局原点（所有层共享）、维度与逐层 Box 数构造，
/// 层数与逐层数量之后不再改变。
#[derive(Debug, Clone)]
pub struct OverlappingAmr {
    global_origin: DVec3,
    dim: Dim,
    boxes_per_level: Vec<usize>,
    blocks: Vec<Option<AmrBlock>>,
}

impl OverlappingAmr {
    /// 创建容器
    ///
    /// `boxes_per_level` 按层索引给出每层 Box 数；
    /// 出现零值说明聚合阶段违约（每个存在的层至少有一个网格片）。
    pub fn new(global_origin: DVec3, dim: Dim, boxes_per_level: Vec<usize>) -> VtkResult<Self> {
        if boxes_per_level.is_empty() {
            return Err(VtkError::InvalidData("容器至少需要一层".into()));
        }
        if let Some(level) = boxes_per_level.iter().position(|&n| n == 0) {
            return Err(VtkError::InvalidData(format!("层 {level} 的 Box 数为 0")));
        }
        let n_levels = boxes_per_level.len();
        Ok(Self {
            global_origin,
            dim,
            boxes_per_level,
            blocks: vec![None; n_levels],
        })
    }

    /// 全局原点
    pub fn global_origin(&self) -> DVec3 {
        self.global_origin
    }

    /// 数据维度
    pub fn dim(&self) -> Dim {
        self.dim
    }

    /// 层数
    pub fn n_levels(&self) -> usize {
        self.boxes_per_level.len()
    }

    /// 逐层 Box 数
    pub fn boxes_per_level(&self) -> &[usize] {
        &self.boxes_per_level
    }

    /// 挂接一层的 Block
    ///
    /// 层索引必须在范围内、未挂接过，且 Block 声明的 Box 数
    /// 与容器构造时给定的一致。
    pub fn attach_block(&mut self, block: AmrBlock) -> VtkResult<()> {
        let level = block.level();
        let n_levels = self.n_levels();
        if level >= n_levels {
            return Err(VtkError::LevelOutOfRange { level, n_levels });
        }
        if self.blocks[level].is_some() {
            return Err(VtkError::DuplicateBlock { level });
        }
        if block.declared_boxes() != self.boxes_per_level[level] {
            return Err(VtkError::BoxCountMismatch {
                level,
                declared: self.boxes_per_level[level],
                actual: block.declared_boxes(),
            });
        }
        self.blocks[level] = Some(block);
        Ok(())
    }

    /// 某层的 Block（未挂接返回 None）
    pub fn block(&self, level: usize) -> Option<&AmrBlock> {
        self.blocks.get(level).and_then(|b| b.as_ref())
    }

    /// 写出前的完整性检查
    ///
    /// 所有层的 Block 均已挂接且挂满，每个 Box 都有 ghost 掩码。
    pub fn check_complete(&self) -> VtkResult<()> {
        for (level, slot) in self.blocks.iter().enumerate() {
            let block = slot.as_ref().ok_or(VtkError::MissingBlock { level })?;
            if block.boxes().len() != block.declared_boxes() {
                return Err(VtkError::BoxCountMismatch {
                    level,
                    declared: block.declared_boxes(),
                    actual: block.boxes().len(),
                });
            }
            for (index, b) in block.boxes().iter().enumerate() {
                if b.ghost().is_none() {
                    return Err(VtkError::GhostMissing { level, index });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_box() -> AmrBox {
        AmrBox::new(DVec3::ZERO, [3, 3, 0]).unwrap()
    }

    #[test]
    fn test_box_cell_counts() {
        let b = small_box();
        assert_eq!(b.cell_counts(), [2, 2, 0]);
        assert_eq!(b.n_cells(), 4);

        let b3 = AmrBox::new(DVec3::ZERO, [3, 4, 5]).unwrap();
        assert_eq!(b3.n_cells(), 2 * 3 * 4);
    }

    #[test]
    fn test_box_rejects_degenerate_xy() {
        assert!(AmrBox::new(DVec3::ZERO, [1, 3, 0]).is_err());
        assert!(AmrBox::new(DVec3::ZERO, [3, 0, 0]).is_err());
        // 第三轴节点数 1 与退化轴 0 含义不同，禁止
        assert!(AmrBox::new(DVec3::ZERO, [3, 3, 1]).is_err());
    }

    #[test]
    fn test_box_data_length_check() {
        let mut b = small_box();
        assert!(b.set_cell_data(vec![0.0; 4], "q_0").is_ok());
        let err = b.set_cell_data(vec![0.0; 3], "q_1").unwrap_err();
        assert!(matches!(err, VtkError::DataLengthMismatch { .. }));
    }

    #[test]
    fn test_ghost_exactly_once() {
        let mut b = small_box();
        assert!(b.set_ghost_data(vec![0; 4]).is_ok());
        assert!(matches!(
            b.set_ghost_data(vec![0; 4]),
            Err(VtkError::DuplicateGhost)
        ));
        assert_eq!(b.ghost().unwrap().name, GHOST_ARRAY_NAME);
        assert_eq!(b.ghost().unwrap().values.type_name(), "UInt8");
    }

    #[test]
    fn test_block_capacity() {
        let mut block = AmrBlock::new(0, 1, DVec3::splat(0.5), DVec3::ZERO);
        assert!(block.attach_box(small_box()).is_ok());
        assert!(matches!(
            block.attach_box(small_box()),
            Err(VtkError::BoxCountMismatch { .. })
        ));
    }

    #[test]
    fn test_container_protocol() {
        let mut amr = OverlappingAmr::new(DVec3::ZERO, Dim::D2, vec![1, 2]).unwrap();
        assert_eq!(amr.n_levels(), 2);

        // 声明数量不符
        let wrong = AmrBlock::new(0, 3, DVec3::ONE, DVec3::ZERO);
        assert!(matches!(
            amr.attach_block(wrong),
            Err(VtkError::BoxCountMismatch { .. })
        ));

        // 层越界
        let oob = AmrBlock::new(5, 1, DVec3::ONE, DVec3::ZERO);
        assert!(matches!(
            amr.attach_block(oob),
            Err(VtkError::LevelOutOfRange { .. })
        ));

        let block = AmrBlock::new(0, 1, DVec3::ONE, DVec3::ZERO);
        assert!(amr.attach_block(block).is_ok());

        // 重复挂接
        let again = AmrBlock::new(0, 1, DVec3::ONE, DVec3::ZERO);
        assert!(matches!(
            amr.attach_block(again),
            Err(VtkError::DuplicateBlock { .. })
        ));

        // 层 1 未挂接，完整性检查失败
        assert!(matches!(
            amr.check_complete(),
            Err(VtkError::MissingBlock { level: 1 })
        ));
    }

    #[test]
    fn test_container_rejects_zero_count_level() {
        assert!(OverlappingAmr::new(DVec3::ZERO, Dim::D2, vec![1, 0]).is_err());
        assert!(OverlappingAmr::new(DVec3::ZERO, Dim::D2, vec![]).is_err());
    }

    #[test]
    fn test_check_complete_requires_ghost() {
        let mut amr = OverlappingAmr::new(DVec3::ZERO, Dim::D2, vec![1]).unwrap();
        let mut block = AmrBlock::new(0, 1, DVec3::ONE, DVec3::ZERO);
        let mut b = small_box();
        b.set_cell_data(vec![0.0; 4], "q_0").unwrap();
        block.attach_box(b).unwrap();
        amr.attach_block(block).unwrap();

        assert!(matches!(
            amr.check_complete(),
            Err(VtkError::GhostMissing { level: 0, index: 0 })
        ));
    }
}
