// crates/av_solution/src/state.rs

//! State 与 Solution
//!
//! Solution 是有序的 State 集合，每个 State 对应一个网格片，
//! 持有网格片几何与该网格片上的场数组。导出期间整个结构只读。

use av_foundation::{ensure, AvError, AvResult, Dim};
use serde::{Deserialize, Serialize};

use crate::field::FieldArray;
use crate::patch::Patch;

/// 单个网格片上的求解器状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// 网格片几何
    pub patch: Patch,
    /// 场数组，第 0 轴为场索引，空间轴与 patch 单元数一致
    pub q: FieldArray,
}

impl State {
    /// 创建状态
    pub fn new(patch: Patch, q: FieldArray) -> Self {
        Self { patch, q }
    }

    /// 验证场数组与网格片几何一致
    pub fn validate(&self) -> AvResult<()> {
        ensure!(
            self.q.n_fields() >= 1,
            AvError::invalid_input("场数组至少需要一个场")
        );
        let expected = self.patch.extent.shape();
        ensure!(
            self.q.shape() == expected.as_slice(),
            AvError::invalid_input(format!(
                "场数组形状 {:?} 与网格片单元数 {:?} 不一致",
                self.q.shape(),
                expected
            ))
        );
        Ok(())
    }
}

/// AMR 解：有序的 State 集合
///
/// 顺序即求解器输出顺序；层内相对顺序在整个导出流程中保持稳定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// 状态列表，每个网格片一个
    pub states: Vec<State>,
}

impl Solution {
    /// 创建解
    pub fn new(states: Vec<State>) -> Self {
        Self { states }
    }

    /// 网格片数量
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// 基准状态（第一个状态，全局原点取自它的网格片）
    pub fn base_state(&self) -> AvResult<&State> {
        self.states
            .first()
            .ok_or_else(|| AvError::invalid_input("解不包含任何网格片"))
    }

    /// 解的维度（取自基准状态）
    pub fn dim(&self) -> AvResult<Dim> {
        Ok(self.base_state()?.patch.dim())
    }

    /// 验证结构一致性
    ///
    /// 检查非空、所有网格片维度一致、每个状态的场数组与几何一致、
    /// 各状态场数量相同。
    pub fn validate(&self) -> AvResult<()> {
        let base = self.base_state()?;
        let dim = base.patch.dim();
        let n_fields = base.q.n_fields();
        for state in &self.states {
            state.validate()?;
            ensure!(
                state.patch.dim() == dim,
                AvError::dimension_mismatch(dim.name(), state.patch.dim().name())
            );
            ensure!(
                state.q.n_fields() == n_fields,
                AvError::size_mismatch("n_fields", n_fields, state.q.n_fields())
            );
        }
        Ok(())
    }
}
