// crates/av_export/tests/export_tests.rs

//! 导出流水线集成测试
//!
//! 构造小型 AMR 解，走完整的标注 → 聚合 → 装配 → 写出流程，
//! 对照输出文件布局与内容验证导出契约。

use av_export::{export, export_with, ExportConfig, ExportError};
use av_foundation::AvResult;
use av_solution::{
    FieldArray, OverlapDetector, Patch, PatchExtent, Solution, State, GHOST_DUPLICATE_CELL,
};
use glam::DVec2;
use std::path::Path;

// ============================================================
// 测试辅助
// ============================================================

/// 构造一个二维状态，场值按 (场索引, 单元索引) 递增，保证内容可区分
fn state(level: u32, lower: (f64, f64), delta: f64, nx: u64, ny: u64, n_fields: usize) -> State {
    let patch = Patch::new(
        level,
        PatchExtent::D2 {
            lower: DVec2::new(lower.0, lower.1),
            delta: DVec2::splat(delta),
            num_cells: [nx, ny],
        },
    );
    let n_cells = (nx * ny) as usize;
    let data: Vec<f64> = (0..n_fields * n_cells)
        .map(|i| i as f64 + level as f64 * 1000.0)
        .collect();
    let q = FieldArray::from_vec(n_fields, &[nx as usize, ny as usize], data).unwrap();
    State::new(patch, q)
}

/// 典型两层解：2 个层 1 网格片（间距 0.1）+ 1 个层 2 网格片（间距 0.05）
fn scenario_solution() -> Solution {
    Solution::new(vec![
        state(1, (0.0, 0.0), 0.1, 4, 4, 2),
        state(1, (0.4, 0.0), 0.1, 4, 4, 2),
        state(2, (0.0, 0.0), 0.05, 4, 4, 2),
    ])
}

/// 从索引文件中抽取全部 file="..." 引用
fn referenced_files(index: &str) -> Vec<String> {
    index
        .lines()
        .filter_map(|line| {
            let start = line.find("file=\"")? + 6;
            let end = line[start..].find('"')? + start;
            Some(line[start..end].to_string())
        })
        .collect()
}

/// 统计某一层 Block 的 DataSet 数
fn datasets_in_level(index: &str, level: usize) -> usize {
    let mut in_block = false;
    let mut count = 0;
    for line in index.lines() {
        if line.contains(&format!("<Block level=\"{level}\"")) {
            in_block = true;
        } else if line.contains("</Block>") {
            in_block = false;
        } else if in_block && line.contains("<DataSet") {
            count += 1;
        }
    }
    count
}

/// 读取目录树下全部文件内容（路径 -> 字节），按路径排序
fn read_tree(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        for entry in std::fs::read_dir(&d).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(dir).unwrap().to_string_lossy().into_owned();
                out.push((rel, std::fs::read(&path).unwrap()));
            }
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

// ============================================================
// 文件布局与命名
// ============================================================

#[test]
fn test_frame_naming() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    export(&scenario_solution(), 7, &config).unwrap();

    assert!(dir.path().join("claw0007.vthb").is_file());
    assert!(dir.path().join("claw0007").is_dir());
    assert!(dir.path().join("claw0007/claw0007_0_0.vti").is_file());
    assert!(dir.path().join("claw0007/claw0007_0_1.vti").is_file());
    assert!(dir.path().join("claw0007/claw0007_1_0.vti").is_file());
}

#[test]
fn test_custom_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default()
        .with_path(dir.path())
        .with_file_prefix("fort");

    export(&scenario_solution(), 0, &config).unwrap();
    assert!(dir.path().join("fort0000.vthb").is_file());
}

#[test]
fn test_index_references_exactly_written_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    export(&scenario_solution(), 0, &config).unwrap();

    let index = std::fs::read_to_string(dir.path().join("claw0000.vthb")).unwrap();
    let refs = referenced_files(&index);
    assert_eq!(refs.len(), 3);
    for r in &refs {
        assert!(dir.path().join(r).is_file(), "索引引用的文件不存在: {r}");
    }

    // 数据目录中没有未被引用的文件
    let n_vti = std::fs::read_dir(dir.path().join("claw0000")).unwrap().count();
    assert_eq!(n_vti, refs.len());
}

// ============================================================
// 两层场景
// ============================================================

#[test]
fn test_scenario_two_levels() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    export(&scenario_solution(), 0, &config).unwrap();

    let index = std::fs::read_to_string(dir.path().join("claw0000.vthb")).unwrap();
    // 源层 {1,2} 归一化为输出层 {0,1}
    assert!(index.contains("<Block level=\"0\""));
    assert!(index.contains("<Block level=\"1\""));
    assert!(!index.contains("<Block level=\"2\""));
    assert_eq!(datasets_in_level(&index, 0), 2);
    assert_eq!(datasets_in_level(&index, 1), 1);

    // 每个 Box 的 z 原点为 0
    for r in referenced_files(&index) {
        let vti = std::fs::read_to_string(dir.path().join(&r)).unwrap();
        let origin_line = vti.lines().find(|l| l.contains("Origin=")).unwrap();
        let start = origin_line.find("Origin=\"").unwrap() + 8;
        let end = origin_line[start..].find('"').unwrap() + start;
        let components: Vec<&str> = origin_line[start..end].split_whitespace().collect();
        assert_eq!(components.len(), 3);
        assert_eq!(components[2], "0", "z 原点必须为 0: {r}");
    }
}

#[test]
fn test_spacing_propagation_in_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    export(&scenario_solution(), 0, &config).unwrap();

    let index = std::fs::read_to_string(dir.path().join("claw0000.vthb")).unwrap();
    // 2D: dz = dx
    assert!(index.contains("<Block level=\"0\" spacing=\"0.1 0.1 0.1\">"));
    assert!(index.contains("<Block level=\"1\" spacing=\"0.05 0.05 0.05\">"));
}

#[test]
fn test_node_count_law_in_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    export(&scenario_solution(), 0, &config).unwrap();

    // 4x4 单元 -> 节点范围 0..4，退化轴 0 0
    let vti =
        std::fs::read_to_string(dir.path().join("claw0000/claw0000_0_0.vti")).unwrap();
    assert!(vti.contains("WholeExtent=\"0 4 0 4 0 0\""));
}

#[test]
fn test_field_count_law_in_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    // 输入 2 个数据场；标注追加掩码后输出 q_0, q_1 + ghost
    export(&scenario_solution(), 0, &config).unwrap();

    let vti =
        std::fs::read_to_string(dir.path().join("claw0000/claw0000_0_0.vti")).unwrap();
    assert!(vti.contains("Name=\"q_0\""));
    assert!(vti.contains("Name=\"q_1\""));
    assert!(!vti.contains("Name=\"q_2\""));
    assert_eq!(vti.matches("Name=\"vtkGhostType\"").count(), 1);
}

// ============================================================
// 幂等与只读契约
// ============================================================

#[test]
fn test_idempotence_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());
    let sol = scenario_solution();

    export(&sol, 0, &config).unwrap();
    let first = read_tree(dir.path());

    export(&sol, 0, &config).unwrap();
    let second = read_tree(dir.path());

    assert_eq!(first, second);
}

#[test]
fn test_export_does_not_mutate_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());
    let sol = scenario_solution();
    let before = sol.clone();

    export(&sol, 0, &config).unwrap();
    assert_eq!(sol, before);
}

// ============================================================
// 失败路径
// ============================================================

#[test]
fn test_empty_solution_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    let err = export(&Solution::new(vec![]), 0, &config).unwrap_err();
    assert!(matches!(err, ExportError::EmptySolution));
}

#[test]
fn test_spacing_mismatch_leaves_no_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    // 同层两个网格片间距不同
    let sol = Solution::new(vec![
        state(1, (0.0, 0.0), 0.1, 4, 4, 1),
        state(1, (0.4, 0.0), 0.2, 4, 4, 1),
    ]);
    let err = export(&sol, 0, &config).unwrap_err();
    assert!(matches!(err, ExportError::SpacingMismatch { .. }));
    // 失败的导出不留下索引文件
    assert!(!dir.path().join("claw0000.vthb").exists());
}

#[test]
fn test_broken_detector_is_collaborator_failure() {
    /// 掩码数量错误的检测器
    struct BrokenDetector;

    impl OverlapDetector for BrokenDetector {
        fn detect(&self, _solution: &Solution) -> AvResult<Vec<Vec<u8>>> {
            Ok(vec![])
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    let err = export_with(&scenario_solution(), 0, &config, &BrokenDetector).unwrap_err();
    assert!(matches!(err, ExportError::Collaborator { .. }));
}

// ============================================================
// 掩码内容
// ============================================================

#[test]
fn test_coarse_patch_ghost_cells_masked() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    // 细层完全覆盖粗层的左下 2x2 单元区域
    let sol = Solution::new(vec![
        state(1, (0.0, 0.0), 0.25, 4, 4, 1),
        state(2, (0.0, 0.0), 0.125, 4, 4, 1),
    ]);
    export(&sol, 0, &config).unwrap();

    let coarse =
        std::fs::read_to_string(dir.path().join("claw0000/claw0000_0_0.vti")).unwrap();
    let ghost_section = coarse
        .split("Name=\"vtkGhostType\"")
        .nth(1)
        .unwrap()
        .split("</DataArray>")
        .next()
        .unwrap();
    let values: Vec<u8> = ghost_section
        .split_whitespace()
        .skip(1) // 跳过 format="ascii"> 残余
        .filter_map(|t| t.parse().ok())
        .collect();
    assert_eq!(values.len(), 16);
    assert_eq!(
        values
            .iter()
            .filter(|&&v| v == GHOST_DUPLICATE_CELL)
            .count(),
        4
    );

    // 最细层全部有效
    let fine =
        std::fs::read_to_string(dir.path().join("claw0000/claw0000_1_0.vti")).unwrap();
    let fine_ghost = fine
        .split("Name=\"vtkGhostType\"")
        .nth(1)
        .unwrap()
        .split("</DataArray>")
        .next()
        .unwrap();
    let fine_values: Vec<u8> = fine_ghost
        .split_whitespace()
        .skip(1)
        .filter_map(|t| t.parse().ok())
        .collect();
    assert!(fine_values.iter().all(|&v| v == 0));
}

// ============================================================
// 层号归一化
// ============================================================

#[test]
fn test_level_numbering_in_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    let sol = Solution::new(vec![
        state(1, (0.0, 0.0), 0.1, 4, 4, 1),
        state(2, (0.0, 0.0), 0.05, 4, 4, 1),
        state(3, (0.0, 0.0), 0.025, 4, 4, 1),
    ]);
    export(&sol, 0, &config).unwrap();

    let index = std::fs::read_to_string(dir.path().join("claw0000.vthb")).unwrap();
    for level in 0..3 {
        assert!(index.contains(&format!("<Block level=\"{level}\"")));
    }
}

#[test]
fn test_gap_levels_collapse_in_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::default().with_path(dir.path());

    // 源层 {1,3} 折叠为输出层 {0,1}
    let sol = Solution::new(vec![
        state(1, (0.0, 0.0), 0.1, 4, 4, 1),
        state(3, (0.0, 0.0), 0.025, 4, 4, 1),
    ]);
    export(&sol, 0, &config).unwrap();

    let index = std::fs::read_to_string(dir.path().join("claw0000.vthb")).unwrap();
    assert!(index.contains("<Block level=\"0\""));
    assert!(index.contains("<Block level=\"1\""));
    assert!(!index.contains("<Block level=\"2\""));
}
