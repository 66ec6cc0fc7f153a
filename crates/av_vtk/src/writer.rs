// crates/av_vtk/src/writer.rs

//! ASCII 写出器
//!
//! 把装配好的容器写成两级文件布局：
//!
//! - `<dir>/<basename>.vthb`: 顶层索引文件
//! - `<dir>/<basename>/<basename>_<level>_<index>.vti`: 每个 Box 一个数据文件
//!
//! 索引与数据文件均为 ASCII 编码。数据文件先写、索引最后写：
//! 中途失败不会留下引用了未写出文件的索引。
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use av_vtk::AmrAsciiWriter;
//!
//! let writer = AmrAsciiWriter::new().precision(6);
//! writer.write(&amr, "_output", "claw0000")?;
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::amr::{AmrBlock, AmrBox, ArrayValues, OverlappingAmr};
use crate::error::{VtkError, VtkResult};

/// Box 原点换算层内整数索引时允许的偏差
const ALIGN_TOL: f64 = 1e-6;

/// ASCII 写出器
#[derive(Debug, Clone)]
pub struct AmrAsciiWriter {
    /// 浮点输出精度（小数位数）
    precision: usize,
}

impl Default for AmrAsciiWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl AmrAsciiWriter {
    /// 创建写出器（默认精度 6 位小数）
    pub fn new() -> Self {
        Self { precision: 6 }
    }

    /// 设置浮点输出精度
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// 写出整个容器
    ///
    /// 先写出全部 `.vti` 数据文件，最后写出 `.vthb` 索引；
    /// 任一文件写出失败即中止，整个导出视为失败。
    pub fn write(&self, amr: &OverlappingAmr, dir: impl AsRef<Path>, basename: &str) -> VtkResult<()> {
        amr.check_complete()?;

        let dir = dir.as_ref();
        let data_dir = dir.join(basename);
        std::fs::create_dir_all(&data_dir)?;

        // 数据文件先写
        for level in 0..amr.n_levels() {
            let block = amr
                .block(level)
                .ok_or(VtkError::MissingBlock { level })?;
            for (index, amr_box) in block.boxes().iter().enumerate() {
                let filename = format!("{basename}_{level}_{index}.vti");
                let file = File::create(data_dir.join(&filename))?;
                let mut w = BufWriter::new(file);
                self.write_vti(&mut w, amr_box, block, index)?;
                w.flush()?;
            }
        }

        // 索引最后写
        let file = File::create(dir.join(format!("{basename}.vthb")))?;
        let mut w = BufWriter::new(file);
        self.write_vthb(&mut w, amr, basename)?;
        w.flush()?;
        Ok(())
    }

    /// 写出顶层索引文件
    fn write_vthb<W: Write>(
        &self,
        w: &mut W,
        amr: &OverlappingAmr,
        basename: &str,
    ) -> VtkResult<()> {
        let o = amr.global_origin();
        writeln!(w, r#"<?xml version="1.0"?>"#)?;
        writeln!(
            w,
            r#"<VTKFile type="vtkOverlappingAMR" version="1.1" byte_order="LittleEndian" header_type="UInt32">"#
        )?;
        writeln!(
            w,
            r#"  <vtkOverlappingAMR origin="{} {} {}" grid_description="{}">"#,
            o.x,
            o.y,
            o.z,
            amr.dim().grid_description()
        )?;

        for level in 0..amr.n_levels() {
            let block = amr
                .block(level)
                .ok_or(VtkError::MissingBlock { level })?;
            let s = block.spacing();
            writeln!(
                w,
                r#"    <Block level="{}" spacing="{} {} {}">"#,
                level, s.x, s.y, s.z
            )?;
            for (index, amr_box) in block.boxes().iter().enumerate() {
                let e = amr_box_extent(amr_box, block)?;
                writeln!(
                    w,
                    r#"      <DataSet index="{}" amr_box="{} {} {} {} {} {}" file="{}/{}_{}_{}.vti"/>"#,
                    index, e[0], e[1], e[2], e[3], e[4], e[5], basename, basename, level, index
                )?;
            }
            writeln!(w, r#"    </Block>"#)?;
        }

        writeln!(w, r#"  </vtkOverlappingAMR>"#)?;
        writeln!(w, r#"</VTKFile>"#)?;
        Ok(())
    }

    /// 写出单个 Box 的数据文件
    fn write_vti<W: Write>(
        &self,
        w: &mut W,
        amr_box: &AmrBox,
        block: &AmrBlock,
        index: usize,
    ) -> VtkResult<()> {
        let o = amr_box.origin();
        let s = block.spacing();
        let extent = node_extent(amr_box);

        writeln!(w, r#"<?xml version="1.0"?>"#)?;
        writeln!(
            w,
            r#"<VTKFile type="ImageData" version="0.1" byte_order="LittleEndian">"#
        )?;
        writeln!(
            w,
            r#"  <ImageData WholeExtent="{}" Origin="{} {} {}" Spacing="{} {} {}">"#,
            extent, o.x, o.y, o.z, s.x, s.y, s.z
        )?;
        writeln!(w, r#"    <Piece Extent="{extent}">"#)?;
        writeln!(w, r#"      <CellData>"#)?;

        for array in amr_box.data() {
            self.write_data_array(w, &array.name, &array.values)?;
        }
        // ghost 掩码最后写；check_complete 保证存在
        let ghost = amr_box.ghost().ok_or(VtkError::GhostMissing {
            level: block.level(),
            index,
        })?;
        self.write_data_array(w, &ghost.name, &ghost.values)?;

        writeln!(w, r#"      </CellData>"#)?;
        writeln!(w, r#"    </Piece>"#)?;
        writeln!(w, r#"  </ImageData>"#)?;
        writeln!(w, r#"</VTKFile>"#)?;
        Ok(())
    }

    /// 写出单个数据数组
    fn write_data_array<W: Write>(
        &self,
        w: &mut W,
        name: &str,
        values: &ArrayValues,
    ) -> VtkResult<()> {
        writeln!(
            w,
            r#"        <DataArray type="{}" Name="{}" format="ascii">"#,
            values.type_name(),
            name
        )?;
        match values {
            ArrayValues::Float64(vs) => {
                for v in vs {
                    writeln!(w, "          {:.prec$}", v, prec = self.precision)?;
                }
            }
            ArrayValues::UInt8(vs) => {
                for v in vs {
                    writeln!(w, "          {v}")?;
                }
            }
        }
        writeln!(w, r#"        </DataArray>"#)?;
        Ok(())
    }
}

/// Box 的节点范围字符串（"0 nx 0 ny 0 0"，退化轴写 "0 0"）
fn node_extent(amr_box: &AmrBox) -> String {
    let n = amr_box.node_count();
    let hi = |v: u64| if v == 0 { 0 } else { v - 1 };
    format!("0 {} 0 {} 0 {}", hi(n[0]), hi(n[1]), hi(n[2]))
}

/// Box 在层内的整数单元范围（lo, hi = lo + 单元数 - 1；退化轴写 0 -1）
fn amr_box_extent(amr_box: &AmrBox, block: &AmrBlock) -> VtkResult<[i64; 6]> {
    const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];
    let origin = amr_box.origin();
    let global = block.global_origin();
    let spacing = block.spacing();
    let cells = amr_box.cell_counts();

    let origin_axis = [origin.x, origin.y, origin.z];
    let global_axis = [global.x, global.y, global.z];
    let spacing_axis = [spacing.x, spacing.y, spacing.z];

    let mut e = [0i64; 6];
    for a in 0..3 {
        if cells[a] == 0 {
            e[2 * a] = 0;
            e[2 * a + 1] = -1;
            continue;
        }
        let lo_f = (origin_axis[a] - global_axis[a]) / spacing_axis[a];
        let lo = lo_f.round();
        if (lo_f - lo).abs() > ALIGN_TOL {
            return Err(VtkError::NonAlignedOrigin {
                axis: AXIS_NAMES[a],
                value: lo_f,
            });
        }
        e[2 * a] = lo as i64;
        e[2 * a + 1] = lo as i64 + cells[a] as i64 - 1;
    }
    Ok(e)
}

impl OverlappingAmr {
    /// 以默认精度写出容器
    pub fn write_ascii(&self, dir: impl AsRef<Path>, basename: &str) -> VtkResult<()> {
        AmrAsciiWriter::new().write(self, dir, basename)
    }
}
