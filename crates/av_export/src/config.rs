// crates/av_export/src/config.rs

//! 导出配置

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 导出配置
///
/// 输出目录与文件名前缀决定文件布局：索引文件
/// `<path>/<prefix><frame:04>.vthb`，数据文件位于同名子目录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// 输出目录
    pub path: PathBuf,
    /// 输出文件名前缀
    pub file_prefix: String,
    /// 浮点输出精度（小数位数）
    pub precision: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("_output"),
            file_prefix: "claw".to_string(),
            precision: 6,
        }
    }
}

impl ExportConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置输出目录
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// 设置文件名前缀
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// 设置浮点输出精度
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// 帧号对应的基础文件名：前缀 + 四位补零帧号
    ///
    /// 帧号超过 9999 时位数自动加宽，不截断。
    pub fn basename(&self, frame: usize) -> String {
        format!("{}{:04}", self.file_prefix, frame)
    }
}
