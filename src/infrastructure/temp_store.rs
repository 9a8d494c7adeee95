//! 临时文件存储 - 基础设施层
//!
//! 持有一批上传文件的临时目录，只暴露"写入"和"释放"能力

use std::path::{Path, PathBuf};

use regex::Regex;
use tempfile::TempDir;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::IntakeError;

/// 临时文件存储
///
/// 职责：
/// - 持有唯一的临时目录
/// - 为每个文件生成唯一的落盘路径
/// - 释放最多执行一次；未显式释放时在 Drop 中由 `TempDir` 删除
#[derive(Debug)]
pub struct TempStore {
    dir: Option<TempDir>,
    root: PathBuf,
}

impl TempStore {
    /// 创建新的临时目录
    pub fn create(prefix: &str) -> Result<Self, IntakeError> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|source| IntakeError::TempDirFailed { source })?;
        let root = dir.path().to_path_buf();
        debug!("创建临时目录: {}", root.display());
        Ok(Self {
            dir: Some(dir),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 写入一个文件，返回落盘路径
    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, IntakeError> {
        let dir = self.dir.as_ref().ok_or_else(|| IntakeError::WriteFailed {
            path: self.root.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "临时目录已释放"),
        })?;

        let path = dir.path().join(unique_file_name(file_name));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| IntakeError::write_failed(&path, e))?;
        debug!("写入临时文件: {} ({} 字节)", path.display(), bytes.len());
        Ok(path)
    }

    /// 释放临时目录
    ///
    /// # 返回
    /// 本次调用是否真正删除了目录；重复调用返回 `Ok(false)`
    pub fn release(&mut self) -> Result<bool, IntakeError> {
        match self.dir.take() {
            Some(dir) => {
                dir.close().map_err(|source| IntakeError::CleanupFailed {
                    path: self.root.display().to_string(),
                    source,
                })?;
                info!("🗑️ 临时目录已清理: {}", self.root.display());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// 生成唯一文件名：`<uuid>_<清洗后的原名>`
fn unique_file_name(file_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), sanitize_file_name(file_name))
}

/// 只保留字母、数字、点、下划线和连字符
fn sanitize_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let cleaned = match Regex::new(r"[^A-Za-z0-9._-]+") {
        Ok(re) => re.replace_all(&base, "_").to_string(),
        Err(_) => base,
    };
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned
    }
}
