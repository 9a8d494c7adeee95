//! 文件接收服务 - 业务能力层
//!
//! 只负责"把一批上传文件落盘"能力：超过阈值时先按从大到小顺序压缩，
//! 再写入同一个临时目录。

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::IntakeError;
use crate::infrastructure::{strip_images, StrippedPdf, TempStore};
use crate::models::{Fingerprint, StagedFile, UploadedDocument};
use crate::utils::logging::format_bytes;

/// 接收过程中的状态信号（用于界面展示）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeEvent {
    /// 批次总大小超过阈值，开始压缩
    CompressionStarted { total_bytes: u64, threshold: u64 },
    /// 正在压缩第 `index` 个（从 1 开始）
    Compressing {
        file_name: String,
        index: usize,
        total: usize,
    },
    /// 压缩生效
    Compressed {
        file_name: String,
        before: u64,
        after: u64,
    },
    /// 压缩后不更小，保留原文件
    KeptOriginal { file_name: String },
    /// 无法解析 PDF，保留原文件
    CompressionFailed { file_name: String, reason: String },
    /// 文件已落盘
    Stored { file_name: String, bytes: u64 },
}

impl std::fmt::Display for IntakeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeEvent::CompressionStarted {
                total_bytes,
                threshold,
            } => write!(
                f,
                "文件总大小 {} 超过 {}，开始压缩 PDF",
                format_bytes(*total_bytes),
                format_bytes(*threshold)
            ),
            IntakeEvent::Compressing {
                file_name,
                index,
                total,
            } => write!(f, "正在压缩 ({}/{}): {}", index, total, file_name),
            IntakeEvent::Compressed {
                file_name,
                before,
                after,
            } => write!(
                f,
                "已压缩 {}: {} → {}",
                file_name,
                format_bytes(*before),
                format_bytes(*after)
            ),
            IntakeEvent::KeptOriginal { file_name } => {
                write!(f, "压缩无效，保留原文件: {}", file_name)
            }
            IntakeEvent::CompressionFailed { file_name, reason } => {
                write!(f, "无法压缩 {}，保留原文件: {}", file_name, reason)
            }
            IntakeEvent::Stored { file_name, bytes } => {
                write!(f, "已保存 {} ({})", file_name, format_bytes(*bytes))
            }
        }
    }
}

/// 一批已落盘的文件及其临时目录
///
/// 临时目录由本结构独占；`release` 最多生效一次。
#[derive(Debug)]
pub struct StagedBatch {
    files: Vec<StagedFile>,
    store: TempStore,
}

impl StagedBatch {
    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn root(&self) -> &std::path::Path {
        self.store.root()
    }

    /// 释放临时目录，返回本次是否真正执行了清理
    pub fn release(&mut self) -> Result<bool, IntakeError> {
        self.store.release()
    }
}

/// 接收结果：已落盘批次 + 过程信号
#[derive(Debug)]
pub struct IntakeReport {
    pub batch: StagedBatch,
    pub events: Vec<IntakeEvent>,
}

/// 文件接收服务
pub struct FileIntake {
    threshold: u64,
    temp_dir_prefix: String,
}

impl FileIntake {
    pub fn new(config: &Config) -> Self {
        Self {
            threshold: config.compression_threshold_bytes,
            temp_dir_prefix: config.temp_dir_prefix.clone(),
        }
    }

    /// 使用自定义阈值
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// 落盘一批上传文件
    ///
    /// # 参数
    /// - `documents`: 上传的 PDF 列表
    ///
    /// # 返回
    /// 返回已落盘批次；任何写入失败都会先清理临时目录再返回错误
    pub async fn stage(&self, documents: Vec<UploadedDocument>) -> Result<IntakeReport, IntakeError> {
        if documents.is_empty() {
            return Err(IntakeError::EmptyBatch);
        }
        if let Some(doc) = documents.iter().find(|d| !d.is_pdf()) {
            return Err(IntakeError::UnsupportedFile {
                name: doc.name.clone(),
            });
        }

        let mut events = Vec::new();
        let total_bytes: u64 = documents.iter().map(UploadedDocument::size).sum();
        let original_sizes: Vec<u64> = documents.iter().map(UploadedDocument::size).collect();

        let payloads = if total_bytes > self.threshold {
            let event = IntakeEvent::CompressionStarted {
                total_bytes,
                threshold: self.threshold,
            };
            info!("📦 {}", event);
            events.push(event);
            compress_largest_first(documents, &mut events).await
        } else {
            documents
        };

        let mut store = TempStore::create(&self.temp_dir_prefix)?;
        match write_all(&store, &payloads, &original_sizes, &mut events).await {
            Ok(files) => {
                info!(
                    "✓ 已接收 {} 个文件 → {}",
                    files.len(),
                    store.root().display()
                );
                Ok(IntakeReport {
                    batch: StagedBatch { files, store },
                    events,
                })
            }
            Err(e) => {
                if let Err(cleanup) = store.release() {
                    warn!("⚠️ 清理临时目录失败: {}", cleanup);
                }
                Err(e)
            }
        }
    }
}

/// 按大小降序逐个压缩，结果按原顺序返回
async fn compress_largest_first(
    documents: Vec<UploadedDocument>,
    events: &mut Vec<IntakeEvent>,
) -> Vec<UploadedDocument> {
    let mut order: Vec<usize> = (0..documents.len()).collect();
    order.sort_by(|&a, &b| documents[b].size().cmp(&documents[a].size()));

    let total = documents.len();
    let mut slots: Vec<Option<UploadedDocument>> = documents.into_iter().map(Some).collect();

    for (position, &idx) in order.iter().enumerate() {
        let Some(doc) = slots[idx].take() else {
            continue;
        };

        let event = IntakeEvent::Compressing {
            file_name: doc.name.clone(),
            index: position + 1,
            total,
        };
        info!("🗜️ {}", event);
        events.push(event);

        let (doc, event) = compress_one(doc).await;
        info!("   {}", event);
        events.push(event);
        slots[idx] = Some(doc);
    }

    slots.into_iter().flatten().collect()
}

/// 压缩单个文件；只有结果严格更小时才替换
async fn compress_one(doc: UploadedDocument) -> (UploadedDocument, IntakeEvent) {
    let UploadedDocument { name, bytes } = doc;

    let shared = Arc::new(bytes);
    let task_bytes = Arc::clone(&shared);
    let result = match tokio::task::spawn_blocking(move || strip_images(&task_bytes)).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(format!("压缩任务异常: {}", e)),
    };
    let bytes = Arc::try_unwrap(shared).unwrap_or_else(|shared| shared.as_ref().clone());

    keep_smaller(name, bytes, result)
}

/// 在原文件和压缩结果之间取舍
fn keep_smaller(
    name: String,
    bytes: Vec<u8>,
    result: Result<StrippedPdf, String>,
) -> (UploadedDocument, IntakeEvent) {
    let before = bytes.len() as u64;
    match result {
        Ok(stripped) if (stripped.bytes.len() as u64) < before => {
            let after = stripped.bytes.len() as u64;
            let event = IntakeEvent::Compressed {
                file_name: name.clone(),
                before,
                after,
            };
            (UploadedDocument::new(name, stripped.bytes), event)
        }
        Ok(_) => {
            let event = IntakeEvent::KeptOriginal {
                file_name: name.clone(),
            };
            (UploadedDocument::new(name, bytes), event)
        }
        Err(reason) => {
            warn!("⚠️ PDF 无法压缩 ({}): {}", name, reason);
            let event = IntakeEvent::CompressionFailed {
                file_name: name.clone(),
                reason,
            };
            (UploadedDocument::new(name, bytes), event)
        }
    }
}

async fn write_all(
    store: &TempStore,
    documents: &[UploadedDocument],
    original_sizes: &[u64],
    events: &mut Vec<IntakeEvent>,
) -> Result<Vec<StagedFile>, IntakeError> {
    let mut files = Vec::with_capacity(documents.len());
    for (doc, &original_size) in documents.iter().zip(original_sizes) {
        let path = store.write(&doc.name, &doc.bytes).await?;
        events.push(IntakeEvent::Stored {
            file_name: doc.name.clone(),
            bytes: doc.size(),
        });
        files.push(StagedFile {
            file_name: doc.name.clone(),
            path,
            original_size,
            fingerprint: Fingerprint::of(&doc.bytes),
        });
    }
    Ok(files)
}
