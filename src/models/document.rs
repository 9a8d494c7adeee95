use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// 用户上传的一个 PDF 文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// 从磁盘读取文件，文件名取路径最后一段
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Ok(Self { name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// 文件名是否以 .pdf 结尾（不区分大小写）
    pub fn is_pdf(&self) -> bool {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }
}

/// 内容指纹：字节长度 + SHA-256
///
/// 同一组文件重新上传时临时路径会变，缓存键只依赖文件名和指纹。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub size: u64,
    pub digest: [u8; 32],
}

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            size: bytes.len() as u64,
            digest: hasher.finalize().into(),
        }
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.size)?;
        for byte in &self.digest {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// 已写入临时目录的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// 原始文件名（发送给后端时使用）
    pub file_name: String,
    /// 临时文件路径
    pub path: PathBuf,
    /// 原始大小
    pub original_size: u64,
    /// 写入后的指纹（压缩后可能变小）
    pub fingerprint: Fingerprint,
}

impl StagedFile {
    pub fn size(&self) -> u64 {
        self.fingerprint.size
    }

    pub fn was_compressed(&self) -> bool {
        self.fingerprint.size < self.original_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_ignores_case() {
        assert!(UploadedDocument::new("rfp.PDF", vec![]).is_pdf());
        assert!(UploadedDocument::new("a.b.pdf", vec![]).is_pdf());
        assert!(!UploadedDocument::new("notes.txt", vec![]).is_pdf());
        assert!(!UploadedDocument::new("pdf", vec![]).is_pdf());
    }

    #[test]
    fn test_fingerprint_depends_on_content() {
        let a = Fingerprint::of(b"%PDF-1.4 a");
        let b = Fingerprint::of(b"%PDF-1.4 b");
        assert_ne!(a, b);
        assert_eq!(a, Fingerprint::of(b"%PDF-1.4 a"));
        assert_eq!(a.size, 10);
    }

    #[test]
    fn test_fingerprint_display_is_size_and_sha256() {
        // sha256("") 的标准值
        assert_eq!(
            Fingerprint::of(b"").to_string(),
            "0:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
