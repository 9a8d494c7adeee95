use serde::{Deserialize, Serialize};

/// 单个文档的分类结果
///
/// 由后端 classify 接口返回，之后可被用户修改标签。
/// 序列化格式即 extract / score 请求中的格式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub file_name: String,
    pub doc_type: String,
    /// 后端抽取的文本；用户修改分类后丢弃
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ClassificationRecord {
    pub fn new(file_name: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            doc_type: doc_type.into(),
            content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_rfp(&self) -> bool {
        super::doc_type::is_rfp(&self.doc_type)
    }
}

/// 是否至少有一个文档被标记为 RFP
pub fn has_rfp(records: &[ClassificationRecord]) -> bool {
    records.iter().any(ClassificationRecord::is_rfp)
}
