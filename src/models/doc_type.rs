//! 文档类型标签与标签目录

use phf::phf_map;

/// 预定义的文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownDocType {
    /// Request for Proposal
    Rfp,
    /// Performance Work Statement
    Pws,
    /// Statement of Work
    Sow,
    /// Statement of Objectives
    Soo,
    /// 投标响应
    RfpResponse,
    /// 修订
    Amendment,
    /// 其他
    Other,
}

impl KnownDocType {
    pub const ALL: [KnownDocType; 7] = [
        KnownDocType::Rfp,
        KnownDocType::Pws,
        KnownDocType::Sow,
        KnownDocType::Soo,
        KnownDocType::RfpResponse,
        KnownDocType::Amendment,
        KnownDocType::Other,
    ];

    /// 获取标准标签
    pub fn label(self) -> &'static str {
        match self {
            KnownDocType::Rfp => "RFP",
            KnownDocType::Pws => "PWS",
            KnownDocType::Sow => "SOW",
            KnownDocType::Soo => "SOO",
            KnownDocType::RfpResponse => "RFP Response",
            KnownDocType::Amendment => "Amendment",
            KnownDocType::Other => "Other",
        }
    }
}

impl std::fmt::Display for KnownDocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 用户输入的别名（小写）→ 标准标签
static LABEL_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "rfp" => "RFP",
    "request for proposal" => "RFP",
    "pws" => "PWS",
    "performance work statement" => "PWS",
    "sow" => "SOW",
    "statement of work" => "SOW",
    "soo" => "SOO",
    "statement of objectives" => "SOO",
    "rfp response" => "RFP Response",
    "rfp_response" => "RFP Response",
    "proposal" => "RFP Response",
    "amendment" => "Amendment",
    "other" => "Other",
};

/// 规范化用户输入的标签
///
/// 已知别名映射为标准写法；其余按原样（去掉首尾空白）作为自定义标签。
/// 后端返回的标签不经过这里。
pub fn normalize_label(input: &str) -> String {
    let trimmed = input.trim();
    let key = trimmed.to_lowercase();
    match LABEL_ALIASES.get(key.as_str()) {
        Some(label) => (*label).to_string(),
        None => trimmed.to_string(),
    }
}

/// 是否为 RFP 标签
pub fn is_rfp(label: &str) -> bool {
    label == KnownDocType::Rfp.label()
}

/// 文档类型目录
///
/// 预定义标签在前，后端或用户带来的新标签按出现顺序追加。只增不减。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTypeCatalog {
    labels: Vec<String>,
}

impl Default for DocTypeCatalog {
    fn default() -> Self {
        Self {
            labels: KnownDocType::ALL
                .iter()
                .map(|t| t.label().to_string())
                .collect(),
        }
    }
}

impl DocTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// 追加标签，返回是否为新标签
    pub fn insert(&mut self, label: &str) -> bool {
        if self.contains(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    /// 批量追加，返回新加入的标签
    pub fn extend<'a>(&mut self, labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        labels
            .into_iter()
            .filter(|label| self.insert(label))
            .map(str::to_string)
            .collect()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label_aliases() {
        assert_eq!(normalize_label(" rfp "), "RFP");
        assert_eq!(normalize_label("Statement of Work"), "SOW");
        assert_eq!(normalize_label("proposal"), "RFP Response");
        assert_eq!(normalize_label("  Pricing Sheet "), "Pricing Sheet");
    }

    #[test]
    fn test_catalog_grows_monotonically() {
        let mut catalog = DocTypeCatalog::new();
        let base = catalog.len();

        let added = catalog.extend(["RFP", "Cover Letter", "Cover Letter", "Pricing"]);
        assert_eq!(added, vec!["Cover Letter".to_string(), "Pricing".to_string()]);
        assert_eq!(catalog.len(), base + 2);

        assert!(!catalog.insert("RFP"));
        assert!(catalog.contains("Pricing"));
        assert_eq!(catalog.labels().last().map(String::as_str), Some("Pricing"));
    }
}
