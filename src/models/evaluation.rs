//! RFP 需求覆盖评估结果
//!
//! 后端在同一位置返回成功结构或诊断结构，这里按 `requirement_met`
//! 拆成两个变体，下游门控只需要做穷尽匹配。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// SOW 四要素的覆盖情况
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    #[serde(default)]
    pub scope: bool,
    #[serde(default)]
    pub objectives: bool,
    #[serde(default)]
    pub tasks: bool,
    #[serde(default)]
    pub deliverables: bool,
}

impl Coverage {
    /// 按固定顺序列出 (要素名, 是否覆盖)
    pub fn entries(&self) -> [(&'static str, bool); 4] {
        [
            ("scope", self.scope),
            ("objectives", self.objectives),
            ("tasks", self.tasks),
            ("deliverables", self.deliverables),
        ]
    }
}

/// 覆盖 SOW 要素的文件
///
/// 后端可能返回单个文件名、文件名列表，也可能不返回。
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SourceFiles {
    #[default]
    Missing,
    One(String),
    Many(Vec<String>),
    /// 其它结构，原样显示
    Other(Value),
}

impl SourceFiles {
    /// 解析字段，结构不符时返回提示信息
    fn decode(value: Option<&Value>) -> (Self, Option<String>) {
        match value {
            None | Some(Value::Null) => (Self::Missing, None),
            Some(Value::String(name)) => (Self::One(name.clone()), None),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => (
                Self::Many(
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                ),
                None,
            ),
            Some(other) => (
                Self::Other(other.clone()),
                Some(format!("sow_elements_file_name 结构不符，原样显示: {}", other)),
            ),
        }
    }
}

impl std::fmt::Display for SourceFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "-"),
            Self::One(name) => write!(f, "{}", name),
            Self::Many(names) => write!(f, "{}", names.join(", ")),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

/// 需求满足时的内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementCoverage {
    pub coverage: Coverage,
    /// 要素名 → 支撑文本
    pub sow_elements: BTreeMap<String, Value>,
    pub sow_elements_file_name: SourceFiles,
}

impl RequirementCoverage {
    /// 逐字段宽松解析，结构不符的字段取默认值并记录提示
    fn decode(raw: &Value, warnings: &mut Vec<String>) -> Self {
        let coverage = match raw.get("coverage") {
            None | Some(Value::Null) => Coverage::default(),
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warnings.push(format!("coverage 结构无法解析: {}", e));
                Coverage::default()
            }),
        };

        let sow_elements = match raw.get("sow_elements") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(map)) => map.clone().into_iter().collect(),
            Some(other) => {
                warnings.push("sow_elements 不是对象，原样显示".to_string());
                BTreeMap::from([("sow_elements".to_string(), other.clone())])
            }
        };

        let (sow_elements_file_name, warning) =
            SourceFiles::decode(raw.get("sow_elements_file_name"));
        warnings.extend(warning);

        Self {
            coverage,
            sow_elements,
            sow_elements_file_name,
        }
    }
}

/// 需求未满足时的诊断信息，原样保留供排查
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDiagnostic {
    pub payload: Value,
}

/// 评估结论
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Met(RequirementCoverage),
    NotMet(EvaluationDiagnostic),
}

/// 评估结果：结论 + 后端原始响应
///
/// 原始响应在 score 请求中作为 `extracted_rfp_result` 原样转发。
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub outcome: Evaluation,
    pub raw: Value,
    /// 展示字段结构不符的提示，不影响结论
    pub shape_warnings: Vec<String>,
}

impl EvaluationResult {
    /// 从后端响应构建
    ///
    /// 结论只取决于 `requirement_met` 是否为 `true`，展示字段按能解析的部分保留。
    pub fn from_value(raw: Value) -> Self {
        let met = raw
            .get("requirement_met")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut shape_warnings = Vec::new();
        let outcome = if met {
            Evaluation::Met(RequirementCoverage::decode(&raw, &mut shape_warnings))
        } else {
            Evaluation::NotMet(EvaluationDiagnostic {
                payload: raw.clone(),
            })
        };
        for warning in &shape_warnings {
            tracing::warn!("⚠️ 评估结果 {}", warning);
        }

        Self {
            outcome,
            raw,
            shape_warnings,
        }
    }

    pub fn requirement_met(&self) -> bool {
        matches!(self.outcome, Evaluation::Met(_))
    }
}
