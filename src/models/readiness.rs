use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// SOW 四个分项名称，顺序即展示顺序
pub const SECTION_NAMES: [&str; 4] = ["scope", "objectives", "tasks", "deliverables"];

/// 就绪度评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessResult {
    /// 0..=1 的评分，缺失或为 null 时按 0 处理
    #[serde(default, deserialize_with = "null_as_default")]
    pub readiness_score: f64,
    /// 主题 → 理由
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: BTreeMap<String, Value>,
    /// 分项名 → 分数，单项可能为 null
    #[serde(default)]
    pub section_scores: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub suggestions: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ReadinessResult {
    /// 四个分项齐全且都是数值时按固定顺序返回，否则返回 None
    pub fn complete_section_scores(&self) -> Option<[(&'static str, f64); 4]> {
        let scores = self.section_scores.as_ref()?;
        let mut out = [("", 0.0); 4];
        for (slot, name) in out.iter_mut().zip(SECTION_NAMES) {
            *slot = (name, scores.get(name)?.as_f64()?);
        }
        Some(out)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_payload_uses_defaults() {
        let result: ReadinessResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(result.readiness_score, 0.0);
        assert!(result.reason.is_empty());
        assert!(result.complete_section_scores().is_none());
    }

    #[test]
    fn test_complete_section_scores_requires_all_four() {
        let mut result: ReadinessResult = serde_json::from_value(json!({
            "readiness_score": 0.82,
            "reason": {"scope": "clear"},
            "section_scores": {"scope": 0.9, "objectives": 0.8, "tasks": 0.7, "deliverables": 0.6}
        }))
        .unwrap();

        let scores = result.complete_section_scores().unwrap();
        assert_eq!(scores[0], ("scope", 0.9));
        assert_eq!(scores[3], ("deliverables", 0.6));

        result.section_scores.as_mut().unwrap().remove("tasks");
        assert!(result.complete_section_scores().is_none());
    }

    #[test]
    fn test_null_section_keeps_rest_of_payload() {
        let result: ReadinessResult = serde_json::from_value(json!({
            "readiness_score": 0.82,
            "reason": null,
            "section_scores": {
                "scope": 0.9, "objectives": null, "tasks": 0.7, "deliverables": 0.6
            },
            "message": "partial"
        }))
        .unwrap();

        assert_eq!(result.readiness_score, 0.82);
        assert!(result.reason.is_empty());
        assert!(result.complete_section_scores().is_none());
        assert_eq!(result.message.as_deref(), Some("partial"));
    }
}
