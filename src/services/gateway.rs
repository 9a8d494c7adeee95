//! 后端网关 - 业务能力层
//!
//! 只负责"带缓存地调用后端"能力：相同输入直接复用上次的成功结果

use std::collections::HashMap;

use serde_json::json;
use tracing::{debug, info};

use crate::clients::Backend;
use crate::error::AppResult;
use crate::models::{ClassificationRecord, EvaluationResult, ReadinessResult, StagedFile};

/// 后端网关
///
/// 职责：
/// - 按调用参数缓存三个接口的成功响应
/// - 失败不缓存，下次相同调用会重新请求
/// - 不关心流程顺序
pub struct BackendGateway<B: Backend> {
    backend: B,
    classify_cache: HashMap<String, Vec<ClassificationRecord>>,
    extract_cache: HashMap<String, EvaluationResult>,
    score_cache: HashMap<String, ReadinessResult>,
}

impl<B: Backend> BackendGateway<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            classify_cache: HashMap::new(),
            extract_cache: HashMap::new(),
            score_cache: HashMap::new(),
        }
    }

    /// 文档分类（按文件名 + 内容指纹缓存）
    pub async fn classify(
        &mut self,
        files: &[StagedFile],
    ) -> AppResult<Vec<ClassificationRecord>> {
        let key = classify_key(files);
        if let Some(cached) = self.classify_cache.get(&key) {
            debug!("classify 命中缓存 ({} 个文件)", files.len());
            return Ok(cached.clone());
        }

        info!("🔍 正在分类 {} 个 PDF...", files.len());
        let records = self.backend.classify(files).await?;
        self.classify_cache.insert(key, records.clone());
        Ok(records)
    }

    /// RFP 需求评估（按分类记录缓存）
    pub async fn evaluate(
        &mut self,
        records: &[ClassificationRecord],
    ) -> AppResult<EvaluationResult> {
        let key = json!(records).to_string();
        if let Some(cached) = self.extract_cache.get(&key) {
            debug!("extract 命中缓存");
            return Ok(cached.clone());
        }

        info!("📑 正在抽取 Scope / Objectives / Tasks / Deliverables...");
        let evaluation = self.backend.extract(records).await?;
        self.extract_cache.insert(key, evaluation.clone());
        Ok(evaluation)
    }

    /// 就绪度评分（按分类记录 + 评估原始响应缓存）
    pub async fn score(
        &mut self,
        records: &[ClassificationRecord],
        evaluation: &EvaluationResult,
    ) -> AppResult<ReadinessResult> {
        let key = json!([records, evaluation.raw]).to_string();
        if let Some(cached) = self.score_cache.get(&key) {
            debug!("score 命中缓存");
            return Ok(cached.clone());
        }

        info!("📈 正在计算就绪度评分...");
        let readiness = self.backend.score(records, evaluation).await?;
        self.score_cache.insert(key, readiness.clone());
        Ok(readiness)
    }

    /// 清空全部缓存
    pub fn clear_cache(&mut self) {
        self.classify_cache.clear();
        self.extract_cache.clear();
        self.score_cache.clear();
        debug!("网关缓存已清空");
    }

    pub fn cached_entries(&self) -> usize {
        self.classify_cache.len() + self.extract_cache.len() + self.score_cache.len()
    }
}

fn classify_key(files: &[StagedFile]) -> String {
    files
        .iter()
        .map(|f| format!("{}#{}", f.file_name, f.fingerprint))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ScriptedBackend;
    use crate::models::Fingerprint;
    use serde_json::json;
    use std::path::PathBuf;

    fn staged(name: &str, content: &[u8], dir: &str) -> StagedFile {
        StagedFile {
            file_name: name.to_string(),
            path: PathBuf::from(dir).join(name),
            original_size: content.len() as u64,
            fingerprint: Fingerprint::of(content),
        }
    }

    #[tokio::test]
    async fn test_identical_classify_uses_cache() {
        let backend = ScriptedBackend::new().with_label("rfp.pdf", "RFP");
        let calls = backend.calls();
        let mut gateway = BackendGateway::new(backend);

        let first = vec![staged("rfp.pdf", b"%PDF-1 rfp", "/tmp/a")];
        // 同样的文件重新上传，临时路径不同
        let second = vec![staged("rfp.pdf", b"%PDF-1 rfp", "/tmp/b")];

        let a = gateway.classify(&first).await.unwrap();
        let b = gateway.classify(&second).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(calls.classify(), 1);

        let changed = vec![staged("rfp.pdf", b"%PDF-1 other", "/tmp/c")];
        gateway.classify(&changed).await.unwrap();
        assert_eq!(calls.classify(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_new_call() {
        let backend = ScriptedBackend::new()
            .with_evaluation(json!({"requirement_met": true, "coverage": {}}));
        let calls = backend.calls();
        let mut gateway = BackendGateway::new(backend);
        let records = vec![ClassificationRecord::new("rfp.pdf", "RFP")];

        gateway.evaluate(&records).await.unwrap();
        gateway.evaluate(&records).await.unwrap();
        assert_eq!(calls.extract(), 1);

        gateway.clear_cache();
        assert_eq!(gateway.cached_entries(), 0);
        gateway.evaluate(&records).await.unwrap();
        assert_eq!(calls.extract(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let backend = ScriptedBackend::new().with_readiness(json!({"readiness_score": 0.5}));
        backend.set_failure(Some("connection refused"));
        let calls = backend.calls();
        let handle = backend.clone();
        let mut gateway = BackendGateway::new(backend);

        let records = vec![ClassificationRecord::new("rfp.pdf", "RFP")];
        let evaluation = EvaluationResult::from_value(json!({"requirement_met": true}));

        let err = gateway.score(&records, &evaluation).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));

        handle.set_failure(None);
        let result = gateway.score(&records, &evaluation).await.unwrap();
        assert_eq!(result.readiness_score, 0.5);
        assert_eq!(calls.score(), 2);
    }
}
