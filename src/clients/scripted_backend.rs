//! 脚本化后端
//!
//! 返回预先设定的响应并记录调用次数，用于测试和离线演示。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::backend_client::{Backend, CLASSIFY_ENDPOINT, EXTRACT_ENDPOINT, SCORE_ENDPOINT};
use crate::error::{AppResult, NetworkError};
use crate::models::{ClassificationRecord, EvaluationResult, ReadinessResult, StagedFile};

/// 每个接口的调用计数
#[derive(Debug, Default)]
pub struct CallCounts {
    pub classify: AtomicUsize,
    pub extract: AtomicUsize,
    pub score: AtomicUsize,
}

impl CallCounts {
    pub fn classify(&self) -> usize {
        self.classify.load(Ordering::SeqCst)
    }

    pub fn extract(&self) -> usize {
        self.extract.load(Ordering::SeqCst)
    }

    pub fn score(&self) -> usize {
        self.score.load(Ordering::SeqCst)
    }
}

/// 脚本化后端
///
/// classify 默认按文件名回显，标签取 `labels` 中对应的值（缺省为 "Other"）。
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    labels: Arc<Mutex<Vec<(String, String)>>>,
    evaluation: Arc<Mutex<Option<Value>>>,
    readiness: Arc<Mutex<Option<Value>>>,
    failure: Arc<Mutex<Option<String>>>,
    calls: Arc<CallCounts>,
    last_extract: Arc<Mutex<Option<Vec<ClassificationRecord>>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设定某个文件的分类标签（覆盖之前的设定）
    pub fn with_label(self, file_name: &str, doc_type: &str) -> Self {
        if let Ok(mut labels) = self.labels.lock() {
            labels.retain(|(name, _)| name != file_name);
            labels.push((file_name.to_string(), doc_type.to_string()));
        }
        self
    }

    /// 设定 extract 响应
    pub fn with_evaluation(self, raw: Value) -> Self {
        self.set_evaluation(raw);
        self
    }

    /// 设定 score 响应
    pub fn with_readiness(self, raw: Value) -> Self {
        self.set_readiness(raw);
        self
    }

    /// 替换 extract 响应（克隆出的句柄共享同一份脚本）
    pub fn set_evaluation(&self, raw: Value) {
        if let Ok(mut slot) = self.evaluation.lock() {
            *slot = Some(raw);
        }
    }

    /// 替换 score 响应
    pub fn set_readiness(&self, raw: Value) {
        if let Ok(mut slot) = self.readiness.lock() {
            *slot = Some(raw);
        }
    }

    /// 让后续所有调用失败（None 恢复正常）
    pub fn set_failure(&self, message: Option<&str>) {
        if let Ok(mut slot) = self.failure.lock() {
            *slot = message.map(str::to_string);
        }
    }

    pub fn calls(&self) -> Arc<CallCounts> {
        Arc::clone(&self.calls)
    }

    /// 最近一次 extract 收到的记录
    pub fn last_extract_request(&self) -> Option<Vec<ClassificationRecord>> {
        self.last_extract.lock().ok().and_then(|slot| slot.clone())
    }

    fn check_failure(&self, endpoint: &str) -> Result<(), NetworkError> {
        let failure = self.failure.lock().ok().and_then(|slot| slot.clone());
        match failure {
            Some(message) => Err(NetworkError::request_failed(endpoint, message)),
            None => Ok(()),
        }
    }

    fn scripted(slot: &Mutex<Option<Value>>, endpoint: &str) -> Result<Value, NetworkError> {
        slot.lock()
            .ok()
            .and_then(|slot| slot.clone())
            .ok_or_else(|| NetworkError::BadStatus {
                endpoint: endpoint.to_string(),
                status: 501,
                body: "no scripted response".to_string(),
            })
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn classify(&self, files: &[StagedFile]) -> AppResult<Vec<ClassificationRecord>> {
        self.calls.classify.fetch_add(1, Ordering::SeqCst);
        self.check_failure(CLASSIFY_ENDPOINT)?;

        let labels = self
            .labels
            .lock()
            .map(|labels| labels.clone())
            .unwrap_or_default();
        Ok(files
            .iter()
            .map(|file| {
                let doc_type = labels
                    .iter()
                    .find(|(name, _)| name == &file.file_name)
                    .map(|(_, label)| label.clone())
                    .unwrap_or_else(|| "Other".to_string());
                ClassificationRecord::new(file.file_name.clone(), doc_type)
                    .with_content(format!("text of {}", file.file_name))
            })
            .collect())
    }

    async fn extract(&self, records: &[ClassificationRecord]) -> AppResult<EvaluationResult> {
        self.calls.extract.fetch_add(1, Ordering::SeqCst);
        self.check_failure(EXTRACT_ENDPOINT)?;
        if let Ok(mut slot) = self.last_extract.lock() {
            *slot = Some(records.to_vec());
        }
        let raw = Self::scripted(&self.evaluation, EXTRACT_ENDPOINT)?;
        Ok(EvaluationResult::from_value(raw))
    }

    async fn score(
        &self,
        _records: &[ClassificationRecord],
        _evaluation: &EvaluationResult,
    ) -> AppResult<ReadinessResult> {
        self.calls.score.fetch_add(1, Ordering::SeqCst);
        self.check_failure(SCORE_ENDPOINT)?;
        let raw = Self::scripted(&self.readiness, SCORE_ENDPOINT)?;
        let readiness = serde_json::from_value(raw)
            .map_err(|e| NetworkError::decode_failed(SCORE_ENDPOINT, e))?;
        Ok(readiness)
    }
}
