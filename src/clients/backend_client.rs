/// 分析后端 API 客户端
///
/// 封装所有与分析后端相关的调用逻辑
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppResult, IntakeError, NetworkError};
use crate::models::{ClassificationRecord, EvaluationResult, ReadinessResult, StagedFile};
use crate::utils::truncate_text;

pub const CLASSIFY_ENDPOINT: &str = "classify";
pub const EXTRACT_ENDPOINT: &str = "extract";
pub const SCORE_ENDPOINT: &str = "score";

/// 分析后端
///
/// 三个调用对客户端而言都是幂等的；实现方不重试，失败原样返回。
/// 读取暂存文件失败属于文件接收错误，其余都是网络错误。
#[async_trait]
pub trait Backend: Send + Sync {
    /// 文档分类
    async fn classify(&self, files: &[StagedFile]) -> AppResult<Vec<ClassificationRecord>>;

    /// RFP 需求覆盖评估
    async fn extract(&self, records: &[ClassificationRecord]) -> AppResult<EvaluationResult>;

    /// 就绪度评分
    async fn score(
        &self,
        records: &[ClassificationRecord],
        evaluation: &EvaluationResult,
    ) -> AppResult<ReadinessResult>;
}

/// 基于 HTTP 的后端客户端
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// 拼接接口地址，保证只有一个分隔斜杠并以斜杠结尾
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/", self.base_url, endpoint)
    }

    /// 发送请求并解析 JSON 响应
    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, NetworkError> {
        let response = request
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| NetworkError::request_failed(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| NetworkError::request_failed(endpoint, e))?;
        debug!("{} 响应 ({} 字节): {}", endpoint, text.len(), truncate_text(&text, 200));

        serde_json::from_str(&text).map_err(|e| NetworkError::decode_failed(endpoint, e))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn classify(&self, files: &[StagedFile]) -> AppResult<Vec<ClassificationRecord>> {
        let mut form = Form::new();
        for file in files {
            let bytes = tokio::fs::read(&file.path)
                .await
                .map_err(|e| IntakeError::read_failed(&file.path, e))?;
            let part = Part::bytes(bytes)
                .file_name(file.file_name.clone())
                .mime_str("application/pdf")
                .map_err(|e| NetworkError::request_failed(CLASSIFY_ENDPOINT, e))?;
            form = form.part("files", part);
        }

        debug!("POST {} ({} 个文件)", self.endpoint_url(CLASSIFY_ENDPOINT), files.len());
        let request = self
            .client
            .post(self.endpoint_url(CLASSIFY_ENDPOINT))
            .multipart(form);
        Ok(self.send(CLASSIFY_ENDPOINT, request).await?)
    }

    async fn extract(&self, records: &[ClassificationRecord]) -> AppResult<EvaluationResult> {
        debug!("POST {} ({} 条记录)", self.endpoint_url(EXTRACT_ENDPOINT), records.len());
        let request = self
            .client
            .post(self.endpoint_url(EXTRACT_ENDPOINT))
            .json(records);
        let raw: Value = self.send(EXTRACT_ENDPOINT, request).await?;
        Ok(EvaluationResult::from_value(raw))
    }

    async fn score(
        &self,
        records: &[ClassificationRecord],
        evaluation: &EvaluationResult,
    ) -> AppResult<ReadinessResult> {
        let body = score_request_body(records, evaluation);
        debug!("POST {}", self.endpoint_url(SCORE_ENDPOINT));
        let request = self
            .client
            .post(self.endpoint_url(SCORE_ENDPOINT))
            .json(&body);
        Ok(self.send(SCORE_ENDPOINT, request).await?)
    }
}

/// 构建 score 请求体
pub fn score_request_body(records: &[ClassificationRecord], evaluation: &EvaluationResult) -> Value {
    json!({
        "classified_docs": records,
        "extracted_rfp_result": evaluation.raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_endpoint_url_normalizes_slashes() {
        let mut config = Config::default();
        config.backend_url = "http://backend:8000/".to_string();
        let backend = HttpBackend::new(&config);
        assert_eq!(backend.endpoint_url("classify"), "http://backend:8000/classify/");

        config.backend_url = "http://backend:8000".to_string();
        let backend = HttpBackend::new(&config);
        assert_eq!(backend.endpoint_url("score"), "http://backend:8000/score/");
    }

    #[test]
    fn test_score_request_forwards_raw_evaluation() {
        let raw = json!({"requirement_met": true, "extra": {"kept": 1}});
        let evaluation = EvaluationResult::from_value(raw.clone());
        let records = vec![ClassificationRecord::new("rfp.pdf", "RFP")];

        let body = score_request_body(&records, &evaluation);
        assert_eq!(body["extracted_rfp_result"], raw);
        assert_eq!(body["classified_docs"][0]["doc_type"], "RFP");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let mut config = Config::default();
        // 端口 9 (discard) 上通常没有 HTTP 服务
        config.backend_url = "http://127.0.0.1:9".to_string();
        let backend = HttpBackend::new(&config);

        let err = backend.extract(&[]).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Network(NetworkError::RequestFailed { ref endpoint, .. }) if endpoint == "extract"
        ));
    }

    #[tokio::test]
    async fn test_missing_staged_file_is_intake_error() {
        let backend = HttpBackend::new(&Config::default());
        let files = vec![StagedFile {
            file_name: "gone.pdf".to_string(),
            path: std::path::PathBuf::from("/nonexistent/pwin/gone.pdf"),
            original_size: 4,
            fingerprint: crate::models::Fingerprint::of(b"%PDF"),
        }];

        let err = backend.classify(&files).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Intake(IntakeError::ReadFailed { ref path, .. }) if path.ends_with("gone.pdf")
        ));
    }
}
