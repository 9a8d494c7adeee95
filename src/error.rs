use thiserror::Error;

/// 应用程序错误类型
///
/// 每个分类对应一个出错的边界：文件接收、后端网关、流程门控、配置加载。
/// 所有错误都在 `App::dispatch` 处被捕获并渲染为提示信息，不会中断会话。
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件接收错误
    #[error("文件接收错误: {0}")]
    Intake(#[from] IntakeError),
    /// 后端调用错误
    #[error("网络错误: {0}")]
    Network(#[from] NetworkError),
    /// 流程前置条件不满足
    #[error("流程错误: {0}")]
    Workflow(#[from] WorkflowError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 文件接收错误
#[derive(Debug, Error)]
pub enum IntakeError {
    /// 上传批次为空
    #[error("没有可处理的文件")]
    EmptyBatch,
    /// 非 PDF 文件
    #[error("不支持的文件类型: {name}（仅支持 PDF）")]
    UnsupportedFile { name: String },
    /// 创建临时目录失败
    #[error("创建临时目录失败: {source}")]
    TempDirFailed {
        #[source]
        source: std::io::Error,
    },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 清理临时目录失败
    #[error("清理临时目录失败 ({path}): {source}")]
    CleanupFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 后端调用错误
///
/// 不区分瞬时与永久失败，也不重试，原始错误信息直接向上传递。
#[derive(Debug, Error)]
pub enum NetworkError {
    /// 请求无法送达
    #[error("API请求失败 ({endpoint}): {message}")]
    RequestFailed { endpoint: String, message: String },
    /// 后端返回非成功状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 响应体无法解析
    #[error("JSON解析失败 ({endpoint}): {message}")]
    DecodeFailed { endpoint: String, message: String },
}

/// 流程前置条件错误
///
/// 正常情况下界面会先禁用对应操作，这里是状态机边界上的兜底检查。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("请先上传 PDF 文件")]
    NoFilesStaged,
    #[error("请先完成文档分类")]
    NotClassified,
    #[error("请先确认分类结果")]
    NotConfirmed,
    #[error("未找到 RFP 文档，请上传 RFP 或将某个文档标记为 RFP")]
    NoRfpDocument,
    #[error("请先完成 RFP 评估")]
    NotEvaluated,
    #[error("RFP 需求未满足，无法计算就绪度评分")]
    RequirementNotMet,
    #[error("分类表中不存在第 {row} 行（共 {len} 行）")]
    RecordNotFound { row: usize, len: usize },
    #[error("分类表中不存在文件: {name}")]
    UnknownFile { name: String },
    #[error("分类标签不能为空")]
    EmptyLabel,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl NetworkError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: impl std::fmt::Display) -> Self {
        NetworkError::RequestFailed {
            endpoint: endpoint.into(),
            message: source.to_string(),
        }
    }

    /// 创建解析失败错误
    pub fn decode_failed(endpoint: impl Into<String>, source: impl std::fmt::Display) -> Self {
        NetworkError::DecodeFailed {
            endpoint: endpoint.into(),
            message: source.to_string(),
        }
    }
}

impl IntakeError {
    /// 创建文件写入错误
    pub fn write_failed(path: &std::path::Path, source: std::io::Error) -> Self {
        IntakeError::WriteFailed {
            path: path.display().to_string(),
            source,
        }
    }

    /// 创建文件读取错误
    pub fn read_failed(path: &std::path::Path, source: std::io::Error) -> Self {
        IntakeError::ReadFailed {
            path: path.display().to_string(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_keeps_raw_message() {
        let err = NetworkError::request_failed("classify", "connection refused");
        assert!(err.to_string().contains("(classify)"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_app_error_wraps_workflow_error() {
        let err: AppError = WorkflowError::NoRfpDocument.into();
        assert!(matches!(err, AppError::Workflow(WorkflowError::NoRfpDocument)));
        assert!(err.to_string().starts_with("流程错误"));
    }
}
