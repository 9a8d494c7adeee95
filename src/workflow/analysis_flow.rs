//! 分析流程 - 流程层
//!
//! 核心职责：定义一次会话的完整处理流程，以及每一步的门控条件
//!
//! 流程顺序：
//! 1. upload → classify（自动）
//! 2. 用户修改标签（可选，会让下游结果失效）
//! 3. confirm（必须由用户显式触发）
//! 4. evaluate → score
//!
//! 所有状态修改都经过这里的具名函数。

use tracing::{debug, info, warn};

use crate::clients::Backend;
use crate::config::Config;
use crate::error::{AppResult, WorkflowError};
use crate::models::{has_rfp, normalize_label, Evaluation, UploadedDocument};
use crate::services::{BackendGateway, FileIntake};
use crate::utils::logging::log_stage_start;
use crate::workflow::operations::Operations;
use crate::workflow::session::{NoticeLevel, SessionState};
use crate::workflow::stage::Stage;

/// 分析流程
///
/// - 决定何时调用后端、何时复用已有结果
/// - 不持有会话状态，会话由调用方传入
/// - 只依赖业务能力（services）
pub struct AnalysisFlow<B: Backend> {
    intake: FileIntake,
    gateway: BackendGateway<B>,
}

impl<B: Backend> AnalysisFlow<B> {
    /// 创建新的分析流程
    pub fn new(config: &Config, backend: B) -> Self {
        Self::with_parts(FileIntake::new(config), BackendGateway::new(backend))
    }

    pub fn with_parts(intake: FileIntake, gateway: BackendGateway<B>) -> Self {
        Self { intake, gateway }
    }

    pub fn gateway(&self) -> &BackendGateway<B> {
        &self.gateway
    }

    /// 上传一批文件（Empty → FilesStaged）
    ///
    /// 已有批次会先被释放，会话下游数据全部重置。
    pub async fn upload(
        &mut self,
        session: &mut SessionState,
        documents: Vec<UploadedDocument>,
    ) -> AppResult<()> {
        log_stage_start("上传", &format!("{} 个文件", documents.len()));

        if let Some(mut previous) = session.batch.take() {
            if let Err(e) = previous.release() {
                warn!("⚠️ 释放上一批文件失败: {}", e);
            }
        }
        session.reset_for_upload();

        let report = self.intake.stage(documents).await?;
        let count = report.batch.files().len();
        session.batch = Some(report.batch);
        session.intake_events = report.events;
        session.notify(NoticeLevel::Success, format!("已上传 {} 个 PDF 文件", count));
        Ok(())
    }

    /// 文档分类（FilesStaged → Classified）
    ///
    /// 分类结果替换整张表，确认状态和下游结果一并清除。
    /// 没有 RFP 标签时不报错，只给出警告，等待用户手动修改。
    pub async fn classify(&mut self, session: &mut SessionState) -> AppResult<()> {
        let files = session
            .batch
            .as_ref()
            .ok_or(WorkflowError::NoFilesStaged)?
            .files()
            .to_vec();
        log_stage_start("分类", &format!("{} 个文件", files.len()));

        let records = self.gateway.classify(&files).await?;

        let new_labels = session
            .catalog
            .extend(records.iter().map(|r| r.doc_type.as_str()));
        if !new_labels.is_empty() {
            info!("🏷️ 新增文档类型: {}", new_labels.join(", "));
        }

        session.has_rfp = has_rfp(&records);
        info!(
            "✓ 分类完成: {} 条记录, RFP: {}",
            records.len(),
            if session.has_rfp { "有" } else { "无" }
        );
        session.records = Some(records);
        session.needs_reconfirmation = false;
        session.invalidate_downstream();

        if !session.has_rfp {
            warn!("⚠️ 分类结果中没有 RFP 文档");
            session.notify(
                NoticeLevel::Warning,
                "未找到 RFP 文档。请上传 RFP 文档，或在分类表中将某个文档标记为 RFP。",
            );
        }
        Ok(())
    }

    /// 修改第 `index` 行（从 0 开始）的分类标签
    ///
    /// # 返回
    /// 标签是否真的发生了变化；未变化时不影响任何状态
    pub fn edit_label(
        &self,
        session: &mut SessionState,
        index: usize,
        label: &str,
    ) -> AppResult<bool> {
        let label = normalize_label(label);
        if label.is_empty() {
            return Err(WorkflowError::EmptyLabel.into());
        }

        let records = session
            .records
            .as_mut()
            .ok_or(WorkflowError::NotClassified)?;
        let len = records.len();
        let record = records
            .get_mut(index)
            .ok_or(WorkflowError::RecordNotFound {
                row: index + 1,
                len,
            })?;

        if record.doc_type == label {
            debug!("标签未变化: {} = {}", record.file_name, label);
            return Ok(false);
        }

        let old = std::mem::replace(&mut record.doc_type, label.clone());
        info!("✏️ {}: {} → {}", record.file_name, old, label);

        // 表格编辑后抽取内容不再随记录提交
        for record in records.iter_mut() {
            record.content = None;
        }
        session.has_rfp = has_rfp(records);
        if session.catalog.insert(&label) {
            info!("🏷️ 新增文档类型: {}", label);
        }

        if session.confirmed || session.evaluation.is_some() {
            session.needs_reconfirmation = true;
            session.notify(
                NoticeLevel::Warning,
                "分类已修改，之前的评估和评分已失效，请重新确认分类。",
            );
        }
        session.invalidate_downstream();
        Ok(true)
    }

    /// 按文件名修改分类标签
    pub fn edit_label_by_name(
        &self,
        session: &mut SessionState,
        file_name: &str,
        label: &str,
    ) -> AppResult<bool> {
        let index = session
            .records
            .as_ref()
            .ok_or(WorkflowError::NotClassified)?
            .iter()
            .position(|r| r.file_name == file_name)
            .ok_or_else(|| WorkflowError::UnknownFile {
                name: file_name.to_string(),
            })?;
        self.edit_label(session, index, label)
    }

    /// 确认分类（Classified → ClassificationConfirmed）
    ///
    /// 没有 RFP 标签时拒绝确认，阶段保持在 Classified。
    pub fn confirm(&self, session: &mut SessionState) -> AppResult<()> {
        if session.records.is_none() {
            return Err(WorkflowError::NotClassified.into());
        }
        if !session.has_rfp {
            return Err(WorkflowError::NoRfpDocument.into());
        }
        if session.confirmed {
            return Ok(());
        }

        session.confirmed = true;
        session.needs_reconfirmation = false;
        info!("✓ 分类已确认");
        session.notify(NoticeLevel::Success, "分类已确认");
        Ok(())
    }

    /// RFP 需求评估（ClassificationConfirmed → Evaluated）
    ///
    /// 满足与不满足都会进入 Evaluated；不满足时保留原始诊断信息。
    pub async fn evaluate(&mut self, session: &mut SessionState) -> AppResult<()> {
        let records = session
            .records
            .as_ref()
            .ok_or(WorkflowError::NotClassified)?
            .clone();
        if !session.confirmed {
            return Err(WorkflowError::NotConfirmed.into());
        }
        if !session.has_rfp {
            return Err(WorkflowError::NoRfpDocument.into());
        }
        if session.evaluation.is_some() {
            debug!("评估结果已存在，跳过");
            return Ok(());
        }

        log_stage_start("RFP 评估", &format!("{} 条分类记录", records.len()));
        let evaluation = self.gateway.evaluate(&records).await?;

        match &evaluation.outcome {
            Evaluation::Met(met) => {
                info!("✅ 需求已满足 (文件: {})", met.sow_elements_file_name);
                session.notify(NoticeLevel::Success, "需求已满足！");
                for warning in &evaluation.shape_warnings {
                    session.notify(
                        NoticeLevel::Warning,
                        format!("评估结果展示字段异常: {}", warning),
                    );
                }
            }
            Evaluation::NotMet(_) => {
                warn!("❌ 需求未满足");
                session.notify(
                    NoticeLevel::Error,
                    "需求未满足。请上传覆盖 scope、objectives、tasks 和 deliverables 的文档。",
                );
            }
        }
        session.evaluation = Some(evaluation);
        Ok(())
    }

    /// 就绪度评分（Evaluated → Scored）
    ///
    /// 只有评估结论为满足时才会调用后端。
    pub async fn score(&mut self, session: &mut SessionState) -> AppResult<()> {
        let evaluation = session
            .evaluation
            .as_ref()
            .ok_or(WorkflowError::NotEvaluated)?
            .clone();
        if !evaluation.requirement_met() {
            return Err(WorkflowError::RequirementNotMet.into());
        }
        if session.readiness.is_some() {
            debug!("评分结果已存在，跳过");
            return Ok(());
        }
        let records = session
            .records
            .as_ref()
            .ok_or(WorkflowError::NotClassified)?
            .clone();

        log_stage_start("就绪度评分", "");
        let readiness = self.gateway.score(&records, &evaluation).await?;
        info!("📊 就绪度评分: {:.2}", readiness.readiness_score);

        session.previous_score = session.latest_score.take();
        session.latest_score = Some(readiness.readiness_score);
        session.readiness = Some(readiness);
        session.analysis_complete = true;
        Ok(())
    }

    /// 按选中的操作尽可能向前推进
    ///
    /// 分类未确认时停在 Classified 等待用户；评估未满足时停在 Evaluated。
    /// 分析已完成时直接返回，不会重复调用后端。
    ///
    /// # 返回
    /// 推进后的阶段
    pub async fn advance(
        &mut self,
        session: &mut SessionState,
        operations: &Operations,
    ) -> AppResult<Stage> {
        if session.analysis_complete {
            debug!("分析已完成，跳过");
            return Ok(session.stage());
        }
        if session.batch.is_none() {
            return Err(WorkflowError::NoFilesStaged.into());
        }
        if session.records.is_none() {
            self.classify(session).await?;
        }
        if !operations.needs_evaluation() || !session.confirmed {
            return Ok(session.stage());
        }
        if session.evaluation.is_none() {
            self.evaluate(session).await?;
        }
        if !operations.score {
            return Ok(session.stage());
        }
        let met = session
            .evaluation
            .as_ref()
            .map(|e| e.requirement_met())
            .unwrap_or(false);
        if met {
            self.score(session).await?;
        }
        Ok(session.stage())
    }

    /// 清空会话（任意阶段 → Empty）
    ///
    /// 丢弃所有记录、清空网关缓存并释放临时目录。
    pub fn clear(&mut self, session: &mut SessionState) -> AppResult<()> {
        let batch = session.batch.take();
        *session = SessionState::default();
        self.gateway.clear_cache();

        if let Some(mut batch) = batch {
            batch.release()?;
        }
        info!("🧹 会话已清空");
        session.notify(NoticeLevel::Info, "会话已清空");
        Ok(())
    }
}
