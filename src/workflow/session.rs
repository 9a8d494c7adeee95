//! 会话状态
//!
//! 整个会话唯一的可变状态，由 `App` 独占并以 `&mut` 传入每个流程函数。
//! 阶段由数据推导，不单独存储，因此不会与数据不一致。

use crate::models::{ClassificationRecord, DocTypeCatalog, EvaluationResult, ReadinessResult};
use crate::services::{IntakeEvent, StagedBatch};
use crate::workflow::stage::Stage;

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 一次操作产生的提示信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// 会话状态
#[derive(Debug, Default)]
pub struct SessionState {
    pub(super) batch: Option<StagedBatch>,
    pub(super) intake_events: Vec<IntakeEvent>,
    pub(super) records: Option<Vec<ClassificationRecord>>,
    pub(super) catalog: DocTypeCatalog,
    pub(super) has_rfp: bool,
    pub(super) confirmed: bool,
    /// 确认后又修改了分类，需要重新确认
    pub(super) needs_reconfirmation: bool,
    pub(super) evaluation: Option<EvaluationResult>,
    pub(super) readiness: Option<ReadinessResult>,
    /// 上一次评分，用于展示变化量
    pub(super) previous_score: Option<f64>,
    pub(super) latest_score: Option<f64>,
    /// 评分完成后不再重复计算，直到分类变化
    pub(super) analysis_complete: bool,
    pub(super) notices: Vec<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        if self.batch.is_none() {
            return Stage::Empty;
        }
        if self.records.is_none() {
            return Stage::FilesStaged;
        }
        if !self.confirmed {
            return Stage::Classified;
        }
        match (&self.evaluation, &self.readiness) {
            (None, _) => Stage::ClassificationConfirmed,
            (Some(_), None) => Stage::Evaluated,
            (Some(_), Some(_)) => Stage::Scored,
        }
    }

    pub fn batch(&self) -> Option<&StagedBatch> {
        self.batch.as_ref()
    }

    pub fn intake_events(&self) -> &[IntakeEvent] {
        &self.intake_events
    }

    pub fn records(&self) -> Option<&[ClassificationRecord]> {
        self.records.as_deref()
    }

    pub fn catalog(&self) -> &DocTypeCatalog {
        &self.catalog
    }

    pub fn has_rfp(&self) -> bool {
        self.has_rfp
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn needs_reconfirmation(&self) -> bool {
        self.needs_reconfirmation
    }

    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        self.evaluation.as_ref()
    }

    pub fn readiness(&self) -> Option<&ReadinessResult> {
        self.readiness.as_ref()
    }

    pub fn previous_score(&self) -> Option<f64> {
        self.previous_score
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// 取走本轮提示（渲染后调用）
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// 丢弃确认状态及评估、评分结果
    pub(super) fn invalidate_downstream(&mut self) {
        self.confirmed = false;
        self.evaluation = None;
        self.readiness = None;
        self.analysis_complete = false;
    }

    /// 新上传前的重置：保留标签目录和评分参考
    pub(super) fn reset_for_upload(&mut self) {
        self.intake_events.clear();
        self.records = None;
        self.has_rfp = false;
        self.needs_reconfirmation = false;
        self.invalidate_downstream();
    }
}
