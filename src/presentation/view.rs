//! 状态投影
//!
//! `project` 是纯函数：同一个会话状态总是得到同一个视图，不修改任何数据。

use serde_json::Value;

use crate::models::{Evaluation, ReadinessResult};
use crate::presentation::intent::IntentKind;
use crate::workflow::{Notice, SessionState, Stage};

/// 仪表颜色区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// 0 - 50
    Red,
    /// 50 - 75
    Yellow,
    /// 75 - 100
    Green,
}

/// 文本仪表（0 - 100）
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub title: String,
    pub value: f64,
    /// 与上一次评分的差值
    pub delta: Option<f64>,
}

impl Gauge {
    /// 由 0..=1 的分数构建
    pub fn from_score(title: impl Into<String>, score: f64) -> Self {
        Self {
            title: title.into(),
            value: score * 100.0,
            delta: None,
        }
    }

    pub fn band(&self) -> Band {
        if self.value < 50.0 {
            Band::Red
        } else if self.value < 75.0 {
            Band::Yellow
        } else {
            Band::Green
        }
    }
}

/// 已上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub file_name: String,
    pub size: u64,
    pub original_size: u64,
}

/// 分类表的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRow {
    /// 从 1 开始
    pub row: usize,
    pub file_name: String,
    pub doc_type: String,
}

/// 评估结果视图
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationView {
    Met {
        file_name: String,
        elements: Vec<(String, String)>,
        coverage: Vec<(&'static str, bool)>,
    },
    /// 原始诊断信息（格式化 JSON）
    NotMet { diagnostic: String },
}

/// 分项评分
#[derive(Debug, Clone, PartialEq)]
pub enum SectionView {
    Gauges(Vec<Gauge>),
    /// 分项不全时后端给出的说明
    Message(String),
    Unavailable,
}

/// 就绪度评分视图
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessView {
    pub gauge: Gauge,
    pub reasons: Vec<(String, String)>,
    pub sections: SectionView,
    pub suggestions: Vec<(String, String)>,
}

/// 会话视图
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub stage: Stage,
    pub files: Vec<FileRow>,
    pub intake_log: Vec<String>,
    pub classification: Vec<ClassificationRow>,
    pub catalog: Vec<String>,
    pub rfp_missing: bool,
    pub needs_reconfirmation: bool,
    pub confirmed: bool,
    pub evaluation: Option<EvaluationView>,
    pub readiness: Option<ReadinessView>,
    pub notices: Vec<Notice>,
    /// 当前可用的操作，前置条件不满足的操作不在其中
    pub enabled: Vec<IntentKind>,
}

impl SessionView {
    pub fn is_enabled(&self, kind: IntentKind) -> bool {
        self.enabled.contains(&kind)
    }
}

/// 把会话状态投影为视图
pub fn project(session: &SessionState) -> SessionView {
    let files = session
        .batch()
        .map(|batch| {
            batch
                .files()
                .iter()
                .map(|f| FileRow {
                    file_name: f.file_name.clone(),
                    size: f.size(),
                    original_size: f.original_size,
                })
                .collect()
        })
        .unwrap_or_default();

    let classification = session
        .records()
        .map(|records| {
            records
                .iter()
                .enumerate()
                .map(|(i, r)| ClassificationRow {
                    row: i + 1,
                    file_name: r.file_name.clone(),
                    doc_type: r.doc_type.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let evaluation = session.evaluation().map(|e| match &e.outcome {
        Evaluation::Met(met) => EvaluationView::Met {
            file_name: met.sow_elements_file_name.to_string(),
            elements: text_pairs(met.sow_elements.iter()),
            coverage: met.coverage.entries().to_vec(),
        },
        Evaluation::NotMet(diagnostic) => EvaluationView::NotMet {
            diagnostic: serde_json::to_string_pretty(&diagnostic.payload)
                .unwrap_or_else(|_| diagnostic.payload.to_string()),
        },
    });

    let readiness = session
        .readiness()
        .map(|r| readiness_view(r, session.previous_score()));

    SessionView {
        stage: session.stage(),
        files,
        intake_log: session.intake_events().iter().map(|e| e.to_string()).collect(),
        classification,
        catalog: session.catalog().labels().to_vec(),
        rfp_missing: session.records().is_some() && !session.has_rfp(),
        needs_reconfirmation: session.needs_reconfirmation(),
        confirmed: session.is_confirmed(),
        evaluation,
        readiness,
        notices: session.notices().to_vec(),
        enabled: enabled_intents(session),
    }
}

/// 可用操作：前置条件不满足的操作直接禁用
fn enabled_intents(session: &SessionState) -> Vec<IntentKind> {
    let staged = session.batch().is_some();
    let classified = session.records().is_some();
    let met = session
        .evaluation()
        .map(|e| e.requirement_met())
        .unwrap_or(false);

    let mut enabled = vec![IntentKind::Upload];
    if staged {
        enabled.push(IntentKind::Classify);
        enabled.push(IntentKind::Analyze);
    }
    if classified {
        enabled.push(IntentKind::EditLabel);
    }
    if classified && session.has_rfp() && !session.is_confirmed() {
        enabled.push(IntentKind::Confirm);
    }
    if session.is_confirmed() && session.has_rfp() && session.evaluation().is_none() {
        enabled.push(IntentKind::Evaluate);
    }
    if met && session.readiness().is_none() {
        enabled.push(IntentKind::Score);
    }
    enabled.push(IntentKind::Clear);
    enabled
}

fn readiness_view(readiness: &ReadinessResult, previous: Option<f64>) -> ReadinessView {
    let mut gauge = Gauge::from_score("Readiness Score", readiness.readiness_score);
    gauge.delta = previous.map(|p| (readiness.readiness_score - p) * 100.0);

    let sections = match readiness.complete_section_scores() {
        Some(scores) => SectionView::Gauges(
            scores
                .iter()
                .map(|(name, score)| Gauge::from_score(capitalize(name), *score))
                .collect(),
        ),
        None => match &readiness.message {
            Some(message) => SectionView::Message(message.clone()),
            None => SectionView::Unavailable,
        },
    };

    ReadinessView {
        gauge,
        reasons: text_pairs(readiness.reason.iter()),
        sections,
        suggestions: readiness
            .suggestions
            .as_ref()
            .map(|s| text_pairs(s.iter()))
            .unwrap_or_default(),
    }
}

fn text_pairs<'a>(entries: impl Iterator<Item = (&'a String, &'a Value)>) -> Vec<(String, String)> {
    entries
        .map(|(key, value)| (key.clone(), value_text(value)))
        .collect()
}

/// 字符串直接显示，其它值显示为 JSON
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
