//! 用户选择执行的分析操作
//!
//! 后面的操作依赖前面的操作：只选"评分"时分类和评估仍会在内部执行，
//! 但不展示它们的结果。

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Classify,
    Evaluate,
    Score,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::Classify => "Classify PDFs",
            Operation::Evaluate => "Evaluate RFP",
            Operation::Score => "Readiness Score",
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classify" | "classification" => Ok(Operation::Classify),
            "evaluate" | "evaluation" | "extract" => Ok(Operation::Evaluate),
            "score" | "readiness" => Ok(Operation::Score),
            other => Err(format!("未知操作: {}（可选: classify, evaluate, score）", other)),
        }
    }
}

/// 选中的操作集合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operations {
    pub classify: bool,
    pub evaluate: bool,
    pub score: bool,
}

impl Default for Operations {
    fn default() -> Self {
        Self::all()
    }
}

impl Operations {
    pub fn all() -> Self {
        Self {
            classify: true,
            evaluate: true,
            score: true,
        }
    }

    pub fn from_list(ops: &[Operation]) -> Self {
        Self {
            classify: ops.contains(&Operation::Classify),
            evaluate: ops.contains(&Operation::Evaluate),
            score: ops.contains(&Operation::Score),
        }
    }

    pub fn shows(&self, op: Operation) -> bool {
        match op {
            Operation::Classify => self.classify,
            Operation::Evaluate => self.evaluate,
            Operation::Score => self.score,
        }
    }

    /// 选中的操作，按执行顺序
    pub fn selected(&self) -> Vec<Operation> {
        [Operation::Classify, Operation::Evaluate, Operation::Score]
            .into_iter()
            .filter(|op| self.shows(*op))
            .collect()
    }

    /// 是否需要走到评估阶段
    pub fn needs_evaluation(&self) -> bool {
        self.evaluate || self.score
    }
}
