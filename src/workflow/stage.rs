/// 工作流阶段，按顺序排列，每个阶段以前一个为前提
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Empty,
    FilesStaged,
    Classified,
    ClassificationConfirmed,
    Evaluated,
    Scored,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Empty => "等待上传",
            Stage::FilesStaged => "文件已就绪",
            Stage::Classified => "已分类",
            Stage::ClassificationConfirmed => "分类已确认",
            Stage::Evaluated => "已评估",
            Stage::Scored => "已评分",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
