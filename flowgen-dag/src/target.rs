use strum::{Display, EnumString};

/// Which dependency parameter a run controls: the summed per-rule dependency
/// lengths, or the total count of non-None edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum TargetKind {
    DependencyLength,
    EdgeCount,
}
