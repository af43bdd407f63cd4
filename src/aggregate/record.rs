use crate::engine::ContainerDescriptor;
use crate::health::FusedState;
use crate::image::ResolvedImage;
use crate::logs::{ContainerIdentity, LogWindow};
use crate::usage::UsageReport;

/// Everything known about one container after a list query.
///
/// Both list routes are projections of this record.
#[derive(Debug, Clone)]
pub struct ContainerRecord {
    pub descriptor: ContainerDescriptor,
    pub state: FusedState,
    /// Operator-facing status label.
    pub status: String,
    pub identity: ContainerIdentity,
    /// Resolved image; only looked up in [`ListMode::Full`](super::ListMode::Full), otherwise
    /// the raw reference.
    pub image: ResolvedImage,
    pub logs: LogWindow,
}

/// Point-in-time utilisation of a single container.
#[derive(Debug, Clone)]
pub struct ContainerUsage {
    pub descriptor: ContainerDescriptor,
    pub created_at: String,
    pub usage: UsageReport,
    pub logs: LogWindow,
}
