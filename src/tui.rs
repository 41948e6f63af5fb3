use anyhow::Result;

use crate::model::PlanStatus;
use crate::plan::PlanProvider;
use crate::transport::HostLink;

#[derive(Clone, Debug, Default)]
pub struct TuiRunOptions {
    /// Shown in the frame header (usually the todo file name).
    pub title: String,
}

/// Runs the terminal editor and returns how the session ended, if the host
/// confirmed an ending before the editor closed.
pub fn run_with_options(
    provider: PlanProvider<HostLink>,
    opts: TuiRunOptions,
) -> Result<Option<PlanStatus>> {
    crate::tui_shell::run_with_options(provider, opts)
}
