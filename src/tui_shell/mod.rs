use anyhow::Result;

use crate::model::PlanStatus;
use crate::plan::PlanProvider;
use crate::transport::HostLink;

mod app;

mod input;
mod keymap;
mod view;

pub fn run_with_options(
    provider: PlanProvider<HostLink>,
    opts: crate::tui::TuiRunOptions,
) -> Result<Option<PlanStatus>> {
    app::run(provider, opts)
}
