use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use replan::host::{PlanHost, run_host, serve_stdio};
use replan::model::{Entry, PlanStatus};
use replan::plan::{EntryFlags, PlanProvider};
use replan::protocol::{HostCommand, HostRequest, HostResponse};
use replan::trace::SessionTrace;
use replan::transport;
use replan::tui::TuiRunOptions;

use crate::cli_runtime::RunContext;

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("build tokio runtime")
}

pub(crate) fn handle_edit(todo: &Path, ctx: &RunContext) -> Result<()> {
    let host = PlanHost::open(todo, ctx.host_options())?;
    let trace = ctx
        .trace
        .as_deref()
        .map(SessionTrace::open)
        .transpose()
        .context("open session trace")?;

    let runtime = build_runtime()?;
    let (link, endpoint) = transport::channel();
    let mut link = link.with_trace(trace);
    let bootstrap = link.request(HostRequest::Bootstrap);
    let host_task = runtime.spawn(run_host(host, endpoint));

    let state = match link.wait_for(bootstrap, Duration::from_secs(5))? {
        HostResponse::State { state } => state,
        other => bail!("unexpected bootstrap reply: {:?}", other),
    };

    let title = todo
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| todo.display().to_string());
    let provider = PlanProvider::new(state, link);
    // The link is dropped with the editor, which lets the host task finish.
    let outcome = replan::tui::run_with_options(provider, TuiRunOptions { title });

    let host = runtime
        .block_on(host_task)
        .context("host task panicked")??;
    outcome?;

    match host.state().status {
        PlanStatus::Editing => {
            bail!("editor closed before the plan was started or aborted")
        }
        PlanStatus::Aborted => eprintln!("rebase aborted"),
        status => info!(?status, "plan handed back to git"),
    }
    Ok(())
}

pub(crate) fn handle_serve(todo: &Path, ctx: &RunContext) -> Result<()> {
    let host = PlanHost::open(todo, ctx.host_options())?;
    let runtime = build_runtime()?;
    let host = runtime.block_on(serve_stdio(host))?;
    info!(status = ?host.state().status, "serve finished");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowRow<'a> {
    #[serde(flatten)]
    entry: &'a Entry,
    #[serde(flatten)]
    flags: EntryFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowOutput<'a> {
    ascending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    read_only: Option<&'a str>,
    rows: Vec<ShowRow<'a>>,
}

fn flag_tags(flags: EntryFlags) -> String {
    let mut tags = Vec::new();
    if flags.is_done {
        tags.push("done");
    }
    if flags.is_current {
        tags.push("current");
    }
    if flags.is_oldest {
        tags.push("oldest");
    }
    if flags.is_squash_target {
        tags.push("target");
    }
    if flags.is_squashing {
        tags.push("squashing");
    }
    if tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", tags.join(","))
    }
}

pub(crate) fn handle_show(todo: &Path, json: bool, ascending: bool, ctx: &RunContext) -> Result<()> {
    let host = PlanHost::open(todo, ctx.host_options())?;
    let mut provider = PlanProvider::new(host.state().clone(), Vec::<HostCommand>::new());
    if let Some(avatars) = host.avatars_notification() {
        provider.apply_notification(avatars);
    }
    if ascending {
        provider.set_ascending(true);
    }

    if json {
        let out = ShowOutput {
            ascending: provider.state().ascending,
            read_only: provider.state().read_only.as_deref(),
            rows: provider
                .rows()
                .map(|(row, flags)| ShowRow {
                    entry: &row.entry,
                    flags,
                    avatar_url: row
                        .entry
                        .sha
                        .as_deref()
                        .and_then(|sha| provider.avatar_for_sha(sha)),
                })
                .collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("serialize plan json")?
        );
        return Ok(());
    }

    if let Some(reason) = &provider.state().read_only {
        eprintln!("read-only: {}", reason);
    }
    for (row, flags) in provider.rows() {
        let e = &row.entry;
        if flags.is_base {
            let line = format!("{:<7} {} {}", "onto", e.short_sha(), e.message);
            println!("{}", line.trim_end());
        } else if e.is_commit() {
            println!(
                "{:<7} {} {}{}",
                e.action.as_str(),
                e.short_sha(),
                e.message,
                flag_tags(flags)
            );
        } else {
            let text = e.command_text.as_deref().unwrap_or_default();
            let line = format!("{:<7} {}", e.action.as_str(), text);
            println!("{}{}", line.trim_end(), flag_tags(flags));
        }
    }
    Ok(())
}
