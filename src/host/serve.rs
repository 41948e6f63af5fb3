use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::protocol::{FromHost, ToHost};

use super::PlanHost;

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, msg: &FromHost) -> Result<()> {
    let mut line = serde_json::to_vec(msg).context("serialize host message")?;
    line.push(b'\n');
    out.write_all(&line).await.context("write stdout")?;
    out.flush().await.context("flush stdout")?;
    Ok(())
}

/// Speaks the host protocol as JSON lines on stdin/stdout.
///
/// Returns when stdin closes, the session finishes, or on Ctrl-C.
pub async fn serve_stdio(mut host: PlanHost) -> Result<PlanHost> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    if let Some(notification) = host.avatars_notification() {
        write_line(&mut stdout, &FromHost::Notification { notification }).await?;
    }
    info!(todo = %host.todo_path().display(), "serving plan on stdio");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    info!("stdin closed");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let msg: ToHost = match serde_json::from_str(line) {
                    Ok(msg) => msg,
                    Err(err) => {
                        warn!(%err, "ignoring malformed message");
                        continue;
                    }
                };
                debug!(?msg, "received");
                for reply in host.dispatch(msg) {
                    write_line(&mut stdout, &reply).await?;
                }
                if host.state().status.is_finished() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }
    Ok(host)
}
