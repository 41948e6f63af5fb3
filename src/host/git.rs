use std::collections::BTreeMap;
use std::process::Command;

use tracing::{debug, warn};

use crate::model::Author;

const SEP: char = '\u{1f}';

struct LogLine {
    full_sha: String,
    author: Author,
    subject: String,
}

fn parse_log_line(line: &str) -> Option<LogLine> {
    let mut parts = line.split(SEP);
    let full_sha = parts.next()?.trim().to_string();
    let name = parts.next()?.to_string();
    let email = parts.next()?.to_string();
    let subject = parts.next().unwrap_or_default().to_string();
    if full_sha.is_empty() {
        return None;
    }
    Some(LogLine {
        full_sha,
        author: Author {
            name,
            email,
            avatar_url: None,
        },
        subject,
    })
}

fn git_log(revs: &[&str]) -> Vec<LogLine> {
    if revs.is_empty() {
        return Vec::new();
    }
    let output = Command::new("git")
        .args(["log", "--no-walk=unsorted", "--format=%H%x1f%an%x1f%ae%x1f%s"])
        .args(revs)
        .output();
    let output = match output {
        Ok(o) if o.status.success() => o,
        Ok(o) => {
            warn!(
                status = ?o.status.code(),
                stderr = %String::from_utf8_lossy(&o.stderr).trim(),
                "git log failed; continuing without commit metadata"
            );
            return Vec::new();
        }
        Err(err) => {
            warn!(%err, "could not run git; continuing without commit metadata");
            return Vec::new();
        }
    };
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(parse_log_line)
        .collect()
}

/// Authors keyed by the (possibly abbreviated) sha as written in the todo.
pub(super) fn lookup_authors(shas: &[&str]) -> BTreeMap<String, Author> {
    let lines = git_log(shas);
    let mut out = BTreeMap::new();
    for sha in shas {
        if let Some(line) = lines.iter().find(|l| l.full_sha.starts_with(sha)) {
            out.insert(sha.to_string(), line.author.clone());
        }
    }
    debug!(requested = shas.len(), found = out.len(), "looked up authors");
    out
}

pub(super) fn commit_subject(sha: &str) -> Option<String> {
    git_log(&[sha])
        .into_iter()
        .find(|l| l.full_sha.starts_with(sha))
        .map(|l| l.subject)
}
