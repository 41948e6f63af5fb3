//! Reading and writing git's `git-rebase-todo` format.

use std::collections::HashSet;

use crate::model::{Action, Entry, EntryId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoFile {
    pub entries: Vec<Entry>,
    /// Abbreviated sha from the `# Rebase a..b onto <sha>` header.
    pub onto: Option<String>,
    /// Lines git would reject; any of these makes the plan read-only.
    pub problems: Vec<String>,
}

impl TodoFile {
    pub fn has_nonlinear_commands(&self) -> bool {
        self.entries.iter().any(|e| e.action.is_nonlinear())
    }
}

/// Hands out unique entry ids across the done and todo files.
#[derive(Debug, Default)]
pub struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    fn claim(&mut self, wanted: String) -> EntryId {
        if self.used.insert(wanted.clone()) {
            return EntryId(wanted);
        }
        let mut n = 2;
        loop {
            let candidate = format!("{wanted}~{n}");
            if self.used.insert(candidate.clone()) {
                return EntryId(candidate);
            }
            n += 1;
        }
    }

    fn commit(&mut self, sha: &str) -> EntryId {
        self.claim(sha.to_string())
    }

    fn command(&mut self, action: Action, line_no: usize) -> EntryId {
        self.claim(format!("{}-{}", action, line_no))
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

fn parse_onto(comment: &str) -> Option<String> {
    let rest = comment.trim_start().strip_prefix("Rebase ")?;
    let (_, after) = rest.split_once(" onto ")?;
    let (sha, _) = split_word(after);
    (!sha.is_empty()).then(|| sha.to_string())
}

fn parse_line(line: &str, line_no: usize, ids: &mut IdAllocator) -> Result<Entry, String> {
    let (verb, rest) = split_word(line);
    let action =
        Action::parse(verb).ok_or_else(|| format!("line {}: unknown command `{}`", line_no, verb))?;

    if action.is_commit_action() {
        let mut rest = rest;
        let mut flag = None;
        if action == Action::Fixup && rest.starts_with('-') {
            let (f, r) = split_word(rest);
            flag = Some(f.to_string());
            rest = r;
        }
        let (sha, message) = split_word(rest);
        if sha.is_empty() {
            return Err(format!("line {}: `{}` needs a commit", line_no, verb));
        }
        let mut entry = Entry::commit(ids.commit(sha), action, sha, message);
        entry.command_text = flag;
        return Ok(entry);
    }

    let id = ids.command(action, line_no);
    match action {
        Action::Break | Action::Noop => Ok(Entry::command(id, action, None)),
        _ if rest.is_empty() => Err(format!("line {}: `{}` needs an argument", line_no, verb)),
        _ => Ok(Entry::command(id, action, Some(rest.to_string()))),
    }
}

pub fn parse_todo(text: &str, ids: &mut IdAllocator) -> TodoFile {
    let mut out = TodoFile::default();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if out.onto.is_none() {
                out.onto = parse_onto(comment);
            }
            continue;
        }
        match parse_line(line, i + 1, ids) {
            Ok(entry) => out.entries.push(entry),
            Err(problem) => out.problems.push(problem),
        }
    }
    out
}

/// Parses `rebase-merge/done`; every entry comes back marked done.
pub fn parse_done(text: &str, ids: &mut IdAllocator) -> Vec<Entry> {
    let mut entries = parse_todo(text, ids).entries;
    for e in &mut entries {
        e.done = true;
    }
    entries
}

pub fn render_todo(entries: &[Entry]) -> String {
    let mut out = String::new();
    for e in entries.iter().filter(|e| !e.done) {
        out.push_str(e.action.as_str());
        if e.is_commit() {
            if e.action == Action::Fixup
                && let Some(flag) = &e.command_text
            {
                out.push(' ');
                out.push_str(flag);
            }
            out.push(' ');
            out.push_str(e.sha.as_deref().unwrap_or_default());
            if !e.message.is_empty() {
                out.push(' ');
                out.push_str(&e.message);
            }
        } else if let Some(text) = &e.command_text {
            out.push(' ');
            out.push_str(text);
        }
        out.push('\n');
    }
    out
}
