use crate::{HistoryEntry, MessageView};

use parley_core::Turn;

use std::io::Write;

const CODE_FENCE: &str = "```";
const CODE_INDENT: &str = "    ";

/// Renders streamed Markdown as plain terminal text.
///
/// Each render gets the full reply so far. Complete lines are projected and
/// printed as soon as their newline arrives; the trailing partial line is held
/// until the stream commits or fails.
pub struct TerminalView<W: Write> {
    out: W,
    consumed: usize,
    held: String,
    in_code: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            consumed: 0,
            held: String::new(),
            in_code: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print the conversation list, marking the active one
    pub fn print_history(&mut self, entries: &[HistoryEntry]) {
        if entries.is_empty() {
            let _ = writeln!(self.out, "No conversations yet");
            return;
        }
        for entry in entries {
            let marker = if entry.active { "*" } else { " " };
            let _ = writeln!(self.out, "{marker} {}  {}", entry.id, entry.title);
        }
    }

    /// Print a stored turn under its role
    pub fn print_turn(&mut self, turn: &Turn) {
        let _ = writeln!(self.out, "[{}]", turn.role);
        let mut in_code = false;
        for line in turn.content.lines() {
            if let Some(text) = project_line(line, &mut in_code) {
                let _ = writeln!(self.out, "{text}");
            }
        }
        let _ = writeln!(self.out);
    }

    fn write_line(&mut self, line: &str) {
        if let Some(text) = project_line(line, &mut self.in_code) {
            let _ = writeln!(self.out, "{text}");
        }
    }

    /// Print whatever partial line is held and reset for the next reply
    fn end_reply(&mut self) {
        if !self.held.is_empty() {
            let line = std::mem::take(&mut self.held);
            self.write_line(&line);
        }
        self.consumed = 0;
        self.in_code = false;
        let _ = self.out.flush();
    }
}

impl<W: Write> MessageView for TerminalView<W> {
    fn render_markdown(&mut self, markdown: &str) {
        let Some(fresh) = markdown.get(self.consumed..) else {
            return;
        };
        let Some(last_newline) = fresh.rfind('\n') else {
            self.held = fresh.to_string();
            return;
        };

        let (complete, rest) = fresh.split_at(last_newline + 1);
        for line in complete.lines() {
            self.write_line(line);
        }
        self.consumed += complete.len();
        self.held = rest.to_string();
        let _ = self.out.flush();
    }

    fn show_error(&mut self, message: &str) {
        self.end_reply();
        let _ = writeln!(self.out, "Error: {message}");
        let _ = self.out.flush();
    }

    fn refresh_history(&mut self, entries: &[HistoryEntry]) {
        self.end_reply();
        let _ = writeln!(self.out);
        self.print_history(entries);
        let _ = self.out.flush();
    }
}

/// Terminal form of one Markdown line. Fence lines vanish; code inside a fence
/// is indented and otherwise left alone.
pub(crate) fn project_line(line: &str, in_code: &mut bool) -> Option<String> {
    if line.trim_start().starts_with(CODE_FENCE) {
        *in_code = !*in_code;
        return None;
    }
    if *in_code {
        return Some(format!("{CODE_INDENT}{line}"));
    }

    let indent_len = line.len() - line.trim_start().len();
    let (indent, body) = line.split_at(indent_len);

    let body = if let Some(heading) = strip_heading(body) {
        heading
    } else if let Some(quoted) = body.strip_prefix("> ") {
        return Some(format!("{indent}| {}", strip_inline(quoted)));
    } else if let Some(item) = ["- ", "* ", "+ "]
        .iter()
        .find_map(|bullet| body.strip_prefix(bullet))
    {
        return Some(format!("{indent}• {}", strip_inline(item)));
    } else {
        body
    };

    Some(format!("{indent}{}", strip_inline(body)))
}

fn strip_heading(body: &str) -> Option<&str> {
    let level = body.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) {
        body[level..].strip_prefix(' ')
    } else {
        None
    }
}

fn strip_inline(text: &str) -> String {
    text.replace("**", "").replace("__", "").replace('`', "")
}
