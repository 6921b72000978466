// BotConsole - core/sanitize.rs
//
// Display sanitisation for untrusted message text.
//
// Messages come straight from the server and are never interpreted: the UI
// renders them as plain text labels. On top of that, terminal control
// sequences are neutralised so a log line cannot fake colours, move the
// cursor, or hide text:
//   1. ANSI CSI / OSC escape sequences are stripped.
//   2. Remaining control characters (except tab) become visible `\u{..}`.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

fn escape_sequence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // CSI: ESC [ params final-byte | OSC: ESC ] ... (BEL | ESC \)
        Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)")
            .unwrap_or_else(|e| unreachable!("static escape regex is valid: {e}"))
    })
}

/// Return the display-safe form of `message`.
pub fn display_text(message: &str) -> Cow<'_, str> {
    let needs_work = message.chars().any(|c| c.is_control() && c != '\t');
    if !needs_work {
        return Cow::Borrowed(message);
    }

    let stripped = escape_sequence_regex().replace_all(message, "");
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        if c.is_control() && c != '\t' {
            out.push_str(&format!("\\u{{{:x}}}", c as u32));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
