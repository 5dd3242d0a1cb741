//! Text rendering of the chat window

use std::io::{self, Write};

use livechat_core::ChatView;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const PLACEHOLDER: &str = "Hey...";

/// Draw the header, message list and input line
pub fn draw<W: Write>(view: &ChatView, out: &mut W, clear: bool) -> io::Result<()> {
    if clear {
        write!(out, "{}", CLEAR_SCREEN)?;
    }

    writeln!(out, "== Live Chat ({}) ==", view.room())?;
    for row in view.rows() {
        write!(
            out,
            "[{}] {} {}: {}",
            row.side.as_str(),
            row.timestamp,
            row.author,
            row.text
        )?;
        if row.deletable {
            write!(out, "  [del {}]", row.id)?;
        }
        writeln!(out)?;
    }

    let draft = view.draft();
    let shown = if draft.is_empty() { PLACEHOLDER } else { draft.as_str() };
    write!(out, "> {} ", shown)?;
    out.flush()
}
