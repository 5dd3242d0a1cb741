//! Line-oriented input handling
//!
//! Each line read from the terminal is the text typed into the input field
//! followed by Enter.

use livechat_core::MessageId;

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Typed text, submitted with Enter
    Say(String),
    /// Delete one of your messages
    Delete(MessageId),
    Quit,
    /// A command the client does not understand
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let Some(rest) = line.strip_prefix('/') else {
        return Command::Say(line.to_string());
    };

    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    match name {
        "quit" | "q" => Command::Quit,
        "delete" | "del" => match arg.parse() {
            Ok(id) => Command::Delete(id),
            Err(_) => Command::Unknown(line.to_string()),
        },
        _ => Command::Unknown(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(parse_line("hello there"), Command::Say("hello there".into()));
        assert_eq!(parse_line("  "), Command::Say("  ".into()));
        assert_eq!(parse_line(""), Command::Say(String::new()));
    }

    #[test]
    fn test_line_endings_stripped() {
        assert_eq!(parse_line("hi\r\n"), Command::Say("hi".into()));
    }

    #[test]
    fn test_delete() {
        assert_eq!(parse_line("/delete 1700000000000"), Command::Delete(MessageId(1700000000000)));
        assert_eq!(parse_line("/del 5"), Command::Delete(MessageId(5)));
        assert_eq!(parse_line("/delete x"), Command::Unknown("/delete x".into()));
    }

    #[test]
    fn test_quit_and_unknown() {
        assert_eq!(parse_line("/quit"), Command::Quit);
        assert_eq!(parse_line("/join 2"), Command::Unknown("/join 2".into()));
    }
}
