//! Turning terminal lines into outgoing command lines

/// What to do with one line typed by the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    /// Nothing worth sending
    Skip,
    /// Send the line and keep reading
    Send(String),
    /// Send the line, then stop reading input
    SendAndStop(String),
}

impl InputLine {
    /// Classifies a raw stdin line, with or without its line ending.
    pub fn classify(raw: &str) -> Self {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            InputLine::Skip
        } else if is_quit(line) {
            InputLine::SendAndStop(line.to_string())
        } else {
            InputLine::Send(line.to_string())
        }
    }
}

/// True when the line asks to leave. Matches any casing, unlike the server,
/// so the client stops reading even if the server ignores the line.
pub fn is_quit(line: &str) -> bool {
    line.as_bytes()
        .get(..4)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(b"QUIT"))
}
