/// Whether a generated line defines a process or belongs to the main program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Definition,
    Program,
}

/// One top-level line of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub kind: LineKind,
}

impl Line {
    pub fn new(text: String, kind: LineKind) -> Self {
        Line { text, kind }
    }

    /// Classify a line of raw text: definitions carry the ` =` assignment marker.
    pub fn classify(text: &str) -> Self {
        let kind = if text.contains(" =") {
            LineKind::Definition
        } else {
            LineKind::Program
        };
        Line::new(text.to_string(), kind)
    }
}

/// Reorder newline-joined generator output so definitions come first.
pub fn canonicalize(raw: &str) -> String {
    let lines: Vec<Line> = raw
        .lines()
        .filter(|line| !line.is_empty())
        .map(Line::classify)
        .collect();
    order(&lines)
}

/// Definitions in first-seen order, each followed by a blank line, then the
/// program lines.
pub fn order(lines: &[Line]) -> String {
    let (definitions, program): (Vec<&Line>, Vec<&Line>) = lines
        .iter()
        .filter(|line| !line.text.is_empty())
        .partition(|line| line.kind == LineKind::Definition);

    let definitions: Vec<&str> = definitions.iter().map(|l| l.text.as_str()).collect();
    let program: Vec<&str> = program.iter().map(|l| l.text.as_str()).collect();

    match (definitions.is_empty(), program.is_empty()) {
        (true, _) => program.join("\n"),
        (false, true) => definitions.join("\n\n"),
        (false, false) => format!("{}\n\n{}", definitions.join("\n\n"), program.join("\n")),
    }
}
