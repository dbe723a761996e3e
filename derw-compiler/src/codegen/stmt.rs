pub(crate) const INDENT: &str = "    ";

/// Statement-level output of the ECMAScript generators. Nested bodies are
/// indented one level per `Block`/`IfElse` when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Stmt {
    /// One statement; may span several lines, each indented as a unit.
    Line(String),
    /// `header {` body `}`
    Block { header: String, body: Vec<Stmt> },
    IfElse {
        condition: String,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
}

impl Stmt {
    pub(crate) fn line(text: impl Into<String>) -> Self {
        Stmt::Line(text.into())
    }

    pub(crate) fn block(header: impl Into<String>, body: Vec<Stmt>) -> Self {
        Stmt::Block {
            header: header.into(),
            body,
        }
    }

    pub(crate) fn guarded(condition: impl AsRef<str>, body: Vec<Stmt>) -> Self {
        Stmt::block(format!("if ({})", condition.as_ref()), body)
    }
}

pub(crate) fn render(statements: &[Stmt]) -> String {
    let mut output = String::new();
    write_statements(&mut output, statements, 0);
    while output.ends_with('\n') {
        output.pop();
    }
    output
}

fn write_statements(output: &mut String, statements: &[Stmt], depth: usize) {
    for statement in statements {
        match statement {
            Stmt::Line(text) => {
                for line in text.lines() {
                    write_line(output, line, depth);
                }
            }
            Stmt::Block { header, body } => {
                write_line(output, &format!("{header} {{"), depth);
                write_statements(output, body, depth + 1);
                write_line(output, "}", depth);
            }
            Stmt::IfElse {
                condition,
                then_body,
                else_body,
            } => {
                write_line(output, &format!("if ({condition}) {{"), depth);
                write_statements(output, then_body, depth + 1);
                write_line(output, "} else {", depth);
                write_statements(output, else_body, depth + 1);
                write_line(output, "}", depth);
            }
        }
    }
}

fn write_line(output: &mut String, line: &str, depth: usize) {
    if !line.trim().is_empty() {
        for _ in 0..depth {
            output.push_str(INDENT);
        }
        output.push_str(line);
    }
    output.push('\n');
}

/// Indent every line after the first by `levels`, for multi-line text
/// spliced into the middle of a line.
pub(crate) fn indent_tail(text: &str, levels: usize) -> String {
    let prefix = INDENT.repeat(levels);
    let mut lines = text.lines();
    let mut output = lines.next().unwrap_or_default().to_string();
    for line in lines {
        output.push('\n');
        if !line.trim().is_empty() {
            output.push_str(&prefix);
            output.push_str(line);
        }
    }
    output
}
