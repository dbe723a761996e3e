use super::ecma::EcmaGenerator;
use super::stmt::Stmt;
use crate::ast::*;

impl EcmaGenerator {
    /// Evaluate the predicate once into a temporary, then switch on the
    /// value itself, its length or its tag depending on the patterns used.
    pub(super) fn case_statement(&mut self, statement: &CaseStatement) -> Vec<Stmt> {
        let predicate = self.expression(&statement.predicate);
        let name = self.temps.name_for(&predicate);

        let patterns = || statement.branches.iter().map(|branch| &branch.pattern);
        let discriminant = if patterns()
            .any(|pattern| matches!(pattern, Pattern::StringValue(_) | Pattern::FormatStringValue(_)))
        {
            name.clone()
        } else if patterns()
            .any(|pattern| matches!(pattern, Pattern::EmptyList | Pattern::ListDestructure(_)))
        {
            format!("{name}.length")
        } else {
            format!("{name}.kind")
        };

        let branches = statement
            .branches
            .iter()
            .map(|branch| self.branch(&name, branch))
            .collect();

        vec![
            Stmt::line(format!("const {name} = {predicate};")),
            Stmt::block(format!("switch ({discriminant})"), branches),
        ]
    }

    fn branch(&mut self, name: &str, branch: &Branch) -> Stmt {
        let body = self.body_statements(&branch.let_body, &branch.body);

        match &branch.pattern {
            Pattern::Destructure(destructure) => {
                let mut statements = field_bindings(destructure, name);
                statements.extend(body);
                Stmt::block(format!("case \"{}\":", destructure.constructor), statements)
            }
            Pattern::StringValue(string) => Stmt::block(format!("case \"{}\":", string.body), body),
            Pattern::FormatStringValue(string) => {
                Stmt::block(format!("case `{}`:", string.body), body)
            }
            // Earlier list branches fall through to here when their guard fails.
            Pattern::EmptyList => Stmt::block(
                "case 0:",
                vec![Stmt::guarded(format!("{name}.length === 0"), body)],
            ),
            Pattern::ListDestructure(pattern) => Stmt::block(
                format!("case {name}.length:"),
                self.list_destructure(name, pattern, body),
            ),
            Pattern::Default => Stmt::block("default:", body),
        }
    }

    fn list_destructure(&self, name: &str, pattern: &ListDestructure, body: Vec<Stmt>) -> Vec<Stmt> {
        let parts = &pattern.parts;
        let gaps = gap_positions(parts);
        let ends_in_empty_list = matches!(parts.last(), Some(ListDestructurePart::EmptyList));

        let comparison = if ends_in_empty_list && gaps.is_empty() {
            "==="
        } else {
            ">="
        };
        let only_final_gap = gaps.len() == 1 && gaps[0] + 1 == parts.len();

        let inner = if gaps.is_empty() || only_final_gap {
            positional(name, parts, body)
        } else {
            self.sequential(parts, 0, name, body)
        };

        vec![Stmt::guarded(
            format!("{name}.length {comparison} {}", required_length(parts)),
            inner,
        )]
    }

    /// Walk the parts left to right, peeling elements off `remainder`.
    /// A gap followed by an anchor scans forward for the anchor and binds
    /// the span before it; the branch body ends up innermost.
    fn sequential(
        &self,
        parts: &[ListDestructurePart],
        index: usize,
        remainder: &str,
        body: Vec<Stmt>,
    ) -> Vec<Stmt> {
        let Some(part) = parts.get(index) else {
            return body;
        };
        let is_last = index + 1 == parts.len();

        match part {
            ListDestructurePart::EmptyList => {
                return vec![Stmt::guarded(format!("{remainder}.length === 0"), body)];
            }
            ListDestructurePart::Value(value) if is_last => {
                let mut statements = vec![Stmt::line(format!(
                    "const {} = {remainder};",
                    value.body
                ))];
                statements.extend(body);
                return statements;
            }
            ListDestructurePart::Value(gap) if index > 0 => {
                let anchor_index = index + 1;
                let candidate = format!("{remainder}[_i{anchor_index}]");
                if let Some(anchor) = parts.get(anchor_index) {
                    if let Some(test) = element_test(anchor, &candidate) {
                        return self.gap_search(parts, anchor_index, gap, &test, remainder, body);
                    }
                }
            }
            _ => {}
        }

        let element = match part {
            ListDestructurePart::Value(value) => value.body.clone(),
            _ => format!("_{index}"),
        };
        let rest = format!("_rest{index}");

        let mut statements = vec![if is_last {
            Stmt::line(format!("const [ {element} ] = {remainder};"))
        } else {
            Stmt::line(format!("const [ {element}, ...{rest} ] = {remainder};"))
        }];

        let next = self.sequential(parts, index + 1, &rest, body);
        match element_test(part, &element) {
            Some(test) => {
                let mut matched = part_bindings(part, &element);
                matched.extend(next);
                statements.push(Stmt::guarded(test, matched));
            }
            None => statements.extend(next),
        }

        if index == 0 {
            statements
        } else {
            vec![Stmt::guarded(format!("{remainder}.length > 0"), statements)]
        }
    }

    fn gap_search(
        &self,
        parts: &[ListDestructurePart],
        anchor_index: usize,
        gap: &Value,
        test: &str,
        remainder: &str,
        body: Vec<Stmt>,
    ) -> Vec<Stmt> {
        let found = format!("_foundIndex{anchor_index}");
        let cursor = format!("_i{anchor_index}");
        let element = format!("_{anchor_index}");
        let rest = format!("_rest{anchor_index}");

        let declaration = if self.typed {
            format!("let {found}: number = -1;")
        } else {
            format!("let {found} = -1;")
        };

        let mut matched = vec![Stmt::line(format!(
            "const {} = {remainder}.slice(0, {found});",
            gap.body
        ))];
        if let Some(anchor) = parts.get(anchor_index) {
            let bindings = part_bindings(anchor, &element);
            if !bindings.is_empty() {
                matched.push(Stmt::line(format!("const {element} = {remainder}[{found}];")));
                matched.extend(bindings);
            }
        }
        if anchor_index + 1 < parts.len() {
            matched.push(Stmt::line(format!(
                "const {rest} = {remainder}.slice({found} + 1);"
            )));
        }
        matched.extend(self.sequential(parts, anchor_index + 1, &rest, body));

        vec![
            Stmt::line(declaration),
            Stmt::block(
                format!("for (let {cursor} = 0; {cursor} < {remainder}.length; {cursor}++)"),
                vec![Stmt::guarded(
                    test,
                    vec![
                        Stmt::line(format!("{found} = {cursor};")),
                        Stmt::line("break;"),
                    ],
                )],
            ),
            Stmt::guarded(format!("{found} > -1"), matched),
        ]
    }
}

/// Destructure a list whose only variable-length part, if any, is the tail.
fn positional(name: &str, parts: &[ListDestructurePart], body: Vec<Stmt>) -> Vec<Stmt> {
    let Some((last, elements)) = parts.split_last() else {
        return body;
    };

    let mut names = Vec::new();
    let mut guards = Vec::new();
    let mut bindings = Vec::new();
    let mut element = |index: usize, part: &ListDestructurePart| {
        let element = match part {
            ListDestructurePart::Value(value) => value.body.clone(),
            _ => format!("_{index}"),
        };
        if let Some(test) = element_test(part, &element) {
            guards.push(test);
        }
        bindings.extend(part_bindings(part, &element));
        element
    };

    for (index, part) in elements.iter().enumerate() {
        names.push(element(index, part));
    }
    match last {
        ListDestructurePart::EmptyList => {}
        ListDestructurePart::Value(value) => names.push(format!("...{}", value.body)),
        anchor => names.push(element(elements.len(), anchor)),
    }

    let mut statements = Vec::new();
    if !names.is_empty() {
        statements.push(Stmt::line(format!("const [ {} ] = {name};", names.join(", "))));
    }
    bindings.extend(body);
    if guards.is_empty() {
        statements.extend(bindings);
    } else {
        statements.push(Stmt::guarded(guards.join(" && "), bindings));
    }
    statements
}

/// Elements a list must have for the pattern to match: every anchor, plus
/// the head when it is a plain name.
fn required_length(parts: &[ListDestructurePart]) -> usize {
    parts
        .iter()
        .enumerate()
        .filter(|(index, part)| match part {
            ListDestructurePart::Destructure(_)
            | ListDestructurePart::StringValue(_)
            | ListDestructurePart::FormatStringValue(_) => true,
            ListDestructurePart::Value(_) => *index == 0,
            ListDestructurePart::EmptyList => false,
        })
        .count()
}

/// Names after the head stand for a run of elements.
fn gap_positions(parts: &[ListDestructurePart]) -> Vec<usize> {
    parts
        .iter()
        .enumerate()
        .filter(|(index, part)| *index > 0 && matches!(part, ListDestructurePart::Value(_)))
        .map(|(index, _)| index)
        .collect()
}

/// The check an element must pass to match `part`; names match anything.
fn element_test(part: &ListDestructurePart, subject: &str) -> Option<String> {
    match part {
        ListDestructurePart::Destructure(destructure) => {
            Some(format!("{subject}.kind === \"{}\"", destructure.constructor))
        }
        ListDestructurePart::StringValue(string) => {
            Some(format!("{subject} === \"{}\"", string.body))
        }
        ListDestructurePart::FormatStringValue(string) => {
            Some(format!("{subject} === `{}`", string.body))
        }
        ListDestructurePart::Value(_) | ListDestructurePart::EmptyList => None,
    }
}

fn part_bindings(part: &ListDestructurePart, subject: &str) -> Vec<Stmt> {
    match part {
        ListDestructurePart::Destructure(destructure) => field_bindings(destructure, subject),
        _ => Vec::new(),
    }
}

fn field_bindings(destructure: &Destructure, subject: &str) -> Vec<Stmt> {
    if destructure.fields.is_empty() {
        Vec::new()
    } else {
        vec![Stmt::line(format!(
            "const {{ {} }} = {subject};",
            destructure.fields.join(", ")
        ))]
    }
}
