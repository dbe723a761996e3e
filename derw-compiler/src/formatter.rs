use anyhow::{bail, Result};

use crate::codegen::DerwPrinter;
use crate::parser::parse;

/// Format Derw source code in the canonical layout.
///
/// Blocks are separated by one blank line (consecutive imports by none),
/// bodies are indented by four spaces and every `if`/`case` branch sits on
/// its own line. Comments between top-level blocks are kept; comments inside
/// a definition are not. Formatting is idempotent: formatting the output
/// again returns it unchanged.
pub fn format_source(input: &str) -> Result<String> {
    let module = parse(input);
    if let Some(error) = module.errors.first() {
        bail!(
            "cannot format source with {} parse error(s); first: {error}",
            module.errors.len()
        );
    }

    let mut output = DerwPrinter::new().module(&module);
    if !output.is_empty() {
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_formats_to_nothing() {
        assert_eq!(format_source("").unwrap(), "");
        assert_eq!(format_source("\n\n   \n").unwrap(), "");
    }

    #[test]
    fn parse_errors_are_refused() {
        let error = format_source("x = = 1").unwrap_err();
        assert!(error.to_string().contains("parse error"));
    }
}
