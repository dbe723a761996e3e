use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use tracing::{debug, info};

use crate::ast::Module;
use crate::codegen::{generate_derw, generate_elm, generate_javascript, generate_typescript};
use crate::diagnostics::Diagnostics;
use crate::lexer::tokenize;
use crate::parser::parse_module;
use crate::source::SourceFile;
use crate::typechecker::check_module;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    TypeScript,
    JavaScript,
    Elm,
    Derw,
}

impl Target {
    pub fn extension(self) -> &'static str {
        match self {
            Target::TypeScript => "ts",
            Target::JavaScript => "js",
            Target::Elm => "elm",
            Target::Derw => "derw",
        }
    }

    pub fn generate(self, module: &Module) -> String {
        match self {
            Target::TypeScript => generate_typescript(module),
            Target::JavaScript => generate_javascript(module),
            Target::Elm => generate_elm(module),
            Target::Derw => generate_derw(module),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Target {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "ts" | "typescript" => Ok(Target::TypeScript),
            "js" | "javascript" => Ok(Target::JavaScript),
            "elm" => Ok(Target::Elm),
            "derw" => Ok(Target::Derw),
            other => Err(anyhow!("unknown target `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub target: Target,
    pub dump_tokens: bool,
}

#[derive(Debug)]
pub struct Compilation {
    pub module: Module,
    pub output: String,
}

/// Runs parse, check and generate over one source file, collecting
/// diagnostics along the way.
pub struct Compiler {
    diagnostics: Diagnostics,
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            options,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Parse errors fail the compilation; type problems are reported as
    /// warnings and code is still generated.
    pub fn compile(&mut self, source: &SourceFile) -> Result<Compilation> {
        let module = self.parse(source)?;

        let type_diagnostics = check_module(&module);
        self.diagnostics.extend(type_diagnostics.into_warnings());

        let output = self.options.target.generate(&module);
        info!(
            path = %source.path.display(),
            target = %self.options.target,
            bytes = output.len(),
            "compiled module"
        );
        Ok(Compilation { module, output })
    }

    /// Parse and type-check without generating code. Type problems are
    /// errors here.
    pub fn check(&mut self, source: &SourceFile) -> Result<Module> {
        let module = self.parse(source)?;

        let type_diagnostics = check_module(&module);
        let type_errors = !type_diagnostics.is_empty();
        self.diagnostics.extend(type_diagnostics);
        if type_errors {
            bail!("Type checking failed");
        }
        Ok(module)
    }

    fn parse(&mut self, source: &SourceFile) -> Result<Module> {
        if self.options.dump_tokens {
            for token in tokenize(&source.contents) {
                println!("{token:?}");
            }
        }

        let name = source.module_name();
        debug!(module = %name, path = %source.path.display(), "parsing");
        let module = parse_module(&source.contents, &name);
        if !module.errors.is_empty() {
            self.diagnostics
                .extend(Diagnostics::from(module.errors.as_slice()));
            bail!("Parsing failed");
        }
        Ok(module)
    }
}
