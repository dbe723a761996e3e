use std::path::PathBuf;

use derw_support::name_from_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u32);

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: SourceId,
    pub path: PathBuf,
    pub contents: String,
}

impl SourceFile {
    pub fn new(id: SourceId, path: PathBuf, contents: String) -> Self {
        Self { id, path, contents }
    }

    /// Module name derived from the file name: `src/Maybe.derw` is `Maybe`.
    pub fn module_name(&self) -> String {
        let name = name_from_path(&self.path.to_string_lossy());
        if name.is_empty() {
            "Main".to_string()
        } else {
            name
        }
    }
}
