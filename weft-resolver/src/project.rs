//! A collection of built files resolved together.

use indexmap::{IndexMap, IndexSet};

use crate::file::FileAst;

/// All files taking part in one resolution, keyed by file identity.
///
/// Built fresh per resolution call; nothing is shared across independent
/// resolutions.
#[derive(Debug, Clone, Default)]
pub struct ProjectAst {
    files: IndexMap<String, FileAst>,
}

impl ProjectAst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, keyed by its id. Replaces any previous file with the same
    /// id.
    pub fn insert(&mut self, file: FileAst) {
        self.files.insert(file.id.clone(), file);
    }

    pub fn file(&self, id: &str) -> Option<&FileAst> {
        self.files.get(id)
    }

    pub fn file_mut(&mut self, id: &str) -> Option<&mut FileAst> {
        self.files.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<FileAst> {
        self.files.shift_remove(id)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileAst> {
        self.files.values()
    }

    pub fn files_mut(&mut self) -> impl Iterator<Item = &mut FileAst> {
        self.files.values_mut()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The file-level dependency graph: each file mapped to the set of files
    /// its tokens reference, in insertion order.
    pub fn dependency_graph(&self) -> IndexMap<&str, IndexSet<&str>> {
        self.files
            .values()
            .map(|file| (file.id.as_str(), file.dependencies()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokenweft_ast::build_tree;
    use tokenweft_core::document_from_value;

    use super::*;

    fn file(id: &str, value: serde_json::Value) -> FileAst {
        FileAst::new(
            id,
            build_tree(&document_from_value(value).unwrap()).unwrap(),
        )
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut project = ProjectAst::new();
        project.insert(file("a.json", json!({})));
        project.insert(file("b.json", json!({})));

        assert_eq!(project.len(), 2);
        assert!(project.file("a.json").is_some());
        assert!(project.file("c.json").is_none());
    }

    #[test]
    fn test_dependency_graph() {
        let mut project = ProjectAst::new();
        project.insert(file(
            "theme.json",
            json!({
                "color": {
                    "$type": "color",
                    "accent": {"$value": "base.json#color.red"}
                }
            }),
        ));
        project.insert(file(
            "base.json",
            json!({
                "color": {
                    "$type": "color",
                    "red": {"$value": "#f00"}
                }
            }),
        ));

        let graph = project.dependency_graph();
        assert_eq!(
            graph["theme.json"].iter().copied().collect::<Vec<_>>(),
            vec!["base.json"]
        );
        assert!(graph["base.json"].is_empty());
    }
}
