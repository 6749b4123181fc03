//! Assembling a multi-file project from a manifest selection.

use tokenweft_ast::build_tree;
use tokenweft_core::DocumentLoader;
use tokenweft_resolver::{FileAst, ProjectAst};

use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::permutation::collect_files;
use crate::validate::{SelectionInput, normalize_selection, validate_manifest, validate_selection};

/// Build one [`FileAst`] per collected file — unmerged — so cross-file
/// references resolve against real file identities. The multi-file
/// counterpart to the merged-document path.
pub fn load_project(
    manifest: &Manifest,
    input: &SelectionInput,
    loader: &impl DocumentLoader,
) -> Result<ProjectAst> {
    let mut issues = validate_manifest(manifest);
    issues.extend(validate_selection(manifest, input));
    if !issues.is_empty() {
        return Err(Error::validation(&issues));
    }

    let selection = normalize_selection(manifest, input);
    let mut project = ProjectAst::new();
    for path in collect_files(manifest, &selection) {
        let document = loader.read(&path).map_err(|source| {
            Box::new(Error::Load {
                path: path.clone(),
                source,
            })
        })?;
        let root = build_tree(&document).map_err(|source| {
            Box::new(Error::Build {
                id: path.clone(),
                source,
            })
        })?;
        project.insert(FileAst::new(path, root));
    }
    Ok(project)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tokenweft_ast::find_token;
    use tokenweft_core::{MemoryLoader, TokenPath};
    use tokenweft_resolver::resolve_project;

    use super::*;

    fn input(value: Value) -> SelectionInput {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object input, got {other}"),
        }
    }

    #[test]
    fn test_load_project_keeps_files_separate_and_resolvable() {
        let manifest = Manifest::from_value(json!({
            "sets": [{"values": ["base.json", "theme.json"]}]
        }))
        .unwrap();

        let mut loader = MemoryLoader::new();
        loader.insert(
            "base.json",
            input(json!({
                "color": {"$type": "color", "red": {"$value": "#f00"}}
            })),
        );
        loader.insert(
            "theme.json",
            input(json!({
                "color": {"$type": "color", "accent": {"$value": "base.json#color.red"}}
            })),
        );

        let mut project = load_project(&manifest, &input(json!({})), &loader).unwrap();
        assert_eq!(project.len(), 2);

        let errors = resolve_project(&mut project);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");

        let theme = &project.file("theme.json").unwrap().root;
        let accent = find_token(theme, &TokenPath::parse("color.accent")).unwrap();
        assert_eq!(accent.resolved_value, Some(json!("#f00")));
    }

    #[test]
    fn test_load_project_respects_modifier_selection() {
        let manifest = Manifest::from_value(json!({
            "sets": [{"values": ["base.json"]}],
            "modifiers": {
                "theme": {
                    "oneOf": ["dark"],
                    "values": {"dark": ["dark.json"]}
                }
            }
        }))
        .unwrap();

        let mut loader = MemoryLoader::new();
        loader.insert("base.json", input(json!({})));
        loader.insert("dark.json", input(json!({})));

        let project = load_project(&manifest, &input(json!({"theme": "dark"})), &loader).unwrap();
        assert!(project.file("dark.json").is_some());

        let project = load_project(&manifest, &input(json!({})), &loader).unwrap();
        assert!(project.file("dark.json").is_none());
    }

    #[test]
    fn test_load_project_surfaces_build_errors() {
        let manifest = Manifest::from_value(json!({
            "sets": [{"values": ["broken.json"]}]
        }))
        .unwrap();

        let mut loader = MemoryLoader::new();
        loader.insert("broken.json", input(json!({"orphan": {"$value": 1}})));

        let err = load_project(&manifest, &input(json!({})), &loader).unwrap_err();
        assert!(matches!(*err, Error::Build { .. }));
    }
}
