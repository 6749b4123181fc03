//! The three-phase resolution engine.
//!
//! All mutable state for one call — the memo of resolved values, the
//! currently-resolving set guarding against cycles, the set of tokens that
//! already failed, and the error sink — lives in one [`ResolveContext`]
//! value threaded through the recursive functions. Values are computed
//! against an immutable borrow of the project and written back to the trees
//! in a final apply pass.

use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;

use indexmap::IndexSet;
use serde_json::Value;
use tokenweft_ast::{GroupNode, NodeRef, TokenReference, find_node, visit_tokens};
use tokenweft_core::TokenPath;

use crate::error::ResolutionError;
use crate::file::FileAst;
use crate::project::ProjectAst;

/// One token within a project.
type TokenKey = (String, TokenPath);

#[derive(Default)]
struct ResolveContext {
    /// Memoized final values.
    resolved: HashMap<TokenKey, Value>,
    /// Tokens currently on the resolution stack; re-entering one is a cycle.
    visiting: IndexSet<TokenKey>,
    /// Tokens that already failed; looked up to avoid duplicate errors.
    failed: HashSet<TokenKey>,
    errors: Vec<ResolutionError>,
}

/// Resolve every file of a project in place.
///
/// Returns the collected errors; every token that could be resolved has its
/// `resolved_value` set regardless of failures elsewhere.
pub fn resolve_project(project: &mut ProjectAst) -> Vec<ResolutionError> {
    let mut ctx = ResolveContext::default();

    // Tokens with references, split by whether any reference leaves the
    // file. Reference-free tokens are resolved by construction.
    let mut local_only: Vec<TokenKey> = Vec::new();
    let mut cross_sources: Vec<TokenKey> = Vec::new();
    for file in project.files() {
        let _: ControlFlow<()> = visit_tokens(&file.root, &mut |token| {
            if !token.references.is_empty() {
                let key = (file.id.clone(), token.path.clone());
                if token.has_cross_file_references() {
                    cross_sources.push(key);
                } else {
                    local_only.push(key);
                }
            }
            ControlFlow::Continue(())
        });
    }

    // Phase 1: intra-file pass. Chains that touch a cross-file token defer
    // without error.
    for (file_id, path) in &local_only {
        resolve_token(project, file_id, path, false, &mut ctx);
    }

    // Phase 2: cross-file pass over every recorded edge source.
    for (file_id, path) in &cross_sources {
        resolve_token(project, file_id, path, true, &mut ctx);
    }

    // Phase 3: second intra-file pass, picking up aliases whose targets only
    // became resolvable through cross-file substitution.
    for (file_id, path) in &local_only {
        resolve_token(project, file_id, path, true, &mut ctx);
    }

    for file in project.files_mut() {
        let file_id = file.id.clone();
        apply_group(&mut file.root, &file_id, &ctx);
    }
    ctx.errors
}

/// Resolve a single tree: the one-file-project special case.
pub fn resolve_file(root: &mut GroupNode) -> Vec<ResolutionError> {
    const LOCAL_ID: &str = "";

    let taken = std::mem::take(root);
    let mut project = ProjectAst::new();
    project.insert(FileAst::new(LOCAL_ID, taken));
    let errors = resolve_project(&mut project);
    let file = project
        .remove(LOCAL_ID)
        .expect("single-file project keeps its file");
    *root = file.root;
    errors
}

/// The result of one recursive resolution step.
enum Outcome {
    Resolved(Value),
    /// Blocked on cross-file work the current phase does not allow; retried
    /// in a later phase. Not a failure and never recorded as an error.
    Deferred,
    /// Permanently unresolvable. The root cause is already in the error
    /// sink.
    Failed,
}

/// Recursively resolve the token at `path` in `file_id`.
///
/// Root-cause errors are recorded exactly once, at the token whose
/// reference failed; tokens that fail only because a dependency failed stay
/// silent.
fn resolve_token(
    project: &ProjectAst,
    file_id: &str,
    path: &TokenPath,
    allow_cross: bool,
    ctx: &mut ResolveContext,
) -> Outcome {
    let key = (file_id.to_owned(), path.clone());
    if let Some(value) = ctx.resolved.get(&key) {
        return Outcome::Resolved(value.clone());
    }
    if ctx.failed.contains(&key) {
        return Outcome::Failed;
    }

    let Some(file) = project.file(file_id) else {
        return Outcome::Failed;
    };
    let token = match find_node(&file.root, path) {
        Some(NodeRef::Token(token)) => token,
        _ => return Outcome::Failed,
    };

    if token.references.is_empty() {
        let value = token.raw_value();
        ctx.resolved.insert(key, value.clone());
        return Outcome::Resolved(value);
    }
    if !allow_cross && token.has_cross_file_references() {
        return Outcome::Deferred;
    }
    if !ctx.visiting.insert(key.clone()) {
        ctx.errors.push(ResolutionError::circular(
            path.clone(),
            format!("circular reference involving '{path}'"),
        ));
        ctx.failed.insert(key);
        return Outcome::Failed;
    }

    let mut working = token.raw_value();
    let mut deferred = false;
    let mut failed = false;
    for reference in &token.references {
        let target_value = match reference {
            TokenReference::Alias { path: target } => {
                resolve_alias(project, file_id, token, target, allow_cross, ctx)
            }
            TokenReference::CrossFile {
                file: target_file,
                path: target,
                literal,
            } => resolve_cross_file(project, token, target_file, target, literal, ctx),
        };
        match target_value {
            Outcome::Resolved(value) => {
                working = substitute(working, &reference.literal(), &value);
            }
            Outcome::Deferred => deferred = true,
            Outcome::Failed => failed = true,
        }
    }

    ctx.visiting.shift_remove(&key);
    if failed {
        ctx.failed.insert(key);
        Outcome::Failed
    } else if deferred {
        Outcome::Deferred
    } else {
        ctx.resolved.insert(key, working.clone());
        Outcome::Resolved(working)
    }
}

fn resolve_alias(
    project: &ProjectAst,
    file_id: &str,
    source: &tokenweft_ast::TokenNode,
    target: &TokenPath,
    allow_cross: bool,
    ctx: &mut ResolveContext,
) -> Outcome {
    let Some(file) = project.file(file_id) else {
        return Outcome::Failed;
    };
    match find_node(&file.root, target) {
        Some(NodeRef::Token(_)) => resolve_token(project, file_id, target, allow_cross, ctx),
        Some(NodeRef::Group(_)) => {
            ctx.errors.push(ResolutionError::invalid(
                source.path.clone(),
                format!("{{{target}}}"),
                format!("references '{target}', which is a group, not a token"),
            ));
            Outcome::Failed
        }
        None => {
            ctx.errors.push(ResolutionError::missing(
                source.path.clone(),
                format!("{{{target}}}"),
                format!("references unknown token '{target}'"),
            ));
            Outcome::Failed
        }
    }
}

fn resolve_cross_file(
    project: &ProjectAst,
    source: &tokenweft_ast::TokenNode,
    target_file: &str,
    target: &TokenPath,
    literal: &str,
    ctx: &mut ResolveContext,
) -> Outcome {
    let Some(file) = project.file(target_file) else {
        ctx.errors.push(ResolutionError::cross_file(
            source.path.clone(),
            target_file,
            literal,
            format!("references unknown file '{target_file}'"),
        ));
        return Outcome::Failed;
    };
    match find_node(&file.root, target) {
        Some(NodeRef::Token(_)) => resolve_token(project, target_file, target, true, ctx),
        Some(NodeRef::Group(_)) => {
            ctx.errors.push(ResolutionError::cross_file(
                source.path.clone(),
                target_file,
                literal,
                format!("'{target}' in '{target_file}' is a group, not a token"),
            ));
            Outcome::Failed
        }
        None => {
            ctx.errors.push(ResolutionError::cross_file(
                source.path.clone(),
                target_file,
                literal,
                format!("token '{target}' not found in '{target_file}'"),
            ));
            Outcome::Failed
        }
    }
}

/// Substitute one resolved reference into a working value.
///
/// A value that *is* the literal is replaced wholesale; a literal embedded
/// in a longer string is replaced textually; arrays and objects are walked
/// so matching elements and properties are replaced wherever they sit.
fn substitute(working: Value, literal: &str, replacement: &Value) -> Value {
    match working {
        Value::String(s) => {
            if s == literal {
                replacement.clone()
            } else if s.contains(literal) {
                Value::String(s.replace(literal, &render_inline(replacement)))
            } else {
                Value::String(s)
            }
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| substitute(item, literal, replacement))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, substitute(value, literal, replacement)))
                .collect(),
        ),
        other => other,
    }
}

/// Render a replacement for textual splicing into a longer string.
fn render_inline(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply_group(group: &mut GroupNode, file_id: &str, ctx: &ResolveContext) {
    for token in group.tokens_mut() {
        if token.resolved {
            continue;
        }
        let key = (file_id.to_owned(), token.path.clone());
        if let Some(value) = ctx.resolved.get(&key) {
            token.mark_resolved(value.clone());
        }
    }
    for subgroup in group.groups_mut() {
        apply_group(subgroup, file_id, ctx);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokenweft_ast::{build_tree, find_token};
    use tokenweft_core::document_from_value;

    use super::*;
    use crate::error::ResolutionErrorKind;

    fn tree(value: serde_json::Value) -> GroupNode {
        build_tree(&document_from_value(value).unwrap()).unwrap()
    }

    fn resolved_value(root: &GroupNode, path: &str) -> Value {
        let token = find_token(root, &TokenPath::parse(path)).unwrap();
        assert!(token.resolved, "'{path}' should be resolved");
        token.resolved_value.clone().unwrap()
    }

    #[test]
    fn test_local_alias_chain_resolves() {
        let mut root = tree(json!({
            "color": {
                "$type": "color",
                "base": {"$value": "#000000"},
                "link": {"$value": "{color.base}"},
                "hover": {"$value": "{color.link}"}
            }
        }));

        let errors = resolve_file(&mut root);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(resolved_value(&root, "color.link"), json!("#000000"));
        assert_eq!(resolved_value(&root, "color.hover"), json!("#000000"));
    }

    #[test]
    fn test_embedded_alias_substitutes_textually() {
        let mut root = tree(json!({
            "color": {"$type": "color", "border": {"$value": "#ccc"}},
            "border": {
                "$type": "border",
                "thin": {"$value": "1px solid {color.border}"}
            }
        }));

        let errors = resolve_file(&mut root);
        assert!(errors.is_empty());
        assert_eq!(resolved_value(&root, "border.thin"), json!("1px solid #ccc"));
    }

    #[test]
    fn test_substitution_inside_arrays_and_objects() {
        let mut root = tree(json!({
            "color": {"$type": "color", "base": {"$value": "#000"}},
            "shadow": {
                "$type": "shadow",
                "card": {"$value": {
                    "color": "{color.base}",
                    "offsets": ["{color.base}", "2px"]
                }}
            }
        }));

        let errors = resolve_file(&mut root);
        assert!(errors.is_empty());
        assert_eq!(
            resolved_value(&root, "shadow.card"),
            json!({"color": "#000", "offsets": ["#000", "2px"]})
        );
    }

    #[test]
    fn test_missing_target_is_collected_not_thrown() {
        let mut root = tree(json!({
            "ok": {"$type": "number", "$value": 1},
            "broken": {"$type": "number", "$value": "{nowhere}"}
        }));

        let errors = resolve_file(&mut root);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ResolutionErrorKind::Missing);
        assert_eq!(errors[0].path.to_string(), "broken");
        assert_eq!(errors[0].reference.as_deref(), Some("{nowhere}"));

        // Everything else still resolved.
        assert_eq!(resolved_value(&root, "ok"), json!(1));
        assert!(!find_token(&root, &TokenPath::parse("broken")).unwrap().resolved);
    }

    #[test]
    fn test_alias_to_group_is_invalid() {
        let mut root = tree(json!({
            "color": {
                "$type": "color",
                "base": {"$value": "#000"}
            },
            "odd": {"$type": "color", "$value": "{color}"}
        }));

        let errors = resolve_file(&mut root);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ResolutionErrorKind::Invalid);
        assert_eq!(errors[0].path.to_string(), "odd");
    }

    #[test]
    fn test_two_token_cycle_terminates_with_one_error() {
        let mut root = tree(json!({
            "a": {"$type": "number", "$value": "{b}"},
            "b": {"$type": "number", "$value": "{a}"}
        }));

        let errors = resolve_file(&mut root);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ResolutionErrorKind::Circular);
        let at = errors[0].path.to_string();
        assert!(at == "a" || at == "b", "cycle reported at '{at}'");
    }

    #[test]
    fn test_self_reference_is_circular() {
        let mut root = tree(json!({
            "selfish": {"$type": "number", "$value": "{selfish}"}
        }));

        let errors = resolve_file(&mut root);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ResolutionErrorKind::Circular);
        assert_eq!(errors[0].path.to_string(), "selfish");
    }

    #[test]
    fn test_cycle_does_not_abort_other_tokens() {
        let mut root = tree(json!({
            "a": {"$type": "number", "$value": "{b}"},
            "b": {"$type": "number", "$value": "{a}"},
            "base": {"$type": "number", "$value": 7},
            "fine": {"$type": "number", "$value": "{base}"}
        }));

        let errors = resolve_file(&mut root);
        assert_eq!(errors.len(), 1);
        assert_eq!(resolved_value(&root, "fine"), json!(7));
    }

    fn two_file_project() -> ProjectAst {
        let mut project = ProjectAst::new();
        project.insert(FileAst::new(
            "theme.json",
            tree(json!({
                "color": {
                    "$type": "color",
                    "accent": {"$value": "base.json#color.red"},
                    "emphasis": {"$value": "{color.accent}"}
                }
            })),
        ));
        project.insert(FileAst::new(
            "base.json",
            tree(json!({
                "color": {
                    "$type": "color",
                    "crimson": {"$value": "#dc143c"},
                    "red": {"$value": "{color.crimson}"}
                }
            })),
        ));
        project
    }

    #[test]
    fn test_cross_file_reference_resolves_through_target_chain() {
        let mut project = two_file_project();
        let errors = resolve_project(&mut project);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");

        let theme = &project.file("theme.json").unwrap().root;
        assert_eq!(resolved_value(theme, "color.accent"), json!("#dc143c"));
    }

    #[test]
    fn test_local_alias_to_cross_file_token_resolves_in_second_pass() {
        let mut project = two_file_project();
        let errors = resolve_project(&mut project);
        assert!(errors.is_empty());

        // `emphasis` is a local alias whose target only resolves once the
        // cross-file value for `accent` has landed.
        let theme = &project.file("theme.json").unwrap().root;
        assert_eq!(resolved_value(theme, "color.emphasis"), json!("#dc143c"));
    }

    #[test]
    fn test_unknown_file_is_a_cross_file_error() {
        let mut project = ProjectAst::new();
        project.insert(FileAst::new(
            "theme.json",
            tree(json!({
                "color": {
                    "$type": "color",
                    "accent": {"$value": "missing.json#color.red"}
                }
            })),
        ));

        let errors = resolve_project(&mut project);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ResolutionErrorKind::CrossFile);
        assert_eq!(errors[0].file.as_deref(), Some("missing.json"));
        assert_eq!(errors[0].path.to_string(), "color.accent");
    }

    #[test]
    fn test_unknown_cross_file_token_is_a_cross_file_error() {
        let mut project = ProjectAst::new();
        project.insert(FileAst::new(
            "theme.json",
            tree(json!({
                "color": {
                    "$type": "color",
                    "accent": {"$value": "base.json#color.orange"}
                }
            })),
        ));
        project.insert(FileAst::new(
            "base.json",
            tree(json!({
                "color": {"$type": "color", "red": {"$value": "#f00"}}
            })),
        ));

        let errors = resolve_project(&mut project);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ResolutionErrorKind::CrossFile);
        assert!(errors[0].message.contains("color.orange"));
    }

    #[test]
    fn test_cross_file_cycle_terminates() {
        let mut project = ProjectAst::new();
        project.insert(FileAst::new(
            "a.json",
            tree(json!({
                "x": {"$type": "number", "$value": "b.json#y"}
            })),
        ));
        project.insert(FileAst::new(
            "b.json",
            tree(json!({
                "y": {"$type": "number", "$value": "a.json#x"}
            })),
        ));

        let errors = resolve_project(&mut project);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ResolutionErrorKind::Circular);
    }

    #[test]
    fn test_reference_free_tokens_untouched_by_engine() {
        let mut root = tree(json!({
            "n": {"$type": "number", "$value": 4}
        }));
        let errors = resolve_file(&mut root);
        assert!(errors.is_empty());
        assert_eq!(resolved_value(&root, "n"), json!(4));
    }

    #[test]
    fn test_numeric_replacement_spliced_into_string() {
        let mut root = tree(json!({
            "scale": {"$type": "number", "$value": 2},
            "expr": {"$type": "number", "$value": "calc(4 * {scale})"}
        }));

        let errors = resolve_file(&mut root);
        assert!(errors.is_empty());
        assert_eq!(resolved_value(&root, "expr"), json!("calc(4 * 2)"));
    }
}
