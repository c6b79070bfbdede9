//! Recursive multi-ancestor reduction and the two top-level entry points.
//! `merge_trees` is the non-recursive entry point that merges three
//! already-resolved trees; `merge_commits` is the recursive entry point
//! that first reduces a set of ancestor commits to a single merge base
//! before delegating to the same tree-level pipeline.

use std::rc::Rc;

use super::collector;
use super::config::MergeConfig;
use super::error::MergeError;
use super::rename;
use super::resolver;
use super::session::Session;
use super::store::MergeStore;
use super::tree_writer;
use crate::core::database::author::Author;
use crate::core::database::commit::Commit;
use crate::core::database::database::Database;
use crate::core::merge::bases::Bases;

pub struct MergeResult {
    pub tree_oid: String,
    pub clean: bool,
    pub session: Session,
}

/// Runs Collector → Rename → Resolver → Tree writer once against `session`,
/// which the caller may be reusing across several inner invocations.
fn run_pipeline(
    session: &mut Session,
    store: &mut dyn MergeStore,
    base_oid: &str,
    side1_oid: &str,
    side2_oid: &str,
    config: &MergeConfig,
) -> Result<(String, bool), MergeError> {
    collector::collect_merge_info(session, store, base_oid, side1_oid, side2_oid)?;
    let rename_clean = rename::detect_renames(session);
    resolver::resolve_all(session, store, config)?;
    let tree_oid = tree_writer::write_trees(session, store)?;
    Ok((tree_oid, rename_clean && session.is_clean()))
}

/// Non-recursive entry point: merges three trees directly, with no
/// ancestor reduction. This is what the recursive driver eventually
/// calls once it has a single merge base, and it is also the entry point a
/// caller who already knows its three trees (rather than commits) should use.
pub fn merge_trees(
    store: &mut dyn MergeStore,
    base_oid: &str,
    side1_oid: &str,
    side2_oid: &str,
    config: &MergeConfig,
) -> Result<MergeResult, MergeError> {
    let mut session = Session::new();
    let (tree_oid, clean) = run_pipeline(&mut session, store, base_oid, side1_oid, side2_oid, config)?;
    Ok(MergeResult { tree_oid, clean, session })
}

fn commit_tree(database: &mut Database, oid: &str) -> Result<String, MergeError> {
    let obj = database.load(oid)?;
    let commit = obj
        .as_any()
        .downcast_ref::<Commit>()
        .ok_or_else(|| MergeError::Generic(format!("{} is not a commit", oid)))?;
    Ok(commit.get_tree().to_string())
}

/// The author recorded on virtual merge-base commits. These commits exist
/// only to let the existing commit-parent graph walk (`Bases`/
/// `CommonAncestors`) discover ancestors of a reduced merge base; no ref
/// ever points at them, so they stay unreachable by any branch or tag.
fn virtual_author() -> Author {
    Author::new("ort-merge-base".to_string(), "ort-merge-base@localhost".to_string())
}

/// Reduces `ancestors` to a single tree, returning that tree's oid and the
/// label used for message rendering. Recurses through
/// `merge_commits_in_session` when more than one ancestor remains to be
/// folded in, exactly as a nested criss-cross merge would.
fn reduce_ancestors(
    database: &mut Database,
    session: &mut Session,
    ancestors: &[String],
    config: &mut MergeConfig,
) -> Result<(String, String), MergeError> {
    match ancestors.len() {
        0 => {
            let tree = database.store_tree(&[])?;
            Ok((tree, "empty tree".to_string()))
        }
        1 => {
            let tree = commit_tree(database, &ancestors[0])?;
            Ok((tree, database.short_oid(&ancestors[0])))
        }
        _ => {
            let mut iter = ancestors.iter();
            let mut merged_base_oid = iter.next().expect("len > 1").clone();

            let saved_branch1 = config.branch1.clone();
            let saved_branch2 = config.branch2.clone();

            for a in iter {
                session.call_depth += 1;
                config.branch1 = "Temporary merge branch 1".to_string();
                config.branch2 = "Temporary merge branch 2".to_string();

                let inner_ancestors = {
                    let mut bases = Bases::new(database)?;
                    bases.find(&merged_base_oid, a)?
                };
                let (inner_tree, _) = merge_commits_in_session(
                    database,
                    session,
                    &inner_ancestors,
                    &merged_base_oid,
                    a,
                    config,
                )?;

                let mut virtual_commit = Commit::new_with_parents(
                    vec![merged_base_oid.clone(), a.clone()],
                    inner_tree,
                    virtual_author(),
                    "virtual merge base".to_string(),
                );
                database.store(&mut virtual_commit)?;
                merged_base_oid = virtual_commit
                    .get_oid()
                    .cloned()
                    .expect("oid set immediately after store");

                config.branch1 = saved_branch1.clone();
                config.branch2 = saved_branch2.clone();
                session.partial_reset();
                session.call_depth -= 1;
            }

            let tree = commit_tree(database, &merged_base_oid)?;
            Ok((tree, "merged common ancestors".to_string()))
        }
    }
}

/// Shared body of the recursive driver, reusing one `Session` across the
/// ancestor-reduction sub-merges and the final merge: the session is
/// partially reset between inner invocations while the session object
/// itself stays alive.
fn merge_commits_in_session(
    database: &mut Database,
    session: &mut Session,
    ancestors: &[String],
    side1_oid: &str,
    side2_oid: &str,
    config: &mut MergeConfig,
) -> Result<(String, bool), MergeError> {
    let (merged_base_tree, label) = reduce_ancestors(database, session, ancestors, config)?;
    session.ancestor_label = label;
    session.partial_reset();

    let side1_tree = commit_tree(database, side1_oid)?;
    let side2_tree = commit_tree(database, side2_oid)?;

    run_pipeline(session, database, &merged_base_tree, &side1_tree, &side2_tree, config)
}

/// Recursive entry point: reduces `ancestors` (the set of merge bases
/// between `side1_oid` and `side2_oid`, possibly empty or containing more
/// than one commit) to a single tree, then merges the two head commits
/// against it.
pub fn merge_commits(
    database: &mut Database,
    ancestors: &[String],
    side1_oid: &str,
    side2_oid: &str,
    config: &mut MergeConfig,
) -> Result<MergeResult, MergeError> {
    let mut session = Session::new();
    let (tree_oid, clean) =
        merge_commits_in_session(database, &mut session, ancestors, side1_oid, side2_oid, config)?;
    Ok(MergeResult { tree_oid, clean, session })
}

/// Renders a conflict's accumulated messages in sorted path order, for
/// callers that want plain text rather than per-path pairs.
pub fn render_messages(result: &MergeResult) -> Vec<(Rc<str>, String)> {
    result.session.sorted_messages()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_mode::FileMode;
    use crate::core::merge::ort::store::fixtures::MemStore;

    fn config() -> MergeConfig {
        MergeConfig::new("ours".to_string(), "theirs".to_string())
    }

    #[test]
    fn merge_trees_resolves_two_side_agreement_cleanly() {
        let mut store = MemStore::new();
        let base_blob = store.put_blob(b"base");
        let new_blob = store.put_blob(b"new");
        let base_tree = store.put_tree(vec![("k", FileMode::REGULAR.0, &base_blob)]);
        let side_tree = store.put_tree(vec![("k", FileMode::REGULAR.0, &new_blob)]);

        let result = merge_trees(&mut store, &base_tree, &side_tree, &side_tree, &config()).unwrap();

        assert!(result.clean);
        let children = store.load_tree_children(&result.tree_oid).unwrap();
        let (_, oid) = children.get("k").unwrap();
        assert_eq!(oid, new_blob);
    }

    #[test]
    fn merge_trees_reports_modify_delete_conflict_uncleanly() {
        let mut store = MemStore::new();
        let h0 = store.put_blob(b"base content");
        let h1 = store.put_blob(b"modified content");
        let base_tree = store.put_tree(vec![("a", FileMode::REGULAR.0, &h0)]);
        let side1_tree = store.put_tree(vec![("a", FileMode::REGULAR.0, &h1)]);
        let side2_tree = store.put_tree(vec![]);

        let result = merge_trees(&mut store, &base_tree, &side1_tree, &side2_tree, &config()).unwrap();

        assert!(!result.clean);
        assert!(result.session.conflicted.contains_key("a"));
    }
}
