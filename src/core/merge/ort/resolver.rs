//! Per-entry merge resolution. Walks the sorted path list in reverse and
//! resolves every still-unresolved entry by stage mask and match mask.

use std::rc::Rc;

use super::config::MergeConfig;
use super::error::MergeError;
use super::session::Session;
use super::store::MergeStore;
use super::types::{other_side, plist_sort_key, ConflictInfo, Entry, MergedInfo, VersionInfo};
use crate::core::merge::diff3;

const S_IFMT: u32 = 0o170000;

struct Disposition {
    result: VersionInfo,
    is_null: bool,
    clean: bool,
    message: Option<String>,
}

/// Resolves every unresolved entry in `session`, in reverse plist order.
pub fn resolve_all(
    session: &mut Session,
    store: &mut dyn MergeStore,
    config: &MergeConfig,
) -> Result<(), MergeError> {
    let mut items: Vec<(Rc<str>, String)> = session
        .paths
        .iter()
        .map(|(path, entry)| {
            let is_dir = match entry {
                Entry::Clean(m) => m.result.is_directory(),
                Entry::Unresolved(c) => c.dirmask != 0,
            };
            (path.clone(), plist_sort_key(path, is_dir))
        })
        .collect();
    items.sort_by(|a, b| a.1.cmp(&b.1));

    for (path, _) in items.iter().rev() {
        resolve_entry(session, store, config, path)?;
    }
    Ok(())
}

fn resolve_entry(
    session: &mut Session,
    store: &mut dyn MergeStore,
    config: &MergeConfig,
    path: &Rc<str>,
) -> Result<(), MergeError> {
    let conflict = match session.paths.get(path.as_ref()) {
        Some(Entry::Unresolved(c)) => (**c).clone(),
        _ => return Ok(()),
    };

    // Step 1: directory bookkeeping. A pure directory is left untouched for
    // the Tree writer to finalize; a directory/file clash is handled by its
    // own displacement path below.
    if conflict.dirmask != 0 {
        if conflict.filemask == 0 {
            // A pure directory never independently conflicts. Its
            // cleanliness is entirely a function of its resolved
            // descendants, which add/remove themselves from `conflicted`
            // on their own. The entry itself stays Unresolved so the Tree
            // writer can still find and fill in its ConflictInfo.
            session.conflicted.remove(path.as_ref());
            return Ok(());
        }
        return resolve_df_conflict(session, store, config, path, conflict);
    }

    let disposition = dispose(&conflict, store, config, session.call_depth)?;
    apply_disposition(session, path, conflict, disposition);
    Ok(())
}

/// Step 2's disposition table, Cases A through F. Collapses A/E/F into a
/// single match_mask-first check: since `VersionInfo::absent()` compares
/// equal to itself, "both sides absent" already registers as a match, so
/// "added on one side" (E) and "deleted on both" (F) both fall out of the
/// match_mask ∈ {3,5,6} branch without a separate filemask check.
fn dispose(
    conflict: &ConflictInfo,
    store: &mut dyn MergeStore,
    config: &MergeConfig,
    call_depth: u32,
) -> Result<Disposition, MergeError> {
    let filemask = conflict.filemask;
    let match_mask = conflict.match_mask;
    let stages = &conflict.stages;

    // Case A (subsuming E and F): two or three sides agree.
    if matches!(match_mask, 3 | 5 | 6) {
        let result = if match_mask == 6 {
            stages[1].clone()
        } else {
            stages[other_side(match_mask)].clone()
        };
        let is_null = result.mode == 0;
        return Ok(Disposition {
            is_null,
            result,
            clean: true,
            message: None,
        });
    }

    debug_assert_eq!(match_mask, 0, "only match_mask 0 remains after Case A");

    // Case D: modify/delete.
    if matches!(filemask, 3 | 5) {
        let modifying_side = if filemask & 2 != 0 { 1 } else { 2 };
        let deleting_side = if modifying_side == 1 { 2 } else { 1 };
        // In a recursive inner merge, adopt base's version instead of the
        // modifying side's to avoid cascading spurious resolutions (4.3).
        let adopt_side = if call_depth > 0 { 0 } else { modifying_side };
        let result = stages[adopt_side].clone();
        let is_null = result.is_absent();
        let message = format!(
            "CONFLICT (modify/delete): {} deleted in {} and modified in {}. Version {} of {} left in tree.",
            conflict.pathnames[0],
            config.branch_label(deleting_side),
            config.branch_label(modifying_side),
            config.branch_label(modifying_side),
            conflict.pathnames[0],
        );
        return Ok(Disposition {
            result,
            is_null,
            clean: false,
            message: Some(message),
        });
    }

    // Case B/C: both non-base sides carry a file-ish entry.
    if matches!(filemask, 6 | 7) {
        let s1 = &stages[1];
        let s2 = &stages[2];

        if (s1.mode & S_IFMT) != (s2.mode & S_IFMT) {
            let message = format!(
                "CONFLICT (file/symlink): {} - type conflict between {} and {}.",
                conflict.pathnames[0],
                config.branch_label(1),
                config.branch_label(2),
            );
            return Ok(Disposition {
                result: s1.clone(),
                is_null: false,
                clean: false,
                message: Some(message),
            });
        }

        let base_content = if filemask & 1 != 0 {
            store.load_blob(&stages[0].oid)?
        } else {
            Vec::new()
        };
        let s1_content = store.load_blob(&s1.oid)?;
        let s2_content = store.load_blob(&s2.oid)?;

        let base_text = String::from_utf8_lossy(&base_content).into_owned();
        let s1_text = String::from_utf8_lossy(&s1_content).into_owned();
        let s2_text = String::from_utf8_lossy(&s2_content).into_owned();

        let merge_result = diff3::merge(&base_text, &s1_text, &s2_text)
            .map_err(|e| MergeError::Generic(e.to_string()))?;
        let content_clean = merge_result.is_clean();
        let text = merge_result.to_string(Some(config.branch_label(1)), Some(config.branch_label(2)));
        let oid = store.store_blob(text.as_bytes())?;

        let base_mode = if filemask & 1 != 0 { Some(stages[0].mode) } else { None };
        let (mode_clean, mode) = merge_modes(base_mode, s1.mode, s2.mode);

        let clean = content_clean && mode_clean;
        let message = if clean {
            None
        } else {
            Some(format!("CONFLICT (content): Merge conflict in {}", conflict.pathnames[0]))
        };

        return Ok(Disposition {
            result: VersionInfo { mode, oid },
            is_null: false,
            clean,
            message,
        });
    }

    unreachable!(
        "filemask {} with match_mask 0 is not a defined disposition (dirmask should have been handled upstream)",
        filemask
    );
}

fn merge_modes(base_mode: Option<u32>, left_mode: u32, right_mode: u32) -> (bool, u32) {
    if base_mode == Some(left_mode) || left_mode == right_mode {
        return (true, right_mode);
    }
    if base_mode == Some(right_mode) {
        return (true, left_mode);
    }
    (false, left_mode)
}

/// Picks which side's content displaces to `<path>~<branch>` in a
/// directory/file conflict: side1 if present, else side2, else base.
fn resolve_df_file_side(filemask: u8) -> usize {
    if filemask & 2 != 0 {
        1
    } else if filemask & 4 != 0 {
        2
    } else {
        0
    }
}

fn resolve_df_conflict(
    session: &mut Session,
    store: &mut dyn MergeStore,
    config: &MergeConfig,
    path: &Rc<str>,
    conflict: ConflictInfo,
) -> Result<(), MergeError> {
    let disposition = dispose(&conflict, store, config, session.call_depth)?;

    let side = resolve_df_file_side(conflict.filemask);
    let label = config.branch_label(side).to_string();
    let displaced_path = format!("{}~{}", path, label);
    let displaced_rc = session.intern(&displaced_path);

    let df_message = format!(
        "CONFLICT (directory/file): There is a directory with name {} in {}; adding {} as {}",
        path, label, path, displaced_path,
    );
    session.append_message(path.clone(), &df_message);
    if let Some(msg) = &disposition.message {
        session.append_message(displaced_rc.clone(), msg);
    }

    let basename_offset = displaced_path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let mut displaced_conflict = conflict;
    displaced_conflict.merged = MergedInfo {
        result: disposition.result,
        is_null: disposition.is_null,
        clean: false,
        basename_offset,
        directory_name: displaced_conflict.merged.directory_name.clone(),
    };
    displaced_conflict.pathnames = [displaced_rc.clone(), displaced_rc.clone(), displaced_rc.clone()];
    displaced_conflict.dirmask = 0;
    displaced_conflict.df_conflict = false;
    displaced_conflict.path_conflict = true;

    // A df-conflict is always reported, regardless of whether the file's
    // own content resolved cleanly.
    session.record(displaced_rc, Entry::Unresolved(Box::new(displaced_conflict)));

    Ok(())
}

fn apply_disposition(session: &mut Session, path: &Rc<str>, conflict: ConflictInfo, disposition: Disposition) {
    if let Some(msg) = &disposition.message {
        session.append_message(path.clone(), msg);
    }

    if disposition.clean {
        session.conflicted.remove(path.as_ref());
        let merged = MergedInfo {
            result: disposition.result,
            is_null: disposition.is_null,
            clean: true,
            basename_offset: conflict.merged.basename_offset,
            directory_name: conflict.merged.directory_name,
        };
        session.record(path.clone(), Entry::Clean(merged));
    } else {
        let mut updated = conflict;
        updated.merged.result = disposition.result;
        updated.merged.is_null = disposition.is_null;
        updated.merged.clean = false;
        session.record(path.clone(), Entry::Unresolved(Box::new(updated)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::merge::ort::collector::collect_merge_info;
    use crate::core::merge::ort::store::fixtures::MemStore;
    use crate::core::file_mode::FileMode;

    fn config() -> MergeConfig {
        MergeConfig::new("ours".to_string(), "theirs".to_string())
    }

    #[test]
    fn two_sides_agree_resolves_clean_adopting_the_changed_side() {
        let mut store = MemStore::new();
        let base_blob = store.put_blob(b"base");
        let new_blob = store.put_blob(b"new");
        let base_tree = store.put_tree(vec![("k", FileMode::REGULAR.0, &base_blob)]);
        let side_tree = store.put_tree(vec![("k", FileMode::REGULAR.0, &new_blob)]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &side_tree, &side_tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();

        assert!(session.is_clean());
        let entry = session.paths.get("k").unwrap();
        assert!(entry.is_clean());
        assert_eq!(entry.merged().result.oid, new_blob);
    }

    #[test]
    fn modify_delete_conflict_reports_expected_message() {
        let mut store = MemStore::new();
        let h0 = store.put_blob(b"base content");
        let h1 = store.put_blob(b"modified content");
        let base_tree = store.put_tree(vec![("a", FileMode::REGULAR.0, &h0)]);
        let side1_tree = store.put_tree(vec![("a", FileMode::REGULAR.0, &h1)]);
        let side2_tree = store.put_tree(vec![]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &side1_tree, &side2_tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();

        assert!(!session.is_clean());
        assert!(session.conflicted.contains_key("a"));
        let messages = session.sorted_messages();
        let (_, msg) = messages.iter().find(|(p, _)| p.as_ref() == "a").unwrap();
        assert!(msg.contains("CONFLICT (modify/delete): a deleted in theirs and modified in ours"));
    }

    #[test]
    fn directory_file_conflict_keeps_directory_and_displaces_file() {
        let mut store = MemStore::new();
        let sub_blob = store.put_blob(b"s");
        let sub_tree = store.put_tree(vec![("sub", FileMode::REGULAR.0, &sub_blob)]);
        let file_blob = store.put_blob(b"f");

        let base_tree = store.put_tree(vec![("p", FileMode::DIRECTORY.0, &sub_tree)]);
        let side1_tree = store.put_tree(vec![("p", FileMode::REGULAR.0, &file_blob)]);
        let side2_tree = store.put_tree(vec![("p", FileMode::DIRECTORY.0, &sub_tree)]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &side1_tree, &side2_tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();

        assert!(!session.is_clean());
        // Directory stays at "p" (still unresolved, awaiting the Tree writer).
        assert!(matches!(session.paths.get("p"), Some(Entry::Unresolved(_))));
        let displaced = session.paths.get("p~ours").expect("displaced file entry");
        match displaced {
            Entry::Unresolved(c) => assert_eq!(c.merged.result.oid, file_blob),
            Entry::Clean(_) => panic!("df-conflict displacement is always recorded unresolved"),
        }
    }

    #[test]
    fn nested_clean_change_does_not_leave_parent_directory_conflicted() {
        let mut store = MemStore::new();
        let h1 = store.put_blob(b"one");
        let h2 = store.put_blob(b"two");
        let base_dir = store.put_tree(vec![("x", FileMode::REGULAR.0, &h1)]);
        let side1_dir = store.put_tree(vec![("x", FileMode::REGULAR.0, &h2)]);

        let base_tree = store.put_tree(vec![("dir", FileMode::DIRECTORY.0, &base_dir)]);
        let side1_tree = store.put_tree(vec![("dir", FileMode::DIRECTORY.0, &side1_dir)]);
        // side2 matches base exactly, so the only real change is side1's dir/x edit.
        let side2_tree = store.put_tree(vec![("dir", FileMode::DIRECTORY.0, &base_dir)]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &side1_tree, &side2_tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();

        assert!(session.is_clean(), "a cleanly-resolved nested change must not leave the parent directory conflicted");
        assert_eq!(session.paths.get("dir/x").unwrap().merged().result.oid, h2);
    }

    #[test]
    fn double_delete_resolves_clean_and_absent() {
        let mut store = MemStore::new();
        let blob = store.put_blob(b"gone");
        let base_tree = store.put_tree(vec![("x", FileMode::REGULAR.0, &blob)]);
        let empty_tree = store.put_tree(vec![]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &empty_tree, &empty_tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();

        assert!(session.is_clean());
        let entry = session.paths.get("x").unwrap();
        assert!(entry.merged().is_null);
    }
}
