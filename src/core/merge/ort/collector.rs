//! Synchronized three-tree walk. Drives the store via `MergeStore` and
//! populates `Session::paths` with one entry per path seen in any of the
//! three trees.

use std::collections::BTreeSet;

use super::error::MergeError;
use super::session::Session;
use super::store::{MergeStore, TreeChildren};
use super::types::{ConflictInfo, Entry, MergedInfo, VersionInfo};
use crate::core::file_mode::FileMode;

/// Walks (base, side1, side2) from the root and populates `session.paths`.
pub fn collect_merge_info(
    session: &mut Session,
    store: &mut dyn MergeStore,
    base_oid: &str,
    side1_oid: &str,
    side2_oid: &str,
) -> Result<(), MergeError> {
    let run = || -> Result<(), MergeError> {
        let base_children = store.load_tree_children(base_oid)?;
        let side1_children = store.load_tree_children(side1_oid)?;
        let side2_children = store.load_tree_children(side2_oid)?;
        collect_directory(
            session,
            store,
            "",
            &base_children,
            &side1_children,
            &side2_children,
        )
    };

    run().map_err(|_| MergeError::CollectMergeInfo {
        base: base_oid.to_string(),
        side1: side1_oid.to_string(),
        side2: side2_oid.to_string(),
    })
}

fn version_of(child: Option<(u32, String)>) -> VersionInfo {
    match child {
        Some((mode, oid)) => VersionInfo { mode, oid },
        None => VersionInfo::absent(),
    }
}

/// Bit i set iff side i's (mode, oid) pair agrees with the partner named in
/// the 7&~match_mask complement.
fn compute_match_mask(base: &VersionInfo, side1: &VersionInfo, side2: &VersionInfo) -> u8 {
    let base_eq_1 = base == side1;
    let base_eq_2 = base == side2;
    let side1_eq_2 = side1 == side2;

    if base_eq_1 && base_eq_2 {
        return 7;
    }
    let mut mask = 0u8;
    if base_eq_1 {
        mask |= 1 | 2;
    }
    if base_eq_2 {
        mask |= 1 | 4;
    }
    if side1_eq_2 {
        mask |= 2 | 4;
    }
    mask
}

/// Recurses one directory level, synchronized across all three sides.
///
/// `dir_path` is the current directory's own full path (`""` at the root,
/// no trailing slash otherwise). It doubles as the directory_name handle
/// every child in this directory will carry.
fn collect_directory(
    session: &mut Session,
    store: &mut dyn MergeStore,
    dir_path: &str,
    base: &TreeChildren,
    side1: &TreeChildren,
    side2: &TreeChildren,
) -> Result<(), MergeError> {
    let directory_name = session.intern(dir_path);

    let mut names: BTreeSet<&str> = BTreeSet::new();
    names.extend(base.0.keys().map(|s| s.as_str()));
    names.extend(side1.0.keys().map(|s| s.as_str()));
    names.extend(side2.0.keys().map(|s| s.as_str()));

    for name in names {
        let b = base.get(name);
        let s1 = side1.get(name);
        let s2 = side2.get(name);

        let mut mask = 0u8;
        let mut dirmask = 0u8;
        if let Some((mode, _)) = &b {
            mask |= 1;
            if FileMode(*mode).is_directory() {
                dirmask |= 1;
            }
        }
        if let Some((mode, _)) = &s1 {
            mask |= 2;
            if FileMode(*mode).is_directory() {
                dirmask |= 2;
            }
        }
        if let Some((mode, _)) = &s2 {
            mask |= 4;
            if FileMode(*mode).is_directory() {
                dirmask |= 4;
            }
        }
        debug_assert!(mask != 0, "a name in the union must be present on some side");
        let filemask = mask & !dirmask;

        let vb = version_of(b.clone());
        let v1 = version_of(s1.clone());
        let v2 = version_of(s2.clone());

        let fullpath = if dir_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", dir_path, name)
        };
        let basename_offset = fullpath.rfind('/').map(|i| i + 1).unwrap_or(0);
        let path_rc = session.intern(&fullpath);

        let match_mask = compute_match_mask(&vb, &v1, &v2);

        if match_mask == 7 {
            let merged = MergedInfo::resolved(vb, directory_name.clone(), basename_offset);
            session.record(path_rc, Entry::Clean(merged));
            // Identical on all three sides: no need to descend, even if it's a directory.
            continue;
        }

        let merged = MergedInfo {
            result: VersionInfo::absent(),
            is_null: dirmask != 0,
            clean: false,
            basename_offset,
            directory_name: directory_name.clone(),
        };
        let conflict = ConflictInfo {
            merged,
            stages: [vb.clone(), v1.clone(), v2.clone()],
            pathnames: [path_rc.clone(), path_rc.clone(), path_rc.clone()],
            df_conflict: filemask != 0 && dirmask != 0,
            path_conflict: false,
            filemask,
            dirmask,
            match_mask,
        };
        session.record(path_rc.clone(), Entry::Unresolved(Box::new(conflict)));

        if dirmask != 0 {
            let base_eq_1 = vb == v1;
            let base_eq_2 = vb == v2;
            let side1_eq_2 = v1 == v2;

            let base_ch = if dirmask & 1 != 0 {
                store.load_tree_children(&vb.oid)?
            } else {
                TreeChildren::empty()
            };
            let side1_ch = if dirmask & 2 != 0 {
                if base_eq_1 {
                    base_ch.clone()
                } else {
                    store.load_tree_children(&v1.oid)?
                }
            } else {
                TreeChildren::empty()
            };
            let side2_ch = if dirmask & 4 != 0 {
                if base_eq_2 {
                    base_ch.clone()
                } else if side1_eq_2 {
                    side1_ch.clone()
                } else {
                    store.load_tree_children(&v2.oid)?
                }
            } else {
                TreeChildren::empty()
            };

            collect_directory(session, store, &fullpath, &base_ch, &side1_ch, &side2_ch)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_mode::FileMode;
    use crate::core::merge::ort::store::fixtures::MemStore;

    #[test]
    fn identical_trees_are_clean_and_not_recursed() {
        let mut store = MemStore::new();
        let blob = store.put_blob(b"hello");
        let tree = store.put_tree(vec![("file", FileMode::REGULAR.0, &blob)]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &tree, &tree, &tree).unwrap();

        assert!(session.is_clean());
        let entry = session.paths.get("file").expect("file entry recorded");
        assert!(entry.is_clean());
        assert_eq!(entry.merged().result.oid, blob);
    }

    #[test]
    fn two_sides_agree_resolves_without_conflict_marker() {
        let mut store = MemStore::new();
        let base_blob = store.put_blob(b"base");
        let new_blob = store.put_blob(b"new");
        let base_tree = store.put_tree(vec![("k", FileMode::REGULAR.0, &base_blob)]);
        let side_tree = store.put_tree(vec![("k", FileMode::REGULAR.0, &new_blob)]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &side_tree, &side_tree).unwrap();

        let entry = session.paths.get("k").unwrap();
        match entry {
            Entry::Unresolved(c) => assert_eq!(c.match_mask, 6),
            Entry::Clean(_) => panic!("match_mask 6 entries are resolved by the Resolver, not here"),
        }
    }

    #[test]
    fn added_on_one_side_only_is_recorded_unresolved_with_filemask() {
        let mut store = MemStore::new();
        let blob = store.put_blob(b"n");
        let base_tree = store.put_tree(vec![]);
        let side_tree = store.put_tree(vec![("n", FileMode::REGULAR.0, &blob)]);
        let empty_tree = store.put_tree(vec![]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &side_tree, &empty_tree).unwrap();

        let entry = session.paths.get("n").unwrap();
        match entry {
            Entry::Unresolved(c) => {
                assert_eq!(c.filemask, 2);
                assert_eq!(c.dirmask, 0);
            }
            Entry::Clean(_) => panic!("filemask 2 is unresolved until the Resolver runs"),
        }
    }

    #[test]
    fn directory_file_conflict_sets_df_conflict_and_recurses_into_directory_side() {
        let mut store = MemStore::new();
        let sub_blob = store.put_blob(b"s");
        let sub_tree = store.put_tree(vec![("sub", FileMode::REGULAR.0, &sub_blob)]);
        let file_blob = store.put_blob(b"f");

        let base_tree = store.put_tree(vec![("p", FileMode::DIRECTORY.0, &sub_tree)]);
        let side1_tree = store.put_tree(vec![("p", FileMode::REGULAR.0, &file_blob)]);
        let side2_tree = store.put_tree(vec![("p", FileMode::DIRECTORY.0, &sub_tree)]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &side1_tree, &side2_tree).unwrap();

        let entry = session.paths.get("p").unwrap();
        match entry {
            Entry::Unresolved(c) => {
                assert!(c.df_conflict);
                assert_eq!(c.filemask, 2);
                assert_eq!(c.dirmask, 1 | 4);
            }
            Entry::Clean(_) => panic!("df-conflict paths are unresolved until the Resolver runs"),
        }
        // base and side2's identical directory was recursed into, so "sub" is visible.
        assert!(session.paths.contains_key("p/sub"));
    }
}
