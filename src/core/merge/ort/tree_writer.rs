//! Post-order subtree emission. Walks the same reverse-sorted path list the
//! Resolver uses and writes tree objects bottom-up via an offsets stack
//! keyed by directory identity.

use std::rc::Rc;

use super::error::MergeError;
use super::session::Session;
use super::store::MergeStore;
use super::types::{plist_sort_key, Entry, VersionInfo};
use crate::core::file_mode::FileMode;

struct Frame {
    directory: Rc<str>,
    start: usize,
}

fn is_strict_prefix(candidate: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return !candidate.is_empty();
    }
    candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate.as_bytes()[ancestor.len()] == b'/'
}

/// Writes every conflicted/clean directory bottom-up, returning the root
/// tree's object hash.
pub fn write_trees(session: &mut Session, store: &mut dyn MergeStore) -> Result<String, MergeError> {
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

    let mut versions: Vec<(String, VersionInfo)> = Vec::new();
    let mut offsets: Vec<Frame> = Vec::new();
    let mut last_directory: Option<Rc<str>> = None;

    for (path, _) in items.iter().rev() {
        let d = session
            .paths
            .get(path.as_ref())
            .expect("path present during tree writing")
            .directory_name();

        let same_as_last = last_directory
            .as_ref()
            .map(|ld| Rc::ptr_eq(ld, &d) || ld.as_ref() == d.as_ref())
            .unwrap_or(false);

        if !same_as_last {
            let descending = match &last_directory {
                None => true,
                Some(ld) => is_strict_prefix(&d, ld),
            };

            if descending {
                offsets.push(Frame {
                    directory: d.clone(),
                    start: versions.len(),
                });
            } else {
                let finished = last_directory.clone().expect("descending=false implies a prior directory");
                let frame = offsets.pop().expect("offsets non-empty when closing a directory");
                debug_assert!(frame.directory.as_ref() == finished.as_ref());

                if frame.start == versions.len() {
                    mark_directory_empty(session, &finished);
                } else {
                    let children: Vec<(String, u32, String)> = versions[frame.start..]
                        .iter()
                        .map(|(name, v)| (name.clone(), v.mode, v.oid.clone()))
                        .collect();
                    let hash = store.store_tree(&children)?;
                    set_directory_result(session, &finished, hash);
                }
                versions.truncate(frame.start);

                let reopening = offsets
                    .last()
                    .map(|f| f.directory.as_ref() == d.as_ref())
                    .unwrap_or(false);
                if !reopening {
                    offsets.push(Frame {
                        directory: d.clone(),
                        start: versions.len(),
                    });
                }
            }
            last_directory = Some(d.clone());
        }

        let merged = session
            .paths
            .get(path.as_ref())
            .expect("path present during tree writing")
            .merged()
            .clone();
        if !merged.is_null {
            let basename = path[merged.basename_offset..].to_string();
            versions.push((basename, merged.result));
        }
    }

    let root_children: Vec<(String, u32, String)> = versions
        .iter()
        .map(|(name, v)| (name.clone(), v.mode, v.oid.clone()))
        .collect();
    let root_hash = store.store_tree(&root_children)?;

    debug_assert_eq!(offsets.len(), 1, "exactly the root frame should remain open");
    debug_assert_eq!(offsets.first().map(|f| f.start), Some(0));

    Ok(root_hash)
}

fn mark_directory_empty(session: &mut Session, path: &Rc<str>) {
    if let Some(Entry::Unresolved(c)) = session.paths.get_mut(path.as_ref()) {
        c.merged.is_null = true;
    }
}

fn set_directory_result(session: &mut Session, path: &Rc<str>, hash: String) {
    if let Some(Entry::Unresolved(c)) = session.paths.get_mut(path.as_ref()) {
        c.merged.result = VersionInfo {
            mode: FileMode::DIRECTORY.0,
            oid: hash,
        };
        c.merged.is_null = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_mode::FileMode;
    use crate::core::merge::ort::collector::collect_merge_info;
    use crate::core::merge::ort::resolver::resolve_all;
    use crate::core::merge::ort::config::MergeConfig;
    use crate::core::merge::ort::store::fixtures::MemStore;

    fn config() -> MergeConfig {
        MergeConfig::new("ours".to_string(), "theirs".to_string())
    }

    #[test]
    fn identical_trees_round_trip_to_the_same_root_hash() {
        let mut store = MemStore::new();
        let blob = store.put_blob(b"hello");
        let tree = store.put_tree(vec![("file", FileMode::REGULAR.0, &blob)]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &tree, &tree, &tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();
        let root = write_trees(&mut session, &mut store).unwrap();

        assert_eq!(root, tree);
    }

    #[test]
    fn nested_directory_rebuilds_with_the_resolved_child() {
        let mut store = MemStore::new();
        let h1 = store.put_blob(b"one");
        let h2 = store.put_blob(b"two");
        let base_dir = store.put_tree(vec![("x", FileMode::REGULAR.0, &h1)]);
        let side1_dir = store.put_tree(vec![("x", FileMode::REGULAR.0, &h2)]);

        let base_tree = store.put_tree(vec![("dir", FileMode::DIRECTORY.0, &base_dir)]);
        let side1_tree = store.put_tree(vec![("dir", FileMode::DIRECTORY.0, &side1_dir)]);
        let side2_tree = store.put_tree(vec![("dir", FileMode::DIRECTORY.0, &base_dir)]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &side1_tree, &side2_tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();
        let root = write_trees(&mut session, &mut store).unwrap();

        let root_children = store.load_tree_children(&root).unwrap();
        let (dir_mode, dir_oid) = root_children.get("dir").expect("dir entry in rebuilt root");
        assert!(FileMode(dir_mode).is_directory());
        assert_eq!(dir_oid, side1_dir);
    }

    #[test]
    fn directory_emptied_by_merge_is_omitted_from_parent() {
        let mut store = MemStore::new();
        let h = store.put_blob(b"gone");
        let sub_tree = store.put_tree(vec![("a", FileMode::REGULAR.0, &h)]);
        let base_tree = store.put_tree(vec![("d", FileMode::DIRECTORY.0, &sub_tree)]);
        let empty_tree = store.put_tree(vec![]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &empty_tree, &empty_tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();
        let root = write_trees(&mut session, &mut store).unwrap();

        let root_children = store.load_tree_children(&root).unwrap();
        assert!(root_children.get("d").is_none());
    }
}
