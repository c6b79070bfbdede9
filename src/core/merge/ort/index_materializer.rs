//! Index materializer. Mutates an external `Index` so every conflicted path
//! carries stage>0 cache entries for the sides that held a file there, in
//! place of whatever stage-0 entry checkout may have left.
//!
//! This crate's `Index` keys by `(path, stage)` in a map with a `BTreeSet`
//! key index, so a stage>0 insertion is already in sorted position and
//! needs no positional bookkeeping or re-sort pass.

use super::session::Session;
use super::types::Entry as MergeEntry;
use crate::core::file_mode::FileMode;
use crate::core::index::entry::Entry as IndexEntry;
use crate::core::index::index::Index;

fn entry_key(path: &str, stage: u8) -> String {
    if stage == 0 {
        path.to_string()
    } else {
        format!("{}\0{}", path, stage)
    }
}

/// Applies every conflicted path in `session` to `index`.
pub fn materialize_conflicts(session: &Session, index: &mut Index) {
    for path in session.conflicted.keys() {
        let conflict = match session.paths.get(path.as_ref()) {
            Some(MergeEntry::Unresolved(c)) => c,
            _ => continue,
        };
        let path_str: &str = path.as_ref();

        let stage0_key = entry_key(path_str, 0);
        if index.entries.remove(&stage0_key).is_some() {
            index.keys.remove(&stage0_key);
        }

        for side in 0..3usize {
            if (conflict.filemask >> side) & 1 == 0 {
                continue;
            }
            let version = &conflict.stages[side];
            let stage = (side + 1) as u8;
            let entry = IndexEntry {
                ctime: 0,
                ctime_nsec: 0,
                mtime: 0,
                mtime_nsec: 0,
                dev: 0,
                ino: 0,
                mode: FileMode(version.mode),
                uid: 0,
                gid: 0,
                size: 0,
                oid: version.oid.clone(),
                flags: path_str.len().min(0xfff) as u16,
                path: path_str.to_string(),
                stage,
            };
            let key = entry_key(path_str, stage);
            index.keys.insert(key.clone());
            index.entries.insert(key, entry);
        }
    }

    if !session.conflicted.is_empty() {
        index.changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::merge::ort::collector::collect_merge_info;
    use crate::core::merge::ort::config::MergeConfig;
    use crate::core::merge::ort::resolver::resolve_all;
    use crate::core::merge::ort::store::fixtures::MemStore;
    use crate::core::file_mode::FileMode as FM;

    fn config() -> MergeConfig {
        MergeConfig::new("ours".to_string(), "theirs".to_string())
    }

    #[test]
    fn modify_delete_conflict_materializes_stage1_and_stage2() {
        let mut store = MemStore::new();
        let h0 = store.put_blob(b"base content");
        let h1 = store.put_blob(b"modified content");
        let base_tree = store.put_tree(vec![("a", FM::REGULAR.0, &h0)]);
        let side1_tree = store.put_tree(vec![("a", FM::REGULAR.0, &h1)]);
        let side2_tree = store.put_tree(vec![]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &base_tree, &side1_tree, &side2_tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();

        let mut index = Index::new("/tmp/does-not-exist/.ash/index");
        materialize_conflicts(&session, &mut index);

        assert!(index.entries.contains_key("a\u{0}1"));
        assert!(!index.entries.contains_key("a\u{0}3"));
        assert!(!index.entries.contains_key("a"));
        assert_eq!(index.entries.get("a\u{0}1").unwrap().oid, h0);
        assert!(index.changed);
    }

    #[test]
    fn clean_merge_materializes_nothing() {
        let mut store = MemStore::new();
        let blob = store.put_blob(b"x");
        let tree = store.put_tree(vec![("f", FM::REGULAR.0, &blob)]);

        let mut session = Session::new();
        collect_merge_info(&mut session, &mut store, &tree, &tree, &tree).unwrap();
        resolve_all(&mut session, &mut store, &config()).unwrap();

        let mut index = Index::new("/tmp/does-not-exist/.ash/index");
        materialize_conflicts(&session, &mut index);

        assert!(index.entries.is_empty());
        assert!(!index.changed);
    }
}
