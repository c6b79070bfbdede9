//! Narrow store contract the merge engine consumes, so the
//! Collector/Resolver/Tree writer never see zlib framing or the on-disk
//! loose-object layout directly. The concrete implementation wraps the
//! existing `Database`.

use std::any::Any;
use std::collections::HashMap;

use crate::core::database::blob::Blob;
use crate::core::database::database::{Database, GitObject};
use crate::core::database::tree::{Tree, TreeEntry};
use crate::core::file_mode::FileMode;
use crate::errors::error::Error;

/// Immediate children of a tree, as (mode, oid) pairs keyed by basename.
///
/// Loading a `TreeChildren` must not recursively materialize grandchildren.
/// The synchronized walker only ever compares siblings one level at a time
/// and recurses by loading a child's own `TreeChildren` only when that child
/// is unresolved.
#[derive(Debug, Clone, Default)]
pub struct TreeChildren(pub HashMap<String, (u32, String)>);

impl TreeChildren {
    pub fn empty() -> Self {
        TreeChildren(HashMap::new())
    }

    pub fn get(&self, name: &str) -> Option<(u32, String)> {
        self.0.get(name).cloned()
    }
}

pub trait MergeStore {
    fn load_tree_children(&mut self, oid: &str) -> Result<TreeChildren, Error>;
    fn load_blob(&mut self, oid: &str) -> Result<Vec<u8>, Error>;
    fn store_blob(&mut self, content: &[u8]) -> Result<String, Error>;
    /// Writes a tree object from (basename, mode, oid) triples, sorted into
    /// the store's canonical tree-entry order before serialization.
    fn store_tree(&mut self, entries: &[(String, u32, String)]) -> Result<String, Error>;
}

/// Sort key that treats directories as though their name carried a trailing
/// `/`, applied here at a single directory level.
fn tree_entry_sort_key(name: &str, mode: u32) -> String {
    if FileMode(mode).is_directory() {
        format!("{}/", name)
    } else {
        name.to_string()
    }
}

/// A tree object whose bytes are pre-sorted in the store's canonical order
/// rather than `Tree::to_bytes`'s plain-name sort. The merge engine writes
/// children it already resolved, it never needs `Tree::build`'s path-walking
/// assembly.
struct RawTree {
    bytes: Vec<u8>,
    oid: Option<String>,
}

impl RawTree {
    fn new(entries: &[(String, u32, String)]) -> Result<Self, Error> {
        let mut sorted: Vec<&(String, u32, String)> = entries.iter().collect();
        sorted.sort_by(|a, b| tree_entry_sort_key(&a.0, a.1).cmp(&tree_entry_sort_key(&b.0, b.1)));

        let mut bytes = Vec::new();
        for (name, mode, oid) in sorted {
            let mode_str = format!("{:o}", mode);
            bytes.extend_from_slice(format!("{} {}\0", mode_str, name).as_bytes());
            let oid_bytes = hex::decode(oid)
                .map_err(|_| Error::Generic(format!("invalid object id in tree entry: {}", oid)))?;
            if oid_bytes.len() != 20 {
                return Err(Error::Generic(format!(
                    "object id {} is not 20 bytes",
                    oid
                )));
            }
            bytes.extend_from_slice(&oid_bytes);
        }

        Ok(RawTree { bytes, oid: None })
    }
}

impl GitObject for RawTree {
    fn get_type(&self) -> &str {
        "tree"
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    fn set_oid(&mut self, oid: String) {
        self.oid = Some(oid);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn GitObject> {
        Box::new(RawTree {
            bytes: self.bytes.clone(),
            oid: self.oid.clone(),
        })
    }
}

impl MergeStore for Database {
    fn load_tree_children(&mut self, oid: &str) -> Result<TreeChildren, Error> {
        let obj = self.load(oid)?;
        let tree = obj
            .as_any()
            .downcast_ref::<Tree>()
            .ok_or_else(|| Error::Generic(format!("object {} is not a tree", oid)))?;

        let mut children = HashMap::with_capacity(tree.get_entries().len());
        for (name, entry) in tree.get_entries() {
            match entry {
                TreeEntry::Blob(blob_oid, mode) => {
                    children.insert(name.clone(), (mode.0, blob_oid.clone()));
                }
                TreeEntry::Tree(subtree) => {
                    let sub_oid = subtree.get_oid().cloned().ok_or_else(|| {
                        Error::Generic(format!("subtree entry {} has no oid", name))
                    })?;
                    children.insert(name.clone(), (FileMode::DIRECTORY.0, sub_oid));
                }
            }
        }
        Ok(TreeChildren(children))
    }

    fn load_blob(&mut self, oid: &str) -> Result<Vec<u8>, Error> {
        let obj = self.load(oid)?;
        Ok(obj.to_bytes())
    }

    fn store_blob(&mut self, content: &[u8]) -> Result<String, Error> {
        let mut blob = Blob::new(content.to_vec());
        self.store(&mut blob)
    }

    fn store_tree(&mut self, entries: &[(String, u32, String)]) -> Result<String, Error> {
        let mut raw = RawTree::new(entries)?;
        self.store(&mut raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_entry_sort_key_orders_directories_between_dashed_and_nested_names() {
        let mut names = vec![
            tree_entry_sort_key("foo-bar", FileMode::REGULAR.0),
            tree_entry_sort_key("foo", FileMode::DIRECTORY.0),
            tree_entry_sort_key("foo.txt", FileMode::REGULAR.0),
        ];
        names.sort();
        assert_eq!(names, vec!["foo-bar", "foo/", "foo.txt"]);
    }
}

/// In-memory `MergeStore` fixture shared by the Collector/Resolver/Tree-writer
/// test modules, so those tests never touch the filesystem.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use sha1::{Digest, Sha1};

    #[derive(Default)]
    pub(crate) struct MemStore {
        pub trees: HashMap<String, TreeChildren>,
        pub blobs: HashMap<String, Vec<u8>>,
    }

    fn oid_of(bytes: &[u8]) -> String {
        let mut hasher = Sha1::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }

    impl MemStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn put_blob(&mut self, content: &[u8]) -> String {
            let oid = oid_of(content);
            self.blobs.insert(oid.clone(), content.to_vec());
            oid
        }

        pub fn put_tree(&mut self, entries: Vec<(&str, u32, &str)>) -> String {
            let mut map = HashMap::new();
            let mut repr = Vec::new();
            for (name, mode, oid) in &entries {
                map.insert(name.to_string(), (*mode, oid.to_string()));
                repr.extend_from_slice(format!("{} {} {}\n", mode, name, oid).as_bytes());
            }
            let oid = oid_of(&repr);
            self.trees.insert(oid.clone(), TreeChildren(map));
            oid
        }
    }

    impl MergeStore for MemStore {
        fn load_tree_children(&mut self, oid: &str) -> Result<TreeChildren, Error> {
            self.trees
                .get(oid)
                .cloned()
                .ok_or_else(|| Error::Generic(format!("no such tree {}", oid)))
        }

        fn load_blob(&mut self, oid: &str) -> Result<Vec<u8>, Error> {
            self.blobs
                .get(oid)
                .cloned()
                .ok_or_else(|| Error::Generic(format!("no such blob {}", oid)))
        }

        fn store_blob(&mut self, content: &[u8]) -> Result<String, Error> {
            Ok(self.put_blob(content))
        }

        fn store_tree(&mut self, entries: &[(String, u32, String)]) -> Result<String, Error> {
            let refs: Vec<(&str, u32, &str)> = entries
                .iter()
                .map(|(n, m, o)| (n.as_str(), *m, o.as_str()))
                .collect();
            Ok(self.put_tree(refs))
        }
    }
}
