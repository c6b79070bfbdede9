use std::rc::Rc;

use crate::core::file_mode::FileMode;

/// Null object hash: the all-zeros 40-hex-character value, meaning "absent".
pub const NULL_OID: &str = "0000000000000000000000000000000000000000";

pub fn is_null_oid(oid: &str) -> bool {
    oid.is_empty() || oid == NULL_OID
}

/// (mode, oid) pair. Mode 0 with a null hash denotes absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub mode: u32,
    pub oid: String,
}

impl VersionInfo {
    pub fn absent() -> Self {
        VersionInfo { mode: 0, oid: NULL_OID.to_string() }
    }

    pub fn is_absent(&self) -> bool {
        self.mode == 0 || is_null_oid(&self.oid)
    }

    pub fn is_directory(&self) -> bool {
        FileMode(self.mode).is_directory()
    }
}

/// The final version of a path.
#[derive(Debug, Clone)]
pub struct MergedInfo {
    pub result: VersionInfo,
    pub is_null: bool,
    pub clean: bool,
    pub basename_offset: usize,
    pub directory_name: Rc<str>,
}

impl MergedInfo {
    pub fn resolved(result: VersionInfo, directory_name: Rc<str>, basename_offset: usize) -> Self {
        let is_null = result.is_absent();
        MergedInfo {
            result,
            is_null,
            clean: true,
            basename_offset,
            directory_name,
        }
    }
}

/// Superset of `MergedInfo` used while a path is unresolved.
#[derive(Debug, Clone)]
pub struct ConflictInfo {
    pub merged: MergedInfo,
    pub stages: [VersionInfo; 3],
    pub pathnames: [Rc<str>; 3],
    pub df_conflict: bool,
    pub path_conflict: bool,
    pub filemask: u8,
    pub dirmask: u8,
    pub match_mask: u8,
}

/// Tagged union: a path is either resolved ("clean") or still unresolved.
///
/// Once a path is promoted to `Clean`, nothing outside `merged` is read
/// again. Callers must match exhaustively rather than check a flag.
#[derive(Debug, Clone)]
pub enum Entry {
    Clean(MergedInfo),
    Unresolved(Box<ConflictInfo>),
}

impl Entry {
    pub fn merged(&self) -> &MergedInfo {
        match self {
            Entry::Clean(m) => m,
            Entry::Unresolved(c) => &c.merged,
        }
    }

    pub fn merged_mut(&mut self) -> &mut MergedInfo {
        match self {
            Entry::Clean(m) => m,
            Entry::Unresolved(c) => &mut c.merged,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Entry::Clean(_))
    }

    pub fn directory_name(&self) -> Rc<str> {
        self.merged().directory_name.clone()
    }
}

/// Sort key treating directory paths as though they carried a trailing `/`.
///
/// The same key serves both the Resolver's reverse-order traversal and the
/// Tree writer's outer full-path sort: appending the slash before
/// comparison guarantees a directory sorts immediately after its own
/// contents in forward order, which is exactly the adjacency both passes
/// depend on.
pub fn plist_sort_key(path: &str, is_dir: bool) -> String {
    if is_dir {
        format!("{}/", path)
    } else {
        path.to_string()
    }
}

/// Returns the unique side not in a 2-of-3 agreement.
///
/// `match_mask` has exactly two bits set (one of 3, 5, 6); the "other"
/// side is the complementary bit within the 3-bit universe.
pub fn other_side(match_mask: u8) -> usize {
    let othermask = 7 & !match_mask;
    if othermask == 4 { 2 } else { 1 }
}
