use std::collections::HashMap;
use std::rc::Rc;

use super::types::Entry;

/// Holds the interned-path map, conflicted subset, output messages and
/// recursion depth for a single top-level merge call.
///
/// Path interning is realized as an `Rc<str>` arena: every `directory_name`
/// handle stored on an entry is a clone of the `Rc<str>` key under which
/// that path lives in `paths`, so `Rc::ptr_eq` is a valid identity check.
/// `pathnames[0..2]` on `ConflictInfo` hold their own `Rc<str>` clones
/// rather than aliasing `paths`'s keys, so removing a path from `paths`
/// never invalidates a `ConflictInfo` still referencing its own name.
pub struct Session {
    pub paths: HashMap<Rc<str>, Entry>,
    pub conflicted: HashMap<Rc<str>, ()>,
    pub output: HashMap<Rc<str>, String>,
    pub current_dir_name: Rc<str>,
    pub call_depth: u32,
    pub ancestor_label: String,
}

impl Session {
    pub fn new() -> Self {
        Session {
            paths: HashMap::new(),
            conflicted: HashMap::new(),
            output: HashMap::new(),
            current_dir_name: Rc::from(""),
            call_depth: 0,
            ancestor_label: String::new(),
        }
    }

    /// Interns `path`, returning the canonical handle: either the one
    /// already stored as a key in `paths`, or a freshly allocated one.
    pub fn intern(&self, path: &str) -> Rc<str> {
        match self.paths.get_key_value(path) {
            Some((existing, _)) => existing.clone(),
            None => Rc::from(path),
        }
    }

    pub fn record(&mut self, path: Rc<str>, entry: Entry) {
        if !entry.is_clean() {
            self.conflicted.insert(path.clone(), ());
        }
        self.paths.insert(path, entry);
    }

    pub fn append_message(&mut self, path: Rc<str>, message: &str) {
        let buf = self.output.entry(path).or_insert_with(String::new);
        buf.push_str(message);
        buf.push('\n');
    }

    /// Clears paths/conflicted, keeping `output`, for the recursive driver's
    /// partial reset between inner invocations.
    pub fn partial_reset(&mut self) {
        self.paths.clear();
        self.conflicted.clear();
    }

    pub fn is_clean(&self) -> bool {
        self.conflicted.is_empty()
    }

    /// Messages in sorted path order, for the message channel.
    pub fn sorted_messages(&self) -> Vec<(Rc<str>, String)> {
        let mut items: Vec<_> = self.output.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        items.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));
        items
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
