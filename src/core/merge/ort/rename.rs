//! Rename pass. Pluggable boundary between the Collector and the Resolver:
//! only `stages`/`pathnames` are consulted downstream, so a similarity-based
//! detector could replace this without touching the Resolver.

use super::session::Session;

/// Default implementation: identity. Detects no renames, always clean.
pub fn detect_renames(_session: &mut Session) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_pass_is_always_clean() {
        let mut session = Session::new();
        assert!(detect_renames(&mut session));
    }
}
