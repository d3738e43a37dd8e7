//! Working-directory string manipulation.
//!
//! FTP paths are absolute, `/`-separated strings. A session's working
//! directory is always non-empty, starts with `/` and carries no trailing
//! slash unless it is the root itself.

use crate::options::CWD_MAX;

/// Drops the last component of `path`, in place. Reaching depth zero restores
/// the root.
pub(crate) fn up_a_level(path: &mut String) {
    if let Some(idx) = path.rfind('/') {
        path.truncate(idx);
        if path.is_empty() {
            path.push('/');
        }
    }
}

/// Combines `cwd` with a client-supplied `param`, in place.
///
/// An empty or `/` parameter resets to the root, `..` steps up one level, a
/// relative name is appended and an absolute name replaces the directory
/// outright. A trailing slash is stripped from any non-root result.
///
/// Returns `false`, leaving `cwd` untouched, when the combined path would not
/// fit the working-directory buffer.
pub(crate) fn build(cwd: &mut String, param: &str) -> bool {
    let mut next = cwd.clone();

    if param.is_empty() || param == "/" {
        next.clear();
        next.push('/');
    } else if param == ".." {
        up_a_level(&mut next);
    } else if !param.starts_with('/') {
        if !next.ends_with('/') {
            next.push('/');
        }
        next.push_str(param);
    } else {
        next.clear();
        next.push_str(param);
    }

    if next.len() > 1 && next.ends_with('/') {
        next.truncate(next.len() - 1);
    }

    if next.len() > CWD_MAX - 1 {
        return false;
    }
    *cwd = next;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn built(cwd: &str, param: &str) -> String {
        let mut p = cwd.to_string();
        assert!(build(&mut p, param));
        p
    }

    #[test]
    fn root_parameter_resets() {
        assert_eq!(built("/a/b", "/"), "/");
        assert_eq!(built("/a/b", ""), "/");
    }

    #[test]
    fn dotdot_steps_up() {
        assert_eq!(built("/", ".."), "/");
        assert_eq!(built("/a/b", ".."), "/a");
        assert_eq!(built("/a", ".."), "/");
    }

    #[test]
    fn relative_appends() {
        assert_eq!(built("/a", "c"), "/a/c");
        assert_eq!(built("/", "c"), "/c");
    }

    #[test]
    fn absolute_replaces() {
        assert_eq!(built("/a", "/x/y"), "/x/y");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(built("/a", "b/"), "/a/b");
        assert_eq!(built("/a", "/x/"), "/x");
    }

    #[test]
    fn overflow_is_rejected_and_cwd_kept() {
        let mut cwd = String::from("/keep");
        let long = "x".repeat(CWD_MAX);
        assert!(!build(&mut cwd, &long));
        assert_eq!(cwd, "/keep");
    }

    #[test]
    fn up_a_level_restores_root_at_depth_one() {
        let mut p = String::from("/a");
        up_a_level(&mut p);
        assert_eq!(p, "/");
        up_a_level(&mut p);
        assert_eq!(p, "/");
    }
}
