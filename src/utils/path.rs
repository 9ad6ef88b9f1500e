//! Path helpers for user-supplied file names.

use std::path::PathBuf;

/// Expand a leading `~/` to the home directory.
pub fn resolve_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(resolve_path("/var/tito.sqlite"), PathBuf::from("/var/tito.sqlite"));
        assert_eq!(resolve_path("tito.sqlite"), PathBuf::from("tito.sqlite"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolve_path("~/a/b.sqlite"), home.join("a/b.sqlite"));
        }
    }
}
