//! Input file discovery by glob pattern.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Regular files matching `pattern`, sorted.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|source| Error::Pattern { pattern: pattern.to_string(), source })?;
    let mut out = Vec::new();
    for entry in paths {
        let path = entry?;
        if path.is_file() {
            out.push(path);
        } else {
            debug!("ignoring non-file match {}", path.display());
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn tmp_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        p.push(format!("hs-core-{}-{}-{}", name, std::process::id(), nanos));
        p
    }

    fn rm_rf(path: &Path) {
        let _ = std::fs::remove_dir_all(path);
    }

    #[test]
    fn matches_are_sorted_files_only() {
        let root = tmp_dir("discover");
        rm_rf(&root);
        std::fs::create_dir_all(root.join("dir.root")).unwrap();
        for name in ["b_leplep.root", "a_lephad.root", "notes.txt"] {
            std::fs::write(root.join(name), b"x").unwrap();
        }

        let pattern = format!("{}/*.root", root.display());
        let found = discover(&pattern).unwrap();
        assert_eq!(found, vec![root.join("a_lephad.root"), root.join("b_leplep.root")]);
        rm_rf(&root);
    }

    #[test]
    fn no_match_is_empty() {
        let root = tmp_dir("empty");
        let pattern = format!("{}/*.root", root.display());
        assert!(discover(&pattern).unwrap().is_empty());
    }

    #[test]
    fn bad_pattern_is_reported() {
        assert!(matches!(discover("[unclosed"), Err(Error::Pattern { .. })));
    }
}
