use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

const TMP_SUFFIX: &str = "tmp";
const REJECTED_SUFFIX: &str = "rejected";

/// Creates `dir` and its parents when missing.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Ensures the directory holding `path` exists.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => ensure_dir(parent),
        None => Ok(()),
    }
}

/// Sibling path used to stage a write before it replaces `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    with_suffix(path, TMP_SUFFIX)
}

/// Sibling path that collects entries a load could not use.
pub fn rejected_path(path: &Path) -> PathBuf {
    with_suffix(path, REJECTED_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, suffix),
        None => suffix.to_string(),
    };
    sibling.set_extension(ext);
    sibling
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_keeps_the_original_extension() {
        assert_eq!(
            tmp_path(Path::new("data/transactions.csv")),
            PathBuf::from("data/transactions.csv.tmp")
        );
        assert_eq!(tmp_path(Path::new("ledger")), PathBuf::from("ledger.tmp"));
        assert_eq!(
            rejected_path(Path::new("transactions.csv")),
            PathBuf::from("transactions.csv.rejected")
        );
    }

    #[test]
    fn ensure_parent_tolerates_bare_file_names() {
        assert!(ensure_parent(Path::new("transactions.csv")).is_ok());
    }
}
