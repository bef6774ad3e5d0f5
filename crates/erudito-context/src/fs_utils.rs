use erudito_core::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every file below `root` that has an extension, in a stable order.
///
/// # Errors
/// Returns [`Error::NotFound`] if `root` is not a directory
pub fn collect_documents(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::NotFound(format!(
            "Document folder {} does not exist",
            root.display()
        )));
    }

    let mut documents: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::warn!("Skipping unreadable entry: {error}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some())
        .collect();
    documents.sort();
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn collects_nested_files_with_extensions() {
        let temp = TempDir::new().expect("temp dir");
        let nested = temp.path().join("guides").join("setup");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(temp.path().join("readme.md"), "# Readme").expect("write");
        fs::write(nested.join("install.txt"), "Install it.").expect("write");
        fs::write(temp.path().join("LICENSE"), "no extension").expect("write");

        let documents = collect_documents(temp.path()).expect("collect");
        assert_eq!(
            documents,
            vec![nested.join("install.txt"), temp.path().join("readme.md")]
        );
    }

    #[test]
    fn missing_root_is_not_found() {
        let temp = TempDir::new().expect("temp dir");
        let result = collect_documents(&temp.path().join("absent"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
