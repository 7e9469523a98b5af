//! Document loading
//!
//! Reads story files from a local directory into [`Document`]s. This is one
//! possible caller-side source; the analysis engine itself only ever sees
//! in-memory documents.

use std::path::Path;

use walkdir::WalkDir;

use crate::{Document, PlotlineError, Result};

/// File extensions loaded when the caller does not specify any
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "html", "htm"];

/// Load every matching file under `root`, sorted by relative path
///
/// Hidden files and directories are skipped. Files that cannot be read as
/// UTF-8 are skipped with a warning rather than failing the whole set.
pub fn load_documents(root: &Path, extensions: &[&str]) -> Result<Vec<Document>> {
    if !root.exists() {
        return Err(PlotlineError::NotFound(root.display().to_string()));
    }

    if root.is_file() {
        let text = std::fs::read_to_string(root).map_err(|e| PlotlineError::Io {
            path: root.display().to_string(),
            source: e,
        })?;
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        return Ok(vec![Document::new(name, text)]);
    }

    let mut documents = Vec::new();

    let entries = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str().unwrap_or("")))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), extensions));

    for entry in entries {
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        match std::fs::read_to_string(path) {
            Ok(text) => documents.push(Document::new(relative, text)),
            Err(e) => tracing::warn!("Skipping unreadable file {}: {}", path.display(), e),
        }
    }

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!("Loaded {} documents from {}", documents.len(), root.display());

    Ok(documents)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("part2")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("b.md"), "\"Hi,\" Alex said.").unwrap();
        fs::write(dir.path().join("part2/a.MD"), "Morgan left.").unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();
        fs::write(dir.path().join(".git/config.md"), "hidden").unwrap();

        let docs = load_documents(dir.path(), DEFAULT_EXTENSIONS).unwrap();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();

        assert_eq!(paths, vec!["b.md", "part2/a.MD"]);
        assert_eq!(docs[0].text, "\"Hi,\" Alex said.");
    }

    #[test]
    fn test_load_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("chapter.txt");
        fs::write(&file, "Alex waited.").unwrap();

        let docs = load_documents(&file, DEFAULT_EXTENSIONS).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, "chapter.txt");
    }

    #[test]
    fn test_load_missing_root() {
        let err = load_documents(Path::new("/no/such/story"), DEFAULT_EXTENSIONS).unwrap_err();
        assert!(matches!(err, PlotlineError::NotFound(_)));
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a/b.Markdown"), &["markdown"]));
        assert!(!has_extension(Path::new("a/b"), &["md"]));
    }
}
