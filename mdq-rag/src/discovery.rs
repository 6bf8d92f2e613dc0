use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::document::MarkdownFile;
use crate::error::{RagError, Result};

/// Recursively list the `.md` files under `root`, sorted by path.
///
/// Hidden files and directories (names starting with `.`) are skipped.
/// Symbolic links are followed, so linked files and directories are listed
/// under the link's own path. Traversal errors such as unreadable
/// directories, dangling links or link cycles abort the listing.
pub fn discover_markdown_files(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(RagError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "root directory does not exist"),
        ));
    }
    if !root.is_dir() {
        return Err(RagError::ConfigError(format!("{} is not a directory", root.display())));
    }

    let mut files = Vec::new();
    let walker =
        WalkDir::new(root).follow_links(true).into_iter().filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            RagError::io(path, source)
        })?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "md")
        {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Read a Markdown file as UTF-8 text.
pub fn read_markdown_file(path: impl AsRef<Path>) -> Result<MarkdownFile> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| RagError::io(path, e))?;
    let content =
        String::from_utf8(bytes).map_err(|_| RagError::InvalidUtf8 { path: path.to_path_buf() })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(MarkdownFile { path: path.to_path_buf(), file_name, content })
}
