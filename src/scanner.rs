use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never searched for handler sources.
const ALWAYS_SKIPPED: &[&str] = &["target"];

/// Walks an application's source tree collecting the `.rs` files that may
/// declare route handlers.
///
/// Hidden directories, `target` and any extra directory names passed to
/// [`SourceScanner::skip_dir`] are not descended into.
///
/// # Example
///
/// ```no_run
/// use route_apidoc::scanner::SourceScanner;
///
/// let result = SourceScanner::new("./my-app/src").skip_dir("benches").scan().unwrap();
/// println!("Found {} source files", result.source_files.len());
/// ```
pub struct SourceScanner {
    root_path: PathBuf,
    skipped_dirs: Vec<String>,
}

/// Result of a source tree scan.
pub struct ScanResult {
    /// Every discovered `.rs` file, in walk order
    pub source_files: Vec<PathBuf>,
    /// Paths that could not be read; scanning continued past them
    pub warnings: Vec<String>,
}

impl SourceScanner {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            skipped_dirs: Vec::new(),
        }
    }

    /// Adds a directory name to leave out of the scan.
    pub fn skip_dir(mut self, name: impl Into<String>) -> Self {
        self.skipped_dirs.push(name.into());
        self
    }

    /// Scans the tree below the root path.
    ///
    /// # Errors
    ///
    /// Returns an error if the root itself is missing or not a directory.
    /// Unreadable entries below the root are recorded as warnings instead.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = std::fs::metadata(&self.root_path).with_context(|| {
            format!("Source root is not accessible: {}", self.root_path.display())
        })?;
        if !metadata.is_dir() {
            anyhow::bail!("Source root is not a directory: {}", self.root_path.display());
        }

        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() == self.root_path || !self.is_skipped(e.path()))
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file()
                        && path.extension().and_then(|s| s.to_str()) == Some("rs")
                    {
                        source_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Scanned {}: {} source files",
            self.root_path.display(),
            source_files.len()
        );

        Ok(ScanResult {
            source_files,
            warnings,
        })
    }

    fn is_skipped(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.starts_with('.') {
            return true;
        }
        path.is_dir()
            && (ALWAYS_SKIPPED.contains(&name.as_str()) || self.skipped_dirs.contains(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_names(result: &ScanResult) -> Vec<String> {
        result
            .source_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_collects_nested_sources() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("http/controllers")).unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("http/controllers/users.rs"), "pub struct UserController;").unwrap();
        fs::write(root.join("http/routes.yaml"), "routes: []").unwrap();

        let result = SourceScanner::new(root).scan().unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(file_names(&result), vec!["users.rs", "main.rs"]);
    }

    #[test]
    fn test_scan_skips_target_and_hidden() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::write(root.join(".git/hook.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "pub fn handler() {}").unwrap();

        let result = SourceScanner::new(root).scan().unwrap();

        assert_eq!(file_names(&result), vec!["lib.rs"]);
    }

    #[test]
    fn test_scan_skips_configured_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("benches")).unwrap();
        fs::write(root.join("benches/load.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "pub fn handler() {}").unwrap();

        let result = SourceScanner::new(root).skip_dir("benches").scan().unwrap();

        assert_eq!(file_names(&result), vec!["lib.rs"]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let result = SourceScanner::new("/nonexistent/app/src").scan();
        assert!(result.is_err());
        assert!(result
            .err()
            .unwrap()
            .to_string()
            .contains("Source root is not accessible"));
    }
}
