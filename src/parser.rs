use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parses application source files with `syn`.
pub struct SourceParser;

/// A parsed application source file.
#[derive(Debug)]
pub struct SourceFile {
    /// Path the source was read from
    pub path: PathBuf,
    /// The parsed syntax tree
    pub syntax_tree: syn::File,
}

impl SourceParser {
    /// Reads and parses a single file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid Rust.
    pub fn parse_file(path: &Path) -> Result<SourceFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Self::parse_source(path, &content)
    }

    /// Parses source text that is already in memory; `path` is only recorded.
    pub fn parse_source(path: impl Into<PathBuf>, content: &str) -> Result<SourceFile> {
        let path = path.into();
        let syntax_tree = syn::parse_file(content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(SourceFile { path, syntax_tree })
    }

    /// Parses every file, skipping the ones that fail.
    ///
    /// A broken file only loses the handlers it declares, so failures are
    /// logged and dropped rather than aborting the whole index.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<SourceFile> {
        let parsed: Vec<SourceFile> = paths
            .iter()
            .filter_map(|path| match Self::parse_file(path) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    None
                }
            })
            .collect();

        debug!(
            "Parsing complete: {} succeeded, {} failed",
            parsed.len(),
            paths.len() - parsed.len()
        );

        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_controller_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            pub struct UserController;

            impl UserController {
                /// Show a user.
                pub fn show(&self, id: u64) -> String {
                    id.to_string()
                }
            }
        "#;

        let file_path = create_temp_file(&temp_dir, "users.rs", code);
        let parsed = SourceParser::parse_file(&file_path).unwrap();

        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.syntax_tree.items.len(), 2);
    }

    #[test]
    fn test_parse_invalid_source() {
        let result = SourceParser::parse_source("broken.rs", "pub fn broken( {");

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to parse Rust syntax"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = SourceParser::parse_file(Path::new("/nonexistent/file.rs"));

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_parse_files_skips_broken_sources() {
        let temp_dir = TempDir::new().unwrap();

        let good = create_temp_file(&temp_dir, "good.rs", "pub fn index() {}");
        let bad = create_temp_file(&temp_dir, "bad.rs", "struct Missing }");

        let parsed = SourceParser::parse_files(&[good.clone(), bad]);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].path, good);
    }
}
