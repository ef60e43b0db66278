//! # File Discovery Module
//!
//! Expands CLI inputs into a flat list of supported image files and
//! provides the small file utilities the rest of the crate shares.
//!
//! ## Supported inputs:
//! JPG, JPEG, PNG, WebP, GIF, BMP, ICO, TIFF/TIF, PNM/PPM/PGM/PBM

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Input discovery and file utilities
pub struct FileScanner;

impl FileScanner {
    /// Expand files and directories into the supported image files they
    /// contain, preserving input order (directories are walked recursively)
    pub fn collect_input_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                for entry in WalkDir::new(input)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                {
                    let path = entry.path();
                    if Self::is_supported_input(path) {
                        files.push(path.to_path_buf());
                    }
                }
            } else if input.is_file() {
                if Self::is_supported_input(input) {
                    files.push(input.clone());
                } else {
                    warn!("Skipping unsupported input file: {}", input.display());
                }
            } else {
                return Err(anyhow::anyhow!("Input does not exist: {}", input.display()));
            }
        }

        Ok(files)
    }

    /// Check if a file's extension is a supported image input
    pub fn is_supported_input(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(
                ext_lower.as_str(),
                "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "ico" | "tiff" | "tif"
                    | "pnm" | "ppm" | "pgm" | "pbm"
            )
        } else {
            false
        }
    }

    /// Best-effort mime type from the file extension
    pub fn guess_mime(path: &Path) -> String {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let subtype = match ext.as_str() {
            "jpg" | "jpeg" => "jpeg",
            "tif" | "tiff" => "tiff",
            "ppm" | "pgm" | "pbm" | "pnm" => "x-portable-anymap",
            "ico" => "x-icon",
            "" => "octet-stream",
            other => return format!("image/{}", other),
        };
        format!("image/{}", subtype)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_supported_extensions() {
        assert!(FileScanner::is_supported_input(Path::new("photo.JPG")));
        assert!(FileScanner::is_supported_input(Path::new("scan.tif")));
        assert!(FileScanner::is_supported_input(Path::new("img.webp")));
        assert!(!FileScanner::is_supported_input(Path::new("clip.mp4")));
        assert!(!FileScanner::is_supported_input(Path::new("notes.txt")));
        assert!(!FileScanner::is_supported_input(Path::new("noext")));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileScanner::format_size(512), "512 B");
        assert_eq!(FileScanner::format_size(2048), "2.00 KB");
        assert_eq!(FileScanner::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(FileScanner::guess_mime(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(FileScanner::guess_mime(Path::new("a.png")), "image/png");
        assert_eq!(FileScanner::guess_mime(Path::new("a.ico")), "image/x-icon");
    }

    #[test]
    fn test_collect_walks_directories_and_filters() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(temp_dir.path().join("a.png"), b"x").unwrap();
        std::fs::write(nested.join("b.jpg"), b"x").unwrap();
        std::fs::write(nested.join("skip.txt"), b"x").unwrap();

        let files =
            FileScanner::collect_input_files(&[temp_dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| FileScanner::is_supported_input(f)));
    }

    #[test]
    fn test_collect_rejects_missing_input() {
        let result = FileScanner::collect_input_files(&[PathBuf::from("/no/such/file.png")]);
        assert!(result.is_err());
    }
}
