use crate::error::{LabelMatchError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    /// スキャン起点からの相対パス
    pub file_name: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// フォルダ内のラベル写真を列挙する（相対パス順）
pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(LabelMatchError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|e| {
            let file_name = e
                .path()
                .strip_prefix(folder)
                .unwrap_or(e.path())
                .to_string_lossy()
                .replace('\\', "/");
            ImageInfo {
                path: e.path().to_path_buf(),
                file_name,
            }
        })
        .collect();

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("JPG"));
        assert!(is_image_extension("jpeg"));
        assert!(is_image_extension("png"));
        assert!(is_image_extension("Tiff"));
        assert!(!is_image_extension("txt"));
        assert!(!is_image_extension("pdf"));
        assert!(!is_image_extension("gif"));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"), false);
        assert!(matches!(result, Err(LabelMatchError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_empty() {
        let temp_dir = tempdir().unwrap();
        assert!(scan_folder(temp_dir.path(), false).unwrap().is_empty());
    }

    #[test]
    fn test_scan_folder_sorted_and_filtered() {
        let temp_dir = tempdir().unwrap();
        for name in ["c.jpg", "a.PNG", "b.jpeg", "notes.txt"] {
            File::create(temp_dir.path().join(name)).unwrap();
        }

        let result = scan_folder(temp_dir.path(), false).unwrap();
        let names: Vec<&str> = result.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.PNG", "b.jpeg", "c.jpg"]);
    }

    #[test]
    fn test_scan_folder_recursive() {
        let temp_dir = tempdir().unwrap();
        let sub = temp_dir.path().join("monday");
        fs::create_dir_all(&sub).unwrap();
        File::create(temp_dir.path().join("top.jpg")).unwrap();
        File::create(sub.join("inner.jpg")).unwrap();

        assert_eq!(scan_folder(temp_dir.path(), false).unwrap().len(), 1);

        let result = scan_folder(temp_dir.path(), true).unwrap();
        let names: Vec<&str> = result.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["monday/inner.jpg", "top.jpg"]);
    }
}
