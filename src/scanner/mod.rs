use crate::analyzer::ImageInput;
use crate::error::{CorrosionError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

impl ImageInfo {
    fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            file_name,
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map_or(false, |ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Images directly inside `folder` (not recursive), sorted by file name.
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(CorrosionError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_image_path(e.path()))
        .map(|e| ImageInfo::from_path(e.path()))
        .collect();

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// Expand command-line paths into images.
///
/// Folders contribute their images sorted by name; files are kept in the
/// order given and must have a supported extension.
pub fn collect_images(paths: &[PathBuf]) -> Result<Vec<ImageInfo>> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_dir() {
            images.extend(scan_folder(path)?);
        } else if path.is_file() {
            if !is_image_path(path) {
                return Err(CorrosionError::UnsupportedImage(path.display().to_string()));
            }
            images.push(ImageInfo::from_path(path));
        } else {
            return Err(CorrosionError::FileNotFound(path.display().to_string()));
        }
    }

    Ok(images)
}

/// Read image bytes, keyed by file name.
pub fn load_images(images: &[ImageInfo]) -> Result<Vec<ImageInput>> {
    images
        .iter()
        .map(|img| -> Result<ImageInput> {
            let bytes = std::fs::read(&img.path)?;
            Ok((img.file_name.clone(), bytes))
        })
        .collect()
}
