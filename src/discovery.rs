//! Candidate discovery - flat listing of image files in a folder

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::pipeline::MosaicError;

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| {
            IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Lists image files directly inside `folder`. A missing folder yields an
/// empty list.
pub fn list_candidates(folder: &Path) -> Result<Vec<PathBuf>, MosaicError> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };

    let mut candidates = vec![];
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_image_path(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert!(is_image_path(Path::new("a.jpg")));
        assert!(is_image_path(Path::new("a.JPEG")));
        assert!(is_image_path(Path::new("dir/b.WebP")));
        assert!(is_image_path(Path::new("c.Gif")));
        assert!(!is_image_path(Path::new("d.bmp")));
        assert!(!is_image_path(Path::new("png")));
        assert!(!is_image_path(Path::new("notes.txt")));
    }

    #[test]
    fn test_lists_only_top_level_images() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.JPG", "c.txt", "d.webp"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        fs::write(dir.path().join("nested.png").join("e.png"), b"x").unwrap();

        let found = list_candidates(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "d.webp"]);
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let found = list_candidates(&dir.path().join("absent")).unwrap();
        assert!(found.is_empty());
    }
}
