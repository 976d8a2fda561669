use std::path::Path;

use crate::recognition::domain::face_embedder::FaceEmbedder;
use crate::recognition::domain::gallery::{identity_from_stem, Gallery};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Build the identity gallery from a directory of reference photos.
///
/// Each file enrolls one embedding under the identity derived from its
/// stem (`alice_1.jpg` → `alice`). Hidden files and non-image extensions
/// are skipped silently; unreadable or undecodable images are skipped
/// with a warning so a single bad file never aborts startup.
pub fn load_gallery(
    dir: &Path,
    embedder: &mut dyn FaceEmbedder,
) -> Result<Gallery, Box<dyn std::error::Error>> {
    let mut gallery = Gallery::new();

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    // Deterministic enrollment order regardless of directory order
    paths.sort();

    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || !has_image_extension(&path) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let identity = identity_from_stem(stem).to_string();

        let image = match image::open(&path) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                log::warn!("skipping unreadable gallery image {}: {e}", path.display());
                continue;
            }
        };
        let (w, h) = image.dimensions();
        let frame = Frame::new(image.into_raw(), w, h, 0);

        match embedder.embed(&frame) {
            Ok(embedding) => gallery.insert(identity, embedding),
            Err(e) => {
                log::warn!("skipping gallery image {}: embedding failed: {e}", path.display());
            }
        }
    }

    log::info!(
        "loaded known identities: [{}]",
        gallery.identities().collect::<Vec<_>>().join(", ")
    );
    Ok(gallery)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::domain::embedding::Embedding;
    use std::fs;
    use tempfile::TempDir;

    /// Embedder stub that returns the crop's first pixel as a 1-D key.
    struct StubEmbedder;

    impl FaceEmbedder for StubEmbedder {
        fn embed(&mut self, crop: &Frame) -> Result<Embedding, Box<dyn std::error::Error>> {
            Ok(Embedding::new(vec![crop.data()[0] as f32, 1.0]))
        }
    }

    fn write_png(dir: &Path, name: &str, value: u8) {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([value, 0, 0]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_groups_photos_by_identity() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "alice_1.png", 10);
        write_png(tmp.path(), "alice_2.png", 20);
        write_png(tmp.path(), "bob.png", 30);

        let gallery = load_gallery(tmp.path(), &mut StubEmbedder).unwrap();
        assert_eq!(gallery.identity_count(), 2);
        let names: Vec<_> = gallery.identities().collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_skips_hidden_and_non_image_files() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "alice.png", 10);
        write_png(tmp.path(), ".hidden.png", 20);
        fs::write(tmp.path().join("notes.txt"), b"not an image").unwrap();

        let gallery = load_gallery(tmp.path(), &mut StubEmbedder).unwrap();
        assert_eq!(gallery.identity_count(), 1);
    }

    #[test]
    fn test_corrupt_image_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        write_png(tmp.path(), "alice.png", 10);
        fs::write(tmp.path().join("broken.jpg"), b"garbage bytes").unwrap();

        let gallery = load_gallery(tmp.path(), &mut StubEmbedder).unwrap();
        assert_eq!(gallery.identity_count(), 1);
        assert_eq!(gallery.identities().next(), Some("alice"));
    }

    #[test]
    fn test_empty_directory_yields_empty_gallery() {
        let tmp = TempDir::new().unwrap();
        let gallery = load_gallery(tmp.path(), &mut StubEmbedder).unwrap();
        assert!(gallery.is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(load_gallery(&missing, &mut StubEmbedder).is_err());
    }

    #[test]
    fn test_uppercase_extension_accepted() {
        let tmp = TempDir::new().unwrap();
        // image crate infers format from extension; PNG content under .PNG
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3]));
        img.save_with_format(tmp.path().join("carol.PNG"), image::ImageFormat::Png)
            .unwrap();

        let gallery = load_gallery(tmp.path(), &mut StubEmbedder).unwrap();
        assert_eq!(gallery.identities().next(), Some("carol"));
    }
}
