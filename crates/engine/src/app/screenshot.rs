use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    FrameSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to encode screenshot: {0}")]
    Encode(#[source] ImageError),
    #[error("failed to write screenshot to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScreenshotError> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(ScreenshotError::FrameSize {
            width,
            height,
            expected,
            actual: rgba.len(),
        });
    }
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(rgba, width, height, ExtendedColorType::Rgba8)
        .map_err(ScreenshotError::Encode)?;
    Ok(bytes)
}

pub fn screenshot_file_name(at: SystemTime) -> String {
    let since_epoch = at.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!(
        "mapview_{}_{:03}.png",
        since_epoch.as_secs(),
        since_epoch.subsec_millis()
    )
}

/// Encodes the frame and writes it under `dir`, returning the final path.
pub fn save_screenshot(
    dir: &Path,
    rgba: &[u8],
    width: u32,
    height: u32,
) -> Result<PathBuf, ScreenshotError> {
    let bytes = encode_png(rgba, width, height)?;
    let path = dir.join(screenshot_file_name(SystemTime::now()));
    write_bytes_atomic(&path, &bytes).map_err(|source| ScreenshotError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, bytes)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "screenshot.png".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn encode_rejects_mismatched_frame() {
        let err = encode_png(&[0; 12], 2, 2).expect_err("size mismatch");
        assert!(matches!(
            err,
            ScreenshotError::FrameSize {
                expected: 16,
                actual: 12,
                ..
            }
        ));
    }

    #[test]
    fn encoded_png_decodes_to_same_pixels() {
        let rgba: Vec<u8> = (0..3 * 2)
            .flat_map(|i| [i as u8 * 10, 40, 200, 255])
            .collect();
        let bytes = encode_png(&rgba, 3, 2).expect("encode");
        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.into_raw(), rgba);
    }

    #[test]
    fn file_name_is_timestamped() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_042);
        assert_eq!(screenshot_file_name(at), "mapview_1700000000_042.png");
    }

    #[test]
    fn save_creates_directory_and_leaves_no_temp_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("screenshots");
        let path = save_screenshot(&dir, &[40; 2 * 2 * 4], 2, 2).expect("save");

        assert!(path.is_file());
        assert_eq!(path.parent(), Some(dir.as_path()));
        let leftovers: Vec<_> = fs::read_dir(&dir)
            .expect("read dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
