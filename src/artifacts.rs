use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

/// Input formats picked up from the assets directory.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "bmp"];

pub const GRID_FILE: &str = "detector-comparison.jpg";
pub const FINAL_FILE: &str = "detector-comparison-final.jpg";
const COMPOSITE_PREFIX: &str = "compare_";

/// True for files this tool writes, so reruns into the input directory do
/// not pick up their own output.
pub fn is_artifact(name: &str) -> bool {
    name == GRID_FILE || name == FINAL_FILE || name.starts_with(COMPOSITE_PREFIX)
}

/// Image files in `dir`, sorted by file name.
pub fn list_images(dir: &Path, prefix: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let supported = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()));
        if !supported {
            continue;
        }
        let name = file_name(&path);
        if is_artifact(&name) || prefix.is_some_and(|p| !name.starts_with(p)) {
            continue;
        }
        paths.push(path);
    }
    paths.sort_by_key(|p| file_name(p));
    Ok(paths)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Decode an image; any failure, I/O or format, is a [`BenchError::Decode`].
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let decode_err = |message: String| BenchError::Decode {
        path: path.to_path_buf(),
        message,
    };
    ImageReader::open(path)
        .map_err(|e| decode_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?
        .decode()
        .map_err(|e| decode_err(e.to_string()))
}

/// Write `image` as JPEG and return the file size in bytes.
pub fn save_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<u64> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
    image.write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(std::fs::metadata(path)?.len())
}

pub fn composite_path(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("{}{}.jpg", COMPOSITE_PREFIX, stem))
}
