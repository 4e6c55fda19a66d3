//! Inputs the scenarios send. The photos are compiled in and unpacked on
//! demand, so the suite runs from any working directory.

use std::path::Path;

use tempfile::TempDir;

pub const INVALID_EMAIL: &str = "vasja@pupkin.com";
pub const INVALID_PASSWORD: &str = "00000000";
pub const INVALID_KEY: &str = "12345";

pub const VALID_PHOTO: &str = "cat1.jpg";
/// Plain text behind an image extension.
pub const NOT_A_PHOTO: &str = "not_photo.jpg";

const PHOTOS: [(&str, &[u8]); 2] = [
    (VALID_PHOTO, include_bytes!("../assets/cat1.jpg")),
    (NOT_A_PHOTO, include_bytes!("../assets/not_photo.jpg")),
];

/// Writes the bundled photos into a fresh temporary directory, removed
/// when the returned guard drops.
pub fn unpack_photos() -> std::io::Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix("petfriends-photos")
        .tempdir()?;

    write_photos(dir.path())?;
    tracing::debug!(dir = %dir.path().display(), "unpacked bundled photos");

    Ok(dir)
}

fn write_photos(dir: &Path) -> std::io::Result<()> {
    for (name, bytes) in PHOTOS {
        std::fs::write(dir.join(name), bytes)?;
    }
    Ok(())
}
