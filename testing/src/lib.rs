use std::path::PathBuf;

use tracing::Level;

pub mod fixtures;
pub mod mock;

pub use mock::MockPetFriends;

pub fn logging() {
    use std::sync::Once;

    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_test_writer()
            .init();
    });
}

/// The photo assets in the workspace checkout: `cat1.jpg` (a valid JPEG) and
/// `not_photo.jpg` (plain text with an image extension). The suite embeds the
/// same files, see `petfriends_test_suite::fixtures`.
pub fn images_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../test-suite/assets")
}

pub fn image(name: &str) -> PathBuf {
    images_dir().join(name)
}
