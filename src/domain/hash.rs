use std::{fmt::Display, fs::File, io, path::Path};

use md5::{Context, Digest};

/// MD5 digest of an audio file's content.
///
/// Sent along with a track so the server can match files
/// regardless of their path or tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(pub Digest);

impl ContentHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes))
    }

    pub fn to_hex(&self) -> String {
        format!("{:x}", self.0)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let mut context = Context::new();
        io::copy(&mut File::open(path)?, &mut context)?;
        Ok(Self(context.compute()))
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::ContentHash;

    #[test]
    fn known_md5_digest() {
        assert_eq!(
            ContentHash::from_bytes(b"hello").to_hex(),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn file_hash_matches_content_hash() {
        let tmp = tempfile::TempDir::new().unwrap();
        let song = tmp.path().join("song.mp3");
        std::fs::write(&song, b"hello").unwrap();

        let from_file = ContentHash::from_file(&song).unwrap();

        assert_eq!(from_file, ContentHash::from_bytes(b"hello"));
        assert_eq!(from_file.to_string(), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(ContentHash::from_file(&tmp.path().join("nope.flac")).is_err());
    }
}
