//! Local image uploads
//!
//! A picked file is probed first (name, size, sniffed MIME type) so it can be
//! rejected before any large read. Accepted files are read on a helper thread
//! and delivered over a channel; the UI polls the [`PendingUpload`] once per
//! frame and applies the result in a single editor write.

use crate::config::Settings;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, warn};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

/// Bytes read from the start of a file to sniff its format.
const SNIFF_LEN: u64 = 64;

/// MIME type used when the format cannot be determined.
const UNKNOWN_MIME: &str = "application/octet-stream";

// ─────────────────────────────────────────────────────────────────────────────
// Limits
// ─────────────────────────────────────────────────────────────────────────────

/// Upload constraints enforced before an image is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest accepted file, in bytes
    pub max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: Settings::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl From<&Settings> for UploadLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            max_bytes: settings.max_upload_bytes,
        }
    }
}

fn check(mime_type: &str, byte_size: u64, limits: UploadLimits) -> Result<()> {
    if !mime_type.starts_with("image/") {
        return Err(Error::UnsupportedImageType {
            mime: mime_type.to_string(),
        });
    }
    if byte_size > limits.max_bytes {
        return Err(Error::ImageTooLarge {
            size: byte_size,
            max: limits.max_bytes,
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// File Selection
// ─────────────────────────────────────────────────────────────────────────────

/// A fully read file, ready to be embedded in a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    /// File name, used as the image's alt text
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub data: Vec<u8>,
}

impl FileSelection {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            byte_size: data.len() as u64,
            data,
        }
    }

    /// Read a whole file, sniffing its MIME type from the content.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let header_len = data.len().min(SNIFF_LEN as usize);
        let mime_type = sniff_mime_type(&data[..header_len], path);
        Ok(Self::new(file_name(path), mime_type, data))
    }

    /// Reject files that are not images or exceed the size limit.
    pub fn validate(&self, limits: UploadLimits) -> Result<()> {
        check(&self.mime_type, self.byte_size, limits)
    }

    /// Embed the file as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// Payload bytes of a base64 `data:` URL, or `None` for any other source.
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

/// Metadata of a picked file, gathered without reading its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
}

impl FileInfo {
    /// Read the file size and sniff its MIME type from the first bytes.
    pub fn probe(path: &Path) -> Result<Self> {
        let read_error = |source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_error)?;
        let byte_size = file.metadata().map_err(read_error)?.len();

        let mut header = Vec::with_capacity(SNIFF_LEN as usize);
        file.take(SNIFF_LEN)
            .read_to_end(&mut header)
            .map_err(read_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            name: file_name(path),
            mime_type: sniff_mime_type(&header, path),
            byte_size,
        })
    }

    pub fn validate(&self, limits: UploadLimits) -> Result<()> {
        check(&self.mime_type, self.byte_size, limits)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("imagem")
        .to_string()
}

/// Determine a MIME type from magic bytes, falling back to the extension
/// for formats without a reliable signature (SVG).
pub fn sniff_mime_type(header: &[u8], path: &Path) -> String {
    if let Ok(format) = image::guess_format(header) {
        return format.to_mime_type().to_string();
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("svg") => "image/svg+xml".to_string(),
        Some("txt") => "text/plain".to_string(),
        _ => UNKNOWN_MIME.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Background Read
// ─────────────────────────────────────────────────────────────────────────────

/// A file read running on a helper thread.
///
/// Dropping the handle discards the result once it arrives.
#[derive(Debug)]
pub struct PendingUpload {
    info: FileInfo,
    receiver: Receiver<Result<FileSelection>>,
}

impl PendingUpload {
    /// Start reading a probed file. Validation is the caller's job.
    pub fn start(info: FileInfo) -> Self {
        let (tx, rx) = channel();
        let path = info.path.clone();

        thread::spawn(move || {
            let result = FileSelection::from_path(&path);
            // The receiver is gone if the dialog was closed
            if tx.send(result).is_err() {
                debug!("Discarding late upload for {}", path.display());
            }
        });

        Self { info, receiver: rx }
    }

    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    /// Non-blocking check for the finished read.
    pub fn poll(&self) -> Option<Result<FileSelection>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("Upload worker for {} stopped", self.info.path.display());
                Some(Err(Error::Application(format!(
                    "Reading '{}' was interrupted",
                    self.info.name
                ))))
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn wait_for(upload: &PendingUpload) -> Result<FileSelection> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = upload.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "upload never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_rejects_non_image() {
        let file = FileSelection::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = file.validate(UploadLimits::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedImageType { ref mime } if mime == "text/plain"));
    }

    #[test]
    fn test_rejects_oversized_image() {
        let limits = UploadLimits { max_bytes: 4 };
        let file = FileSelection::new("big.png", "image/png", vec![0; 5]);
        assert!(matches!(
            file.validate(limits),
            Err(Error::ImageTooLarge { size: 5, max: 4 })
        ));
        let file = FileSelection::new("ok.png", "image/png", vec![0; 4]);
        assert!(file.validate(limits).is_ok());
    }

    #[test]
    fn test_default_limit_is_five_mib() {
        assert_eq!(UploadLimits::default().max_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_data_url() {
        let file = FileSelection::new("a.png", "image/png", b"abc".to_vec());
        assert_eq!(file.to_data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_decode_data_url() {
        let file = FileSelection::new("a.png", "image/png", PNG_HEADER.to_vec());
        assert_eq!(decode_data_url(&file.to_data_url()).unwrap(), PNG_HEADER);
        assert!(decode_data_url("http://x/y.png").is_none());
        assert!(decode_data_url("data:text/plain,hello").is_none());
        assert!(decode_data_url("data:image/png;base64,@@@").is_none());
    }

    #[test]
    fn test_sniff_mime_type() {
        assert_eq!(sniff_mime_type(PNG_HEADER, Path::new("x.bin")), "image/png");
        assert_eq!(sniff_mime_type(b"<svg", Path::new("logo.SVG")), "image/svg+xml");
        assert_eq!(sniff_mime_type(b"plain", Path::new("a.txt")), "text/plain");
        assert_eq!(sniff_mime_type(b"plain", Path::new("a")), UNKNOWN_MIME);
    }

    #[test]
    fn test_probe_and_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("figura.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let info = FileInfo::probe(&path).unwrap();
        assert_eq!(info.name, "figura.png");
        assert_eq!(info.mime_type, "image/png");
        assert_eq!(info.byte_size, PNG_HEADER.len() as u64);
        assert!(info.validate(UploadLimits::default()).is_ok());

        let upload = PendingUpload::start(info);
        let file = wait_for(&upload).unwrap();
        assert_eq!(file.data, PNG_HEADER);
        assert_eq!(file.mime_type, "image/png");
    }

    #[test]
    fn test_from_path_sniffs_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sem-extensao");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let file = FileSelection::from_path(&path).unwrap();
        assert_eq!(file.name, "sem-extensao");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.byte_size, PNG_HEADER.len() as u64);
    }

    #[test]
    fn test_probe_missing_file() {
        let err = FileInfo::probe(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_read_failure_is_reported() {
        let info = FileInfo {
            path: PathBuf::from("/definitely/not/here.png"),
            name: "here.png".to_string(),
            mime_type: "image/png".to_string(),
            byte_size: 1,
        };
        let upload = PendingUpload::start(info);
        assert!(matches!(wait_for(&upload), Err(Error::FileRead { .. })));
    }
}
