//! Upload gate: type allow-list, size ceiling, and collision-free file naming.
//!
//! A file is accepted when its declared MIME type is listed **or** its
//! extension is listed. Content is never sniffed; stored files are opaque.

use std::sync::LazyLock;

use chrono::Utc;
use rand::Rng;
use regex::Regex;

use crate::errors::AppError;

pub const ALLOWED_MIME_TYPES: [&str; 4] = [
    "application/pdf",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.oasis.opendocument.spreadsheet",
];

pub const ALLOWED_EXTENSIONS: [&str; 4] = [".pdf", ".xls", ".xlsx", ".ods"];

pub const REJECTED_TYPE_MESSAGE: &str = "Only PDF, Excel (XLS, XLSX) and ODS files are allowed";

/// Longest stem kept in a stored name; with the suffix the name stays under
/// the 255-byte filename limit.
pub const MAX_STEM_BYTES: usize = 200;

/// Longer or unusual extensions are dropped from the stored name.
const MAX_EXT_BYTES: usize = 16;

const SUFFIX_RANGE: std::ops::RangeInclusive<u32> = 100_000_000..=999_999_999;

static UNSAFE_STEM_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static pattern"));

/// Why an upload was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("{}", REJECTED_TYPE_MESSAGE)]
    DisallowedType,

    #[error("File exceeds the maximum upload size of {limit} bytes")]
    TooLarge { limit: usize },
}

impl From<UploadRejection> for AppError {
    fn from(rejection: UploadRejection) -> Self {
        match rejection {
            UploadRejection::DisallowedType => AppError::Validation(rejection.to_string()),
            UploadRejection::TooLarge { .. } => AppError::PayloadTooLarge(rejection.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadGate {
    max_bytes: usize,
}

impl UploadGate {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Accept if the MIME type is listed or the extension is listed.
    pub fn check_type(&self, declared_mime: &str, filename: &str) -> Result<(), UploadRejection> {
        if mime_allowed(declared_mime) || extension_allowed(filename) {
            Ok(())
        } else {
            Err(UploadRejection::DisallowedType)
        }
    }

    pub fn check_size(&self, len: usize) -> Result<(), UploadRejection> {
        if len > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Start an in-memory buffer that refuses to grow past the ceiling.
    pub fn buffer(&self) -> UploadBuffer {
        UploadBuffer {
            bytes: Vec::new(),
            gate: self.clone(),
        }
    }

    /// `{stem}-{millis}-{nine random digits}{ext}` for the given original name.
    pub fn destination_name(&self, filename: &str) -> String {
        let suffix = rand::thread_rng().gen_range(SUFFIX_RANGE);
        destination_name_at(filename, Utc::now().timestamp_millis(), suffix)
    }
}

/// Accumulates streamed chunks, checking the ceiling before each append.
#[derive(Debug)]
pub struct UploadBuffer {
    bytes: Vec<u8>,
    gate: UploadGate,
}

impl UploadBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), UploadRejection> {
        self.gate.check_size(self.bytes.len() + chunk.len())?;
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn mime_allowed(declared: &str) -> bool {
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_MIME_TYPES.contains(&essence.as_str())
}

fn extension_allowed(filename: &str) -> bool {
    let (_, ext) = split_name(filename);
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

/// Split the final path component into stem and extension (dot included).
/// Leading-dot names such as `.env` have no extension.
fn split_name(filename: &str) -> (&str, &str) {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    match base.rfind('.') {
        Some(idx) if idx > 0 => (&base[..idx], &base[idx..]),
        _ => (base, ""),
    }
}

fn destination_name_at(filename: &str, millis: i64, suffix: u32) -> String {
    let (stem, ext) = split_name(filename);
    // Every non-ASCII char is replaced, so byte truncation is char-safe.
    let mut stem = UNSAFE_STEM_CHARS.replace_all(stem, "_").into_owned();
    stem.truncate(MAX_STEM_BYTES);
    if stem.is_empty() {
        stem.push_str("file");
    }
    let ext = if ext.len() <= MAX_EXT_BYTES && !UNSAFE_STEM_CHARS.is_match(ext) {
        ext
    } else {
        ""
    };
    format!("{stem}-{millis}-{suffix}{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_UPLOAD_BYTES;

    fn gate() -> UploadGate {
        UploadGate::new(DEFAULT_MAX_UPLOAD_BYTES)
    }

    const OTHER_MIMES: [&str; 5] = [
        "application/octet-stream",
        "text/plain",
        "image/png",
        "application/x-msdownload",
        "",
    ];

    #[test]
    fn listed_extension_accepted_for_any_mime() {
        for ext in ALLOWED_EXTENSIONS {
            for mime in OTHER_MIMES {
                let name = format!("week1-notes{ext}");
                assert!(gate().check_type(mime, &name).is_ok(), "{name} as {mime}");
            }
        }
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(gate().check_type("text/plain", "REPORT.PDF").is_ok());
        assert!(gate().check_type("text/plain", "Marks.XlsX").is_ok());
    }

    #[test]
    fn listed_mime_accepted_for_any_extension() {
        for mime in ALLOWED_MIME_TYPES {
            for name in ["payload.exe", "script.sh", "noextension", ".hidden"] {
                assert!(gate().check_type(mime, name).is_ok(), "{name} as {mime}");
            }
        }
    }

    #[test]
    fn mime_parameters_and_case_ignored() {
        assert!(gate()
            .check_type("Application/PDF; charset=binary", "x.bin")
            .is_ok());
    }

    #[test]
    fn unlisted_pair_rejected_with_fixed_message() {
        let err = gate().check_type("image/png", "photo.png").unwrap_err();
        assert_eq!(err, UploadRejection::DisallowedType);
        assert_eq!(err.to_string(), REJECTED_TYPE_MESSAGE);
    }

    #[test]
    fn dotfile_has_no_extension() {
        assert!(gate().check_type("text/plain", ".pdf").is_err());
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(gate().check_size(DEFAULT_MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            gate().check_size(DEFAULT_MAX_UPLOAD_BYTES + 1),
            Err(UploadRejection::TooLarge {
                limit: DEFAULT_MAX_UPLOAD_BYTES
            })
        );
    }

    #[test]
    fn buffer_refuses_chunk_that_crosses_ceiling() {
        let mut buffer = UploadGate::new(10).buffer();
        buffer.push(b"12345").unwrap();
        buffer.push(b"67890").unwrap();
        assert!(buffer.push(b"x").is_err());
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.into_bytes(), b"1234567890".to_vec());
    }

    #[test]
    fn rejections_map_to_app_errors() {
        let err: AppError = UploadRejection::TooLarge { limit: 1 }.into();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        let err: AppError = UploadRejection::DisallowedType.into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn destination_name_layout() {
        assert_eq!(
            destination_name_at("Lecture 3.pdf", 1_700_000_000_123, 123_456_789),
            "Lecture_3-1700000000123-123456789.pdf"
        );
        assert_eq!(
            destination_name_at("../../etc/passwd", 1, 100_000_000),
            "passwd-1-100000000"
        );
        assert_eq!(
            destination_name_at("C:\\Users\\ama\\grades.XLSX", 5, 999_999_999),
            "grades-5-999999999.XLSX"
        );
    }

    #[test]
    fn long_names_fit_filesystem_limit() {
        let long = format!("{}.pdf", "a".repeat(300));
        let name = destination_name_at(&long, 1_700_000_000_123, 123_456_789);
        assert!(name.len() < 255, "{} bytes", name.len());
        assert!(name.starts_with(&"a".repeat(MAX_STEM_BYTES)));
        assert!(name.ends_with("-1700000000123-123456789.pdf"));

        let accented = format!("{}.xlsx", "é".repeat(300));
        assert!(destination_name_at(&accented, 1, 100_000_000).len() < 255);
    }

    #[test]
    fn oversized_or_odd_extension_dropped() {
        let long_ext = format!("notes.{}", "x".repeat(300));
        assert_eq!(
            destination_name_at(&long_ext, 1, 100_000_000),
            "notes-1-100000000"
        );
        assert_eq!(
            destination_name_at("notes.p df", 1, 100_000_000),
            "notes-1-100000000"
        );
    }

    #[test]
    fn destination_name_has_nine_digit_suffix() {
        let pattern = Regex::new(r"^notes-\d+-\d{9}\.pdf$").unwrap();
        for _ in 0..50 {
            let name = gate().destination_name("notes.pdf");
            assert!(pattern.is_match(&name), "{name}");
        }
    }

    #[test]
    fn same_original_name_yields_distinct_destinations() {
        let first = gate().destination_name("syllabus.pdf");
        let second = gate().destination_name("syllabus.pdf");
        assert_ne!(first, second);
    }
}
