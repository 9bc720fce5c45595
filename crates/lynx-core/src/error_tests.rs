//! Tests for `error` module

use super::error::Error;

#[test]
fn test_error_codes_match_messages() {
    let errors = vec![
        Error::DimensionMismatch {
            expected: 768,
            actual: 512,
        },
        Error::EmptyInput("query"),
        Error::InvalidK(0),
        Error::NotTrained,
        Error::InsufficientData {
            needed: 100,
            available: 3,
        },
        Error::InvalidConfig("nprobe out of range".into()),
        Error::IdOutOfRange { id: 9, size: 4 },
        Error::InvalidVector("non-finite value in row 2".into()),
        Error::Snapshot("invalid magic number".into()),
        Error::Backend("embedding service unreachable".into()),
    ];

    for error in errors {
        // The code embedded in the display string matches `code()`.
        assert!(
            error.to_string().contains(error.code()),
            "message '{error}' does not carry code {}",
            error.code()
        );
    }
}

#[test]
fn test_dimension_mismatch_message() {
    let error = Error::DimensionMismatch {
        expected: 3,
        actual: 5,
    };
    assert_eq!(
        error.to_string(),
        "[LYNX-001] Vector dimension mismatch: expected 3, got 5"
    );
}

#[test]
fn test_recoverability() {
    assert!(Error::NotTrained.is_recoverable());
    assert!(Error::InvalidK(0).is_recoverable());
    assert!(!Error::Snapshot("corrupted".into()).is_recoverable());
    assert!(!Error::Backend("down".into()).is_recoverable());

    let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
    assert!(!io.is_recoverable());
}

#[test]
fn test_io_error_conversion() {
    fn fails() -> crate::error::Result<()> {
        let _ = std::fs::File::open("/nonexistent/lynx/path")?;
        Ok(())
    }

    assert!(matches!(fails(), Err(Error::Io(_))));
}
