//! Integration tests for logging, diagnostics and status reporting

use bridge_traits::time::LogLevel;
use core_runtime::diagnostics::DiagnosticLog;
use core_runtime::logging::{redact_if_sensitive, strip_path, LogFormat, LoggingConfig};
use core_runtime::status::StatusReporter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.redact_pii);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());

    #[cfg(debug_assertions)]
    assert_eq!(config.format, LogFormat::Pretty);
    #[cfg(not(debug_assertions))]
    assert_eq!(config.format, LogFormat::Json);
}

#[test]
fn test_credentials_never_survive_redaction() {
    assert_eq!(redact_if_sensitive("password", "correct horse"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("app_password", "abcd-efgh"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("authorization", "Basic Zm9vOmJhcg=="), "[REDACTED]");

    let user = redact_if_sensitive("username", "bob@cloud.example.org");
    assert!(!user.contains("cloud.example.org"));
}

#[test]
fn test_path_stripping_for_device_paths() {
    assert_eq!(
        strip_path("/storage/emulated/0/DCIM/Camera/IMG_20240101_120000.jpg"),
        "IMG_20240101_120000.jpg"
    );
    assert_eq!(strip_path("DCIM/Camera/PXL_1.dng"), "PXL_1.dng");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_status_and_diagnostics_together() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let status = StatusReporter::with_callback(Arc::new(move |_status: &str| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    let log = DiagnosticLog::upload();

    for i in 0..40 {
        status.report(format!("Uploaded {}/40", i + 1));
        log.push(format!("upload {}", i));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 40);
    assert_eq!(status.current(), "Uploaded 40/40");
    assert_eq!(log.len(), 30);
    assert_eq!(log.snapshot().last().unwrap().message, "upload 39");
}
