//! # Backup Demo
//!
//! Backs up photos below the home directory to a Nextcloud server using the
//! desktop bridges.
//!
//! ```text
//! NEXTCLOUD_URL=https://cloud.example.com \
//! NEXTCLOUD_USER=alice \
//! NEXTCLOUD_PASSWORD=app-password \
//! PHOTO_DIRS=Pictures,DCIM/Camera \
//! cargo run --example backup_demo --package core-service
//! ```

use anyhow::{bail, Context};
use core_runtime::logging::{init_logging, LoggingConfig};
use core_service::{BackupEvent, BackupService, CoreConfig, CoreEvent, ServerCredentials};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default()).context("initialising logging")?;

    let credentials = ServerCredentials::new(
        env::var("NEXTCLOUD_URL").context("NEXTCLOUD_URL is not set")?,
        env::var("NEXTCLOUD_USER").context("NEXTCLOUD_USER is not set")?,
        env::var("NEXTCLOUD_PASSWORD").context("NEXTCLOUD_PASSWORD is not set")?,
    );
    let sources = env::var("PHOTO_DIRS").unwrap_or_else(|_| "Pictures".to_string());
    let target = env::var("TARGET_DIR").unwrap_or_else(|_| "/Photos/Backup".to_string());

    let config = CoreConfig::builder()
        .source_directories(sources.split(',').map(str::trim))
        .target_directory(target)
        .build()?;
    let service = BackupService::new(config);

    let report = service.test_connection(&credentials).await?;
    println!(
        "Server: {} {} (maintenance: {})",
        report.server.product_name, report.server.version, report.server.maintenance
    );
    if !report.authenticated {
        bail!("server rejected the credentials");
    }
    service.save_credentials(&credentials).await?;

    let mut events = service.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                CoreEvent::Backup(BackupEvent::FileUploaded {
                    file_name,
                    bytes,
                    elapsed_ms,
                    ..
                }) => println!("  uploaded {} ({} bytes, {} ms)", file_name, bytes, elapsed_ms),
                CoreEvent::Backup(BackupEvent::FileFailed {
                    file_name, message, ..
                }) => println!("  failed {}: {}", file_name, message),
                other => println!("{}", other.description()),
            }
        }
    });

    let summary = service.run_backup(false).await?;
    println!(
        "Done: {} uploaded, {} skipped, {} failed of {}",
        summary.uploaded, summary.skipped, summary.failed, summary.total
    );

    drop(service);
    printer.await?;
    Ok(())
}
