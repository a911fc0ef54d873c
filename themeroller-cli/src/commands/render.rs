//! Render command - generate images and copy them into a directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use themeroller::service::ImageService;
use themeroller::RenderedImage;
use tracing::{info, warn};

use super::common::{load_config, ServiceArgs};
use crate::error::CliError;

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Canonical filenames, e.g. ui-icons_222222_256x240.png
    #[arg(required = true, value_name = "FILENAME")]
    pub filenames: Vec<String>,

    /// Output directory
    #[arg(long, short, default_value = ".", value_name = "DIR")]
    pub out: PathBuf,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// Run the render command.
pub fn run(args: RenderArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let service_config = args.service.resolve(&config)?;

    for dir in [&service_config.cache_dir, &args.out] {
        std::fs::create_dir_all(dir).map_err(|source| CliError::Write {
            path: dir.clone(),
            source,
        })?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async {
        let service = ImageService::start(service_config).await?;
        render_all(&service, &args.filenames, &args.out).await
    })
}

async fn render_all(
    service: &ImageService,
    filenames: &[String],
    out: &Path,
) -> Result<(), CliError> {
    let start = Instant::now();
    let results =
        futures::future::join_all(filenames.iter().map(|name| service.get_filename(name))).await;

    let mut failed = 0;
    for (name, result) in filenames.iter().zip(results) {
        match result {
            Ok(image) => {
                let path = write_image(out, &image)?;
                println!("{} ({} bytes)", path.display(), image.data.len());
            }
            Err(e) => {
                warn!(filename = %name, error = %e, "Failed to render");
                eprintln!("{}: {}", name, e);
                failed += 1;
            }
        }
    }

    info!(
        total = filenames.len(),
        failed,
        duration_ms = start.elapsed().as_millis() as u64,
        metrics = %service.metrics(),
        "Render finished"
    );

    if failed > 0 {
        return Err(CliError::Render {
            failed,
            total: filenames.len(),
        });
    }
    Ok(())
}

fn write_image(out: &Path, image: &RenderedImage) -> Result<PathBuf, CliError> {
    let path = out.join(&image.filename);
    std::fs::write(&path, &image.data).map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(filename: &str, data: &'static [u8]) -> RenderedImage {
        RenderedImage {
            filename: filename.to_string(),
            data: data.into(),
        }
    }

    #[test]
    fn test_write_image_uses_canonical_filename() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = write_image(
            temp.path(),
            &image("ui-icons_222222_256x240.png", b"\x89PNG"),
        )
        .unwrap();

        assert_eq!(path, temp.path().join("ui-icons_222222_256x240.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_write_image_reports_missing_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = write_image(&temp.path().join("absent"), &image("a.png", b"x")).unwrap_err();
        assert!(matches!(err, CliError::Write { .. }));
    }

    #[tokio::test]
    async fn test_render_all_reports_invalid_filenames() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = themeroller::ServiceConfig::new(temp.path(), temp.path());
        let service = ImageService::start(config).await.unwrap();

        let err = render_all(&service, &["favicon.ico".to_string()], temp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Render { failed: 1, total: 1 }));
    }
}
