//! Classify command - one-shot classification of an image or camera frame

use anyhow::{Context, Result, bail};
use nim_vision_domain::{CallOptions, RasterImage, VisionService};
use std::path::PathBuf;
use std::time::Duration;

use super::{build_service, print_classifications};
use crate::args::ClassifyArgs;
use crate::config::AppConfig;

pub async fn execute(args: ClassifyArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let service = build_service(&config)?;

    let options = CallOptions {
        question: args.question.clone(),
        timeout: args.timeout_secs.map(Duration::from_secs),
    };

    let classifications = match (&args.image, &args.camera) {
        (Some(path), _) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read image: {}", path.display()))?;

            tracing::info!(path = %path.display(), bytes = bytes.len(), "Classifying image file");

            service
                .get_classifications(&RasterImage::new(bytes), args.count, &options)
                .await
        }
        (None, Some(camera)) => {
            tracing::info!(camera = %camera, "Classifying camera frame");

            service
                .get_classifications_from_camera(camera, args.count, &options)
                .await
        }
        (None, None) => bail!("Either --image or --camera is required"),
    }
    .context("Classification failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&classifications)
            .context("Failed to serialize output")?;
        println!("{}", json);
    } else {
        print_classifications(&classifications);
    }

    Ok(())
}
