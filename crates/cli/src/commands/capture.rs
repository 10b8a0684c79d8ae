//! Capture command - grab a camera frame, optionally save and classify it

use anyhow::{Context, Result};
use nim_vision_domain::{CallOptions, CaptureOptions, Classification, VisionService};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use super::{build_service, print_classifications};
use crate::args::CaptureArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct CaptureReport {
    camera: String,
    image_bytes: usize,
    mime_type: Option<String>,
    saved_to: Option<PathBuf>,
    classifications: Option<Vec<Classification>>,
}

pub async fn execute(args: CaptureArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let service = build_service(&config)?;

    let capture = CaptureOptions {
        return_image: true,
        return_classifications: !args.no_classify,
    };
    let options = CallOptions {
        question: args.question.clone(),
        timeout: args.timeout_secs.map(Duration::from_secs),
    };

    let result = service
        .capture_all_from_camera(&args.camera, capture, &options)
        .await
        .context("Capture failed")?;

    let image = result
        .image
        .context("Camera returned no image")?;

    if let Some(ref path) = args.save_image {
        tokio::fs::write(path, &image.bytes)
            .await
            .with_context(|| format!("Failed to write image: {}", path.display()))?;
    }

    let report = CaptureReport {
        camera: args.camera.clone(),
        image_bytes: image.bytes.len(),
        mime_type: image.mime_type.clone(),
        saved_to: args.save_image.clone(),
        classifications: result.classifications,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Captured {} bytes from camera '{}'", report.image_bytes, report.camera);
        if let Some(ref path) = report.saved_to {
            println!("Saved to {}", path.display());
        }
        if let Some(ref classifications) = report.classifications {
            print_classifications(classifications);
        }
    }

    Ok(())
}
