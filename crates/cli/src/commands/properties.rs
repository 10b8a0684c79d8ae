//! Properties command - show advertised capabilities

use anyhow::Result;
use nim_vision_domain::{CallOptions, VisionService};
use std::path::PathBuf;

use super::build_service;
use crate::args::PropertiesArgs;
use crate::config::AppConfig;

pub async fn execute(args: PropertiesArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let service = build_service(&config)?;

    let properties = service.get_properties(&CallOptions::default());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&properties)?);
    } else {
        println!("classifications: {}", properties.classifications_supported);
        println!("detections: {}", properties.detections_supported);
        println!(
            "object point clouds: {}",
            properties.object_point_clouds_supported
        );
    }

    Ok(())
}
