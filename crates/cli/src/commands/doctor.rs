//! Doctor command - validate configuration and show status

use anyhow::Result;
use nim_vision_adapters::camera::FsCameraProvider;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    provider: CheckResult,
    cameras: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        provider: CheckResult::error("Not checked"),
        cameras: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    if let Some(config) = check_config(&mut report, config_path) {
        report.provider = check_provider(&config);
        report.cameras = check_cameras(&config);
    }

    let checks = [&report.config, &report.provider, &report.cameras];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_config(report: &mut DoctorReport, config_path: Option<PathBuf>) -> Option<AppConfig> {
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            return None;
        }
    };

    let problems = config.problems();
    report.config = if problems.is_empty() {
        CheckResult::ok("Configuration is valid")
    } else {
        CheckResult::error(format!("{} problem(s) found", problems.len()))
            .with_details(serde_json::json!({ "problems": problems }))
    };

    Some(config)
}

fn check_provider(config: &AppConfig) -> CheckResult {
    let vision = &config.vision;

    match vision.provider.as_str() {
        "stub" => CheckResult::warn("Provider: stub (offline, replies are canned)"),
        "nim" => {
            if vision.api_key.trim().is_empty() {
                return CheckResult::error(format!(
                    "Provider: nim, Model: {}, API key: not set",
                    vision.model_name
                ));
            }

            CheckResult::ok(format!(
                "Provider: nim, Model: {}, API key: (set)",
                vision.model_name
            ))
            .with_details(serde_json::json!({
                "invoke_url": vision.invoke_url,
                "max_tokens": vision.max_tokens,
                "temperature": vision.temperature,
                "top_p": vision.top_p,
            }))
        }
        other => CheckResult::error(format!("Unknown provider: {}", other)),
    }
}

fn check_cameras(config: &AppConfig) -> CheckResult {
    let cameras = &config.vision.cameras;
    if cameras.is_empty() {
        return CheckResult::ok("No cameras configured");
    }

    let provider = FsCameraProvider::new(&config.general.camera_dir);
    let missing: Vec<&str> = cameras
        .iter()
        .filter(|name| provider.frame_path(name).is_none())
        .map(|name| name.as_str())
        .collect();

    let details = serde_json::json!({
        "camera_dir": provider.camera_dir(),
        "configured": cameras,
        "missing_frames": missing,
    });

    if missing.is_empty() {
        CheckResult::ok(format!("{} camera(s) with frames available", cameras.len()))
            .with_details(details)
    } else {
        CheckResult::warn(format!(
            "No frame found for: {} (in {})",
            missing.join(", "),
            provider.camera_dir().display()
        ))
        .with_details(details)
    }
}

fn print_report(report: &DoctorReport) {
    println!("nim-vision Doctor Report");
    println!("========================");
    println!();

    print_check("Config", &report.config);
    if let Some(problems) = report
        .config
        .details
        .as_ref()
        .and_then(|d| d.get("problems"))
        .and_then(|p| p.as_array())
    {
        for problem in problems {
            println!("    - {}", problem.as_str().unwrap_or_default());
        }
    }
    print_check("Provider", &report.provider);
    print_check("Cameras", &report.cameras);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: nim-vision classify --image <file>");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_provider_reports_missing_key() {
        let config = AppConfig::default();
        assert!(check_provider(&config).is_error());
    }

    #[test]
    fn test_check_cameras_reports_missing_frames() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("front.png"), b"frame").unwrap();

        let mut config = AppConfig::default();
        config.general.camera_dir = dir.path().to_path_buf();
        config.vision.cameras = vec!["front".to_string()];
        assert!(check_cameras(&config).is_ok());

        config.vision.cameras.push("rear".to_string());
        let result = check_cameras(&config);
        assert_eq!(result.status, "warn");
        assert!(result.message.contains("rear"));
    }
}
