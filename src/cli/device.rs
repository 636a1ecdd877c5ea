//! One-shot device commands

use anyhow::{bail, Context, Result};
use sketchbot_canvas::{MemoryCanvas, Stroke};
use sketchbot_core::{ImageWorkflowController, PathModel, PositionStore};
use sketchbot_device::{DeviceCommand, DevicePosition};
use std::path::Path;
use tracing::info;

use super::one_shot_dispatcher;
use crate::app::AppConfig;

pub async fn position(config: &AppConfig) -> Result<()> {
    let dispatcher = one_shot_dispatcher(config)?;
    let mut positions = PositionStore::new();
    if positions.refresh(&dispatcher).await.is_none() {
        bail!("Position not available");
    }
    Ok(())
}

pub async fn move_to(config: &AppConfig, [x, y, z, e]: [i32; 4]) -> Result<()> {
    let min = config.session.min_axis_value;
    if let Some(value) = [x, y, z, e].into_iter().find(|v| *v < min) {
        bail!("Axis value {value} is below the minimum of {min}");
    }

    let dispatcher = one_shot_dispatcher(config)?;
    dispatcher
        .send_move(DevicePosition::new(x, y, z, e))
        .await
        .context("Move failed")?;
    Ok(())
}

pub async fn command(config: &AppConfig, command: DeviceCommand) -> Result<()> {
    let dispatcher = one_shot_dispatcher(config)?;
    let mut positions = PositionStore::new();
    dispatcher
        .send_command(command, &mut positions)
        .await
        .with_context(|| format!("Command {command} failed"))?;
    Ok(())
}

pub async fn draw(config: &AppConfig, file: &Path) -> Result<()> {
    let strokes = read_strokes(file)?;
    let mut path = PathModel::new();
    let total = strokes.len();
    for stroke in strokes {
        path.append(stroke);
    }
    if path.is_empty() {
        bail!("{} contains no ink strokes", file.display());
    }
    info!(total, ink = path.len(), "Sending stroke file");

    let dispatcher = one_shot_dispatcher(config)?;
    dispatcher
        .send_path(path.transmittable())
        .await
        .context("Sending drawing failed")?;
    println!("✅ Sent {} strokes", path.len());
    Ok(())
}

pub async fn image(config: &AppConfig) -> Result<()> {
    let dispatcher = one_shot_dispatcher(config)?;
    let mut images = ImageWorkflowController::new();
    let mut canvas = MemoryCanvas::new(config.canvas.clone());
    let mut path = PathModel::new();
    images.fetch(&dispatcher, &mut canvas, &mut path).await?;
    Ok(())
}

/// Read a JSON array of strokes in the `/draw` wire format
pub fn read_strokes(file: &Path) -> Result<Vec<Stroke>> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    parse_strokes(&raw).with_context(|| format!("Invalid stroke file {}", file.display()))
}

fn parse_strokes(raw: &str) -> Result<Vec<Stroke>> {
    let strokes: Vec<Stroke> = serde_json::from_str(raw)?;
    for (i, stroke) in strokes.iter().enumerate() {
        stroke
            .validate()
            .with_context(|| format!("stroke {i}"))?;
    }
    Ok(strokes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strokes() {
        let raw = r#"[
            {"drawMode": true, "strokeColor": "black", "strokeWidth": 4,
             "paths": [{"x": 1, "y": 2}, {"x": 3, "y": 4}]},
            {"drawMode": false, "strokeColor": "black", "strokeWidth": 4,
             "paths": [{"x": 5, "y": 6}], "startTimestamp": 1, "endTimestamp": 2}
        ]"#;
        let strokes = parse_strokes(raw).unwrap();
        assert_eq!(strokes.len(), 2);
        assert!(strokes[0].is_ink());
        assert!(!strokes[1].is_ink());
    }

    #[test]
    fn test_parse_rejects_empty_stroke() {
        let raw = r#"[{"drawMode": true, "strokeColor": "black", "strokeWidth": 4, "paths": []}]"#;
        let err = parse_strokes(raw).unwrap_err();
        assert!(format!("{err:#}").contains("stroke 0"));
    }
}
