use crate::config::load_config;
use crate::dump::{PlacementDump, write_placement_dump};
use crate::engine::{LabelEngine, View};
use crate::geometry::{Point, Projection};
use crate::scene::Scene;
use crate::text_metrics::FontTextMetrics;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "osmlabel", version, about = "Label placement for OSM-style map scenes")]
pub struct Args {
    /// Input scene JSON or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the placement JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (label stack, offsets, presets)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(short = 'w', long = "width", default_value_t = 960.0)]
    pub width: f64,

    /// Viewport height in pixels
    #[arg(short = 'H', long = "height", default_value_t = 600.0)]
    pub height: f64,

    /// Tile zoom level
    #[arg(short = 'z', long = "zoom", default_value_t = 17.0)]
    pub zoom: f64,

    /// Map center as 'lon,lat'. Defaults to the scene's mean location.
    #[arg(long = "center")]
    pub center: Option<String>,

    /// Wireframe mode: markers only, no point labels
    #[arg(long = "wireframe", default_value_t = false)]
    pub wireframe: bool,

    /// Include drawn/skipped collision boxes in the output
    #[arg(long = "debug", default_value_t = false)]
    pub debug: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let scene = Scene::from_json_str(&input).context("failed to parse scene")?;

    let center = match &args.center {
        Some(raw) => parse_center(raw)?,
        None => scene_center(&scene),
    };
    let dimensions = [args.width, args.height];
    let view = View::new(centered_projection(args.zoom, center, dimensions), dimensions);
    let view = View { wireframe: args.wireframe, ..view };

    let metrics = FontTextMetrics::new(&config.font_family);
    let mut engine = LabelEngine::new(config, metrics);
    let ids: Vec<String> = scene.order().to_vec();
    let labels = engine.place_labels(&scene, &ids, &view, true);

    let dump = PlacementDump::new(&view, labels, args.debug.then(|| engine.collider()));
    write_placement_dump(&dump, args.output.as_deref())?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn parse_center(raw: &str) -> Result<Point> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        bail!("center must be 'lon,lat', got '{raw}'");
    }
    let lon: f64 = parts[0].parse().context("invalid center longitude")?;
    let lat: f64 = parts[1].parse().context("invalid center latitude")?;
    Ok([lon, lat])
}

/// Mean of all node locations, so an uncentered scene lands on screen.
fn scene_center(scene: &Scene) -> Point {
    let locs: Vec<Point> = scene
        .order()
        .iter()
        .filter_map(|id| scene.entity(id))
        .filter_map(|entity| entity.loc)
        .collect();
    if locs.is_empty() {
        return [0.0, 0.0];
    }
    let n = locs.len() as f64;
    [
        locs.iter().map(|p| p[0]).sum::<f64>() / n,
        locs.iter().map(|p| p[1]).sum::<f64>() / n,
    ]
}

/// Projection at `zoom` whose translate puts `center` mid-viewport.
fn centered_projection(zoom: f64, center: Point, dimensions: [f64; 2]) -> Projection {
    let mut projection = Projection::for_zoom(zoom, [0.0, 0.0]);
    let projected = projection.project(center);
    projection.translate = [
        dimensions[0] / 2.0 - projected[0],
        dimensions[1] / 2.0 - projected[1],
    ];
    projection
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_center() {
        assert_eq!(parse_center("-0.1, 51.5").unwrap(), [-0.1, 51.5]);
        assert!(parse_center("51.5").is_err());
        assert!(parse_center("a,b").is_err());
    }

    #[test]
    fn centered_projection_hits_viewport_center() {
        let center = [-0.1, 51.5];
        let projection = centered_projection(17.0, center, [960.0, 600.0]);
        let p = projection.project(center);
        assert!((p[0] - 480.0).abs() < 1e-9);
        assert!((p[1] - 300.0).abs() < 1e-9);
    }
}
