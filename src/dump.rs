use crate::engine::View;
use crate::index::{BoxIndex, BoxRole};
use crate::place::{Collider, PlacedLabels};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct PlacementDump {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    pub labels: PlacedLabels,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugBoxes>,
}

/// Collision boxes for the debug overlay: committed and rejected sets.
#[derive(Debug, Serialize)]
pub struct DebugBoxes {
    pub drawn: Vec<BoxDump>,
    pub skipped: Vec<BoxDump>,
}

#[derive(Debug, Serialize)]
pub struct BoxDump {
    pub entity: String,
    pub role: &'static str,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl PlacementDump {
    pub fn new(view: &View, labels: PlacedLabels, collider: Option<&Collider>) -> Self {
        PlacementDump {
            width: view.dimensions[0],
            height: view.dimensions[1],
            zoom: view.projection.zoom(),
            labels,
            debug: collider.map(|collider| DebugBoxes {
                drawn: dump_index(collider.drawn()),
                skipped: dump_index(collider.skipped()),
            }),
        }
    }
}

fn dump_index(index: &BoxIndex) -> Vec<BoxDump> {
    let mut boxes: Vec<BoxDump> = index
        .all()
        .map(|bbox| BoxDump {
            entity: bbox.key.entity.clone(),
            role: match bbox.key.role {
                BoxRole::Label => "label",
                BoxRole::Icon => "icon",
                BoxRole::Marker => "marker",
            },
            min_x: bbox.min_x,
            min_y: bbox.min_y,
            max_x: bbox.max_x,
            max_y: bbox.max_y,
        })
        .collect();
    // R-tree iteration order is not stable; sort for reproducible dumps.
    boxes.sort_by(|a, b| {
        a.entity
            .cmp(&b.entity)
            .then(a.role.cmp(b.role))
            .then(a.min_x.total_cmp(&b.min_x))
            .then(a.min_y.total_cmp(&b.min_y))
    });
    boxes
}

pub fn write_placement_dump(dump: &PlacementDump, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, dump)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, dump)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}
