use crate::model::GridLayout;
use serde_json::{Value, json};

/// Serialize a `GridLayout` as `{ canvas, grid, cells, meta }`.
///
/// Each cell carries its canvas rectangle (`cell`), the fitted logo rectangle inside it
/// (`logo`, absolute canvas coordinates) and the trimmed region of the source (`source`).
/// Field names use camelCase like other sprite/atlas JSON.
pub fn to_json(layout: &GridLayout) -> Value {
    let cells: Vec<Value> = layout
        .cells
        .iter()
        .map(|c| {
            let logo = c.logo_rect();
            json!({
                "index": c.index,
                "key": c.key,
                "row": c.row,
                "col": c.col,
                "cell": {"x": c.cell.x, "y": c.cell.y, "w": c.cell.w, "h": c.cell.h},
                "logo": {"x": logo.x, "y": logo.y, "w": logo.w, "h": logo.h},
                "source": {"x": c.source.x, "y": c.source.y, "w": c.source.w, "h": c.source.h},
                "sourceSize": {"w": c.source_size.w, "h": c.source_size.h},
                "trimmed": c.trimmed,
                "scale": c.scale,
            })
        })
        .collect();
    json!({
        "canvas": {"w": layout.canvas.w, "h": layout.canvas.h},
        "grid": {"rows": layout.rows, "columns": layout.columns},
        "cells": cells,
        "meta": &layout.meta,
    })
}
