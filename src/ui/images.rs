//! Terminal graphics for the rasterized diagram.

#[cfg(unix)]
use std::time::Duration;

use ratatui::prelude::*;
use ratatui_image::picker::Picker;
#[cfg(unix)]
use ratatui_image::picker::cap_parser::QueryStdioOptions;
use ratatui_image::protocol::StatefulProtocolType;
use ratatui_image::{CropOptions, Resize, StatefulImage};

use crate::app::Model;

#[cfg(unix)]
const PICKER_QUERY_TIMEOUT_MS: u64 = 250;

/// Create a picker for terminal image rendering.
///
/// The picker detects terminal capabilities and chooses the best protocol.
pub fn create_picker(force_half_cell: bool) -> Option<Picker> {
    if force_half_cell {
        crate::perf::log_event(
            "image.create_picker",
            "force_half_cell=true protocol=Halfblocks",
        );
        return Some(Picker::halfblocks());
    }

    // The stdio capability query can leave orphaned reader threads on the
    // Windows console input buffer.
    #[cfg(not(unix))]
    {
        crate::perf::log_event(
            "image.create_picker",
            "windows fallback protocol=Halfblocks",
        );
        return Some(Picker::halfblocks());
    }

    #[cfg(unix)]
    {
        let picker = match Picker::from_query_stdio_with_options(query_options()) {
            Ok(picker) => picker,
            Err(err) => {
                tracing::warn!(error = %err, "terminal graphics query failed; using half blocks");
                Picker::halfblocks()
            }
        };
        crate::perf::log_event(
            "image.create_picker",
            format!(
                "term_program={} term={} protocol={:?}",
                std::env::var("TERM_PROGRAM").unwrap_or_else(|_| "<unset>".to_string()),
                std::env::var("TERM").unwrap_or_else(|_| "<unset>".to_string()),
                picker.protocol_type()
            ),
        );
        Some(picker)
    }
}

#[cfg(unix)]
fn query_options() -> QueryStdioOptions {
    let mut options = QueryStdioOptions::default();
    options.timeout = Duration::from_millis(PICKER_QUERY_TIMEOUT_MS);
    options
}

/// Draw the cached diagram image centred in `area`.
///
/// An image larger than `area` (zoomed in) is clipped around its centre.
/// Returns false when there is nothing to draw.
pub fn render_diagram_image(model: &mut Model, frame: &mut Frame, area: Rect) -> bool {
    let Some(cached) = model.diagram_image.as_mut() else {
        return false;
    };
    if area.width == 0 || area.height == 0 {
        return false;
    }
    let img_width = cached.width_cols;
    let img_height = cached.height_rows;
    let visible_cols = img_width.min(area.width);
    let visible_rows = img_height.min(area.height);
    let dst_x = area.x + (area.width - visible_cols) / 2;
    let dst_y = area.y + (area.height - visible_rows) / 2;
    let src_x = (img_width - visible_cols) / 2;
    let src_y = (img_height - visible_rows) / 2;

    crate::perf::log_event(
        "render.diagram",
        format!(
            "img={img_width}x{img_height} area={}x{} src=({src_x},{src_y})",
            area.width, area.height
        ),
    );

    if matches!(cached.protocol.protocol_type(), StatefulProtocolType::ITerm2(_)) {
        // iTerm2 stores the payload in one anchor cell; buffer slicing breaks it.
        let crop = Resize::Crop(Some(CropOptions {
            clip_top: src_y > 0,
            clip_left: src_x > 0,
        }));
        StatefulImage::default().resize(crop).render(
            Rect::new(dst_x, dst_y, visible_cols, visible_rows),
            frame.buffer_mut(),
            &mut cached.protocol,
        );
        return true;
    }

    let halfblocks = matches!(
        cached.protocol.protocol_type(),
        StatefulProtocolType::Halfblocks(_)
    );
    let temp_area = Rect::new(0, 0, img_width, img_height);
    let mut temp_buf = ratatui::buffer::Buffer::empty(temp_area);
    let resize = if halfblocks {
        // Nearest-neighbor aliases badly in half-cell mode.
        Resize::Scale(Some(image::imageops::FilterType::CatmullRom))
    } else {
        Resize::Scale(None)
    };
    StatefulImage::default()
        .resize(resize)
        .render(temp_area, &mut temp_buf, &mut cached.protocol);

    if halfblocks && !crate::ui::style::supports_truecolor() {
        for row in 0..temp_area.height {
            for col in 0..temp_area.width {
                let cell = &mut temp_buf[(col, row)];
                if let Color::Rgb(r, g, b) = cell.fg {
                    cell.fg = Color::Indexed(crate::ui::style::rgb_to_xterm_256(r, g, b));
                }
                if let Color::Rgb(r, g, b) = cell.bg {
                    cell.bg = Color::Indexed(crate::ui::style::rgb_to_xterm_256(r, g, b));
                }
            }
        }
    }

    let frame_buf = frame.buffer_mut();
    let bounds = frame_buf.area;
    for row in 0..visible_rows {
        for col in 0..visible_cols {
            let (dx, dy) = (dst_x + col, dst_y + row);
            if dx >= bounds.right() || dy >= bounds.bottom() {
                continue;
            }
            frame_buf[(dx, dy)] = temp_buf[(src_x + col, src_y + row)].clone();
        }
    }
    true
}
