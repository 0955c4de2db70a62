//! Page geometry and placement math. Pure arithmetic, no I/O.

use crate::options::{FitMode, Orientation, PageSize};

/// Page dimensions in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
}

/// Scaled size and centered offset of an image on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub width_pt: f32,
    pub height_pt: f32,
    pub x_pt: f32,
    pub y_pt: f32,
}

const A4_PT: (f32, f32) = (595.276, 841.89);
const LETTER_PT: (f32, f32) = (612.0, 792.0);
const LEGAL_PT: (f32, f32) = (612.0, 1008.0);

/// Resolve the page size in points.
///
/// `reference_px` is the pixel size of the image that anchors the page and
/// is only consulted in auto mode; auto without a reference falls back to
/// A4. Landscape swaps the axes after resolution, including for auto.
pub fn resolve_page_geometry(
    page_size: PageSize,
    orientation: Orientation,
    reference_px: Option<(u32, u32)>,
    dpi: u32,
) -> PageGeometry {
    let (w, h) = match page_size {
        PageSize::A4 => A4_PT,
        PageSize::Letter => LETTER_PT,
        PageSize::Legal => LEGAL_PT,
        PageSize::Auto => match reference_px {
            Some((px_w, px_h)) => (
                px_w as f32 / dpi as f32 * 72.0,
                px_h as f32 / dpi as f32 * 72.0,
            ),
            None => A4_PT,
        },
    };
    match orientation {
        Orientation::Portrait => PageGeometry {
            width_pt: w,
            height_pt: h,
        },
        Orientation::Landscape => PageGeometry {
            width_pt: h,
            height_pt: w,
        },
    }
}

/// Scale and center an image within the page's usable area.
///
/// Contain takes the smaller axis scale, cover the larger; both preserve
/// aspect ratio and center on both axes. Cover may overflow the usable
/// area on one axis; no clipping is computed here, viewers clip at the
/// page boundary.
pub fn place_image(
    img_w: u32,
    img_h: u32,
    page: PageGeometry,
    margins: f32,
    fit: FitMode,
) -> Placement {
    let usable_w = page.width_pt - 2.0 * margins;
    let usable_h = page.height_pt - 2.0 * margins;
    let scale_x = usable_w / img_w as f32;
    let scale_y = usable_h / img_h as f32;
    let scale = match fit {
        FitMode::Contain => scale_x.min(scale_y),
        FitMode::Cover => scale_x.max(scale_y),
    };
    let width_pt = img_w as f32 * scale;
    let height_pt = img_h as f32 * scale;
    Placement {
        width_pt,
        height_pt,
        x_pt: margins + (usable_w - width_pt) / 2.0,
        y_pt: margins + (usable_h - height_pt) / 2.0,
    }
}
