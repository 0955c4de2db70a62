use clap::ValueEnum;
use std::str::FromStr;

use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageSize {
    A4,
    Letter,
    Legal,
    /// page sized to the first image's pixel dimensions at the request DPI
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FitMode {
    /// scale to fit inside the usable area, may leave whitespace
    Contain,
    /// scale to fill the usable area, may overflow on one axis
    Cover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// original submission order
    Uploaded,
    /// stable ascending sort by filename
    Filename,
}

impl FromStr for PageSize {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A4" => Ok(PageSize::A4),
            "Letter" => Ok(PageSize::Letter),
            "Legal" => Ok(PageSize::Legal),
            "auto" => Ok(PageSize::Auto),
            _ => Err(invalid("pageSize", s, "expected A4, Letter, Legal or auto")),
        }
    }
}

impl FromStr for Orientation {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(invalid("orientation", s, "expected portrait or landscape")),
        }
    }
}

impl FromStr for FitMode {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contain" => Ok(FitMode::Contain),
            "cover" => Ok(FitMode::Cover),
            _ => Err(invalid("fit", s, "expected contain or cover")),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uploaded" => Ok(SortOrder::Uploaded),
            "filename" => Ok(SortOrder::Filename),
            _ => Err(invalid("order", s, "expected uploaded or filename")),
        }
    }
}

fn invalid(field: &'static str, value: &str, reason: &str) -> ConvertError {
    ConvertError::InvalidOption {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Background color, parsed from a `#RRGGBB` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Accepts exactly `#` followed by six hex digits, either case.
    pub fn parse(s: &str) -> Result<Rgb> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| invalid("bgColor", s, "expected #RRGGBB"))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| invalid("bgColor", s, "expected #RRGGBB"))
        };
        Ok(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Normalized components for the PDF `rg` color operator.
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Immutable per-request configuration, built once via `Default` plus
/// field overrides and validated before any image processing starts.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// uniform page inset in points
    pub margins: f32,
    pub fit: FitMode,
    /// pixels-per-inch used to size pages in auto mode
    pub dpi: u32,
    pub bg_color: Rgb,
    pub order: SortOrder,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: 36.0,
            fit: FitMode::Contain,
            dpi: 300,
            bg_color: Rgb::WHITE,
            order: SortOrder::Uploaded,
        }
    }
}

impl ConversionOptions {
    /// Rejects the whole request before any image is touched.
    pub fn validate(&self) -> Result<()> {
        if !self.margins.is_finite() || !(0.0..=200.0).contains(&self.margins) {
            return Err(ConvertError::InvalidOption {
                field: "margins",
                value: self.margins.to_string(),
                reason: "must be between 0 and 200 points".to_string(),
            });
        }
        if !(72..=600).contains(&self.dpi) {
            return Err(ConvertError::InvalidOption {
                field: "dpi",
                value: self.dpi.to_string(),
                reason: "must be between 72 and 600".to_string(),
            });
        }
        Ok(())
    }
}
