//! Flexible variant URLs
//!
//! Cloudflare Images accepts transforms as a trailing path segment of
//! comma-separated `key=value` options, e.g. `{base}/width=800,fit=cover`.

use crate::models::FlexibleExamples;
use std::fmt;

pub const THUMBNAIL_WIDTH: u32 = 245;
pub const THUMBNAIL_HEIGHT: u32 = 156;
pub const DEFAULT_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    ScaleDown,
    Contain,
    Cover,
    Crop,
    Pad,
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Fit::ScaleDown => "scale-down",
            Fit::Contain => "contain",
            Fit::Cover => "cover",
            Fit::Crop => "crop",
            Fit::Pad => "pad",
        };
        f.write_str(value)
    }
}

/// Ordered set of transform options. Options render in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transform {
    options: Vec<(&'static str, String)>,
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(self, format: &str) -> Self {
        self.push("format", format.to_string())
    }

    pub fn quality(self, quality: u8) -> Self {
        self.push("quality", quality.to_string())
    }

    pub fn width(self, width: u32) -> Self {
        self.push("width", width.to_string())
    }

    pub fn height(self, height: u32) -> Self {
        self.push("height", height.to_string())
    }

    pub fn fit(self, fit: Fit) -> Self {
        self.push("fit", fit.to_string())
    }

    fn push(mut self, key: &'static str, value: String) -> Self {
        self.options.push((key, value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn apply(&self, base_url: &str) -> String {
        if self.is_empty() {
            return base_url.to_string();
        }
        format!("{}/{}", base_url, self)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.options.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

pub fn thumbnail_url(base_url: &str) -> String {
    Transform::new()
        .width(THUMBNAIL_WIDTH)
        .height(THUMBNAIL_HEIGHT)
        .fit(Fit::Contain)
        .quality(DEFAULT_QUALITY)
        .apply(base_url)
}

impl FlexibleExamples {
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            webp: Transform::new().format("webp").apply(base_url),
            quality: Transform::new().quality(DEFAULT_QUALITY).apply(base_url),
            resize: Transform::new()
                .width(800)
                .height(600)
                .fit(Fit::Cover)
                .apply(base_url),
            combined: Transform::new()
                .format("webp")
                .quality(DEFAULT_QUALITY)
                .width(800)
                .height(600)
                .fit(Fit::Cover)
                .apply(base_url),
            thumbnail: Transform::new()
                .width(THUMBNAIL_WIDTH)
                .height(THUMBNAIL_HEIGHT)
                .fit(Fit::Cover)
                .quality(DEFAULT_QUALITY)
                .apply(base_url),
            mobile: Transform::new()
                .format("webp")
                .width(640)
                .quality(DEFAULT_QUALITY)
                .fit(Fit::ScaleDown)
                .apply(base_url),
            desktop: Transform::new()
                .format("webp")
                .width(1920)
                .quality(DEFAULT_QUALITY)
                .fit(Fit::ScaleDown)
                .apply(base_url),
        }
    }
}
