//! Shared test utilities for paint pipeline tests.
//!
//! Provides a [`RecordingBackend`] that records all draw calls for assertion.

use parkscape_types::Result;
use parkscape_types::geometry::ScreenRect;
use parkscape_types::image::ImageId;

use crate::backend::{Dpi, PaintBackend};

/// A recorded draw call from the recording backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    Sprite { image: u32, x: i32, y: i32 },
    Clear { colour: u8 },
    FilterRect { rect: ScreenRect, palette: u8 },
    Text { text: String, x: i32, y: i32 },
}

/// A backend that records all draw calls for test assertions.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<DrawCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of sprite blits.
    pub fn sprite_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Sprite { .. }))
            .count()
    }

    /// The sprite calls in submission order.
    pub fn sprites(&self) -> Vec<(u32, i32, i32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Sprite { image, x, y } => Some((*image, *x, *y)),
                _ => None,
            })
            .collect()
    }
}

impl PaintBackend for RecordingBackend {
    fn draw_sprite(&mut self, _dpi: &Dpi, image: ImageId, x: i32, y: i32) -> Result<()> {
        self.calls.push(DrawCall::Sprite { image: image.0, x, y });
        Ok(())
    }

    fn clear(&mut self, _dpi: &Dpi, colour: u8) -> Result<()> {
        self.calls.push(DrawCall::Clear { colour });
        Ok(())
    }

    fn filter_rect(&mut self, _dpi: &Dpi, rect: ScreenRect, palette: u8) -> Result<()> {
        self.calls.push(DrawCall::FilterRect { rect, palette });
        Ok(())
    }

    fn draw_text(&mut self, _dpi: &Dpi, text: &str, x: i32, y: i32) -> Result<()> {
        self.calls.push(DrawCall::Text {
            text: text.to_owned(),
            x,
            y,
        });
        Ok(())
    }
}
