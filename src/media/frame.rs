use std::sync::Arc;

use crate::foundation::error::{PlayerError, PlayerResult};

/// One decoded picture in premultiplied RGBA8, row-major and tightly packed.
///
/// Fields are public so platform adapters can hand over frames that are not ready yet (zero
/// dimensions, short buffers); consumers check [`VisualFrame::is_decodable`] before using them.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualFrame {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl VisualFrame {
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> PlayerResult<Self> {
        let frame = Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        };
        if !frame.is_decodable() {
            return Err(PlayerError::validation(format!(
                "frame buffer of {} bytes does not match {width}x{height} rgba8",
                frame.rgba8_premul.len()
            )));
        }
        Ok(frame)
    }

    /// A frame filled with one premultiplied color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            rgba8_premul: Arc::new(data),
        }
    }

    /// Nonzero dimensions and a buffer that covers them.
    pub fn is_decodable(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba8_premul.len() == self.width as usize * self.height as usize * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba8_premul.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
