use crate::foundation::error::{QrfeedError, QrfeedResult};

/// Channel order of a packed 3-byte pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelOrder {
    Rgb,
    #[default]
    Bgr,
}

impl PixelOrder {
    /// ffmpeg `-pix_fmt` name for raw input in this order.
    pub fn ffmpeg_pix_fmt(self) -> &'static str {
        match self {
            PixelOrder::Rgb => "rgb24",
            PixelOrder::Bgr => "bgr24",
        }
    }
}

/// A rendered frame as packed 8-bit pixels, opaque, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Channel order of `data`.
    pub order: PixelOrder,
    /// `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl Frame {
    /// Wrap an RGB raster, reordering channels to `order`.
    pub fn from_rgb_image(img: image::RgbImage, order: PixelOrder) -> Self {
        let (width, height) = img.dimensions();
        let mut data = img.into_raw();
        if order == PixelOrder::Bgr {
            swap_red_blue(&mut data);
        }
        Self {
            width,
            height,
            order,
            data,
        }
    }

    /// Convert back to an RGB raster (e.g. for PNG export).
    pub fn to_rgb_image(&self) -> QrfeedResult<image::RgbImage> {
        let mut data = self.data.clone();
        if self.order == PixelOrder::Bgr {
            swap_red_blue(&mut data);
        }
        image::RgbImage::from_raw(self.width, self.height, data).ok_or_else(|| {
            QrfeedError::validation("frame.data size mismatch with width*height*3")
        })
    }

    /// Pixel at `(x, y)` in RGB order regardless of storage order.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 3;
        let px = self.data.get(i..i + 3)?;
        Some(match self.order {
            PixelOrder::Rgb => [px[0], px[1], px[2]],
            PixelOrder::Bgr => [px[2], px[1], px[0]],
        })
    }

    pub(crate) fn expected_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 3
    }
}

/// RGB <-> BGR, in place.
pub fn swap_red_blue(data: &mut [u8]) {
    for px in data.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}
