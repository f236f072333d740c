use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{GrayImage, Luma};
use qrcode::{Color, QrCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("qr encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("qr rendering failed: {0}")]
    Render(#[from] image::ImageError),
}

const SCALE: u32 = 10;
const QUIET_ZONE: u32 = 4; // modules of white border

/// Render `data` as a QR code and return it as a base64-encoded PNG,
/// ready for an `<img src="data:image/png;base64,...">` payment screen.
pub fn png_base64(data: &str) -> Result<String, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let width = code.width();

    let size = (width as u32 + 2 * QUIET_ZONE) * SCALE;
    let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));

    for y in 0..width {
        for x in 0..width {
            if code[(x, y)] == Color::Dark {
                let px = (x as u32 + QUIET_ZONE) * SCALE;
                let py = (y as u32 + QUIET_ZONE) * SCALE;
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        img.put_pixel(px + dx, py + dy, Luma([0u8]));
                    }
                }
            }
        }
    }

    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)?;

    Ok(BASE64.encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    #[test]
    fn test_produces_decodable_png() {
        let encoded = png_base64("upi://pay?pa=test&am=10.00").unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        // PNG magic
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
