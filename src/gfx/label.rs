//! # Text Labels
//!
//! Rasterizes a line of text into an RGBA image sized to fit the text plus
//! padding, ready to be uploaded once as a texture.
//!
//! The same [`FontSpec`] is used to measure and to draw, so the buffer is
//! always large enough for what gets painted into it. A font specifier without
//! a unit (`"10"`) is rejected instead of silently producing a mismatched
//! buffer.
//!
//! Glyphs come from the `font8x8` bitmap font, scaled to the requested pixel
//! size with nearest-neighbour sampling; every glyph advances by one em.

use font8x8::{UnicodeFonts, BASIC_FONTS};

use crate::error::LabelError;

/// Glyph cell size of the bitmap font
const GLYPH_SIZE: f32 = 8.0;

/// Largest label texture side; the render device is requested with this limit
pub const MAX_LABEL_DIMENSION: u32 = 4096;

/// A font size with an explicit unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size_px: f32,
}

impl FontSpec {
    pub fn px(size_px: f32) -> Self {
        Self { size_px }
    }

    /// Parses a CSS-like font size such as `"10px"`
    pub fn parse(spec: &str) -> Result<Self, LabelError> {
        let trimmed = spec.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);

        if unit.is_empty() {
            return Err(LabelError::MissingFontUnit(spec.to_string()));
        }
        if !unit.trim().eq_ignore_ascii_case("px") {
            return Err(LabelError::UnsupportedFontUnit {
                spec: spec.to_string(),
                unit: unit.trim().to_string(),
            });
        }

        match number.parse::<f32>() {
            Ok(size_px) if size_px > 0.0 && size_px.is_finite() => Ok(Self { size_px }),
            _ => Err(LabelError::InvalidFontSize(spec.to_string())),
        }
    }

    /// Width of `text` in pixels when drawn with this font
    pub fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.size_px
    }
}

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from 0xRRGGBB
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgba((hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255)
    }

    /// Parses `transparent`, a few CSS colour names, `#rgb`, `#rrggbb` or `#rrggbbaa`
    pub fn parse(value: &str) -> Result<Self, LabelError> {
        let invalid = || LabelError::InvalidColor(value.to_string());
        let value_lower = value.trim().to_ascii_lowercase();

        let named = match value_lower.as_str() {
            "transparent" => Some(Self::TRANSPARENT),
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::from_hex(0xff0000)),
            "green" => Some(Self::from_hex(0x008000)),
            "blue" => Some(Self::from_hex(0x0000ff)),
            "gray" | "grey" => Some(Self::from_hex(0x808080)),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let hex = value_lower.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Ok(Self::rgba(expand(0)?, expand(1)?, expand(2)?, 255))
            }
            6 | 8 => {
                let alpha = if hex.len() == 8 {
                    channel(&hex[6..8])?
                } else {
                    255
                };
                Ok(Self::rgba(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                    alpha,
                ))
            }
            _ => Err(invalid()),
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Normalized 0..1 components
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

/// Immutable RGBA8 image holding a rendered label, top row first
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTexture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl LabelTexture {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some(Color::rgba(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }

    fn put(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let i = (y as usize * self.width as usize + x as usize) * 4;
            self.pixels[i..i + 4].copy_from_slice(&color.to_array());
        }
    }
}

/// Layout parameters for [`create_text_texture`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub font: FontSpec,
    pub padding: u32,
    pub background: Color,
    pub text_color: Color,
}

impl LabelStyle {
    /// Parses the style from its textual settings
    pub fn parse(font: &str, padding: u32, background: &str, text_color: &str) -> Result<Self, LabelError> {
        Ok(Self {
            font: FontSpec::parse(font)?,
            padding,
            background: Color::parse(background)?,
            text_color: Color::parse(text_color)?,
        })
    }
}

/// Draws `text` over the background colour with `padding` on every side.
///
/// The image is `ceil(text width) + 2 * padding` wide and
/// `font size + 2 * padding` tall. Either side above
/// [`MAX_LABEL_DIMENSION`] is [`LabelError::TooLarge`].
pub fn create_text_texture(text: &str, style: &LabelStyle) -> Result<LabelTexture, LabelError> {
    let font_size = style.font.size_px;
    let padding = u64::from(style.padding) * 2;
    let width = style.font.measure(text).ceil() as u64 + padding;
    let height = font_size.ceil() as u64 + padding;

    let limit = u64::from(MAX_LABEL_DIMENSION);
    if width > limit || height > limit {
        return Err(LabelError::TooLarge { width, height });
    }
    let (width, height) = (width as u32, height as u32);
    let text_height = font_size.ceil() as u32;

    let mut texture = LabelTexture {
        width,
        height,
        pixels: style
            .background
            .to_array()
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect(),
    };

    let cell = text_height;
    for (index, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            continue;
        };
        let origin_x = style.padding as f32 + index as f32 * font_size;

        for py in 0..cell {
            let row = ((py as f32 * GLYPH_SIZE / font_size) as usize).min(7);
            let bits = glyph[row];
            if bits == 0 {
                continue;
            }
            for px in 0..cell {
                let col = ((px as f32 * GLYPH_SIZE / font_size) as usize).min(7);
                if bits & (1 << col) != 0 {
                    let x = (origin_x + px as f32) as u32;
                    texture.put(x, style.padding + py, style.text_color);
                }
            }
        }
    }

    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_style() -> LabelStyle {
        LabelStyle::parse("10px", 5, "transparent", "black").unwrap()
    }

    #[test]
    fn test_font_spec_requires_unit() {
        assert!(matches!(FontSpec::parse("10"), Err(LabelError::MissingFontUnit(_))));
        assert!(matches!(
            FontSpec::parse("10em"),
            Err(LabelError::UnsupportedFontUnit { .. })
        ));
        assert!(matches!(FontSpec::parse("0px"), Err(LabelError::InvalidFontSize(_))));
        assert!(matches!(FontSpec::parse("px"), Err(LabelError::InvalidFontSize(_))));
        assert_eq!(FontSpec::parse("10px").unwrap(), FontSpec::px(10.0));
        assert_eq!(FontSpec::parse(" 12.5PX ").unwrap(), FontSpec::px(12.5));
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(Color::parse("transparent").unwrap(), Color::TRANSPARENT);
        assert_eq!(Color::parse("Black").unwrap(), Color::BLACK);
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("#bbbbbb").unwrap(), Color::from_hex(0xbbbbbb));
        assert_eq!(Color::parse("#11223344").unwrap(), Color::rgba(0x11, 0x22, 0x33, 0x44));
        assert!(Color::parse("0xbbbbbb").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gggggg").is_err());
    }

    #[test]
    fn test_label_sizing_fits_text_and_padding() {
        let style = default_style();
        for text in ["A", "About Me", "a considerably longer label text"] {
            let texture = create_text_texture(text, &style).unwrap();
            let text_width = style.font.measure(text);

            assert!(texture.width() as f32 >= text_width + 10.0, "{text}");
            assert_eq!(texture.height(), 20, "{text}");
            assert_eq!(
                texture.pixels().len(),
                (texture.width() * texture.height() * 4) as usize
            );
        }
    }

    #[test]
    fn test_label_draws_text_over_transparent_background() {
        let texture = create_text_texture("About Me", &default_style()).unwrap();

        // Padding stays transparent
        assert_eq!(texture.pixel(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(texture.pixel(texture.width() - 1, texture.height() - 1), Some(Color::TRANSPARENT));

        // Some ink lands inside the text box, and only there
        let mut inked = 0;
        for y in 0..texture.height() {
            for x in 0..texture.width() {
                if texture.pixel(x, y) == Some(Color::BLACK) {
                    assert!((5..15).contains(&y), "ink outside text rows at y={y}");
                    assert!((5..85).contains(&x), "ink outside text columns at x={x}");
                    inked += 1;
                }
            }
        }
        assert!(inked > 0);
    }

    #[test]
    fn test_opaque_background_fills_buffer() {
        let style = LabelStyle::parse("10px", 5, "white", "black").unwrap();
        let texture = create_text_texture("", &style).unwrap();

        assert_eq!(texture.width(), 10);
        assert_eq!(texture.height(), 20);
        assert!(texture.pixels().chunks(4).all(|p| p == [255, 255, 255, 255]));
    }

    #[test]
    fn test_oversized_font_is_rejected() {
        let style = LabelStyle::parse("40000px", 5, "transparent", "black").unwrap();

        match create_text_texture("About Me", &style) {
            Err(LabelError::TooLarge { width, height }) => {
                assert_eq!(width, 8 * 40000 + 10);
                assert_eq!(height, 40010);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_overlong_text_is_rejected() {
        let style = default_style();

        // 409 glyphs at 10px plus padding is 4100 wide
        assert!(matches!(
            create_text_texture(&"x".repeat(409), &style),
            Err(LabelError::TooLarge { width: 4100, height: 20 })
        ));

        let widest = create_text_texture(&"x".repeat(408), &style).unwrap();
        assert_eq!(widest.width(), 4090);
        assert_eq!(widest.pixels().len(), 4090 * 20 * 4);
    }
}
