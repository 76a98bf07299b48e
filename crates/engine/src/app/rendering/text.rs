use super::raster::{put_pixel, Canvas};

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;

type GlyphRows = [u8; GLYPH_HEIGHT as usize];

const BLANK: GlyphRows = [0; GLYPH_HEIGHT as usize];

// Each row is a 3-bit mask, most significant bit on the left.
const FONT: &[(char, GlyphRows)] = &[
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    ('#', [0b101, 0b111, 0b101, 0b111, 0b101]),
    ('%', [0b101, 0b001, 0b010, 0b100, 0b101]),
    ('\'', [0b010, 0b010, 0b000, 0b000, 0b000]),
    ('(', [0b001, 0b010, 0b010, 0b010, 0b001]),
    (')', [0b100, 0b010, 0b010, 0b010, 0b100]),
    ('+', [0b000, 0b010, 0b111, 0b010, 0b000]),
    (',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b111, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b010, 0b010, 0b010]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('>', [0b100, 0b010, 0b001, 0b010, 0b100]),
    ('?', [0b111, 0b001, 0b011, 0b000, 0b010]),
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b111, 0b100, 0b100, 0b100, 0b111]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b111, 0b100, 0b101, 0b101, 0b111]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b111, 0b001, 0b001, 0b101, 0b111]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b101, 0b111, 0b111, 0b111, 0b101]),
    ('O', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b111, 0b101, 0b101, 0b111, 0b001]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('|', [0b010, 0b010, 0b010, 0b010, 0b010]),
];

/// Lowercase letters share the uppercase glyphs; anything unknown draws blank.
fn glyph_rows(ch: char) -> GlyphRows {
    let ch = ch.to_ascii_uppercase();
    FONT.iter()
        .find(|(glyph_char, _)| *glyph_char == ch)
        .map(|(_, rows)| *rows)
        .unwrap_or(BLANK)
}

fn advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

/// Width in pixels of `text` drawn at `scale`, without trailing spacing.
pub fn text_width_px(text: &str, scale: i32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    count * advance(scale) - scale
}

pub fn text_height_px(scale: i32) -> i32 {
    GLYPH_HEIGHT * scale
}

pub(crate) fn draw_text(
    frame: &mut [u8],
    canvas: Canvas,
    origin: (i32, i32),
    text: &str,
    color: [u8; 4],
    scale: i32,
) {
    let scale = scale.max(1);
    let (mut x, y) = origin;
    for ch in text.chars() {
        draw_glyph(frame, canvas, x, y, glyph_rows(ch), color, scale);
        x += advance(scale);
    }
}

fn draw_glyph(
    frame: &mut [u8],
    canvas: Canvas,
    x: i32,
    y: i32,
    rows: GlyphRows,
    color: [u8; 4],
    scale: i32,
) {
    for (row_index, row_bits) in rows.iter().enumerate() {
        let cell_y = y + row_index as i32 * scale;
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            let cell_x = x + col * scale;
            for sy in 0..scale {
                for sx in 0..scale {
                    put_pixel(frame, canvas, cell_x + sx, cell_y + sy, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hud_strings_have_glyphs() {
        for text in [
            "STAGE 1 | LIFE: 3",
            "GOT THE KEY!",
            "THE DOOR IS TOO FAR...",
            "> POTION",
        ] {
            for ch in text.chars().filter(|ch| *ch != ' ') {
                assert_ne!(glyph_rows(ch), BLANK, "missing glyph for {ch:?}");
            }
        }
    }

    #[test]
    fn lowercase_uses_uppercase_glyphs() {
        assert_eq!(glyph_rows('k'), glyph_rows('K'));
        assert_eq!(glyph_rows('~'), BLANK);
    }

    #[test]
    fn width_scales_with_length_and_scale() {
        assert_eq!(text_width_px("", 3), 0);
        assert_eq!(text_width_px("A", 3), 9);
        assert_eq!(text_width_px("AB", 3), 21);
        assert_eq!(text_width_px("AB", 1), 7);
        assert_eq!(text_height_px(4), 20);
    }

    #[test]
    fn drawing_off_canvas_is_safe() {
        let canvas = Canvas {
            width: 8,
            height: 8,
        };
        let mut frame = vec![0u8; 8 * 8 * 4];
        draw_text(&mut frame, canvas, (-20, -20), "HELLO", [255; 4], 3);
        draw_text(&mut frame, canvas, (6, 6), "HELLO", [255; 4], 3);
        assert_eq!(frame.len(), 8 * 8 * 4);
    }

    #[test]
    fn glyph_pixels_land_at_scaled_offsets() {
        let canvas = Canvas {
            width: 16,
            height: 16,
        };
        let mut frame = vec![0u8; 16 * 16 * 4];
        draw_text(&mut frame, canvas, (0, 0), "-", [255; 4], 2);
        // '-' lights only the middle row: y in 4..6 at scale 2.
        let lit = |x: usize, y: usize| frame[(y * 16 + x) * 4] == 255;
        assert!(!lit(0, 3));
        assert!(lit(0, 4));
        assert!(lit(5, 5));
        assert!(!lit(6, 5));
    }
}
