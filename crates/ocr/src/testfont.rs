//! Tiny 5×7 bitmap font for rendering synthetic screenshots in tests.

use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};

pub(crate) const GLYPHS: &str = "0123456789+-.:";

pub(crate) fn bitmap(c: char) -> &'static [&'static str] {
    match c {
        '0' => &[".###.", "#...#", "#..##", "#.#.#", "##..#", "#...#", ".###."],
        '1' => &["..#..", ".##..", "..#..", "..#..", "..#..", "..#..", ".###."],
        '2' => &[".###.", "#...#", "....#", "...#.", "..#..", ".#...", "#####"],
        '3' => &["#####", "...#.", "..#..", "...#.", "....#", "#...#", ".###."],
        '4' => &["...#.", "..##.", ".#.#.", "#..#.", "#####", "...#.", "...#."],
        '5' => &["#####", "#....", "####.", "....#", "....#", "#...#", ".###."],
        '6' => &["..##.", ".#...", "#....", "####.", "#...#", "#...#", ".###."],
        '7' => &["#####", "....#", "...#.", "..#..", ".#...", ".#...", ".#..."],
        '8' => &[".###.", "#...#", "#...#", ".###.", "#...#", "#...#", ".###."],
        '9' => &[".###.", "#...#", "#...#", ".####", "....#", "...#.", ".##.."],
        '+' => &[".....", "..#..", "..#..", "#####", "..#..", "..#..", "....."],
        '-' => &[".....", ".....", ".....", "#####", ".....", ".....", "....."],
        '.' => &["..", "..", "..", "..", "..", "##", "##"],
        ':' => &["..", "##", "##", "..", "##", "##", ".."],
        _ => &[],
    }
}

const SCALE: u32 = 3;
const MARGIN: u32 = 10;
const LINE_GAP: u32 = 20;
const SPACE: u32 = 12;
const INK: Rgb<u8> = Rgb([20, 20, 30]);
const PAPER: Rgb<u8> = Rgb([245, 245, 240]);

fn cell_width(c: char) -> u32 {
    if c == ' ' {
        return SPACE;
    }
    bitmap(c).first().map_or(0, |r| r.len() as u32) * SCALE
}

fn line_width(line: &str, spacing: u32) -> u32 {
    line.chars().map(|c| cell_width(c) + spacing).sum()
}

/// Renders each line as its own band, glyphs `spacing` pixels apart.
pub(crate) fn render(lines: &[&str], spacing: u32) -> RgbImage {
    let width = lines.iter().map(|l| line_width(l, spacing)).max().unwrap_or(0) + 2 * MARGIN;
    let line_height = 7 * SCALE;
    let height = lines.len() as u32 * (line_height + LINE_GAP) + 2 * MARGIN;
    let mut img: RgbImage = ImageBuffer::from_pixel(width, height, PAPER);

    for (i, line) in lines.iter().enumerate() {
        let y0 = MARGIN + i as u32 * (line_height + LINE_GAP);
        let mut x0 = MARGIN;
        for c in line.chars() {
            draw(&mut img, c, x0, y0);
            x0 += cell_width(c) + spacing;
        }
    }
    img
}

/// One glyph alone on a small canvas, as a reference image would look.
pub(crate) fn render_glyph(c: char) -> DynamicImage {
    let text = c.to_string();
    DynamicImage::ImageRgb8(render(&[text.as_str()], 0))
}

fn draw(img: &mut RgbImage, c: char, x0: u32, y0: u32) {
    for (row, bits) in bitmap(c).iter().enumerate() {
        for (col, bit) in bits.chars().enumerate() {
            if bit != '#' {
                continue;
            }
            for dy in 0..SCALE {
                for dx in 0..SCALE {
                    img.put_pixel(x0 + col as u32 * SCALE + dx, y0 + row as u32 * SCALE + dy, INK);
                }
            }
        }
    }
}
