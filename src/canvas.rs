use std::fs;
use std::io;
use std::path::Path;

use crate::vector::{ Rgb, Vec3x };

/// A canvas of traced pixels.
///
/// This structure stores the results of the ray tracer: one [0, 1] color
/// per pixel, flattened row-major. A finished canvas can be saved as a PPM
/// image file or packed into a raw buffer for an interactive window.
///
/// For files, only PPM images are supported.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Rgb>,
}

/// One channel from [0, 1] to display depth.
fn quantize(value: f64) -> u32 {
    (value * 255.0).clamp(0.0, 255.0).ceil() as u32
}

impl Canvas {
    /// Creates a new black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Rgb::zero(); width * height]
        }
    }

    /// Builds a canvas directly from a traced color batch, lane `i`
    /// filling pixel `i` of the raster.
    pub fn from_colors(width: usize, height: usize, colors: &Vec3x) -> Canvas {
        debug_assert_eq!(colors.len(), width * height);

        let pixels = (0..colors.len()).map(|i| colors.lane(i)).collect();
        Canvas { width, height, pixels }
    }

    /// Renders the canvas as PPM text.
    ///
    /// Lines in the PPM body are clamped to 70 columns. If some channel
    /// value would exceed the 70 column mark on a line, it is moved to the
    /// next line over.
    pub fn ppm(&self) -> String {
        let mut out = String::new();

        // PPM header and metadata
        out.push_str("P3\n");
        out.push_str(&format!("{} {}\n", self.width, self.height));
        out.push_str("255\n"); // Maximum color value

        // Write channel values, making sure that no line exceeds 70 columns
        let mut col = 0;
        for pixel in self.pixels.iter() {
            for value in [pixel.x, pixel.y, pixel.z] {
                let token = quantize(value).to_string();

                if col == 0 {
                    out.push_str(&token);
                    col = token.len();
                } else if col + 1 + token.len() > 70 {
                    // This value would surpass the 70 column marker
                    out.push('\n');
                    out.push_str(&token);
                    col = token.len();
                } else {
                    out.push(' ');
                    out.push_str(&token);
                    col += 1 + token.len();
                }
            }
        }

        // Terminate the PPM text with a newline
        out.push('\n');

        out
    }

    /// Saves the canvas to a PPM file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.ppm())
    }

    /// Packs the canvas into one 0RGB word per pixel, row-major, in the
    /// layout interactive framebuffers expect.
    pub fn to_argb(&self) -> Vec<u32> {
        self.pixels.iter()
            .map(|p| (quantize(p.x) << 16) | (quantize(p.y) << 8) | quantize(p.z))
            .collect()
    }

    /// Writes a color to a location on the `Canvas`.
    ///
    /// Out-of-bounds pixels are ignored. Pixels are specified in row-column
    /// order, where `y` is the row of the pixel, and `x` is the column. Rows
    /// and columns are zero-indexed.
    ///
    /// # Examples
    ///
    /// Writing a pixel to the fourth column, second row on an 8-by-8 canvas:
    ///
    /// ```
    /// # use beamtrace::vector::Rgb;
    /// # use beamtrace::canvas::Canvas;
    /// let purple = Rgb::new(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Rgb) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Pixels are specified in row-column order, where `y` is the row of the
    /// pixel, and `x` is the column. Rows and columns are zero-indexed. If
    /// the specified pixel location is out-of-bounds, `None` is returned by
    /// this function.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        // Return nothing if pixel is out-of-bounds
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }
}

/* Tests */

#[cfg(test)]
use crate::batch::Batch;
#[cfg(test)]
use crate::vector::Vector3;

#[test]
fn ppm_header_carries_dimensions() {
    let canvas = Canvas::new(5, 3);
    let ppm = canvas.ppm();

    let mut lines = ppm.lines();
    assert_eq!(lines.next(), Some("P3"));
    assert_eq!(lines.next(), Some("5 3"));
    assert_eq!(lines.next(), Some("255"));
}

#[test]
fn channels_quantize_rounding_up() {
    let mut canvas = Canvas::new(1, 1);
    canvas.write_pixel(0, 0, &Rgb::new(0.5, 0.0, 1.5));

    // 127.5 rounds up; overrange clamps to 255
    assert_eq!(canvas.ppm().lines().nth(3), Some("128 0 255"));
}

#[test]
fn ppm_body_wraps_at_seventy_columns() {
    let mut canvas = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            canvas.write_pixel(x, y, &Rgb::white());
        }
    }

    let ppm = canvas.ppm();
    assert!(ppm.lines().all(|line| line.len() <= 70));
    assert!(ppm.ends_with('\n'));
}

#[test]
fn colors_fill_pixels_row_major() {
    let colors = Vector3::new(
        Batch::from_vec(vec![0.1, 0.2, 0.3, 0.4]),
        Batch::from_vec(vec![0.0, 0.0, 0.0, 0.0]),
        Batch::from_vec(vec![0.0, 0.0, 0.0, 0.0]),
    );
    let canvas = Canvas::from_colors(2, 2, &colors);

    assert_eq!(canvas.read_pixel(0, 0).unwrap(), colors.lane(0));
    assert_eq!(canvas.read_pixel(1, 0).unwrap(), colors.lane(1));
    assert_eq!(canvas.read_pixel(0, 1).unwrap(), colors.lane(2));
    assert_eq!(canvas.read_pixel(1, 1).unwrap(), colors.lane(3));
}

#[test]
fn argb_packs_channels_high_to_low() {
    let mut canvas = Canvas::new(1, 1);
    canvas.write_pixel(0, 0, &Rgb::new(1.0, 0.5, 0.0));

    assert_eq!(canvas.to_argb(), vec![0x00FF_8000]);
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut canvas = Canvas::new(2, 2);
    canvas.write_pixel(5, 5, &Rgb::white());

    assert_eq!(canvas.read_pixel(5, 5), None);
    assert_eq!(canvas.read_pixel(1, 1).unwrap(), Rgb::zero());
}
