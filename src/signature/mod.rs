//! Freehand signature capture.
//!
//! Strokes are recorded in canvas cell coordinates and exported as an SVG
//! image wrapped in a base64 `data:` URL.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

pub const DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";

/// Pixels per canvas cell in the exported image. Terminal cells are
/// roughly twice as tall as they are wide.
const CELL_WIDTH_PX: u32 = 8;
const CELL_HEIGHT_PX: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

pub type Stroke = Vec<Point>;

#[derive(Debug, Clone)]
pub struct SignaturePad {
    width: u16,
    height: u16,
    pen_color: &'static str,
    strokes: Vec<Stroke>,
    drawing: bool,
}

impl SignaturePad {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pen_color: "black",
            strokes: Vec::new(),
            drawing: false,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn begin_stroke(&mut self, point: Point) {
        let point = self.clamp(point);
        self.strokes.push(vec![point]);
        self.drawing = true;
    }

    /// Extends the active stroke. Starts a new one if none is active.
    pub fn extend_stroke(&mut self, point: Point) {
        if !self.drawing {
            self.begin_stroke(point);
            return;
        }
        let point = self.clamp(point);
        if let Some(stroke) = self.strokes.last_mut()
            && stroke.last() != Some(&point)
        {
            stroke.push(point);
        }
    }

    pub fn end_stroke(&mut self) {
        self.drawing = false;
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.drawing = false;
    }

    /// Cells touched by the drawing, with segments between recorded points
    /// filled in.
    pub fn inked_cells(&self) -> Vec<Point> {
        let mut cells = Vec::new();
        for stroke in &self.strokes {
            let mut points = stroke.iter();
            let Some(first) = points.next() else {
                continue;
            };
            cells.push(*first);
            let mut prev = *first;
            for point in points {
                trace_line(prev, *point, &mut cells);
                prev = *point;
            }
        }
        cells
    }

    /// Current drawing as an image-encoded string, or `None` before any
    /// stroke has been drawn.
    pub fn export(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let svg = self.to_svg();
        Some(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(svg.as_bytes())))
    }

    pub fn to_svg(&self) -> String {
        let width_px = u32::from(self.width) * CELL_WIDTH_PX;
        let height_px = u32::from(self.height) * CELL_HEIGHT_PX;

        let mut path = String::new();
        for stroke in &self.strokes {
            for (index, point) in stroke.iter().enumerate() {
                let (x, y) = cell_center(*point);
                let cmd = if index == 0 { 'M' } else { 'L' };
                let _ = write!(path, "{cmd}{x} {y} ");
            }
            if stroke.len() == 1 {
                path.push_str("l0 0 ");
            }
        }

        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width_px}\" height=\"{height_px}\" \
             viewBox=\"0 0 {width_px} {height_px}\"><path d=\"{}\" fill=\"none\" stroke=\"{}\" \
             stroke-width=\"3\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/></svg>",
            path.trim_end(),
            self.pen_color
        )
    }

    fn clamp(&self, point: Point) -> Point {
        Point {
            x: point.x.min(self.width - 1),
            y: point.y.min(self.height - 1),
        }
    }
}

fn cell_center(point: Point) -> (u32, u32) {
    (
        u32::from(point.x) * CELL_WIDTH_PX + CELL_WIDTH_PX / 2,
        u32::from(point.y) * CELL_HEIGHT_PX + CELL_HEIGHT_PX / 2,
    )
}

/// Bresenham walk from `from` (exclusive) to `to` (inclusive).
fn trace_line(from: Point, to: Point, out: &mut Vec<Point>) {
    let (mut x, mut y) = (i32::from(from.x), i32::from(from.y));
    let (x1, y1) = (i32::from(to.x), i32::from(to.y));
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    while x != x1 || y != y1 {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        out.push(Point::new(x as u16, y as u16));
    }
}

#[cfg(test)]
mod tests {
    use super::{DATA_URL_PREFIX, Point, SignaturePad};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn decode(url: &str) -> String {
        let payload = url.strip_prefix(DATA_URL_PREFIX).expect("data url prefix");
        let bytes = STANDARD.decode(payload).expect("valid base64");
        String::from_utf8(bytes).expect("utf8 svg")
    }

    #[test]
    fn blank_pad_exports_nothing() {
        let pad = SignaturePad::new(40, 6);
        assert!(pad.is_empty());
        assert_eq!(pad.export(), None);
    }

    #[test]
    fn export_encodes_strokes_as_svg_path() {
        let mut pad = SignaturePad::new(40, 6);
        pad.begin_stroke(Point::new(1, 1));
        pad.extend_stroke(Point::new(3, 2));
        pad.end_stroke();

        let svg = decode(&pad.export().expect("drawn"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"320\" height=\"96\""));
        assert!(svg.contains("d=\"M12 24 L28 40\""));
    }

    #[test]
    fn single_tap_becomes_a_dot() {
        let mut pad = SignaturePad::new(10, 4);
        pad.begin_stroke(Point::new(0, 0));
        pad.end_stroke();
        let svg = decode(&pad.export().expect("drawn"));
        assert!(svg.contains("d=\"M4 8 l0 0\""));
    }

    #[test]
    fn points_are_clamped_to_canvas() {
        let mut pad = SignaturePad::new(5, 3);
        pad.begin_stroke(Point::new(50, 50));
        assert_eq!(pad.strokes()[0], vec![Point::new(4, 2)]);
    }

    #[test]
    fn extend_without_active_stroke_starts_one() {
        let mut pad = SignaturePad::new(10, 4);
        pad.extend_stroke(Point::new(2, 2));
        pad.extend_stroke(Point::new(2, 2));
        pad.extend_stroke(Point::new(3, 2));
        assert_eq!(pad.strokes().len(), 1);
        assert_eq!(pad.strokes()[0].len(), 2);
    }

    #[test]
    fn inked_cells_fill_gaps_between_samples() {
        let mut pad = SignaturePad::new(10, 4);
        pad.begin_stroke(Point::new(0, 0));
        pad.extend_stroke(Point::new(4, 0));
        let cells = pad.inked_cells();
        assert_eq!(cells.len(), 5);
        assert_eq!(cells.last(), Some(&Point::new(4, 0)));
    }

    #[test]
    fn clear_discards_drawing() {
        let mut pad = SignaturePad::new(10, 4);
        pad.begin_stroke(Point::new(1, 1));
        pad.clear();
        assert!(pad.is_empty());
        assert!(!pad.is_drawing());
    }
}
