// Polygon paths in canvas coordinates (x right, y down), 2D-canvas style.
// Curves are flattened into straight segments on the way in, so the
// rasteriser only ever sees polylines.

use std::f32::consts::TAU;

/// Segments used for a full ellipse turn; partial arcs get a proportional share.
const ELLIPSE_SEGMENTS: f32 = 96.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    subpaths: Vec<Vec<(f32, f32)>>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new sub-path at (x,y).
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.subpaths.push(vec![(x, y)]);
        self
    }

    /// Line from the current point; with no current point this acts like move_to.
    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        match self.subpaths.last_mut() {
            Some(sp) => sp.push((x, y)),
            None => self.subpaths.push(vec![(x, y)]),
        }
        self
    }

    /// Close the current sub-path; the next point starts a fresh one at the same spot.
    pub fn close(&mut self) -> &mut Self {
        if let Some(&first) = self.subpaths.last().and_then(|sp| sp.first()) {
            if let Some(sp) = self.subpaths.last_mut() {
                sp.push(first);
            }
            self.subpaths.push(vec![first]);
        }
        self
    }

    /// Elliptical arc centred on (cx,cy), swept clockwise from `start` to `end` (radians).
    /// Like the canvas API, an `end` below `start` wraps once around, and the arc's
    /// first point is joined to the current sub-path by a straight line.
    pub fn ellipse(
        &mut self,
        cx: f32, cy: f32,
        rx: f32, ry: f32,
        rotation: f32,
        start: f32, end: f32,
    ) -> &mut Self {
        let mut sweep = end - start;
        if sweep >= TAU {
            sweep = TAU;
        } else if sweep < 0.0 {
            sweep = sweep.rem_euclid(TAU);
        }

        let steps = ((sweep / TAU) * ELLIPSE_SEGMENTS).ceil().max(1.0) as usize;
        let (sin_r, cos_r) = rotation.sin_cos();
        for i in 0..=steps {
            let t = start + sweep * (i as f32 / steps as f32);
            let (ex, ey) = (rx * t.cos(), ry * t.sin());
            let x = cx + ex * cos_r - ey * sin_r;
            let y = cy + ex * sin_r + ey * cos_r;
            self.line_to(x, y);
        }
        self
    }

    /// Convenience for a full circle as its own sub-path.
    pub fn circle(&mut self, cx: f32, cy: f32, r: f32) -> &mut Self {
        self.move_to(cx + r, cy);
        self.ellipse(cx, cy, r, r, 0.0, 0.0, TAU)
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|sp| sp.len() < 2)
    }

    pub fn subpaths(&self) -> impl Iterator<Item = &[(f32, f32)]> {
        self.subpaths.iter().map(Vec::as_slice)
    }

    /// Edges for filling: every sub-path implicitly closed.
    pub fn fill_edges(&self) -> impl Iterator<Item = ((f32, f32), (f32, f32))> + '_ {
        self.subpaths.iter().filter(|sp| sp.len() >= 2).flat_map(|sp| {
            let n = sp.len();
            (0..n).map(move |i| (sp[i], sp[(i + 1) % n]))
        })
    }

    /// Edges for stroking: only the segments actually drawn.
    pub fn stroke_edges(&self) -> impl Iterator<Item = ((f32, f32), (f32, f32))> + '_ {
        self.subpaths.iter().flat_map(|sp| sp.windows(2).map(|w| (w[0], w[1])))
    }
}
