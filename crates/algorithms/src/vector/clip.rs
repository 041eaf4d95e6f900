//! Clipping operations
//!
//! Clip a layer by a rectangular extent using Cohen-Sutherland for lines
//! and Sutherland-Hodgman for polygon rings. Points are kept or dropped.

use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use placegis_core::vector::FeatureCollection;

/// A clipping rectangle
#[derive(Debug, Clone, Copy)]
pub struct ClipRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ClipRect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Edge of the clipping rectangle
#[derive(Debug, Clone, Copy)]
enum Edge {
    Left,
    Right,
    Bottom,
    Top,
}

impl Edge {
    fn is_inside(&self, p: &Coord<f64>, rect: &ClipRect) -> bool {
        match self {
            Edge::Left => p.x >= rect.min_x,
            Edge::Right => p.x <= rect.max_x,
            Edge::Bottom => p.y >= rect.min_y,
            Edge::Top => p.y <= rect.max_y,
        }
    }

    fn intersect(&self, p: &Coord<f64>, q: &Coord<f64>, rect: &ClipRect) -> Coord<f64> {
        let (px, py) = (p.x, p.y);
        let (qx, qy) = (q.x, q.y);
        let dx = qx - px;
        let dy = qy - py;

        match self {
            Edge::Left => {
                let t = (rect.min_x - px) / dx;
                Coord { x: rect.min_x, y: py + t * dy }
            }
            Edge::Right => {
                let t = (rect.max_x - px) / dx;
                Coord { x: rect.max_x, y: py + t * dy }
            }
            Edge::Bottom => {
                let t = (rect.min_y - py) / dy;
                Coord { x: px + t * dx, y: rect.min_y }
            }
            Edge::Top => {
                let t = (rect.max_y - py) / dy;
                Coord { x: px + t * dx, y: rect.max_y }
            }
        }
    }
}

/// Clip a polygon ring against one edge (Sutherland-Hodgman step)
fn clip_ring_edge(vertices: &[Coord<f64>], edge: Edge, rect: &ClipRect) -> Vec<Coord<f64>> {
    if vertices.is_empty() {
        return Vec::new();
    }

    let mut output = Vec::new();
    let n = vertices.len();

    for i in 0..n {
        let current = &vertices[i];
        let next = &vertices[(i + 1) % n];

        let current_inside = edge.is_inside(current, rect);
        let next_inside = edge.is_inside(next, rect);

        match (current_inside, next_inside) {
            (true, true) => {
                output.push(*next);
            }
            (true, false) => {
                output.push(edge.intersect(current, next, rect));
            }
            (false, true) => {
                output.push(edge.intersect(current, next, rect));
                output.push(*next);
            }
            (false, false) => {}
        }
    }

    output
}

fn clip_polygon(poly: &Polygon<f64>, rect: &ClipRect) -> Option<Polygon<f64>> {
    let mut vertices: Vec<Coord<f64>> = poly.exterior().0.to_vec();

    // Remove closing vertex for the algorithm
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    for edge in [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top] {
        vertices = clip_ring_edge(&vertices, edge, rect);
        if vertices.is_empty() {
            return None;
        }
    }

    // Close the ring
    vertices.push(vertices[0]);

    // Interior rings are not clipped
    Some(Polygon::new(LineString::new(vertices), vec![]))
}

/// Clip a geometry by a rectangular extent.
///
/// Returns the clipped geometry, or None if it falls completely outside.
pub fn clip_by_rect(geom: &Geometry<f64>, rect: ClipRect) -> Option<Geometry<f64>> {
    match geom {
        Geometry::Point(p) => {
            if rect.contains(p.x(), p.y()) {
                Some(geom.clone())
            } else {
                None
            }
        }

        Geometry::Polygon(poly) => clip_polygon(poly, &rect).map(Geometry::Polygon),

        Geometry::MultiPolygon(mp) => {
            let parts: Vec<Polygon<f64>> = mp
                .0
                .iter()
                .filter_map(|p| clip_polygon(p, &rect))
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(Geometry::MultiPolygon(MultiPolygon::new(parts)))
            }
        }

        Geometry::LineString(ls) => {
            // Clip each segment
            let mut clipped_coords: Vec<Coord<f64>> = Vec::new();

            for window in ls.0.windows(2) {
                let (p0, p1) = (window[0], window[1]);
                if let Some((c0, c1)) = clip_segment(p0, p1, &rect) {
                    if clipped_coords.last() != Some(&c0) {
                        clipped_coords.push(c0);
                    }
                    clipped_coords.push(c1);
                }
            }

            if clipped_coords.len() >= 2 {
                Some(Geometry::LineString(LineString::new(clipped_coords)))
            } else {
                None
            }
        }

        other => Some(other.clone()),
    }
}

/// Clip every feature of a collection to a rectangular extent.
///
/// Features whose geometry falls entirely outside the extent are dropped,
/// as are attribute-only features (there is nothing to clip).
pub fn clip_collection(collection: &FeatureCollection, rect: ClipRect) -> FeatureCollection {
    let mut out = FeatureCollection::with_crs(collection.crs.clone());
    for col in collection.columns() {
        out.add_column(col.clone());
    }

    for feature in collection.iter() {
        let Some(geom) = &feature.geometry else {
            continue;
        };
        if let Some(clipped) = clip_by_rect(geom, rect) {
            let mut nf = feature.clone();
            nf.geometry = Some(clipped);
            out.push(nf);
        }
    }
    out
}

/// Cohen-Sutherland region codes
const INSIDE: u8 = 0b0000;
const LEFT: u8 = 0b0001;
const RIGHT: u8 = 0b0010;
const BOTTOM: u8 = 0b0100;
const TOP: u8 = 0b1000;

fn outcode(p: Coord<f64>, rect: &ClipRect) -> u8 {
    let mut code = INSIDE;
    if p.x < rect.min_x { code |= LEFT; }
    if p.x > rect.max_x { code |= RIGHT; }
    if p.y < rect.min_y { code |= BOTTOM; }
    if p.y > rect.max_y { code |= TOP; }
    code
}

fn clip_segment(
    mut p0: Coord<f64>,
    mut p1: Coord<f64>,
    rect: &ClipRect,
) -> Option<(Coord<f64>, Coord<f64>)> {
    let mut code0 = outcode(p0, rect);
    let mut code1 = outcode(p1, rect);

    loop {
        if (code0 | code1) == 0 {
            return Some((p0, p1)); // Both inside
        }
        if (code0 & code1) != 0 {
            return None; // Both outside same region
        }

        let code_out = if code0 != 0 { code0 } else { code1 };
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;

        let new_point = if code_out & TOP != 0 {
            let t = (rect.max_y - p0.y) / dy;
            Coord { x: p0.x + t * dx, y: rect.max_y }
        } else if code_out & BOTTOM != 0 {
            let t = (rect.min_y - p0.y) / dy;
            Coord { x: p0.x + t * dx, y: rect.min_y }
        } else if code_out & RIGHT != 0 {
            let t = (rect.max_x - p0.x) / dx;
            Coord { x: rect.max_x, y: p0.y + t * dy }
        } else {
            let t = (rect.min_x - p0.x) / dx;
            Coord { x: rect.min_x, y: p0.y + t * dy }
        };

        if code_out == code0 {
            p0 = new_point;
            code0 = outcode(p0, rect);
        } else {
            p1 = new_point;
            code1 = outcode(p1, rect);
        }
    }
}
