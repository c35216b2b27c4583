//! Shape generation for 2D primitives
//!
//! All shapes are in field pixels with y pointing down.

use glam::Vec2;

use super::vertex::Vertex;

/// Filled axis-aligned rectangle (two triangles)
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let max = min + size;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Triangle with its base on the top edge of the box and its apex at the
/// bottom center
pub fn down_triangle(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(min.x + size.x, min.y, color),
        Vertex::new(min.x + size.x * 0.5, min.y + size.y, color),
    ]
}

/// Soft halo around a box: concentric rectangles fading outwards
pub fn glow(min: Vec2, size: Vec2, color: [f32; 4], spread: f32, layers: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(layers as usize * 6);

    // Outermost first so inner layers blend on top
    for i in (1..=layers).rev() {
        let t = i as f32 / layers as f32;
        let grow = Vec2::splat(spread * t);
        let alpha = color[3] * (1.0 - t) * 0.6 + 0.05;
        vertices.extend(rect(
            min - grow,
            size + grow * 2.0,
            [color[0], color[1], color[2], alpha],
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0; 4];

    #[test]
    fn test_rect_covers_box() {
        let verts = rect(Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0), WHITE);
        assert_eq!(verts.len(), 6);
        let xs: Vec<f32> = verts.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = verts.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 10.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 40.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), 20.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 60.0);
    }

    #[test]
    fn test_down_triangle_apex_at_bottom() {
        let verts = down_triangle(Vec2::new(0.0, 0.0), Vec2::new(15.0, 30.0), WHITE);
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[2].position, [7.5, 30.0]);
        assert_eq!(verts[0].position[1], 0.0);
        assert_eq!(verts[1].position[1], 0.0);
    }

    #[test]
    fn test_glow_layers_grow_outwards() {
        let verts = glow(Vec2::ZERO, Vec2::splat(10.0), WHITE, 8.0, 4);
        assert_eq!(verts.len(), 24);
        // First layer is the widest
        assert_eq!(verts[0].position, [-8.0, -8.0]);
        assert!(verts[0].color[3] < verts[18].color[3]);
    }
}
