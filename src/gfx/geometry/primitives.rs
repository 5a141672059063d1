use super::GeometryData;

/// Generates a single-quad plane of `width` x `height` centred on the origin.
///
/// The plane lies in the XY plane facing +Z. Texture coordinates put v = 0 on
/// the top edge so images stored top row first appear upright.
pub fn plane_geometry(width: f32, height: f32) -> GeometryData {
    let half_width = width * 0.5;
    let half_height = height * 0.5;

    let mut data = GeometryData::new();
    for (y, v) in [(half_height, 0.0), (-half_height, 1.0)] {
        for (x, u) in [(-half_width, 0.0), (half_width, 1.0)] {
            data.vertices.push([x, y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
            data.tex_coords.push([u, v]);
        }
    }

    // 0 -- 1
    // |  / |
    // 2 -- 3
    data.indices = vec![0, 2, 1, 1, 2, 3];
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_bounds_and_winding() {
        let plane = plane_geometry(0.3, 0.1);

        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.triangle_count(), 2);
        for v in &plane.vertices {
            assert!((v[0].abs() - 0.15).abs() < 1e-6);
            assert!((v[1].abs() - 0.05).abs() < 1e-6);
            assert_eq!(v[2], 0.0);
        }

        // Counter-clockwise seen from +Z
        for tri in plane.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| plane.vertices[i as usize]);
            let cross_z = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross_z > 0.0);
        }
    }

    #[test]
    fn test_plane_top_edge_maps_to_first_texture_row() {
        let plane = plane_geometry(2.0, 1.0);
        let (vertices, indices) = plane.to_textured_format();

        assert_eq!(indices.len(), 6);
        let top_left = vertices.iter().find(|v| v.position == [-1.0, 0.5, 0.0]).unwrap();
        assert_eq!(top_left.tex_coords, [0.0, 0.0]);
    }
}
