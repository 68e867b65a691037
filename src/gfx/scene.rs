//! Fixed scene content: instance positions and their transform rules.

use cgmath::{Deg, InnerSpace, Matrix4, Vector3};

/// World positions of the ten cube instances.
pub const CUBE_POSITIONS: [Vector3<f32>; 10] = [
    Vector3::new(0.0, 0.0, 0.0),
    Vector3::new(2.0, 5.0, -15.0),
    Vector3::new(-1.5, -2.2, -2.5),
    Vector3::new(-3.8, -2.0, -12.3),
    Vector3::new(2.4, -0.4, -3.5),
    Vector3::new(-1.7, 3.0, -7.5),
    Vector3::new(1.3, -2.0, -2.5),
    Vector3::new(1.5, 2.0, -2.5),
    Vector3::new(1.5, 0.2, -1.5),
    Vector3::new(-1.3, 1.0, -1.5),
];

/// World positions of the four point lights (and their markers).
pub const POINT_LIGHT_POSITIONS: [Vector3<f32>; 4] = [
    Vector3::new(0.7, 0.2, 2.0),
    Vector3::new(2.3, -3.3, -4.0),
    Vector3::new(-4.0, 2.0, -12.0),
    Vector3::new(0.0, 0.0, -3.0),
];

/// Each cube is tilted a further 20° than the previous one.
const CUBE_ROTATION_STEP_DEG: f32 = 20.0;
const CUBE_ROTATION_AXIS: Vector3<f32> = Vector3::new(1.0, 0.3, 0.5);

/// Light markers render as small cubes at a fifth of the mesh size.
const LIGHT_MARKER_SCALE: f32 = 0.2;

/// Model matrix for cube instance `index`: translate to its fixed position,
/// then rotate by an index-derived angle about a fixed tilted axis.
pub fn cube_model_matrix(index: usize) -> Matrix4<f32> {
    let angle = Deg(CUBE_ROTATION_STEP_DEG * index as f32);
    Matrix4::from_translation(CUBE_POSITIONS[index])
        * Matrix4::from_axis_angle(CUBE_ROTATION_AXIS.normalize(), angle)
}

/// Model matrix for a light marker: translate, then scale the cube down.
pub fn marker_model_matrix(position: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(position) * Matrix4::from_scale(LIGHT_MARKER_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{Point3, Transform};

    #[test]
    fn scene_holds_ten_cubes_and_four_lights() {
        assert_eq!(CUBE_POSITIONS.len(), 10);
        assert_eq!(POINT_LIGHT_POSITIONS.len(), 4);
    }

    #[test]
    fn first_cube_is_a_pure_translation() {
        let matrix = cube_model_matrix(0);
        let moved = matrix.transform_point(Point3::new(1.0, 2.0, 3.0));
        // Index 0 rotates by 0°, so points pass through unrotated.
        assert_relative_eq!(moved.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(moved.z, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn rotation_angle_grows_twenty_degrees_per_index() {
        for index in 0..10 {
            let matrix = cube_model_matrix(index);
            // Trace of the rotation block is 1 + 2cos(θ).
            let trace = matrix.x.x + matrix.y.y + matrix.z.z;
            let expected = 1.0 + 2.0 * (20.0f32 * index as f32).to_radians().cos();
            assert_relative_eq!(trace, expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn cube_transform_lands_on_its_position() {
        for (index, position) in CUBE_POSITIONS.iter().enumerate() {
            let matrix = cube_model_matrix(index);
            let origin = matrix.transform_point(Point3::new(0.0, 0.0, 0.0));
            assert_relative_eq!(origin.x, position.x, epsilon = 1e-5);
            assert_relative_eq!(origin.y, position.y, epsilon = 1e-5);
            assert_relative_eq!(origin.z, position.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn marker_transform_scales_down_around_its_light() {
        let position = POINT_LIGHT_POSITIONS[1];
        let matrix = marker_model_matrix(position);
        let corner = matrix.transform_point(Point3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(corner.x, position.x + 0.1, epsilon = 1e-5);
        assert_relative_eq!(corner.y, position.y + 0.1, epsilon = 1e-5);
        assert_relative_eq!(corner.z, position.z + 0.1, epsilon = 1e-5);
    }
}
