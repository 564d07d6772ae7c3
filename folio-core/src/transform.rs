/// Tilt transforms and the matrices that render them
use nalgebra::{Matrix4, Vector3};

/// Rotation (in degrees) and uniform scale applied to a tilted element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltTransform {
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub scale: f32,
}

impl TiltTransform {
    pub fn new(rotate_x: f32, rotate_y: f32, scale: f32) -> Self {
        Self {
            rotate_x,
            rotate_y,
            scale,
        }
    }

    /// The resting transform: no rotation, unit scale
    pub fn neutral() -> Self {
        Self {
            rotate_x: 0.0,
            rotate_y: 0.0,
            scale: 1.0,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.rotate_x == 0.0 && self.rotate_y == 0.0 && self.scale == 1.0
    }

    pub fn is_finite(&self) -> bool {
        self.rotate_x.is_finite() && self.rotate_y.is_finite() && self.scale.is_finite()
    }

    /// Render as a CSS transform function list viewed through `perspective_px`
    pub fn css(&self, perspective_px: f32) -> String {
        format!(
            "perspective({}px) rotateX({:.2}deg) rotateY({:.2}deg) scale({})",
            perspective_px, self.rotate_x, self.rotate_y, self.scale
        )
    }

    /// Render as a single CSS `matrix3d(...)`
    pub fn css_matrix(&self, perspective_px: f32) -> String {
        Transform::css_matrix3d(&Transform::model_matrix(self, perspective_px))
    }
}

impl Default for TiltTransform {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Matrix builders for tilt transforms.
///
/// Composition follows CSS order: the leftmost function in a transform
/// list is the leftmost factor.
pub struct Transform;

impl Transform {
    /// Rotation about X then Y, angles taken in degrees
    pub fn rotation_matrix(transform: &TiltTransform) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(transform.rotate_x.to_radians(), 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, transform.rotate_y.to_radians(), 0.0));

        rx * ry
    }

    /// Create a uniform scale matrix
    pub fn scale_matrix(scale: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(scale)
    }

    /// CSS `perspective(d)`: identity with `m34 = -1/d`
    pub fn perspective_matrix(distance: f32) -> Matrix4<f32> {
        let mut matrix = Matrix4::identity();
        if distance > 0.0 && distance.is_finite() {
            matrix[(3, 2)] = -1.0 / distance;
        }
        matrix
    }

    /// perspective * rotateX * rotateY * scale
    pub fn model_matrix(transform: &TiltTransform, perspective_px: f32) -> Matrix4<f32> {
        Self::perspective_matrix(perspective_px)
            * Self::rotation_matrix(transform)
            * Self::scale_matrix(transform.scale)
    }

    /// Format a matrix as CSS `matrix3d`, which lists entries column-major
    pub fn css_matrix3d(matrix: &Matrix4<f32>) -> String {
        let entries = matrix
            .as_slice()
            .iter()
            .map(|v| format!("{}", v))
            .collect::<Vec<_>>()
            .join(", ");
        format!("matrix3d({})", entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_transform() {
        let neutral = TiltTransform::neutral();
        assert!(neutral.is_neutral());
        assert_eq!(TiltTransform::default(), neutral);

        let matrix = Transform::rotation_matrix(&neutral);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_css_rendering() {
        let transform = TiltTransform::new(3.75, -7.5, 1.05);
        assert_eq!(
            transform.css(1000.0),
            "perspective(1000px) rotateX(3.75deg) rotateY(-7.50deg) scale(1.05)"
        );
    }

    #[test]
    fn test_perspective_matrix() {
        let matrix = Transform::perspective_matrix(1000.0);
        assert!((matrix[(3, 2)] + 0.001).abs() < 1e-7);

        // Degenerate distances fall back to identity
        assert_eq!(Transform::perspective_matrix(0.0), Matrix4::identity());
    }

    #[test]
    fn test_rotation_about_x_moves_y_axis_towards_z() {
        let matrix = Transform::rotation_matrix(&TiltTransform::new(90.0, 0.0, 1.0));
        let rotated = matrix.transform_vector(&Vector3::new(0.0, 1.0, 0.0));
        assert!(rotated.y.abs() < 1e-6);
        assert!((rotated.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_css_matrix3d_has_sixteen_entries() {
        let css = TiltTransform::new(5.0, -5.0, 1.05).css_matrix(1000.0);
        assert!(css.starts_with("matrix3d("));
        assert_eq!(css.matches(',').count(), 15);
    }
}
