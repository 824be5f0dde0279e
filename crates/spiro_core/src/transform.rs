//! 4x4 transformation matrix
//!
//! 2D affine transforms are carried in homogeneous 4x4 form so the same
//! matrix type serves both the render state and the projection uniform.

use crate::geometry::Point;

/// 4x4 transformation matrix (column-major)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation about the Z axis (counter-clockwise in a Y-up frame)
    pub fn rotation_z(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Orthographic projection mapping the given box to clip space
    ///
    /// Passing `bottom > top` flips the vertical axis, which is how pixel
    /// space with the origin at the top-left is produced.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rl = right - left;
        let tb = top - bottom;
        let fna = far - near;
        Self {
            cols: [
                [2.0 / rl, 0.0, 0.0, 0.0],
                [0.0, 2.0 / tb, 0.0, 0.0],
                [0.0, 0.0, -2.0 / fna, 0.0],
                [
                    -(right + left) / rl,
                    -(top + bottom) / tb,
                    -(far + near) / fna,
                    1.0,
                ],
            ],
        }
    }

    /// Multiply two matrices (`self * other`)
    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut result = [[0.0f32; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    result[i][j] += self.cols[k][j] * other.cols[i][k];
                }
            }
        }
        Mat4 { cols: result }
    }

    /// Transform a point in the z = 0 plane, treating it as `(x, y, 0, 1)`
    pub fn transform_point(&self, p: Point) -> Point {
        let c = &self.cols;
        Point::new(
            c[0][0] * p.x + c[1][0] * p.y + c[3][0],
            c[0][1] * p.x + c[1][1] * p.y + c[3][1],
        )
    }

    /// Transform a point through the full homogeneous matrix, returning `[x, y, z, w]`
    pub fn transform_homogeneous(&self, p: Point) -> [f32; 4] {
        let c = &self.cols;
        let mut out = [0.0; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = c[0][row] * p.x + c[1][row] * p.y + c[3][row];
        }
        out
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Column data laid out for GPU upload
    pub fn to_cols_array(&self) -> [[f32; 4]; 4] {
        self.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
    }

    #[test]
    fn test_translate_then_rotate() {
        let m = Mat4::IDENTITY
            .mul(&Mat4::translation(10.0, 0.0, 0.0))
            .mul(&Mat4::rotation_z(FRAC_PI_2));
        assert!(approx(m.transform_point(Point::new(1.0, 0.0)), Point::new(10.0, 1.0)));
    }

    #[test]
    fn test_rotate_then_translate_differs() {
        let m = Mat4::rotation_z(FRAC_PI_2).mul(&Mat4::translation(10.0, 0.0, 0.0));
        assert!(approx(m.transform_point(Point::new(1.0, 0.0)), Point::new(0.0, 11.0)));
    }

    #[test]
    fn test_scale() {
        let m = Mat4::scale(2.0, 3.0, 1.0);
        assert!(approx(m.transform_point(Point::new(4.0, 5.0)), Point::new(8.0, 15.0)));
    }

    #[test]
    fn test_orthographic_pixel_space() {
        // Row 0 at the top of the viewport
        let proj = Mat4::orthographic(0.0, 800.0, 600.0, 0.0, -1.0, 1.0);
        let top_left = proj.transform_homogeneous(Point::new(0.0, 0.0));
        let bottom_right = proj.transform_homogeneous(Point::new(800.0, 600.0));
        assert!((top_left[0] + 1.0).abs() < 1e-6 && (top_left[1] - 1.0).abs() < 1e-6);
        assert!((bottom_right[0] - 1.0).abs() < 1e-6 && (bottom_right[1] + 1.0).abs() < 1e-6);
        assert_eq!(top_left[2], 0.0);
        assert_eq!(top_left[3], 1.0);
    }

    #[test]
    fn test_identity_mul() {
        let t = Mat4::translation(3.0, 4.0, 0.0);
        assert_eq!(Mat4::IDENTITY.mul(&t), t);
        assert_eq!(t.mul(&Mat4::IDENTITY), t);
    }
}
