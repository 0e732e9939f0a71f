//! First-person camera with yaw/pitch look controls

use talus_core::{mat4_mul, Mat4, Vec3, MAT4_IDENTITY};

/// Pitch limit in degrees. Straight up/down would collapse the look-at basis.
const PITCH_LIMIT: f32 = 89.9;

/// A first-person 3D camera
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Horizontal angle in degrees. 0 looks down +Z, 90 looks down +X.
    pub yaw: f32,
    /// Vertical angle in degrees, positive looks up
    pub pitch: f32,
    /// Field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.05,
            far: 10000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get camera position as an array for GPU upload
    pub fn position_array(&self) -> [f32; 3] {
        [self.position.x, self.position.y, self.position.z]
    }

    /// Get camera forward direction (world space, unit length)
    pub fn forward_vector(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();

        Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            pitch.cos() * yaw.cos(),
        )
    }

    /// Get camera right vector (world space, horizontal)
    pub fn right_vector(&self) -> Vec3 {
        self.forward_vector().cross(&Vec3::UP).normalized()
    }

    /// Apply a mouse delta in pixels. Positive dy (mouse moved down) pitches
    /// the view down.
    pub fn rotate(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw -= dx * sensitivity;
        self.pitch -= dy * sensitivity;

        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        // Keep yaw in (-180, 180] so it never accumulates precision loss
        if self.yaw > 180.0 {
            self.yaw -= 360.0;
        } else if self.yaw <= -180.0 {
            self.yaw += 360.0;
        }
    }

    /// Get the view matrix (4x4, column-major)
    pub fn view_matrix(&self) -> Mat4 {
        let f = self.forward_vector();
        let s = f.cross(&Vec3::UP).normalized();
        let u = s.cross(&f);

        [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [
                -s.dot(&self.position),
                -u.dot(&self.position),
                f.dot(&self.position),
                1.0,
            ],
        ]
    }

    /// Get the projection matrix (4x4, column-major)
    ///
    /// Maps view-space depth to [0, 1] clip range (wgpu convention):
    /// z_view = -near → 0, z_view = -far → 1.
    pub fn projection_matrix(&self) -> Mat4 {
        let fov_rad = self.fov.to_radians();
        let f = 1.0 / (fov_rad / 2.0).tan();

        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, self.far / (self.near - self.far), -1.0],
            [0.0, 0.0, (self.near * self.far) / (self.near - self.far), 0.0],
        ]
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        mat4_mul(&proj, &view)
    }
}

/// Compute the inverse of a 4x4 column-major matrix using cofactor expansion.
///
/// Panics if the matrix is singular. View and projection matrices built from
/// finite camera parameters are always invertible, so a singular input here
/// means corrupted state upstream.
pub fn mat4_inverse(m: &Mat4) -> Mat4 {
    // Flatten column-major to indexable
    let s = |col: usize, row: usize| -> f32 { m[col][row] };

    let c00 = s(2, 2) * s(3, 3) - s(3, 2) * s(2, 3);
    let c02 = s(1, 2) * s(3, 3) - s(3, 2) * s(1, 3);
    let c03 = s(1, 2) * s(2, 3) - s(2, 2) * s(1, 3);

    let c04 = s(2, 1) * s(3, 3) - s(3, 1) * s(2, 3);
    let c06 = s(1, 1) * s(3, 3) - s(3, 1) * s(1, 3);
    let c07 = s(1, 1) * s(2, 3) - s(2, 1) * s(1, 3);

    let c08 = s(2, 1) * s(3, 2) - s(3, 1) * s(2, 2);
    let c10 = s(1, 1) * s(3, 2) - s(3, 1) * s(1, 2);
    let c11 = s(1, 1) * s(2, 2) - s(2, 1) * s(1, 2);

    let c12 = s(2, 0) * s(3, 3) - s(3, 0) * s(2, 3);
    let c14 = s(1, 0) * s(3, 3) - s(3, 0) * s(1, 3);
    let c15 = s(1, 0) * s(2, 3) - s(2, 0) * s(1, 3);

    let c16 = s(2, 0) * s(3, 2) - s(3, 0) * s(2, 2);
    let c18 = s(1, 0) * s(3, 2) - s(3, 0) * s(1, 2);
    let c19 = s(1, 0) * s(2, 2) - s(2, 0) * s(1, 2);

    let c20 = s(2, 0) * s(3, 1) - s(3, 0) * s(2, 1);
    let c22 = s(1, 0) * s(3, 1) - s(3, 0) * s(1, 1);
    let c23 = s(1, 0) * s(2, 1) - s(2, 0) * s(1, 1);

    let f0 = [c00, c00, c02, c03];
    let f1 = [c04, c04, c06, c07];
    let f2 = [c08, c08, c10, c11];
    let f3 = [c12, c12, c14, c15];
    let f4 = [c16, c16, c18, c19];
    let f5 = [c20, c20, c22, c23];

    let v0 = [s(1, 0), s(0, 0), s(0, 0), s(0, 0)];
    let v1 = [s(1, 1), s(0, 1), s(0, 1), s(0, 1)];
    let v2 = [s(1, 2), s(0, 2), s(0, 2), s(0, 2)];
    let v3 = [s(1, 3), s(0, 3), s(0, 3), s(0, 3)];

    let mut inv = [[0.0f32; 4]; 4];
    let sign_a = [1.0, -1.0, 1.0, -1.0];
    let sign_b = [-1.0, 1.0, -1.0, 1.0];

    for i in 0..4 {
        inv[0][i] = sign_a[i] * (v1[i] * f0[i] - v2[i] * f1[i] + v3[i] * f2[i]);
        inv[1][i] = sign_b[i] * (v0[i] * f0[i] - v2[i] * f3[i] + v3[i] * f4[i]);
        inv[2][i] = sign_a[i] * (v0[i] * f1[i] - v1[i] * f3[i] + v3[i] * f5[i]);
        inv[3][i] = sign_b[i] * (v0[i] * f2[i] - v1[i] * f4[i] + v2[i] * f5[i]);
    }

    let det = s(0, 0) * inv[0][0] + s(1, 0) * inv[0][1] + s(2, 0) * inv[0][2] + s(3, 0) * inv[0][3];

    assert!(
        det.abs() > 1e-10,
        "attempted to invert a singular matrix (det = {det})"
    );

    let inv_det = 1.0 / det;
    for col in &mut inv {
        for val in col.iter_mut() {
            *val *= inv_det;
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform_point(m: &Mat4, p: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = m[0][row] * p[0] + m[1][row] * p[1] + m[2][row] * p[2] + m[3][row] * p[3];
        }
        out
    }

    #[test]
    fn forward_vector_follows_yaw() {
        let mut camera = Camera::new();

        camera.yaw = 0.0;
        let f = camera.forward_vector();
        assert!((f.x).abs() < 1e-6 && (f.z - 1.0).abs() < 1e-6);

        camera.yaw = 90.0;
        let f = camera.forward_vector();
        assert!((f.x - 1.0).abs() < 1e-6 && (f.z).abs() < 1e-6);
    }

    #[test]
    fn rotate_clamps_pitch() {
        let mut camera = Camera::new();
        camera.rotate(0.0, -10000.0, 0.2);
        assert!(camera.pitch <= PITCH_LIMIT);

        camera.rotate(0.0, 10000.0, 0.2);
        assert!(camera.pitch >= -PITCH_LIMIT);
    }

    #[test]
    fn rotate_wraps_yaw() {
        let mut camera = Camera::new();
        camera.yaw = 179.0;
        camera.rotate(-10.0, 0.0, 1.0);
        assert!(camera.yaw > -180.0 && camera.yaw <= 180.0);
        assert!((camera.yaw - (-171.0)).abs() < 1e-4);
    }

    #[test]
    fn projection_maps_near_to_zero_and_far_to_one() {
        let camera = Camera {
            near: 0.05,
            far: 10000.0,
            ..Camera::new()
        };
        let proj = camera.projection_matrix();

        let near_clip = transform_point(&proj, [0.0, 0.0, -camera.near, 1.0]);
        assert!((near_clip[2] / near_clip[3]).abs() < 1e-5);

        let far_clip = transform_point(&proj, [0.0, 0.0, -camera.far, 1.0]);
        assert!((far_clip[2] / far_clip[3] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, -5.0),
            ..Camera::new()
        };
        let view = camera.view_matrix();

        // A point 5 units down +Z from the camera lands on the view-space -Z axis
        let p = transform_point(&view, [0.0, 0.0, 0.0, 1.0]);
        assert!((p[0]).abs() < 1e-5);
        assert!((p[1]).abs() < 1e-5);
        assert!((p[2] - (-5.0)).abs() < 1e-5);
    }

    #[test]
    fn inverse_roundtrips_view_projection() {
        let camera = Camera {
            position: Vec3::new(100.0, 125.0, 100.0),
            yaw: 45.0,
            pitch: -10.0,
            ..Camera::new()
        };
        let vp = camera.view_projection_matrix();
        let inv = mat4_inverse(&vp);
        let product = mat4_mul(&vp, &inv);

        for col in 0..4 {
            for row in 0..4 {
                let expected = if col == row { 1.0 } else { 0.0 };
                assert!(
                    (product[col][row] - expected).abs() < 1e-3,
                    "product[{col}][{row}] = {}",
                    product[col][row]
                );
            }
        }
    }

    #[test]
    fn inverse_of_identity_is_identity() {
        let inv = mat4_inverse(&MAT4_IDENTITY);
        assert_eq!(inv, MAT4_IDENTITY);
    }

    #[test]
    #[should_panic(expected = "singular")]
    fn inverse_panics_on_singular_matrix() {
        let zero = [[0.0f32; 4]; 4];
        mat4_inverse(&zero);
    }
}
