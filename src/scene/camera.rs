use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective { fov_y_radians: f32 },
    /// Shadow-map cameras; `half_extent` is half the width of the covered area.
    Orthographic { half_extent: f32 },
}

/// The view a pass draws from. An accumulator without one skips its finisher.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn perspective(eye: Vec3, target: Vec3, fov_y_radians: f32) -> Self {
        Self {
            eye,
            target,
            projection: Projection::Perspective { fov_y_radians },
            ..Self::default()
        }
    }

    /// Looks along `direction` from far enough back to cover `half_extent`.
    pub fn shadow(direction: Vec3, focus: Vec3, half_extent: f32) -> Self {
        let direction = direction.normalize_or_zero();
        let direction = if direction == Vec3::ZERO { Vec3::NEG_Y } else { direction };
        let up = if direction.abs_diff_eq(Vec3::NEG_Y, 1e-3) || direction.abs_diff_eq(Vec3::Y, 1e-3) {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Self {
            eye: focus - direction * half_extent * 2.0,
            target: focus,
            up,
            projection: Projection::Orthographic { half_extent },
            near: 0.1,
            far: half_extent * 4.0,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::Perspective {
                fov_y_radians: 60f32.to_radians(),
            },
            near: 0.1,
            far: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_camera_backs_away_from_focus() {
        let cam = Camera::shadow(Vec3::new(0.0, -2.0, 0.0), Vec3::ONE, 10.0);
        assert_eq!(cam.target, Vec3::ONE);
        assert!(cam.eye.abs_diff_eq(Vec3::new(1.0, 21.0, 1.0), 1e-4));
        assert_eq!(cam.up, Vec3::Z);
        assert_eq!(cam.projection, Projection::Orthographic { half_extent: 10.0 });
    }

    #[test]
    fn degenerate_shadow_direction_looks_down() {
        let cam = Camera::shadow(Vec3::ZERO, Vec3::ZERO, 5.0);
        assert!(cam.eye.y > 0.0);
    }
}
