use nalgebra::Vector3;

pub type Vec3 = Vector3<f64>;

/// Angle between two vectors in degrees. Zero-length inputs yield 0.
pub fn angle_between(a: &Vec3, b: &Vec3) -> f64 {
    let (na, nb) = (a.norm(), b.norm());
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (na * nb)).clamp(-1.0, 1.0).acos().to_degrees()
}

pub fn normalize_or(v: &Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize(f64::EPSILON).unwrap_or(fallback)
}

/// Local horizon frame at `position` for a body rotating about +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub up: Vec3,
    pub north: Vec3,
    pub east: Vec3,
}

impl LocalFrame {
    pub fn at(position: &Vec3) -> Self {
        let up = normalize_or(position, Vec3::z());
        let axis = Vec3::z();
        // At the poles north is undefined; any horizontal vector will do.
        let north = normalize_or(&(axis - up * axis.dot(&up)), Vec3::x());
        let east = north.cross(&up);
        LocalFrame { up, north, east }
    }

    /// Unit vector for a compass heading and a pitch above the horizon, both in degrees.
    pub fn heading(&self, heading: f64, pitch: f64) -> Vec3 {
        let (h, p) = (heading.to_radians(), pitch.to_radians());
        (self.north * h.cos() + self.east * h.sin()) * p.cos() + self.up * p.sin()
    }

    /// Pitch of `direction` above the local horizon in degrees.
    pub fn pitch_of(&self, direction: &Vec3) -> f64 {
        90.0 - angle_between(&self.up, direction)
    }
}

/// Rotate `from` toward `to` by at most `max_angle` degrees.
pub fn rotate_towards(from: &Vec3, to: &Vec3, max_angle: f64) -> Vec3 {
    let target = normalize_or(to, *from);
    let separation = angle_between(from, &target);
    if separation <= max_angle {
        return target;
    }
    let axis = from.cross(&target);
    let Some(axis) = axis.try_normalize(f64::EPSILON) else {
        return target;
    };
    let angle = max_angle.to_radians();
    let rotated =
        from * angle.cos() + axis.cross(from) * angle.sin() + axis * axis.dot(from) * (1.0 - angle.cos());
    normalize_or(&rotated, target)
}
