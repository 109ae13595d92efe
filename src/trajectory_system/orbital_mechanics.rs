//! Closed-form orbital mechanics used by the ascent guidance.

use std::f64::consts::PI;

use crate::config::LaunchDirection;
use crate::constants::STANDARD_GRAVITY;
use crate::utils::vector3d::Vec3;

/// Inertial launch azimuth in compass degrees [0, 360).
///
/// When the requested inclination is shallower than the launch-site latitude allows,
/// the heading is clamped to due east (prograde orbits) or due west (retrograde).
pub fn launch_azimuth(
    latitude: f64,
    inclination: f64,
    direction: LaunchDirection,
    orbital_speed: f64,
    equatorial_speed: f64,
) -> f64 {
    let cos_lat = latitude.to_radians().cos();
    let cos_inc = inclination.to_radians().cos();

    if cos_inc.abs() > cos_lat.abs() {
        return if inclination <= 90.0 { 90.0 } else { 270.0 };
    }

    let inertial = (cos_inc / cos_lat).clamp(-1.0, 1.0).asin();
    let rotating = ((orbital_speed * inertial.sin() - equatorial_speed * cos_lat)
        / (orbital_speed * inertial.cos()))
    .atan()
    .to_degrees();

    let azimuth = match direction {
        LaunchDirection::North if rotating >= 0.0 => rotating,
        LaunchDirection::North => 360.0 + rotating,
        LaunchDirection::South => 180.0 - rotating,
    };
    azimuth.rem_euclid(360.0)
}

/// Speed change needed at apoapsis to circularize, from vis-viva.
/// `apoapsis` is an altitude above `body_radius`.
pub fn circularization_delta_v(mu: f64, body_radius: f64, apoapsis: f64, semi_major_axis: f64) -> f64 {
    let radius = body_radius + apoapsis;
    let circular = (mu / radius).sqrt();
    let current = (mu * (2.0 / radius - 1.0 / semi_major_axis)).max(0.0).sqrt();
    circular - current
}

/// Burn duration for `delta_v` at constant thrust and ISP (ideal rocket equation).
pub fn ideal_burn_time(delta_v: f64, mass: f64, thrust: f64, isp: f64) -> f64 {
    if delta_v <= 0.0 {
        return 0.0;
    }
    let exhaust_velocity = isp * STANDARD_GRAVITY;
    let final_mass = mass * (-delta_v / exhaust_velocity).exp();
    let mass_flow = thrust / exhaust_velocity;
    (mass - final_mass) / mass_flow
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    Point(Vec3),
    /// Line is parallel to the plane and never meets it.
    Parallel,
    /// Line lies in the plane.
    Contained,
}

impl Intersection {
    pub fn is_degenerate(&self) -> bool {
        !matches!(self, Intersection::Point(_))
    }

    pub fn point(&self) -> Option<Vec3> {
        match self {
            Intersection::Point(p) => Some(*p),
            _ => None,
        }
    }
}

pub fn line_plane_intersection(
    line_direction: &Vec3,
    plane_normal: &Vec3,
    line_point: &Vec3,
    plane_point: &Vec3,
) -> Intersection {
    let denominator = line_direction.dot(plane_normal);
    let offset = (plane_point - line_point).dot(plane_normal);

    if denominator == 0.0 {
        return if offset == 0.0 {
            Intersection::Contained
        } else {
            Intersection::Parallel
        };
    }

    Intersection::Point(line_point + line_direction * (offset / denominator))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub eccentricity_vector: Vec3,
    pub angular_momentum: Vec3,
}

impl OrbitalElements {
    pub fn from_state(mu: f64, position: &Vec3, velocity: &Vec3) -> Self {
        let radius = position.norm();
        let speed = velocity.norm();
        let energy = speed * speed / 2.0 - mu / radius;
        let angular_momentum = position.cross(velocity);
        let eccentricity_vector = velocity.cross(&angular_momentum) / mu - position / radius;

        OrbitalElements {
            semi_major_axis: -mu / (2.0 * energy),
            eccentricity: eccentricity_vector.norm(),
            eccentricity_vector,
            angular_momentum,
        }
    }

    pub fn apoapsis_radius(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    pub fn periapsis_radius(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }
}

/// Below this eccentricity the apsides are undefined.
const CIRCULAR_ECCENTRICITY: f64 = 1e-9;

/// Inertial velocity the vessel will have when it next crosses apoapsis.
/// For a circular orbit the current velocity is returned.
pub fn velocity_at_apoapsis(mu: f64, position: &Vec3, velocity: &Vec3) -> Vec3 {
    let elements = OrbitalElements::from_state(mu, position, velocity);
    if elements.eccentricity < CIRCULAR_ECCENTRICITY {
        return *velocity;
    }
    let apoapsis_direction = -elements.eccentricity_vector / elements.eccentricity;
    let h = elements.angular_momentum.norm();
    let speed = h / elements.apoapsis_radius();
    elements
        .angular_momentum
        .cross(&apoapsis_direction)
        .normalize()
        * speed
}

/// Seconds until the next apoapsis, or 0 for circular and open orbits.
pub fn time_to_apoapsis(mu: f64, position: &Vec3, velocity: &Vec3) -> f64 {
    let elements = OrbitalElements::from_state(mu, position, velocity);
    let (a, e) = (elements.semi_major_axis, elements.eccentricity);
    if e < CIRCULAR_ECCENTRICITY || a <= 0.0 || e >= 1.0 {
        return 0.0;
    }

    let cos_nu = (elements.eccentricity_vector.dot(position) / (e * position.norm())).clamp(-1.0, 1.0);
    let mut true_anomaly = cos_nu.acos();
    if position.dot(velocity) < 0.0 {
        true_anomaly = 2.0 * PI - true_anomaly;
    }

    let eccentric_anomaly = 2.0 * (((1.0 - e) / (1.0 + e)).sqrt() * (true_anomaly / 2.0).tan()).atan();
    let mean_anomaly = eccentric_anomaly - e * eccentric_anomaly.sin();
    let mean_motion = (mu / a.powi(3)).sqrt();

    (PI - mean_anomaly).rem_euclid(2.0 * PI) / mean_motion
}

pub fn circular_speed(mu: f64, radius: f64) -> f64 {
    (mu / radius).sqrt()
}

/// Surface speed at the equator; zero for a non-rotating body.
pub fn equatorial_speed(radius: f64, rotation_period: f64) -> f64 {
    if rotation_period <= 0.0 {
        0.0
    } else {
        2.0 * PI * radius / rotation_period
    }
}

/// Effective ISP of engines burning together, weighted by mass flow.
pub fn combined_isp<I>(engines: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (thrust, flow) = engines
        .into_iter()
        .filter(|(thrust, isp)| *thrust > 0.0 && *isp > 0.0)
        .fold((0.0, 0.0), |(t, f), (thrust, isp)| (t + thrust, f + thrust / isp));
    if flow > 0.0 {
        thrust / flow
    } else {
        0.0
    }
}
