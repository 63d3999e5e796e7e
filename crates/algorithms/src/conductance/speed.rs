//! Speed response to slope and ground cover

use std::f64::consts::PI;

/// Predicts walking speed (ground units per second) for one edge.
pub trait SpeedModel: Send + Sync {
    /// Speed for a signed slope angle in degrees (positive uphill in the
    /// direction of travel) and the mean density/roughness of the two
    /// endpoint cells.
    fn speed(&self, slope_deg: f64, density: f64, roughness: f64) -> f64;
}

/// Lorentzian speed-slope curve damped by vegetation density and roughness.
///
/// ```text
/// lorentzian(s) = c / (π · b · (1 + ((s − a) / b)²))
/// speed         = lorentzian(s) / (d · density + e · roughness + 1)
/// ```
///
/// The constants are an empirical fit; they are not parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LorentzianSpeed;

impl LorentzianSpeed {
    /// Slope of peak speed (degrees); slightly downhill
    pub const A: f64 = -2.320;
    /// Half-width of the curve (degrees)
    pub const B: f64 = 26.315;
    /// Scale
    pub const C: f64 = 147.362;
    /// Density damping
    pub const D: f64 = 15.265;
    /// Roughness damping
    pub const E: f64 = 16.505;

    /// Unobstructed speed at slope `s` degrees
    pub fn lorentzian(slope_deg: f64) -> f64 {
        let u = (slope_deg - Self::A) / Self::B;
        Self::C / (PI * Self::B * (1.0 + u * u))
    }

    /// Divisor applied for ground cover
    pub fn obstruction(density: f64, roughness: f64) -> f64 {
        Self::D * density + Self::E * roughness + 1.0
    }

    /// Slope at which the curve peaks
    pub fn peak_slope() -> f64 {
        Self::A
    }
}

impl SpeedModel for LorentzianSpeed {
    fn speed(&self, slope_deg: f64, density: f64, roughness: f64) -> f64 {
        Self::lorentzian(slope_deg) / Self::obstruction(density, roughness)
    }
}
