//! Conductance of a single directed edge

use super::SpeedModel;

/// Layer values at one endpoint of an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    pub elevation: f64,
    pub density: f64,
    pub roughness: f64,
    /// Both the cliff and the water mask allow passage
    pub passable: bool,
}

/// Outcome of evaluating one directed edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conductance {
    /// Speed in ground units per second, strictly positive and finite
    Speed(f64),
    /// An endpoint lies on a cliff or in water
    Barrier,
    /// The speed model produced a non-positive or non-finite speed
    Degenerate(f64),
}

impl Conductance {
    /// Speed, with barriers and degenerate values as 0
    pub fn value(&self) -> f64 {
        match self {
            Conductance::Speed(v) => *v,
            Conductance::Barrier | Conductance::Degenerate(_) => 0.0,
        }
    }

    /// Traversal time over `distance`, `+∞` for zero conductance
    pub fn travel_time(&self, distance: f64) -> f64 {
        match self {
            Conductance::Speed(v) => distance / v,
            _ => f64::INFINITY,
        }
    }
}

/// Signed slope angle in degrees for an elevation change over a
/// horizontal distance
pub fn slope_angle(dz: f64, distance: f64) -> f64 {
    (dz / distance).atan().to_degrees()
}

/// Conductance of the directed edge `from → to` over `distance` ground units.
///
/// Slope is taken in the direction of travel; density and roughness are
/// the means of the two endpoints. A barrier at either endpoint forces zero
/// conductance whatever the other terms are.
pub fn edge_conductance<M: SpeedModel + ?Sized>(
    model: &M,
    from: &CellSample,
    to: &CellSample,
    distance: f64,
) -> Conductance {
    if !(from.passable && to.passable) {
        return Conductance::Barrier;
    }

    let slope = slope_angle(to.elevation - from.elevation, distance);
    let density = (from.density + to.density) / 2.0;
    let roughness = (from.roughness + to.roughness) / 2.0;

    let speed = model.speed(slope, density, roughness);
    if speed > 0.0 && speed.is_finite() {
        Conductance::Speed(speed)
    } else {
        Conductance::Degenerate(speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conductance::LorentzianSpeed;
    use approx::assert_relative_eq;

    fn cell(elevation: f64, density: f64, roughness: f64) -> CellSample {
        CellSample {
            elevation,
            density,
            roughness,
            passable: true,
        }
    }

    #[test]
    fn test_direction_flips_slope_sign() {
        let low = cell(100.0, 0.0, 0.0);
        let high = cell(105.0, 0.0, 0.0);

        let up = edge_conductance(&LorentzianSpeed, &low, &high, 10.0);
        let down = edge_conductance(&LorentzianSpeed, &high, &low, 10.0);

        let s = slope_angle(5.0, 10.0);
        assert_relative_eq!(slope_angle(-5.0, 10.0), -s);
        assert_relative_eq!(up.value(), LorentzianSpeed::lorentzian(s));
        assert_relative_eq!(down.value(), LorentzianSpeed::lorentzian(-s));
        assert!(up.value() < down.value());
    }

    #[test]
    fn test_cover_is_averaged_symmetrically() {
        let a = cell(0.0, 0.2, 0.0);
        let b = cell(0.0, 0.6, 0.1);
        let ab = edge_conductance(&LorentzianSpeed, &a, &b, 10.0).value();
        let ba = edge_conductance(&LorentzianSpeed, &b, &a, 10.0).value();

        assert_relative_eq!(ab, ba);
        assert_relative_eq!(ab, LorentzianSpeed.speed(0.0, 0.4, 0.05));
    }

    #[test]
    fn test_barrier_at_either_end_is_zero() {
        let open = cell(0.0, 0.0, 0.0);
        let blocked = CellSample {
            passable: false,
            ..open
        };

        for (from, to) in [(&open, &blocked), (&blocked, &open), (&blocked, &blocked)] {
            let c = edge_conductance(&LorentzianSpeed, from, to, 10.0);
            assert_eq!(c, Conductance::Barrier);
            assert_eq!(c.value(), 0.0);
            assert_eq!(c.travel_time(10.0), f64::INFINITY);
        }
    }

    #[test]
    fn test_negative_cover_is_degenerate() {
        let bad = cell(0.0, -1.0, 0.0);
        let c = edge_conductance(&LorentzianSpeed, &bad, &bad, 10.0);
        assert!(matches!(c, Conductance::Degenerate(v) if v < 0.0));
        assert_eq!(c.value(), 0.0);
    }
}
