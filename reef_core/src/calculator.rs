//! Dose volume from a normalized gap.

use crate::reference::Potency;

/// `target - current`, both canonical.
#[inline]
pub fn gap(current: f64, target: f64) -> f64 {
    target - current
}

/// Total additive volume (mL) to close `gap` in `volume_liters` of water.
///
/// With potency defined per mL per liter the volume is
/// `gap * volume_liters / potency`. Non-positive gaps need no dose.
#[inline]
pub fn dose_volume_ml(gap: f64, volume_liters: f64, potency: Potency) -> f64 {
    if gap <= 0.0 {
        return 0.0;
    }
    gap * volume_liters / potency.value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::PotencyBasis;

    #[test]
    fn per_liter_formula() {
        let p = Potency::per_liter(1.4).unwrap();
        let ml = dose_volume_ml(1.5, 100.0, p);
        assert!((ml - 107.142_857).abs() < 1e-3);
    }

    #[test]
    fn gallon_declared_potency_matches_gallon_math() {
        // 1 mL/gal raises 1.4 dKH: 2 dKH in 50 gal needs 2 * 50 / 1.4 mL.
        let p = Potency::declared(1.4, PotencyBasis::PerGallon).unwrap();
        let liters = 50.0 * crate::units::LITERS_PER_GALLON;
        let ml = dose_volume_ml(2.0, liters, p);
        assert!((ml - 2.0 * 50.0 / 1.4).abs() < 1e-9);
    }

    #[test]
    fn no_dose_for_non_positive_gap() {
        let p = Potency::per_liter(1.0).unwrap();
        assert_eq!(dose_volume_ml(0.0, 100.0, p), 0.0);
        assert_eq!(dose_volume_ml(-3.0, 100.0, p), 0.0);
    }
}
