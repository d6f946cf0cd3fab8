use netpanel::display::{SignalBand, gauge_fill_fraction, gauge_fill_width};
use proptest::prelude::*;

proptest! {
    #[test]
    fn band_matches_threshold_ranges(s in -150i32..=20) {
        let expected = if s >= -30 {
            SignalBand::Amazing
        } else if s >= -67 {
            SignalBand::VeryGood
        } else if s >= -70 {
            SignalBand::Okay
        } else {
            SignalBand::Poor
        };
        prop_assert_eq!(SignalBand::from_dbm(s), expected);
    }

    #[test]
    fn stronger_signal_never_ranks_lower(a in -150i32..=20, b in -150i32..=20) {
        let (weak, strong) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(SignalBand::from_dbm(weak) <= SignalBand::from_dbm(strong));
        prop_assert!(gauge_fill_fraction(weak) <= gauge_fill_fraction(strong));
        prop_assert!(gauge_fill_width(weak) <= gauge_fill_width(strong));
    }

    #[test]
    fn fill_fraction_stays_in_unit_range(s in any::<i16>()) {
        let f = gauge_fill_fraction(s as i32);
        prop_assert!((0.0..=1.0).contains(&f));
    }
}
