use common_money::{normalize_scale, MoneyError, Price};
use bigdecimal::BigDecimal;
use proptest::prelude::*;
use std::str::FromStr;

proptest! {
    // Whole cents are accepted and stored with exactly 2 fractional digits.
    #[test]
    fn whole_cent_prices_are_kept_exactly(cents in 0i64..10_000_000) {
        let raw = BigDecimal::from_str(&format!("{}.{:02}", cents / 100, cents % 100)).unwrap();
        let price = Price::new(raw.clone()).expect("non-negative price accepted");
        prop_assert_eq!(price.inner().as_bigint_and_exponent().1, 2);
        prop_assert_eq!(price.inner(), &raw);
        prop_assert_eq!(price.inner().clone(), normalize_scale(&raw));
    }

    // A non-zero third or fourth fractional digit would be lost, so it is refused.
    #[test]
    fn sub_cent_prices_are_rejected(cents in 0i64..10_000_000, extra in 1i64..100) {
        let raw = BigDecimal::from_str(&format!("{}.{:02}{:02}", cents / 100, cents % 100, extra)).unwrap();
        prop_assert!(matches!(Price::new(raw), Err(MoneyError::TooPrecise(_))));
    }

    #[test]
    fn negative_prices_are_rejected(cents in 1i64..10_000_000) {
        let raw = BigDecimal::from(-cents) / BigDecimal::from(100);
        prop_assert!(Price::new(raw).is_err());
    }
}
