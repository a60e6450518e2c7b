//! # Seed Entropy Unit Tests / 种子熵源单元测试

use matrix_stress::infra::entropy::{parse_seed, resolve_seed};

#[cfg(test)]
mod entropy_tests {
    use super::*;

    #[test]
    fn test_explicit_seed_is_kept() {
        assert_eq!(resolve_seed(12345), 12345);
        assert_eq!(resolve_seed(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_zero_seed_is_replaced() {
        // Whatever the environment holds, the resolved seed is never zero.
        assert_ne!(resolve_seed(0), 0);
    }

    #[test]
    fn test_parse_seed_accepts_signed_values() {
        assert_eq!(parse_seed("42"), Some(42));
        assert_eq!(parse_seed("  7 \n"), Some(7));
        assert_eq!(parse_seed("-1"), Some(u64::MAX));
        assert_eq!(parse_seed("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_seed("seed"), None);
        assert_eq!(parse_seed(""), None);
    }
}
