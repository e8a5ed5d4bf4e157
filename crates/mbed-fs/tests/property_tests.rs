use mbed_fs::NormalizedPath;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_normalization_invariants(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));
        prop_assert!(!as_str.contains("//"));

        // Normalizing twice changes nothing
        let again = NormalizedPath::new(path.to_native());
        prop_assert_eq!(&path, &again);
    }

    #[test]
    fn test_join_then_strip_prefix(a in "[a-z_]{1,8}(/[a-z_]{1,8}){0,3}", b in "[a-z_]{1,8}(/[a-z_]{1,8}){0,3}") {
        let base = NormalizedPath::new(&a);
        let joined = base.join(&b);

        prop_assert!(joined.starts_with(&base));
        let rest = joined.strip_prefix(&base).unwrap();
        prop_assert_eq!(rest.as_str(), b.as_str());
    }
}
