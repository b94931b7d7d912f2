use csar_fs::NormalizedPath;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_normalization_invariants(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));
        prop_assert!(!as_str.contains("//"));

        // Normalizing twice changes nothing
        let again = NormalizedPath::new(as_str);
        prop_assert_eq!(&path, &again);

        let roundtripped = NormalizedPath::new(path.to_native());
        prop_assert_eq!(path, roundtripped);
    }

    #[test]
    fn test_join_then_parent(a in "[A-Za-z0-9_-]{1,8}", b in "[A-Za-z0-9_-][A-Za-z0-9_.-]{0,7}") {
        let base = NormalizedPath::new(&a);
        let joined = base.join(&b);

        prop_assert_eq!(joined.file_name(), Some(b.as_str()));
        prop_assert_eq!(joined.parent(), Some(base));
    }
}
