//! Integration tests for identifiers and the identifier registry.

use pagedom::{Error, Id, IdRegistry};

#[test]
fn test_generated_ids_avoid_registered() {
    let mut registry = IdRegistry::new();
    for text in ["id1", "id2", "id4"] {
        registry.register(text).unwrap();
    }

    let mut generated = Vec::new();
    for _ in 0..3 {
        let id = registry.create_id(None).unwrap();
        generated.push(id.to_string());
    }
    assert_eq!(generated, vec!["id3", "id5", "id6"]);
}

#[test]
fn test_generated_id_not_returned_until_unregistered() {
    let mut registry = IdRegistry::new();
    let taken = registry.register("r1").unwrap();

    let next = registry.generate_id(Some("r")).unwrap();
    assert_ne!(next, taken);

    assert!(registry.unregister_id(&taken));
    assert!(!registry.unregister_id(&taken));
}

#[test]
fn test_counters_per_prefix() {
    let mut registry = IdRegistry::new();
    assert_eq!(registry.create_id(Some("l")).unwrap().as_str(), "l1");
    assert_eq!(registry.create_id(Some("w")).unwrap().as_str(), "w1");
    assert_eq!(registry.create_id(Some("l")).unwrap().as_str(), "l2");
}

#[test]
fn test_invalid_formats() {
    let mut registry = IdRegistry::new();
    for text in ["", "1st", "9"] {
        assert!(matches!(
            registry.register(text),
            Err(Error::InvalidIdFormat(_))
        ));
    }
    assert!(registry.is_empty());

    for text in ["a1", "_x", "region 1", "é"] {
        assert!(registry.register(text).is_ok(), "{:?} should be valid", text);
    }
    assert!(matches!(
        registry.generate_id(Some("0prefix")),
        Err(Error::InvalidIdFormat(_))
    ));
}

#[test]
fn test_register_replacing_old_id() {
    let mut registry = IdRegistry::new();
    let old = registry.register("r1").unwrap();
    let other = registry.register("r2").unwrap();

    let err = registry.register_id(&other, Some(&old)).unwrap_err();
    assert!(matches!(err, Error::DuplicateId(_)));
    assert!(registry.contains("r1"));
    assert!(registry.contains("r2"));

    let new = Id::new("r3").unwrap();
    registry.register_id(&new, Some(&old)).unwrap();
    assert!(!registry.contains("r1"));
    assert!(registry.contains("r3"));
    assert_eq!(registry.len(), 2);

    // re-registering an id as its own replacement is a no-op
    registry.register_id(&new, Some(&new)).unwrap();
    assert!(registry.contains("r3"));
}

#[test]
fn test_register_or_create_new_id() {
    let mut registry = IdRegistry::new().with_default_prefix("n");
    let first = registry.register_or_create_new_id("main", None).unwrap();
    assert_eq!(first.as_str(), "main");

    let second = registry.register_or_create_new_id("main", None).unwrap();
    assert_eq!(second.as_str(), "n1");

    let third = registry.register_or_create_new_id("42", Some("r")).unwrap();
    assert_eq!(third.as_str(), "r1");
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_registries_are_independent() {
    let mut a = IdRegistry::new();
    let mut b = IdRegistry::new();
    a.register("shared").unwrap();
    assert!(b.register("shared").is_ok());
}

#[test]
fn test_id_value_equality() {
    let a = Id::new("region1").unwrap();
    let b: Id = "region1".parse().unwrap();
    assert_eq!(a, b);
    let json = serde_json::to_string(&a).unwrap();
    assert_eq!(json, "\"region1\"");
    assert!(serde_json::from_str::<Id>("\"7up\"").is_err());
}
