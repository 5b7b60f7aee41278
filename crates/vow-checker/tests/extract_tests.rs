//! Tests for class descriptor extraction

use vow_checker::{
    extract_descriptors, extract_descriptors_with, AbstractMap, CheckError, DescriptorKind,
    Descriptors, ExtractOptions, Visibility,
};
use vow_core::{Callable, ClassBuilder, ClassHandle, Value};
use vow_parser::Definitions;
use vow_types::{Config, StandardRegistry};

fn extract(class: &ClassHandle, defs: &mut Definitions) -> Result<Descriptors, CheckError> {
    extract_with(class, defs, &ExtractOptions::default(), &AbstractMap::default())
}

fn extract_with(
    class: &ClassHandle,
    defs: &mut Definitions,
    options: &ExtractOptions,
    abstracts: &AbstractMap,
) -> Result<Descriptors, CheckError> {
    let registry = StandardRegistry::new();
    registry.register(class.clone());
    let config = Config::default();
    extract_descriptors(class, options, defs, abstracts, &config, &registry)
}

#[test]
fn test_walk_order_statics_then_members_then_fields() {
    let class = ClassBuilder::new("Account")
        .static_method("open", Callable::declared("open(id) {}"))
        .method("save", Callable::declared("save(name) {}"))
        .property("kind", Value::str("model"))
        .field("balance", Value::Int(0))
        .build();

    let options = ExtractOptions {
        safe_mode: false,
        ..ExtractOptions::default()
    };
    let set = extract_with(&class, &mut Definitions::new(), &options, &AbstractMap::default())
        .unwrap();

    assert_eq!(set.len(), 4);
    assert_eq!(set.get(0).unwrap().name, "open");
    assert!(set.get(0).unwrap().is_static);
    assert_eq!(set.get(1).unwrap().name, "save");
    assert!(!set.get(1).unwrap().is_static);
    assert_eq!(set.get(2).unwrap().kind, DescriptorKind::Property);
    assert_eq!(set.get(3).unwrap().name, "balance");
    assert_eq!(set.get(3).unwrap().kind, DescriptorKind::Property);
    assert_eq!(
        set.get(3).unwrap().value.as_ref().unwrap(),
        &Value::Int(0)
    );
}

#[test]
fn test_safe_mode_skips_fields() {
    let class = ClassBuilder::new("Account")
        .method("save", Callable::declared("save() {}"))
        .field("balance", Value::Int(0))
        .build();

    let set = extract(&class, &mut Definitions::new()).unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.find(false, "balance").is_none());
}

#[test]
fn test_reserved_keys_are_skipped() {
    let class = ClassBuilder::new("Account")
        .method("constructor", Callable::declared("constructor() {}"))
        .property("prototype", Value::Null)
        .method("save", Callable::declared("save() {}"))
        .build();

    let set = extract(&class, &mut Definitions::new()).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(0).unwrap().name, "save");
}

#[test]
fn test_accessor_yields_getter_then_setter() {
    let class = ClassBuilder::new("Account")
        .accessor(
            "email",
            Some(Callable::declared("get email() /*: string */ {}")),
            Some(Callable::declared("set email(value /*: string */) {}")),
        )
        .build();

    let set = extract(&class, &mut Definitions::new()).unwrap();
    assert_eq!(set.len(), 2);

    let getter = set.get(0).unwrap();
    assert_eq!(getter.kind, DescriptorKind::Getter);
    assert!(getter.parameters.is_none());
    assert_eq!(getter.ret.as_ref().unwrap().type_expr, "string");

    let setter = set.get(1).unwrap();
    assert_eq!(setter.kind, DescriptorKind::Setter);
    assert!(setter.ret.is_none());
    let params = setter.parameters.as_ref().unwrap();
    assert_eq!(params.params[0].cast.as_ref().unwrap().type_expr, "string");
}

#[test]
fn test_accessor_halves_share_definitions() {
    let mut defs = Definitions::new()
        .with("email", "return", "string")
        .with("email", "1", "string");
    let class = ClassBuilder::new("Account")
        .accessor(
            "email",
            Some(Callable::declared("get email() {}")),
            Some(Callable::declared("set email(value) {}")),
        )
        .build();

    let set = extract(&class, &mut defs).unwrap();
    assert_eq!(set.get(0).unwrap().ret.as_ref().unwrap().type_expr, "string");
    let setter_params = set.get(1).unwrap().parameters.as_ref().unwrap();
    assert_eq!(
        setter_params.params[0].cast.as_ref().unwrap().type_expr,
        "string"
    );
}

#[test]
fn test_visibility_from_name() {
    let class = ClassBuilder::new("Account")
        .method("save", Callable::declared("save() {}"))
        .method("_flush", Callable::declared("_flush() {}"))
        .method("__hash", Callable::declared("__hash() {}"))
        .build();

    let set = extract(&class, &mut Definitions::new()).unwrap();
    assert_eq!(set.find(false, "save").unwrap().visibility, Visibility::Public);
    assert_eq!(
        set.find(false, "_flush").unwrap().visibility,
        Visibility::Protected
    );
    assert_eq!(
        set.find(false, "__hash").unwrap().visibility,
        Visibility::Private
    );
}

#[test]
fn test_abstract_rename_and_definitions() {
    let mut abstracts = AbstractMap::default();
    abstracts.insert("k1".to_string(), "save".to_string());
    let mut defs = Definitions::new().with("save", "1", "string");
    let class = ClassBuilder::new("Account")
        .method("k1", Callable::declared("k1(name) {}"))
        .build();

    let set = extract_with(&class, &mut defs, &ExtractOptions::default(), &abstracts).unwrap();
    let desc = set.get(0).unwrap();
    assert_eq!(desc.name, "save");
    assert_eq!(desc.original_name, "k1");
    assert!(desc.is_abstract);
    // The definition was claimed under the public name.
    let params = desc.parameters.as_ref().unwrap();
    assert_eq!(params.params[0].cast.as_ref().unwrap().type_expr, "string");
}

#[test]
fn test_abstract_with_body_rejected() {
    let mut abstracts = AbstractMap::default();
    abstracts.insert("k1".to_string(), "save".to_string());
    let class = ClassBuilder::new("Account")
        .method("k1", Callable::declared("k1(name) { return 1 }"))
        .build();

    let err = extract_with(
        &class,
        &mut Definitions::new(),
        &ExtractOptions::default(),
        &abstracts,
    )
    .unwrap_err();
    match err {
        CheckError::AbstractWithBody { source, member } => {
            assert_eq!(source, "Account");
            assert_eq!(member, "save");
        }
        other => panic!("Expected AbstractWithBody, got {other:?}"),
    }
}

#[test]
fn test_abstract_property_rejected() {
    let mut abstracts = AbstractMap::default();
    abstracts.insert("k1".to_string(), "kind".to_string());
    let class = ClassBuilder::new("Account")
        .property("k1", Value::str("model"))
        .build();

    let err = extract_with(
        &class,
        &mut Definitions::new(),
        &ExtractOptions::default(),
        &abstracts,
    )
    .unwrap_err();
    assert!(matches!(err, CheckError::AbstractProperty { .. }));
}

#[test]
fn test_abstract_concrete_collision() {
    let mut abstracts = AbstractMap::default();
    abstracts.insert("k1".to_string(), "save".to_string());
    let class = ClassBuilder::new("Account")
        .method("k1", Callable::declared("k1() {}"))
        .method("save", Callable::declared("save() {}"))
        .build();

    let err = extract_with(
        &class,
        &mut Definitions::new(),
        &ExtractOptions::default(),
        &abstracts,
    )
    .unwrap_err();
    match err {
        CheckError::AbstractCollision { member, .. } => assert_eq!(member, "save"),
        other => panic!("Expected AbstractCollision, got {other:?}"),
    }
}

#[test]
fn test_two_abstracts_colliding_on_one_name() {
    let mut abstracts = AbstractMap::default();
    abstracts.insert("k1".to_string(), "save".to_string());
    abstracts.insert("k2".to_string(), "save".to_string());
    let class = ClassBuilder::new("Account")
        .method("k1", Callable::declared("k1() {}"))
        .method("k2", Callable::declared("k2() {}"))
        .build();

    let err = extract_with(
        &class,
        &mut Definitions::new(),
        &ExtractOptions::default(),
        &abstracts,
    )
    .unwrap_err();
    assert!(matches!(err, CheckError::AbstractAbstractCollision { .. }));
}

#[test]
fn test_duplicate_member_rejected() {
    let class = ClassBuilder::new("Account")
        .method("save", Callable::declared("save() {}"))
        .method("save", Callable::declared("save(a) {}"))
        .build();

    let err = extract(&class, &mut Definitions::new()).unwrap_err();
    assert!(matches!(err, CheckError::DuplicateMember { .. }));
}

#[test]
fn test_getter_and_setter_do_not_collide() {
    let class = ClassBuilder::new("Account")
        .accessor("email", Some(Callable::declared("get email() {}")), None)
        .accessor("email", None, Some(Callable::declared("set email(v) {}")))
        .build();

    let set = extract(&class, &mut Definitions::new()).unwrap();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_missing_abstract_reported() {
    let mut abstracts = AbstractMap::default();
    abstracts.insert("k9".to_string(), "ghost".to_string());
    let class = ClassBuilder::new("Account")
        .method("save", Callable::declared("save() {}"))
        .build();

    let err = extract_with(
        &class,
        &mut Definitions::new(),
        &ExtractOptions::default(),
        &abstracts,
    )
    .unwrap_err();
    match err {
        CheckError::MissingAbstract { source, names } => {
            assert_eq!(source, "Account");
            assert_eq!(names, vec!["k9 -> ghost".to_string()]);
        }
        other => panic!("Expected MissingAbstract, got {other:?}"),
    }
}

#[test]
fn test_magic_method_classification() {
    let class = ClassBuilder::new("Account")
        .method("__construct", Callable::declared("__construct(a, b, c) {}"))
        .method("__get", Callable::declared("__get(key) {}"))
        .build();

    let set = extract(&class, &mut Definitions::new()).unwrap();
    let construct = set.find(false, "__construct").unwrap();
    assert!(construct.is_magic);
    assert_eq!(construct.visibility, Visibility::Public);
    assert!(set.find(false, "__get").unwrap().is_magic);
}

#[test]
fn test_magic_arity_enforced() {
    let class = ClassBuilder::new("Account")
        .method("__get", Callable::declared("__get(key, extra) {}"))
        .build();

    let err = extract(&class, &mut Definitions::new()).unwrap_err();
    match err {
        CheckError::MagicArity {
            member,
            expected,
            found,
            ..
        } => {
            assert_eq!(member, "__get");
            assert_eq!(expected, 1);
            assert_eq!(found, "2");
        }
        other => panic!("Expected MagicArity, got {other:?}"),
    }
}

#[test]
fn test_magic_variadic_rejected() {
    let class = ClassBuilder::new("Account")
        .method("__set", Callable::declared("__set(key, ...values) {}"))
        .build();

    let err = extract(&class, &mut Definitions::new()).unwrap_err();
    match err {
        CheckError::MagicArity { found, .. } => {
            assert_eq!(found, "1 with a variadic tail");
        }
        other => panic!("Expected MagicArity, got {other:?}"),
    }
}

#[test]
fn test_magic_name_on_property_rejected() {
    let class = ClassBuilder::new("Account")
        .property("__get", Value::Null)
        .build();

    let err = extract(&class, &mut Definitions::new()).unwrap_err();
    assert!(matches!(err, CheckError::MagicNotMethod { .. }));
}

#[test]
fn test_magic_rules_disabled_by_config() {
    let class = ClassBuilder::new("Account")
        .property("__get", Value::Null)
        .build();
    let registry = StandardRegistry::new();
    let config = Config {
        magic_methods: false,
        ..Config::default()
    };

    let set = extract_descriptors(
        &class,
        &ExtractOptions::default(),
        &mut Definitions::new(),
        &AbstractMap::default(),
        &config,
        &registry,
    )
    .unwrap();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_unused_member_definitions_fail_closed() {
    let mut defs = Definitions::new().with("ghost", "1", "string");
    let class = ClassBuilder::new("Account")
        .method("save", Callable::declared("save() {}"))
        .build();

    let err = extract(&class, &mut defs).unwrap_err();
    match err {
        CheckError::UnusedDefinitions { path, keys } => {
            assert_eq!(path, "Account");
            assert_eq!(keys, vec!["ghost".to_string()]);
        }
        other => panic!("Expected UnusedDefinitions, got {other:?}"),
    }
}

#[test]
fn test_unused_position_definitions_fail_closed() {
    let mut defs = Definitions::new()
        .with("save", "1", "string")
        .with("save", "3", "string");
    let class = ClassBuilder::new("Account")
        .method("save", Callable::declared("save(a, b) {}"))
        .build();

    let err = extract(&class, &mut defs).unwrap_err();
    match err {
        CheckError::UnusedDefinitions { path, keys } => {
            assert_eq!(path, "Account.save");
            assert_eq!(keys, vec!["3".to_string()]);
        }
        other => panic!("Expected UnusedDefinitions, got {other:?}"),
    }
}

#[test]
fn test_all_abstract_covers_callables_only() {
    let options = ExtractOptions {
        all_abstract: true,
        ..ExtractOptions::default()
    };
    let class = ClassBuilder::new("Store")
        .method("save", Callable::declared("save(item) {}"))
        .accessor(
            "size",
            Some(Callable::declared("get size() {}")),
            Some(Callable::declared("set size(v) {}")),
        )
        .property("kind", Value::str("store"))
        .build();

    let set = extract_with(
        &class,
        &mut Definitions::new(),
        &options,
        &AbstractMap::default(),
    )
    .unwrap();

    assert_eq!(set.len(), 4);
    assert!(set.find(false, "save").unwrap().is_abstract);
    assert!(set.get(1).unwrap().is_abstract);
    assert!(set.get(2).unwrap().is_abstract);
    assert!(!set.find(false, "kind").unwrap().is_abstract);
}

#[test]
fn test_sink_receives_descriptors_in_order() {
    let class = ClassBuilder::new("Account")
        .static_method("open", Callable::declared("open() {}"))
        .method("save", Callable::declared("save() {}"))
        .build();
    let registry = StandardRegistry::new();
    let config = Config::default();

    let mut names = Vec::new();
    extract_descriptors_with(
        &class,
        &ExtractOptions::default(),
        &mut Definitions::new(),
        &AbstractMap::default(),
        &config,
        &registry,
        |d| names.push(d.name.clone()),
    )
    .unwrap();
    assert_eq!(names, vec!["open".to_string(), "save".to_string()]);
}

#[test]
fn test_parse_errors_carry_through() {
    let class = ClassBuilder::new("Account")
        .method("save", Callable::declared("save(a, {b {}"))
        .build();

    let err = extract(&class, &mut Definitions::new()).unwrap_err();
    assert!(matches!(err, CheckError::Extract(_)));
}

#[test]
fn test_static_definitions_use_static_prefix() {
    let mut defs = Definitions::new().with("static:open", "1", "string");
    let class = ClassBuilder::new("Account")
        .static_method("open", Callable::declared("open(id) {}"))
        .build();

    let set = extract(&class, &mut defs).unwrap();
    let params = set.find(true, "open").unwrap().parameters.as_ref().unwrap();
    assert_eq!(params.params[0].cast.as_ref().unwrap().type_expr, "string");
}
