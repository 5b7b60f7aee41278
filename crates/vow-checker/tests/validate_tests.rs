//! Tests for call-time argument and return validation

use std::sync::Arc;

use vow_checker::{CheckError, Validator};
use vow_core::{fault, Callable, ClassBuilder, IterValue, Promise, TaskQueue, Thrown, Value};
use vow_parser::{parse_member, MemberContract, MemberDefs, ParseCtx};
use vow_types::{Config, StandardRegistry};

fn build_in(text: &str, registry: &StandardRegistry) -> MemberContract {
    let config = Config::default();
    let mut defs = MemberDefs::empty("save");
    let ctx = ParseCtx {
        config: &config,
        registry,
        owner: None,
        source_name: "Account",
        function_name: "save",
    };
    parse_member(text, &mut defs, &ctx, true).unwrap()
}

fn build(text: &str) -> MemberContract {
    build_in(text, &StandardRegistry::new())
}

fn validator() -> Validator {
    Validator::new(Arc::new(StandardRegistry::new()), Config::default())
}

// === Arity and positional checks ===

#[test]
fn test_missing_required_argument() {
    let contract = build("save(name, note) {}");
    let err = validator()
        .validate_arguments(&contract.signature, vec![Value::str("a")])
        .unwrap_err();
    match err {
        CheckError::MissingParameter {
            source,
            function,
            position,
        } => {
            assert_eq!(source, "Account");
            assert_eq!(function, "save");
            assert_eq!(position, 2);
        }
        other => panic!("Expected MissingParameter, got {other:?}"),
    }
}

#[test]
fn test_positional_type_checks() {
    let contract = build("save(name /*: string */, count /*: integer */) {}");
    let v = validator();

    let args = v
        .validate_arguments(&contract.signature, vec![Value::str("a"), Value::Int(3)])
        .unwrap();
    assert_eq!(args.len(), 2);

    let err = v
        .validate_arguments(&contract.signature, vec![Value::str("a"), Value::str("b")])
        .unwrap_err();
    match err {
        CheckError::NotValidParameter {
            position,
            expected,
            given,
            ..
        } => {
            assert_eq!(position, "2");
            assert_eq!(expected, "integer");
            assert_eq!(given, "string");
        }
        other => panic!("Expected NotValidParameter, got {other:?}"),
    }
}

#[test]
fn test_nullable_position_admits_nullish() {
    let contract = build("save(name /*: ?string */) {}");
    let v = validator();

    v.validate_arguments(&contract.signature, vec![Value::Null])
        .unwrap();
    v.validate_arguments(&contract.signature, vec![Value::Undefined])
        .unwrap();
    assert!(v
        .validate_arguments(&contract.signature, vec![Value::Bool(true)])
        .is_err());
}

#[test]
fn test_optional_argument_with_default() {
    let contract = build("save(name /*: string */ = \"anon\") {}");
    let v = validator();

    v.validate_arguments(&contract.signature, vec![]).unwrap();
    v.validate_arguments(&contract.signature, vec![Value::Undefined])
        .unwrap();
    assert!(v
        .validate_arguments(&contract.signature, vec![Value::Int(1)])
        .is_err());
}

#[test]
fn test_union_accepts_any_member() {
    let contract = build("save(id /*: string|integer */) {}");
    let v = validator();

    v.validate_arguments(&contract.signature, vec![Value::str("a")])
        .unwrap();
    v.validate_arguments(&contract.signature, vec![Value::Int(1)])
        .unwrap();
    assert!(v
        .validate_arguments(&contract.signature, vec![Value::Bool(true)])
        .is_err());
}

#[test]
fn test_nominal_type_by_lineage() {
    let registry = Arc::new(StandardRegistry::new());
    let base = ClassBuilder::new("Model").build();
    let account = ClassBuilder::new("Account").parent(base.clone()).build();
    registry.register(base.clone());
    registry.register(account.clone());

    let contract = build_in("save(record /*: Model */) {}", &registry);
    let v = Validator::new(registry, Config::default());

    let instance = Value::Instance(account.instantiate());
    v.validate_arguments(&contract.signature, vec![instance])
        .unwrap();

    let stranger = Value::Instance(ClassBuilder::new("Other").build().instantiate());
    let err = v
        .validate_arguments(&contract.signature, vec![stranger])
        .unwrap_err();
    match err {
        CheckError::NotValidParameter { expected, given, .. } => {
            assert_eq!(expected, "Model");
            assert_eq!(given, "Other");
        }
        other => panic!("Expected NotValidParameter, got {other:?}"),
    }
}

#[test]
fn test_variadic_tail_cites_each_position() {
    let contract = build("save(...tags /*: string */) {}");
    let err = validator()
        .validate_arguments(
            &contract.signature,
            vec![Value::str("a"), Value::str("b"), Value::Int(3)],
        )
        .unwrap_err();
    match err {
        CheckError::NotValidParameter { position, .. } => assert_eq!(position, "3"),
        other => panic!("Expected NotValidParameter, got {other:?}"),
    }
}

// === Destructured parameters ===

#[test]
fn test_destructured_missing_property() {
    let contract = build("save({name, note}) {}");
    let value = Value::dict([("name".to_string(), Value::str("a"))]);
    let err = validator()
        .validate_arguments(&contract.signature, vec![value])
        .unwrap_err();
    match err {
        CheckError::MissingProperty { position, name, .. } => {
            assert_eq!(position, "1");
            assert_eq!(name, "note");
        }
        other => panic!("Expected MissingProperty, got {other:?}"),
    }
}

#[test]
fn test_destructured_field_types() {
    let contract = build("save({name /*: string */, count /*: integer */ = 0}) {}");
    let v = validator();

    let ok = Value::dict([("name".to_string(), Value::str("a"))]);
    v.validate_arguments(&contract.signature, vec![ok]).unwrap();

    let bad = Value::dict([("name".to_string(), Value::Int(3))]);
    let err = v
        .validate_arguments(&contract.signature, vec![bad])
        .unwrap_err();
    match err {
        CheckError::NotValidProperty {
            position,
            name,
            expected,
            given,
            ..
        } => {
            assert_eq!(position, "1");
            assert_eq!(name, "name");
            assert_eq!(expected, "string");
            assert_eq!(given, "number");
        }
        other => panic!("Expected NotValidProperty, got {other:?}"),
    }
}

#[test]
fn test_deep_destructuring_reports_inner_position() {
    let contract = build("save({owner: {name /*: string */}}) {}");
    let inner = Value::dict([("name".to_string(), Value::Int(1))]);
    let value = Value::dict([("owner".to_string(), inner)]);
    let err = validator()
        .validate_arguments(&contract.signature, vec![value])
        .unwrap_err();
    match err {
        CheckError::NotValidProperty { position, name, .. } => {
            assert_eq!(position, "1.1");
            assert_eq!(name, "name");
        }
        other => panic!("Expected NotValidProperty, got {other:?}"),
    }
}

#[test]
fn test_destructured_entry_signature_reads_first_argument() {
    let contract = build("save({name /*: string */}) {}");
    let nested = contract.signature.params[0].destructured.clone().unwrap();

    let err = validator()
        .validate_arguments(&nested, vec![Value::dict([])])
        .unwrap_err();
    assert!(matches!(err, CheckError::MissingProperty { .. }));

    let ok = Value::dict([("name".to_string(), Value::str("a"))]);
    validator().validate_arguments(&nested, vec![ok]).unwrap();
}

// === Promise interception ===

#[test]
fn test_promise_resolution_validated_through_wrapper() {
    let contract = build("save(task /*: ->string */) {}");
    let queue = TaskQueue::new();
    let promise = Promise::new(Arc::clone(&queue));

    let args = validator()
        .validate_arguments(&contract.signature, vec![Value::Promise(promise.clone())])
        .unwrap();
    let wrapper = match &args[0] {
        Value::Promise(wrapper) => {
            assert!(!Arc::ptr_eq(wrapper, &promise));
            Arc::clone(wrapper)
        }
        other => panic!("Expected a promise, got {other:?}"),
    };

    promise.resolve(Value::Int(5));
    queue.run_until_idle();
    match wrapper.settled() {
        Some(Err(err)) => {
            let text = err.to_string();
            assert!(text.contains("argument 1"));
            assert!(text.contains("string"));
        }
        other => panic!("Expected a rejection, got {other:?}"),
    }
}

#[test]
fn test_promise_resolution_passes_when_valid() {
    let contract = build("save(task /*: ->string */) {}");
    let queue = TaskQueue::new();
    let promise = Promise::new(Arc::clone(&queue));

    let args = validator()
        .validate_arguments(&contract.signature, vec![Value::Promise(promise.clone())])
        .unwrap();
    promise.resolve(Value::str("done"));
    queue.run_until_idle();

    let Value::Promise(wrapper) = &args[0] else {
        panic!("Expected a promise");
    };
    match wrapper.settled() {
        Some(Ok(value)) => assert_eq!(value, Value::str("done")),
        other => panic!("Expected fulfillment, got {other:?}"),
    }
}

#[test]
fn test_promise_rejection_passes_through() {
    let contract = build("save(task /*: ->string */) {}");
    let queue = TaskQueue::new();
    let promise = Promise::new(Arc::clone(&queue));

    let args = validator()
        .validate_arguments(&contract.signature, vec![Value::Promise(promise.clone())])
        .unwrap();
    promise.reject(fault(Thrown(Value::str("boom"))));
    queue.run_until_idle();

    let Value::Promise(wrapper) = &args[0] else {
        panic!("Expected a promise");
    };
    match wrapper.settled() {
        Some(Err(err)) => assert_eq!(err.to_string(), "uncaught boom"),
        other => panic!("Expected a rejection, got {other:?}"),
    }
}

#[test]
fn test_plain_value_on_promise_position() {
    let contract = build("save(task /*: ->string */) {}");
    let v = validator();

    // A plain value validates immediately, as the resolution would.
    let args = v
        .validate_arguments(&contract.signature, vec![Value::str("done")])
        .unwrap();
    assert_eq!(args[0], Value::str("done"));
    assert!(v
        .validate_arguments(&contract.signature, vec![Value::Int(1)])
        .is_err());
}

#[test]
fn test_nullable_resolution_marker() {
    let contract = build("save(task /*: ?>string */) {}");
    let v = validator();
    let queue = TaskQueue::new();
    let promise = Promise::new(Arc::clone(&queue));

    // Null is a valid resolution but not a valid plain value position...
    let args = v
        .validate_arguments(&contract.signature, vec![Value::Promise(promise.clone())])
        .unwrap();
    promise.resolve(Value::Null);
    queue.run_until_idle();
    let Value::Promise(wrapper) = &args[0] else {
        panic!("Expected a promise");
    };
    assert!(matches!(wrapper.settled(), Some(Ok(Value::Null))));

    // ...yet a plain null also passes, because a plain value is checked as
    // the resolution.
    v.validate_arguments(&contract.signature, vec![Value::Null])
        .unwrap();
}

// === Iterable interception ===

#[test]
fn test_array_elements_checked_eagerly() {
    let contract = build("save(ids /*: []integer */) {}");
    let v = validator();

    v.validate_arguments(
        &contract.signature,
        vec![Value::array(vec![Value::Int(1), Value::Int(2)])],
    )
    .unwrap();

    let err = v
        .validate_arguments(
            &contract.signature,
            vec![Value::array(vec![Value::Int(1), Value::str("x")])],
        )
        .unwrap_err();
    match err {
        CheckError::NotValidParameter {
            position, expected, given, ..
        } => {
            assert_eq!(position, "1");
            assert_eq!(expected, "integer");
            assert_eq!(given, "string");
        }
        other => panic!("Expected NotValidParameter, got {other:?}"),
    }
}

#[test]
fn test_nullable_element_marker() {
    let strict = build("save(ids /*: []integer */) {}");
    let relaxed = build("save(ids /*: [?]integer */) {}");
    let v = validator();

    let nullish = || Value::array(vec![Value::Int(1), Value::Null]);
    assert!(v
        .validate_arguments(&strict.signature, vec![nullish()])
        .is_err());
    v.validate_arguments(&relaxed.signature, vec![nullish()])
        .unwrap();
}

#[test]
fn test_iterator_validates_lazily() {
    let contract = build("save(ids /*: []integer */) {}");
    let source = IterValue::from_values(vec![Value::Int(1), Value::str("x"), Value::Int(3)]);

    let args = validator()
        .validate_arguments(&contract.signature, vec![Value::Iterator(source)])
        .unwrap();
    let Value::Iterator(wrapped) = &args[0] else {
        panic!("Expected an iterator");
    };

    // The first element passes; the bad one only fails when pulled.
    assert_eq!(wrapped.next().unwrap(), Some(Value::Int(1)));
    let err = wrapped.next().unwrap_err();
    assert!(err.to_string().contains("integer"));
}

#[test]
fn test_generator_function_wrapped() {
    let contract = build("save(ids /*: []integer */) {}");
    let generator = Callable::new("ids() {}", |_args| {
        Ok(Value::Iterator(IterValue::from_values(vec![
            Value::Int(1),
            Value::Bool(false),
        ])))
    })
    .generator();

    let args = validator()
        .validate_arguments(
            &contract.signature,
            vec![Value::Function(Arc::new(generator))],
        )
        .unwrap();
    let Value::Function(wrapped) = &args[0] else {
        panic!("Expected a function");
    };
    assert!(wrapped.is_generator());

    let Value::Iterator(iter) = wrapped.invoke(&[]).unwrap() else {
        panic!("Expected an iterator");
    };
    assert_eq!(iter.next().unwrap(), Some(Value::Int(1)));
    assert!(iter.next().is_err());
}

#[test]
fn test_plain_function_is_not_iterable() {
    let contract = build("save(ids /*: []integer */) {}");
    let plain = Callable::new("ids() {}", |_args| Ok(Value::Undefined));

    let err = validator()
        .validate_arguments(
            &contract.signature,
            vec![Value::Function(Arc::new(plain))],
        )
        .unwrap_err();
    match err {
        CheckError::NotIterable { position, given, .. } => {
            assert_eq!(position, "1");
            assert_eq!(given, "function");
        }
        other => panic!("Expected NotIterable, got {other:?}"),
    }
}

// === In-place replacement ===

#[test]
fn test_destructured_field_wrapper_replaced_in_place() {
    let contract = build("save({task /*: ->string */}) {}");
    let queue = TaskQueue::new();
    let promise = Promise::new(Arc::clone(&queue));
    let value = Value::dict([("task".to_string(), Value::Promise(promise.clone()))]);

    validator()
        .validate_arguments(&contract.signature, vec![value.clone()])
        .unwrap();

    // The dict now holds the validating wrapper, visible to every holder.
    let wrapper = match value.get_property("task") {
        Value::Promise(wrapper) => {
            assert!(!Arc::ptr_eq(&wrapper, &promise));
            wrapper
        }
        other => panic!("Expected a promise, got {other:?}"),
    };

    promise.resolve(Value::Int(3));
    queue.run_until_idle();
    match wrapper.settled() {
        Some(Err(err)) => assert!(err.to_string().contains("property 'task'")),
        other => panic!("Expected a rejection, got {other:?}"),
    }
}

// === Return validation ===

#[test]
fn test_return_value_checked() {
    let contract = build("save() /*: integer */ {}");
    let ret = contract.ret.unwrap();
    let v = validator();

    let value = v
        .validate_return(&ret, Value::Int(3), "Account", "save")
        .unwrap();
    assert_eq!(value, Value::Int(3));

    let err = v
        .validate_return(&ret, Value::str("no"), "Account", "save")
        .unwrap_err();
    match err {
        CheckError::NotValidReturn {
            source,
            function,
            expected,
            given,
        } => {
            assert_eq!(source, "Account");
            assert_eq!(function, "save");
            assert_eq!(expected, "integer");
            assert_eq!(given, "string");
        }
        other => panic!("Expected NotValidReturn, got {other:?}"),
    }
}

#[test]
fn test_non_iterable_return_cites_return_position() {
    let contract = build("save() /*: []string */ {}");
    let ret = contract.ret.unwrap();

    let err = validator()
        .validate_return(&ret, Value::Int(1), "Account", "save")
        .unwrap_err();
    match err {
        CheckError::NotIterable { position, .. } => assert_eq!(position, "return"),
        other => panic!("Expected NotIterable, got {other:?}"),
    }
}

#[test]
fn test_promise_return_intercepted() {
    let contract = build("save() /*: ->integer */ {}");
    let ret = contract.ret.unwrap();
    let queue = TaskQueue::new();
    let promise = Promise::new(Arc::clone(&queue));

    let value = validator()
        .validate_return(&ret, Value::Promise(promise.clone()), "Account", "save")
        .unwrap();
    promise.resolve(Value::str("no"));
    queue.run_until_idle();

    let Value::Promise(wrapper) = &value else {
        panic!("Expected a promise");
    };
    match wrapper.settled() {
        Some(Err(err)) => assert!(err.to_string().contains("must return")),
        other => panic!("Expected a rejection, got {other:?}"),
    }
}
