//! Call-time contract validation.
//!
//! The validator checks real argument and return values against a built
//! [`Signature`]. Plain positions validate synchronously. Promise-marked
//! positions are replaced by an intercepting promise that validates the
//! eventual resolution; iterable-marked positions validate arrays eagerly
//! and iterators and generators lazily, element by element, as the consumer
//! pulls. Validation runs in declaration order and stops at the first
//! violation.

use std::fmt;
use std::sync::Arc;

use vow_core::{fault, IterValue, Promise, Value};
use vow_parser::{ReturnSpec, Signature};
use vow_types::{cast_accepts, CastInfo, Config, TypeRegistry};

use crate::error::CheckError;

/// Checks values against built contracts.
///
/// Cheap to clone; promise and iterator interception capture a clone so a
/// wrapped value outlives the call that wrapped it.
#[derive(Clone)]
pub struct Validator {
    registry: Arc<dyn TypeRegistry>,
    config: Config,
}

impl Validator {
    /// A validator over the given type universe.
    pub fn new(registry: Arc<dyn TypeRegistry>, config: Config) -> Validator {
        Validator { registry, config }
    }

    /// The active behavior switches.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validates a call's arguments against `sig`.
    ///
    /// Returns the argument vector with promise- and iterable-marked
    /// positions replaced by their validating wrappers. Destructured
    /// parameters have wrapped field values replaced in place, so every
    /// holder of the same dict sees them.
    pub fn validate_arguments(
        &self,
        sig: &Signature,
        mut args: Vec<Value>,
    ) -> Result<Vec<Value>, CheckError> {
        if sig.is_destructured {
            // A destructured signature reads its fields by name out of the
            // first argument.
            let value = args.first().cloned().unwrap_or(Value::Undefined);
            self.validate_destructured(sig, &value)?;
            return Ok(args);
        }
        for &pos in &sig.required {
            if pos >= args.len() {
                return Err(CheckError::MissingParameter {
                    source: sig.source_name.clone(),
                    function: sig.function_name.clone(),
                    position: pos + 1,
                });
            }
        }
        for (i, param) in sig.params.iter().enumerate() {
            let Some(cast) = &param.cast else { continue };
            if param.variadic {
                for j in i..args.len() {
                    let site = self.site(sig, Site::Parameter((j + 1).to_string()));
                    let value = std::mem::replace(&mut args[j], Value::Undefined);
                    args[j] = self.check_value(cast, param.has_default, None, value, &site)?;
                }
                continue;
            }
            if i >= args.len() {
                // Omitted optional argument; the declared default fills in.
                continue;
            }
            let site = self.site(sig, Site::Parameter((i + 1).to_string()));
            let value = std::mem::replace(&mut args[i], Value::Undefined);
            args[i] =
                self.check_value(cast, param.has_default, param.destructured.as_ref(), value, &site)?;
        }
        Ok(args)
    }

    /// Validates a return value against a built return contract.
    pub fn validate_return(
        &self,
        ret: &ReturnSpec,
        value: Value,
        source: &str,
        function: &str,
    ) -> Result<Value, CheckError> {
        let site = SiteCtx {
            source: source.to_string(),
            function: function.to_string(),
            site: Site::Return,
        };
        self.check_value(ret, false, None, value, &site)
    }

    /// Checks a destructured signature's fields by name inside `value`,
    /// replacing wrapped field values in place.
    fn validate_destructured(&self, sig: &Signature, value: &Value) -> Result<(), CheckError> {
        let enclosing = sig.parent_position.clone().unwrap_or_else(|| "1".to_string());
        for &pos in &sig.required {
            let Some(name) = &sig.params[pos].name else { continue };
            if !value.has_property(name) {
                return Err(CheckError::MissingProperty {
                    source: sig.source_name.clone(),
                    function: sig.function_name.clone(),
                    position: enclosing.clone(),
                    name: name.clone(),
                });
            }
        }
        for (j, param) in sig.params.iter().enumerate() {
            if param.variadic {
                continue;
            }
            let Some(name) = &param.name else { continue };
            let Some(cast) = &param.cast else { continue };
            let site = SiteCtx {
                source: sig.source_name.clone(),
                function: sig.function_name.clone(),
                site: Site::Property {
                    position: enclosing.clone(),
                    child: format!("{enclosing}.{}", j + 1),
                    name: name.clone(),
                },
            };
            let current = value.get_property(name);
            let checked =
                self.check_value(cast, param.has_default, param.destructured.as_ref(), current, &site)?;
            value.set_property(name, checked);
        }
        Ok(())
    }

    /// Full check for one position: promise interception first, then the
    /// direct check.
    fn check_value(
        &self,
        cast: &CastInfo,
        has_default: bool,
        nested: Option<&Signature>,
        value: Value,
        site: &SiteCtx,
    ) -> Result<Value, CheckError> {
        if cast.markers.check_promise {
            if let Value::Promise(promise) = &value {
                let wrapper = Promise::new(Arc::clone(promise.queue()));
                let validator = self.clone();
                let resolution = resolution_cast(cast);
                let nested = nested.cloned();
                let site = site.clone();
                let on_ok = Arc::clone(&wrapper);
                let on_err = Arc::clone(&wrapper);
                promise.then(
                    move |resolved| {
                        match validator.check_direct(
                            &resolution,
                            has_default,
                            nested.as_ref(),
                            resolved,
                            &site,
                        ) {
                            Ok(value) => on_ok.resolve(value),
                            Err(err) => on_ok.reject(fault(err)),
                        }
                    },
                    // rejections pass through untouched
                    move |err| on_err.reject(err),
                );
                return Ok(Value::Promise(wrapper));
            }
            if value.is_nullish() && cast.markers.is_nullable {
                return Ok(value);
            }
            // A plain value on a promise-marked position validates as the
            // resolution would.
            let resolution = resolution_cast(cast);
            return self.check_direct(&resolution, has_default, nested, value, site);
        }
        self.check_direct(cast, has_default, nested, value, site)
    }

    /// The non-promise check: nullability, iterable dispatch, the union
    /// cast, then the nested destructured walk.
    fn check_direct(
        &self,
        cast: &CastInfo,
        has_default: bool,
        nested: Option<&Signature>,
        value: Value,
        site: &SiteCtx,
    ) -> Result<Value, CheckError> {
        if value.is_nullish() && cast.markers.is_nullable {
            return Ok(value);
        }
        if value.is_undefined() && has_default {
            return Ok(value);
        }
        if cast.markers.check_iterable {
            return self.check_iterable(cast, has_default, value, site);
        }
        if !cast_accepts(
            self.registry.as_ref(),
            &cast.matcher,
            &value,
            has_default,
            cast.markers.is_nullable,
        ) {
            return Err(site.mismatch(&cast.type_expr, &value));
        }
        if let Some(nested) = nested {
            if nested.needs_walk() && !value.is_nullish() {
                self.validate_destructured(nested, &value)?;
            }
        }
        Ok(value)
    }

    /// Element validation for an iterable-marked position. Arrays are
    /// walked eagerly; iterators and generator functions validate lazily as
    /// elements are pulled.
    fn check_iterable(
        &self,
        cast: &CastInfo,
        has_default: bool,
        value: Value,
        site: &SiteCtx,
    ) -> Result<Value, CheckError> {
        match value {
            Value::Array(items) => {
                let shared = Arc::clone(&items);
                let len = shared.lock().len();
                for index in 0..len {
                    // The lock is released around the registry call.
                    let element = {
                        let guard = shared.lock();
                        match guard.get(index) {
                            Some(element) => element.clone(),
                            None => break,
                        }
                    };
                    self.check_element(cast, &element, site)?;
                }
                Ok(Value::Array(items))
            }
            Value::Iterator(iter) => {
                let validator = self.clone();
                let cast = cast.clone();
                let site = site.clone();
                let wrapped = IterValue::wrap(&iter, move |element| {
                    validator
                        .check_element(&cast, &element, &site)
                        .map_err(fault)?;
                    Ok(element)
                });
                Ok(Value::Iterator(wrapped))
            }
            Value::Function(function) if function.is_generator() => {
                let validator = self.clone();
                let cast = cast.clone();
                let site = site.clone();
                let original = Arc::clone(&function);
                let wrapped = function.with_body(Arc::new(move |args: &[Value]| {
                    match original.invoke(args)? {
                        Value::Iterator(iter) => {
                            let validator = validator.clone();
                            let cast = cast.clone();
                            let site = site.clone();
                            Ok(Value::Iterator(IterValue::wrap(&iter, move |element| {
                                validator
                                    .check_element(&cast, &element, &site)
                                    .map_err(fault)?;
                                Ok(element)
                            })))
                        }
                        other => Ok(other),
                    }
                }));
                Ok(Value::Function(Arc::new(wrapped)))
            }
            other => Err(site.not_iterable(&other)),
        }
    }

    /// One element of an iterable-marked position. Elements are flat: the
    /// union cast with the element nullable flag, no further wrappers.
    fn check_element(
        &self,
        cast: &CastInfo,
        element: &Value,
        site: &SiteCtx,
    ) -> Result<(), CheckError> {
        if element.is_nullish() && cast.markers.is_nullable_iterable {
            return Ok(());
        }
        if !cast_accepts(
            self.registry.as_ref(),
            &cast.matcher,
            element,
            false,
            cast.markers.is_nullable_iterable,
        ) {
            return Err(site.mismatch(&cast.type_expr, element));
        }
        Ok(())
    }

    fn site(&self, sig: &Signature, site: Site) -> SiteCtx {
        SiteCtx {
            source: sig.source_name.clone(),
            function: sig.function_name.clone(),
            site,
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Where a value under check came from, for error construction.
#[derive(Debug, Clone)]
enum Site {
    /// A positional argument, by dotted 1-based position.
    Parameter(String),
    /// A named field of a destructured argument.
    Property {
        /// Position of the enclosing destructured parameter.
        position: String,
        /// Dotted position of the field itself.
        child: String,
        /// Field name.
        name: String,
    },
    /// A return value.
    Return,
}

#[derive(Debug, Clone)]
struct SiteCtx {
    source: String,
    function: String,
    site: Site,
}

impl SiteCtx {
    fn mismatch(&self, expected: &str, value: &Value) -> CheckError {
        let given = value.kind_name();
        match &self.site {
            Site::Parameter(position) => CheckError::NotValidParameter {
                source: self.source.clone(),
                function: self.function.clone(),
                position: position.clone(),
                expected: expected.to_string(),
                given,
            },
            Site::Property { position, name, .. } => CheckError::NotValidProperty {
                source: self.source.clone(),
                function: self.function.clone(),
                position: position.clone(),
                name: name.clone(),
                expected: expected.to_string(),
                given,
            },
            Site::Return => CheckError::NotValidReturn {
                source: self.source.clone(),
                function: self.function.clone(),
                expected: expected.to_string(),
                given,
            },
        }
    }

    fn not_iterable(&self, value: &Value) -> CheckError {
        let position = match &self.site {
            Site::Parameter(position) => position.clone(),
            Site::Property { child, .. } => child.clone(),
            Site::Return => "return".to_string(),
        };
        CheckError::NotIterable {
            source: self.source.clone(),
            function: self.function.clone(),
            position,
            given: value.kind_name(),
        }
    }
}

/// The cast a promise's resolution is held to: the resolution nullability
/// becomes the plain one, the promise markers clear, and any iterable
/// markers stay for the resolved value.
fn resolution_cast(cast: &CastInfo) -> CastInfo {
    let mut markers = cast.markers;
    markers.is_nullable = markers.is_nullable_promise;
    markers.check_promise = false;
    markers.is_nullable_promise = false;
    CastInfo {
        type_expr: cast.type_expr.clone(),
        matcher: cast.matcher.clone(),
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vow_types::{BuiltinKind, Markers, TypeMatcher};

    // === Resolution cast ===

    #[test]
    fn test_resolution_cast_clears_promise_markers() {
        let cast = CastInfo::new(
            "string",
            TypeMatcher::Builtin(BuiltinKind::String),
            Markers {
                check_promise: true,
                is_nullable_promise: true,
                ..Markers::default()
            },
        );
        let resolution = resolution_cast(&cast);
        assert!(!resolution.markers.check_promise);
        assert!(!resolution.markers.is_nullable_promise);
        assert!(resolution.markers.is_nullable);
        assert!(!resolution.markers.check_iterable);
    }

    #[test]
    fn test_resolution_cast_keeps_iterable_markers() {
        let cast = CastInfo::new(
            "integer",
            TypeMatcher::Builtin(BuiltinKind::Integer),
            Markers {
                check_promise: true,
                check_iterable: true,
                is_nullable_iterable: true,
                ..Markers::default()
            },
        );
        let resolution = resolution_cast(&cast);
        assert!(resolution.markers.check_iterable);
        assert!(resolution.markers.is_nullable_iterable);
        assert!(!resolution.markers.is_nullable);
    }

    // === Site formatting ===

    #[test]
    fn test_not_iterable_site_positions() {
        let ctx = SiteCtx {
            source: "Feed".to_string(),
            function: "items".to_string(),
            site: Site::Return,
        };
        match ctx.not_iterable(&Value::Int(3)) {
            CheckError::NotIterable { position, given, .. } => {
                assert_eq!(position, "return");
                assert_eq!(given, "number");
            }
            other => panic!("Expected NotIterable, got {other:?}"),
        }
        let ctx = SiteCtx {
            source: "Feed".to_string(),
            function: "items".to_string(),
            site: Site::Property {
                position: "2".to_string(),
                child: "2.1".to_string(),
                name: "tags".to_string(),
            },
        };
        match ctx.not_iterable(&Value::Bool(true)) {
            CheckError::NotIterable { position, .. } => assert_eq!(position, "2.1"),
            other => panic!("Expected NotIterable, got {other:?}"),
        }
    }
}
