//! Extracted signature model.

use vow_types::CastInfo;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Binding name, absent for anonymous destructured patterns.
    pub name: Option<String>,
    /// Normalized declaration text, comments stripped.
    pub text: String,
    /// Type bound, if any channel supplied one.
    pub cast: Option<CastInfo>,
    /// Whether a default expression is present.
    pub has_default: bool,
    /// Whether this is a rest parameter.
    pub variadic: bool,
    /// Nested signature for destructured patterns.
    pub destructured: Option<Signature>,
}

impl Parameter {
    /// Whether a call-time check applies to this position.
    pub fn is_validated(&self) -> bool {
        self.cast.is_some()
    }

    /// Whether the caller must supply this position.
    pub fn is_required(&self) -> bool {
        !self.has_default && !self.variadic
    }
}

/// A parameter list plus its precomputed index sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Parameters in declaration order.
    pub params: Vec<Parameter>,
    /// Indices the caller must supply.
    pub required: Vec<usize>,
    /// Indices with a type bound.
    pub validated: Vec<usize>,
    /// Indices whose nested pattern itself needs walking.
    pub destructured: Vec<usize>,
    /// Whether this signature describes a destructured pattern.
    pub is_destructured: bool,
    /// Dotted position of the parent parameter, for nested signatures.
    pub parent_position: Option<String>,
    /// Display name of the owning source, usually a class name.
    pub source_name: String,
    /// Display name of the owning function.
    pub function_name: String,
}

impl Signature {
    pub(crate) fn new(
        params: Vec<Parameter>,
        is_destructured: bool,
        parent_position: Option<String>,
        source_name: &str,
        function_name: &str,
    ) -> Signature {
        let mut sig = Signature {
            params,
            required: Vec::new(),
            validated: Vec::new(),
            destructured: Vec::new(),
            is_destructured,
            parent_position,
            source_name: source_name.to_string(),
            function_name: function_name.to_string(),
        };
        sig.index();
        sig
    }

    pub(crate) fn index(&mut self) {
        self.required.clear();
        self.validated.clear();
        self.destructured.clear();
        for (i, param) in self.params.iter().enumerate() {
            if param.is_required() {
                self.required.push(i);
            }
            if param.is_validated() {
                self.validated.push(i);
            }
            if param
                .destructured
                .as_ref()
                .map_or(false, Signature::needs_walk)
            {
                self.destructured.push(i);
            }
        }
    }

    /// Whether any position in this signature, or below it, needs a
    /// call-time check.
    pub fn needs_walk(&self) -> bool {
        !self.validated.is_empty() || !self.required.is_empty() || !self.destructured.is_empty()
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A member's return contract. Same shape as a parameter cast; built from
/// the trailing annotation and the `return` definition key family.
pub type ReturnSpec = CastInfo;

/// Everything extracted for one member: its parameters and return bound.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberContract {
    /// The parameter list.
    pub signature: Signature,
    /// Return type bound, if declared.
    pub ret: Option<ReturnSpec>,
}
