//! Class walking and descriptor extraction.
//!
//! One extraction pass enumerates a class's static members, prototype
//! members and (outside safe mode) instance fields, classifies each into a
//! [`Descriptor`], builds its contracts through `vow-parser`, and enforces
//! the declaration rules: abstract members need empty bodies, magic methods
//! need their fixed arity, names may not collide, and every supplied
//! definition and abstract mapping must be used.

use rustc_hash::{FxHashMap, FxHashSet};
use vow_core::{Callable, ClassHandle, FieldDecl, MemberDecl, MemberKind};
use vow_parser::{body_is_empty, parse_member, segment, Definitions, MemberDefs, ParseCtx, Signature};
use vow_types::{Config, TypeRegistry};

use crate::descriptor::{
    is_magic, is_reserved, magic_arity, visibility_of, Descriptor, DescriptorKind, Descriptors,
};
use crate::error::CheckError;

/// Switches for one extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Skip instance-field enumeration.
    pub safe_mode: bool,
    /// Force every method, getter and setter abstract.
    pub all_abstract: bool,
}

impl Default for ExtractOptions {
    fn default() -> ExtractOptions {
        ExtractOptions {
            safe_mode: true,
            all_abstract: false,
        }
    }
}

/// Declared key to public name, for members declared abstract.
pub type AbstractMap = FxHashMap<String, String>;

/// Extracts every member of `class` into an ordered collection.
///
/// `defs` is consumed destructively; entries left over after the walk are an
/// error. Every `abstracts` entry must match a declared key.
pub fn extract_descriptors(
    class: &ClassHandle,
    options: &ExtractOptions,
    defs: &mut Definitions,
    abstracts: &AbstractMap,
    config: &Config,
    registry: &dyn TypeRegistry,
) -> Result<Descriptors, CheckError> {
    let mut out = Descriptors::new();
    extract_descriptors_with(class, options, defs, abstracts, config, registry, |d| {
        out.push(d)
    })?;
    Ok(out)
}

/// Like [`extract_descriptors`], but delivers each descriptor to `sink` as
/// it is produced instead of collecting.
pub fn extract_descriptors_with(
    class: &ClassHandle,
    options: &ExtractOptions,
    defs: &mut Definitions,
    abstracts: &AbstractMap,
    config: &Config,
    registry: &dyn TypeRegistry,
    mut sink: impl FnMut(Descriptor),
) -> Result<(), CheckError> {
    let mut pass = Extraction {
        class,
        options,
        defs,
        abstracts,
        config,
        registry,
        slots: FxHashMap::default(),
        matched: FxHashSet::default(),
    };
    for decl in class.statics() {
        pass.member(decl, true, &mut sink)?;
    }
    for decl in class.members() {
        pass.member(decl, false, &mut sink)?;
    }
    if !options.safe_mode {
        for field in class.fields() {
            pass.field(field, &mut sink)?;
        }
    }
    pass.finish()
}

/// Declaration slot a member occupies. Methods and properties share the
/// value slot; the two accessor halves each have their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KindSlot {
    Value,
    Get,
    Set,
}

/// State for one extraction pass.
struct Extraction<'a> {
    class: &'a ClassHandle,
    options: &'a ExtractOptions,
    defs: &'a mut Definitions,
    abstracts: &'a AbstractMap,
    config: &'a Config,
    registry: &'a dyn TypeRegistry,
    // (is_static, slot, public name) -> declared abstract
    slots: FxHashMap<(bool, KindSlot, String), bool>,
    matched: FxHashSet<String>,
}

impl Extraction<'_> {
    fn member(
        &mut self,
        decl: &MemberDecl,
        is_static: bool,
        sink: &mut dyn FnMut(Descriptor),
    ) -> Result<(), CheckError> {
        if is_reserved(&decl.key) {
            return Ok(());
        }
        let source = self.class.name().to_string();
        let mapped = self.abstracts.get(&decl.key).cloned();
        if mapped.is_some() {
            self.matched.insert(decl.key.clone());
        }
        let name = mapped.clone().unwrap_or_else(|| decl.key.clone());
        match &decl.kind {
            MemberKind::Property(value) => {
                if mapped.is_some() {
                    return Err(CheckError::AbstractProperty {
                        source,
                        member: name,
                    });
                }
                if self.config.magic_methods && is_magic(is_static, &name) {
                    return Err(CheckError::MagicNotMethod {
                        source,
                        member: name,
                    });
                }
                self.claim(is_static, KindSlot::Value, &name, false)?;
                sink(Descriptor {
                    kind: DescriptorKind::Property,
                    name: name.clone(),
                    original_name: decl.key.clone(),
                    is_static,
                    is_abstract: false,
                    is_magic: false,
                    visibility: visibility_of(is_static, &name),
                    value: Some(value.clone()),
                    parameters: None,
                    ret: None,
                    source_name: source,
                });
                Ok(())
            }
            MemberKind::Method(callable) => {
                let is_abstract = mapped.is_some() || self.options.all_abstract;
                let magic = is_magic(is_static, &name);
                if is_abstract {
                    require_empty_body(callable, &source, &name)?;
                }
                self.claim(is_static, KindSlot::Value, &name, is_abstract)?;
                let mut member_defs = self.defs.take_member(is_static, &name)?;
                let ctx = ParseCtx {
                    config: self.config,
                    registry: self.registry,
                    owner: Some(self.class),
                    source_name: &source,
                    function_name: &name,
                };
                let contract = parse_member(callable.text(), &mut member_defs, &ctx, true)?;
                if magic && self.config.magic_methods {
                    check_magic_arity(is_static, &source, &name, &contract.signature)?;
                }
                require_consumed(&member_defs, &source, &name)?;
                sink(Descriptor {
                    kind: DescriptorKind::Method,
                    name: name.clone(),
                    original_name: decl.key.clone(),
                    is_static,
                    is_abstract,
                    is_magic: magic,
                    visibility: visibility_of(is_static, &name),
                    value: None,
                    parameters: Some(contract.signature),
                    ret: contract.ret,
                    source_name: source,
                });
                Ok(())
            }
            MemberKind::Accessor { getter, setter } => {
                if self.config.magic_methods && is_magic(is_static, &name) {
                    return Err(CheckError::MagicNotMethod {
                        source,
                        member: name,
                    });
                }
                let is_abstract = mapped.is_some() || self.options.all_abstract;
                if let Some(getter) = getter {
                    if is_abstract {
                        require_empty_body(getter, &source, &name)?;
                    }
                }
                if let Some(setter) = setter {
                    if is_abstract {
                        require_empty_body(setter, &source, &name)?;
                    }
                }
                if getter.is_some() {
                    self.claim(is_static, KindSlot::Get, &name, is_abstract)?;
                }
                if setter.is_some() {
                    self.claim(is_static, KindSlot::Set, &name, is_abstract)?;
                }
                // Both halves draw from one definition set; the getter takes
                // the return keys, the setter the positional ones.
                let mut member_defs = self.defs.take_member(is_static, &name)?;
                let ctx = ParseCtx {
                    config: self.config,
                    registry: self.registry,
                    owner: Some(self.class),
                    source_name: &source,
                    function_name: &name,
                };
                if let Some(getter) = getter {
                    let contract = parse_member(getter.text(), &mut member_defs, &ctx, true)?;
                    sink(Descriptor {
                        kind: DescriptorKind::Getter,
                        name: name.clone(),
                        original_name: decl.key.clone(),
                        is_static,
                        is_abstract,
                        is_magic: false,
                        visibility: visibility_of(is_static, &name),
                        value: None,
                        parameters: None,
                        ret: contract.ret,
                        source_name: source.clone(),
                    });
                }
                if let Some(setter) = setter {
                    let contract = parse_member(setter.text(), &mut member_defs, &ctx, false)?;
                    sink(Descriptor {
                        kind: DescriptorKind::Setter,
                        name: name.clone(),
                        original_name: decl.key.clone(),
                        is_static,
                        is_abstract,
                        is_magic: false,
                        visibility: visibility_of(is_static, &name),
                        value: None,
                        parameters: Some(contract.signature),
                        ret: None,
                        source_name: source.clone(),
                    });
                }
                require_consumed(&member_defs, &source, &name)?;
                Ok(())
            }
        }
    }

    /// Fields are enumerated without collision or abstract handling; a
    /// field key in the abstracts map simply never matches.
    fn field(&self, decl: &FieldDecl, sink: &mut dyn FnMut(Descriptor)) -> Result<(), CheckError> {
        if is_reserved(&decl.key) {
            return Ok(());
        }
        let source = self.class.name().to_string();
        if self.config.magic_methods && is_magic(false, &decl.key) {
            return Err(CheckError::MagicNotMethod {
                source,
                member: decl.key.clone(),
            });
        }
        sink(Descriptor {
            kind: DescriptorKind::Property,
            name: decl.key.clone(),
            original_name: decl.key.clone(),
            is_static: false,
            is_abstract: false,
            is_magic: false,
            visibility: visibility_of(false, &decl.key),
            value: Some(decl.value.clone()),
            parameters: None,
            ret: None,
            source_name: source,
        });
        Ok(())
    }

    fn claim(
        &mut self,
        is_static: bool,
        slot: KindSlot,
        name: &str,
        is_abstract: bool,
    ) -> Result<(), CheckError> {
        let key = (is_static, slot, name.to_string());
        if let Some(&prior_abstract) = self.slots.get(&key) {
            let source = self.class.name().to_string();
            let member = name.to_string();
            return Err(if prior_abstract && is_abstract {
                CheckError::AbstractAbstractCollision { source, member }
            } else if prior_abstract || is_abstract {
                CheckError::AbstractCollision { source, member }
            } else {
                CheckError::DuplicateMember { source, member }
            });
        }
        self.slots.insert(key, is_abstract);
        Ok(())
    }

    fn finish(&self) -> Result<(), CheckError> {
        let mut missing: Vec<String> = self
            .abstracts
            .iter()
            .filter(|(raw, _)| !self.matched.contains(*raw))
            .map(|(raw, alias)| format!("{raw} -> {alias}"))
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(CheckError::MissingAbstract {
                source: self.class.name().to_string(),
                names: missing,
            });
        }
        let leftover = self.defs.leftover_members();
        if !leftover.is_empty() {
            return Err(CheckError::UnusedDefinitions {
                path: self.class.name().to_string(),
                keys: leftover,
            });
        }
        Ok(())
    }
}

fn require_empty_body(callable: &Callable, source: &str, member: &str) -> Result<(), CheckError> {
    let path = format!("{source}.{member}");
    if callable.has_body() || !body_is_empty(&segment(callable.text(), &path)?.body) {
        return Err(CheckError::AbstractWithBody {
            source: source.to_string(),
            member: member.to_string(),
        });
    }
    Ok(())
}

fn check_magic_arity(
    is_static: bool,
    source: &str,
    member: &str,
    sig: &Signature,
) -> Result<(), CheckError> {
    let Some(expected) = magic_arity(is_static, member) else {
        return Ok(());
    };
    let variadic = sig.params.iter().any(|p| p.variadic);
    if variadic || sig.params.len() != expected {
        let found = if variadic {
            let fixed = sig.params.iter().filter(|p| !p.variadic).count();
            format!("{fixed} with a variadic tail")
        } else {
            sig.params.len().to_string()
        };
        return Err(CheckError::MagicArity {
            source: source.to_string(),
            member: member.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn require_consumed(defs: &MemberDefs, source: &str, member: &str) -> Result<(), CheckError> {
    if defs.is_fully_consumed() {
        return Ok(());
    }
    Err(CheckError::UnusedDefinitions {
        path: format!("{source}.{member}"),
        keys: defs.unused_keys(),
    })
}
