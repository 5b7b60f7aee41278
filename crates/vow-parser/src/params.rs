//! The parameter model builder.
//!
//! Turns the parameter segment of a declaration plus the member's share of
//! the definitions channel into a [`Signature`]. Annotations and
//! definitions feed the same cast model; when both speak for one position,
//! `prefer_definitions` picks the winner. Destructured patterns recurse
//! into nested signatures addressed by dotted positions.

use unicode_xid::UnicodeXID;
use vow_core::ClassHandle;
use vow_types::{
    cast_accepts, BuiltinKind, CastInfo, Config, Markers, TypeMatcher, TypeRegistry,
};

use crate::annotation::{annotation_after, first_annotation_in};
use crate::defaults::eval_literal;
use crate::definitions::{DefinitionValue, MemberDefs};
use crate::error::ExtractError;
use crate::markers::{dotted, parse_type_expr};
use crate::segment::{collapse_ws, segment, strip_comments, Scanner};
use crate::signature::{MemberContract, Parameter, Signature};

/// The member being built and the universe it resolves types against.
pub struct ParseCtx<'a> {
    /// Effective configuration.
    pub config: &'a Config,
    /// Type universe for name resolution and default checking.
    pub registry: &'a dyn TypeRegistry,
    /// Owning class, when the member belongs to one.
    pub owner: Option<&'a ClassHandle>,
    /// Display name of the source, usually the class name.
    pub source_name: &'a str,
    /// Display name of the member.
    pub function_name: &'a str,
}

impl ParseCtx<'_> {
    fn path(&self) -> String {
        format!("{}.{}", self.source_name, self.function_name)
    }
}

/// Builds the contract for one member from its declaration text and its
/// share of the definitions channel.
///
/// Definitions are consumed as positions claim them; the caller checks for
/// leftovers afterwards. `want_return` gates the return contract so the
/// setter half of an accessor pair never claims the getter's return entry.
pub fn parse_member(
    text: &str,
    defs: &mut MemberDefs,
    ctx: &ParseCtx<'_>,
    want_return: bool,
) -> Result<MemberContract, ExtractError> {
    let path = ctx.path();
    let segmented = segment(text, &path)?;
    let items = split_top_level(&segmented.params, &path)?;
    let mut params = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        params.push(parse_parameter(item, index, defs, ctx, None)?);
    }
    let signature = Signature::new(params, false, None, ctx.source_name, ctx.function_name);

    let ret = if want_return {
        let annotation = if ctx.config.parse_comments {
            annotation_after(&segmented.trailer)
        } else {
            None
        };
        resolve_cast(defs.take_return(), annotation, false, &path, ctx)?
    } else {
        None
    };
    Ok(MemberContract { signature, ret })
}

/// Splits a parameter list on top-level commas. A trailing comma is
/// tolerated; an empty slot anywhere else surfaces as an empty item.
fn split_top_level(text: &str, path: &str) -> Result<Vec<String>, ExtractError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut s = Scanner::new(text);
    loop {
        match s.skip_noise() {
            Ok(true) => continue,
            Ok(false) => {}
            Err(issue) => return Err(issue.into_error(path)),
        }
        let Some(byte) = s.peek() else { break };
        match byte {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                items.push(text[start..s.pos()].to_string());
                s.bump();
                start = s.pos();
                continue;
            }
            _ => {}
        }
        s.bump();
    }
    let tail = &text[start..];
    if !tail.trim().is_empty() {
        items.push(tail.to_string());
    }
    Ok(items)
}

/// First `needle` at bracket depth zero, outside strings and comments.
fn find_top_level(text: &str, needle: u8, path: &str) -> Result<Option<usize>, ExtractError> {
    let mut depth = 0usize;
    let mut s = Scanner::new(text);
    loop {
        match s.skip_noise() {
            Ok(true) => continue,
            Ok(false) => {}
            Err(issue) => return Err(issue.into_error(path)),
        }
        let Some(byte) = s.peek() else {
            return Ok(None);
        };
        if byte == needle && depth == 0 {
            return Ok(Some(s.pos()));
        }
        match byte {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        s.bump();
    }
}

struct Pattern<'a> {
    before: &'a str,
    inner: &'a str,
    after: &'a str,
}

/// Finds a destructuring pattern in one parameter item. A `{` after a
/// top-level `=` belongs to the default value, not to a pattern.
fn extract_pattern<'a>(item: &'a str, path: &str) -> Result<Option<Pattern<'a>>, ExtractError> {
    let mut s = Scanner::new(item);
    let mut depth = 0usize;
    let open_at = loop {
        match s.skip_noise() {
            Ok(true) => continue,
            Ok(false) => {}
            Err(issue) => return Err(issue.into_error(path)),
        }
        let Some(byte) = s.peek() else {
            return Ok(None);
        };
        match byte {
            b'=' if depth == 0 => return Ok(None),
            b'{' if depth == 0 => break s.pos(),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        s.bump();
    };

    s.bump();
    let mut inner_depth = 0usize;
    let close_at = loop {
        match s.skip_noise() {
            Ok(true) => continue,
            Ok(false) => {}
            Err(issue) => return Err(issue.into_error(path)),
        }
        let Some(byte) = s.peek() else {
            return Err(ExtractError::UnclosedDelimiter {
                path: path.to_string(),
                open: '{',
                at: open_at,
            });
        };
        match byte {
            b'}' if inner_depth == 0 => break s.pos(),
            b'(' | b'[' | b'{' => inner_depth += 1,
            b')' | b']' | b'}' => inner_depth = inner_depth.saturating_sub(1),
            _ => {}
        }
        s.bump();
    };
    Ok(Some(Pattern {
        before: &item[..open_at],
        inner: &item[open_at + 1..close_at],
        after: &item[close_at + 1..],
    }))
}

fn is_valid_name(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '_' || first == '$' || first.is_xid_start()) {
        return false;
    }
    chars.all(|c| c == '$' || c.is_xid_continue())
}

/// Resolves one position's cast from its definition and its annotation.
/// An already consumed definition stays consumed even when the annotation
/// wins, so overriding never produces a leftover.
fn resolve_cast(
    def: Option<(Markers, DefinitionValue)>,
    annotation: Option<String>,
    is_param: bool,
    path: &str,
    ctx: &ParseCtx<'_>,
) -> Result<Option<CastInfo>, ExtractError> {
    if let Some((key_markers, value)) = def {
        if annotation.is_none() || ctx.config.prefer_definitions {
            let cast = match value {
                DefinitionValue::Type(expr) => {
                    let (value_markers, bare) = parse_type_expr(&expr, path)?;
                    let matcher = ctx.registry.resolve_expr(&bare, ctx.owner, is_param, path)?;
                    CastInfo::new(bare, matcher, key_markers.merge(value_markers))
                }
                DefinitionValue::Class(class) => {
                    let name = class.name().to_string();
                    let matcher = TypeMatcher::Nominal {
                        name: name.clone(),
                        source: Some(class),
                    };
                    CastInfo::new(name, matcher, key_markers)
                }
            };
            return Ok(Some(cast));
        }
    }
    let Some(expr) = annotation else {
        return Ok(None);
    };
    let (markers, bare) = parse_type_expr(&expr, path)?;
    let matcher = ctx.registry.resolve_expr(&bare, ctx.owner, is_param, path)?;
    Ok(Some(CastInfo::new(bare, matcher, markers)))
}

/// Whether any position in `sig`, at any depth, carries a type the caller
/// spelled out. The automatic dictionary cast on patterns does not count.
fn has_explicit_types(sig: &Signature) -> bool {
    sig.params.iter().any(|param| match &param.destructured {
        None => param.cast.is_some(),
        Some(nested) => {
            param
                .cast
                .as_ref()
                .map_or(false, |cast| cast.type_expr != "dictionary")
                || has_explicit_types(nested)
        }
    })
}

fn parse_pattern_items(
    inner: &str,
    defs: &mut MemberDefs,
    ctx: &ParseCtx<'_>,
    parent_path: &[u32],
    parent_position: &str,
) -> Result<Signature, ExtractError> {
    let items = split_top_level(inner, &ctx.path())?;
    let mut params = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        params.push(parse_parameter(item, index, defs, ctx, Some(parent_path))?);
    }
    Ok(Signature::new(
        params,
        true,
        Some(parent_position.to_string()),
        ctx.source_name,
        ctx.function_name,
    ))
}

fn parse_parameter(
    item: &str,
    index: usize,
    defs: &mut MemberDefs,
    ctx: &ParseCtx<'_>,
    parent_path: Option<&[u32]>,
) -> Result<Parameter, ExtractError> {
    let path = ctx.path();
    let nested = parent_path.is_some();
    let mut path_ids: Vec<u32> = parent_path.map(<[u32]>::to_vec).unwrap_or_default();
    path_ids.push(index as u32 + 1);
    let position = dotted(&path_ids);

    let structural = strip_comments(item, false);
    if structural.trim().is_empty() {
        return Err(ExtractError::EmptyParameter { path });
    }
    let variadic = structural.trim_start().starts_with("...");
    let text = collapse_ws(&structural);

    if let Some(pattern) = extract_pattern(item, &path)? {
        let eq = find_top_level(pattern.after, b'=', &path)?;
        let ann_region = &pattern.after[..eq.unwrap_or(pattern.after.len())];
        let annotation = if ctx.config.parse_comments {
            first_annotation_in(ann_region).map(|(payload, _)| payload)
        } else {
            None
        };
        let spare = strip_comments(ann_region, false);
        if !spare.trim().is_empty() {
            return Err(ExtractError::BadParameterName {
                path,
                text: collapse_ws(&spare),
            });
        }
        let default_struct = eq.map(|at| strip_comments(&pattern.after[at + 1..], false));

        let before = strip_comments(pattern.before, false);
        let before = before.trim();
        let before = before
            .strip_prefix("...")
            .map(str::trim_start)
            .unwrap_or(before);
        let name = if before.is_empty() {
            None
        } else if let Some(key) = before.strip_suffix(':') {
            let key = key.trim();
            if !nested || !is_valid_name(key) {
                return Err(ExtractError::BadParameterName {
                    path,
                    text: collapse_ws(before),
                });
            }
            Some(key.to_string())
        } else {
            return Err(ExtractError::BadParameterName {
                path,
                text: collapse_ws(before),
            });
        };

        if variadic && !ctx.config.allow_variadic_destructuring {
            return Err(ExtractError::DestructuredVariadic { path, position });
        }

        let def = defs.take(&path_ids);
        if nested && variadic && (def.is_some() || annotation.is_some()) {
            return Err(ExtractError::VariadicPropertyDefinition { path, position });
        }
        let mut cast = resolve_cast(def, annotation, true, &path, ctx)?;
        let default_is_null = default_struct.as_deref().map_or(false, |d| d.trim() == "null");
        if let Some(cast) = cast.as_mut() {
            if default_is_null {
                cast.markers.is_nullable = true;
            }
        }

        // A variadic pattern is tolerated only under its config flag, and
        // even then its fields go unchecked.
        let destructured = if variadic {
            None
        } else {
            let custom = cast.as_ref().map_or(false, |c| !c.is_builtin());
            let had_nested_defs = defs.has_nested(&path_ids);
            let inner = parse_pattern_items(pattern.inner, defs, ctx, &path_ids, &position)?;
            if custom && (had_nested_defs || has_explicit_types(&inner)) {
                let type_expr = cast
                    .as_ref()
                    .map(|c| c.type_expr.clone())
                    .unwrap_or_default();
                return Err(ExtractError::AmbiguousDestructuredTyping {
                    path,
                    position,
                    type_expr,
                });
            }
            Some(inner)
        };

        let cast = cast.or_else(|| {
            Some(CastInfo::new(
                "dictionary",
                TypeMatcher::Builtin(BuiltinKind::Dictionary),
                Markers {
                    is_nullable: default_is_null,
                    ..Markers::default()
                },
            ))
        });
        check_default(
            cast.as_ref(),
            eq.is_some(),
            default_struct.as_deref(),
            ctx,
            &path,
            &position,
        )?;

        return Ok(Parameter {
            name,
            text,
            cast,
            has_default: eq.is_some(),
            variadic,
            destructured,
        });
    }

    let eq = find_top_level(item, b'=', &path)?;
    let name_region = &item[..eq.unwrap_or(item.len())];
    let annotation = if ctx.config.parse_comments {
        first_annotation_in(item).map(|(payload, _)| payload)
    } else {
        None
    };

    let name_struct = strip_comments(name_region, false);
    let trimmed = name_struct.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyParameter { path });
    }
    let name = match (nested, trimmed.find(':')) {
        (true, Some(colon)) => {
            // A renaming entry: the contract addresses the key, not the
            // binding it renames to.
            let key = trimmed[..colon].trim();
            let binding = trimmed[colon + 1..].trim();
            if !is_valid_name(key) || !is_valid_name(binding) {
                return Err(ExtractError::BadParameterName {
                    path,
                    text: collapse_ws(trimmed),
                });
            }
            Some(key.to_string())
        }
        _ => {
            let candidate = trimmed
                .strip_prefix("...")
                .map(str::trim_start)
                .unwrap_or(trimmed);
            if !is_valid_name(candidate) {
                return Err(ExtractError::BadParameterName {
                    path,
                    text: collapse_ws(trimmed),
                });
            }
            Some(candidate.to_string())
        }
    };

    let def = defs.take(&path_ids);
    if nested && variadic && (def.is_some() || annotation.is_some()) {
        return Err(ExtractError::VariadicPropertyDefinition { path, position });
    }
    let mut cast = resolve_cast(def, annotation, true, &path, ctx)?;
    let default_struct = eq.map(|at| strip_comments(&item[at + 1..], false));
    let default_is_null = default_struct.as_deref().map_or(false, |d| d.trim() == "null");
    if let Some(cast) = cast.as_mut() {
        if default_is_null {
            cast.markers.is_nullable = true;
        }
    }
    check_default(
        cast.as_ref(),
        eq.is_some(),
        default_struct.as_deref(),
        ctx,
        &path,
        &position,
    )?;

    Ok(Parameter {
        name,
        text,
        cast,
        has_default: eq.is_some(),
        variadic,
        destructured: None,
    })
}

/// Checks a declared default against the declared type, when both exist
/// and the default is a checkable literal. `null` and `undefined` defaults
/// are exempt: null folds into nullability, undefined means omission.
fn check_default(
    cast: Option<&CastInfo>,
    has_default: bool,
    default_struct: Option<&str>,
    ctx: &ParseCtx<'_>,
    path: &str,
    position: &str,
) -> Result<(), ExtractError> {
    if !ctx.config.check_defaults || !has_default {
        return Ok(());
    }
    let Some(cast) = cast else {
        return Ok(());
    };
    let Some(text) = default_struct else {
        return Ok(());
    };
    let text = text.trim();
    if text.is_empty() || text == "null" || text == "undefined" || cast.markers.check_promise {
        return Ok(());
    }

    let value = eval_literal(text).map_err(|reason| ExtractError::DefaultEval {
        path: path.to_string(),
        position: position.to_string(),
        reason,
    })?;
    let mismatch = |given: String| ExtractError::DefaultMismatch {
        path: path.to_string(),
        position: position.to_string(),
        expected: cast.type_expr.clone(),
        given,
    };

    if cast.markers.check_iterable {
        let Some(items) = value.as_array() else {
            return Err(mismatch(value.kind_name()));
        };
        for item in items.lock().iter() {
            if !cast_accepts(
                ctx.registry,
                &cast.matcher,
                item,
                false,
                cast.markers.is_nullable_iterable,
            ) {
                return Err(mismatch(item.kind_name()));
            }
        }
        return Ok(());
    }
    if !cast_accepts(
        ctx.registry,
        &cast.matcher,
        &value,
        false,
        cast.markers.is_nullable,
    ) {
        return Err(mismatch(value.kind_name()));
    }
    Ok(())
}
