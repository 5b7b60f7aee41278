//! The definitions channel.
//!
//! Hosts may supply types out of band instead of (or in addition to)
//! inline annotations: a map of member key (`name` or `static:name`) to
//! position key to type. Entries are consumed destructively as the
//! extractor applies them; anything left over afterwards is a hard error,
//! so a typo in a key can never be silently ignored.

use rustc_hash::FxHashMap;
use vow_core::ClassHandle;
use vow_types::Markers;

use crate::error::ExtractError;
use crate::markers::{parse_position_key, KeyTarget};

/// A type bound supplied through the definitions channel.
#[derive(Debug, Clone)]
pub enum DefinitionValue {
    /// A type expression string, markers allowed.
    Type(String),
    /// A class handle used directly as a nominal type.
    Class(ClassHandle),
}

impl From<&str> for DefinitionValue {
    fn from(expr: &str) -> DefinitionValue {
        DefinitionValue::Type(expr.to_string())
    }
}

impl From<String> for DefinitionValue {
    fn from(expr: String) -> DefinitionValue {
        DefinitionValue::Type(expr)
    }
}

impl From<ClassHandle> for DefinitionValue {
    fn from(class: ClassHandle) -> DefinitionValue {
        DefinitionValue::Class(class)
    }
}

/// All definitions for one extraction.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    entries: FxHashMap<String, FxHashMap<String, DefinitionValue>>,
}

impl Definitions {
    /// An empty channel.
    pub fn new() -> Definitions {
        Definitions::default()
    }

    /// Adds one definition. `member` is `name` for prototype members and
    /// `static:name` for static members.
    pub fn insert(
        &mut self,
        member: impl Into<String>,
        position: impl Into<String>,
        value: impl Into<DefinitionValue>,
    ) {
        self.entries
            .entry(member.into())
            .or_default()
            .insert(position.into(), value.into());
    }

    /// Builder-style [`Definitions::insert`].
    pub fn with(
        mut self,
        member: impl Into<String>,
        position: impl Into<String>,
        value: impl Into<DefinitionValue>,
    ) -> Definitions {
        self.insert(member, position, value);
        self
    }

    /// Whether no member has definitions left.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and parses the definitions for one member. Missing members
    /// yield an empty set.
    pub fn take_member(&mut self, is_static: bool, name: &str) -> Result<MemberDefs, ExtractError> {
        let member_key = if is_static {
            format!("static:{name}")
        } else {
            name.to_string()
        };
        let raw = self.entries.remove(&member_key).unwrap_or_default();
        MemberDefs::parse(member_key, raw)
    }

    /// Member keys that no extracted member ever consumed, sorted.
    pub fn leftover_members(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[derive(Debug, Clone)]
struct DefEntry {
    raw_key: String,
    markers: Markers,
    target: KeyTarget,
    value: DefinitionValue,
}

/// Parsed definitions for one member, consumed entry by entry.
#[derive(Debug, Clone)]
pub struct MemberDefs {
    member_key: String,
    entries: Vec<Option<DefEntry>>,
}

impl MemberDefs {
    /// A set with no entries.
    pub fn empty(member_key: impl Into<String>) -> MemberDefs {
        MemberDefs {
            member_key: member_key.into(),
            entries: Vec::new(),
        }
    }

    fn parse(
        member_key: String,
        raw: FxHashMap<String, DefinitionValue>,
    ) -> Result<MemberDefs, ExtractError> {
        let mut raw: Vec<(String, DefinitionValue)> = raw.into_iter().collect();
        raw.sort_by(|a, b| a.0.cmp(&b.0));

        let mut entries = Vec::with_capacity(raw.len());
        for (raw_key, value) in raw {
            let parsed = parse_position_key(&raw_key, &member_key)?;
            entries.push(Some(DefEntry {
                raw_key,
                markers: parsed.markers,
                target: parsed.target,
                value,
            }));
        }
        Ok(MemberDefs {
            member_key,
            entries,
        })
    }

    /// The member key these definitions came in under.
    pub fn member_key(&self) -> &str {
        &self.member_key
    }

    /// Consumes the definition for a parameter path, if present.
    pub fn take(&mut self, path: &[u32]) -> Option<(Markers, DefinitionValue)> {
        let index = self.entries.iter().position(|slot| {
            matches!(slot, Some(entry) if matches!(&entry.target, KeyTarget::Path(p) if p == path))
        })?;
        self.entries[index]
            .take()
            .map(|entry| (entry.markers, entry.value))
    }

    /// Consumes the return definition, if present.
    pub fn take_return(&mut self) -> Option<(Markers, DefinitionValue)> {
        let index = self.entries.iter().position(|slot| {
            matches!(slot, Some(entry) if entry.target == KeyTarget::Return)
        })?;
        self.entries[index]
            .take()
            .map(|entry| (entry.markers, entry.value))
    }

    /// Whether unconsumed entries address fields below `path`.
    pub fn has_nested(&self, path: &[u32]) -> bool {
        self.entries.iter().flatten().any(|entry| {
            matches!(&entry.target, KeyTarget::Path(p) if p.len() > path.len() && p.starts_with(path))
        })
    }

    /// Raw keys never consumed, sorted.
    pub fn unused_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .flatten()
            .map(|entry| entry.raw_key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Whether every entry was consumed.
    pub fn is_fully_consumed(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }
}
