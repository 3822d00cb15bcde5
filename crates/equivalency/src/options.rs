//! Options Resolver: a mutable builder consumed once into an immutable
//! [`EquivalencyOptions`] snapshot before traversal starts.

use std::fmt;
use std::sync::Arc;

use equivalency_path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{ComparerError, UsageError};
use crate::types::TypeRef;
use crate::value::Value;

/// Caller-supplied equality for selected nodes.
pub type ComparerFn = Arc<dyn Fn(&Value, &Value) -> Result<bool, ComparerError> + Send + Sync>;

/// Caller-supplied member predicate.
pub type SelectorFn = Arc<dyn Fn(&MemberContext<'_>) -> bool + Send + Sync>;

/// What a selector sees about one node.
#[derive(Debug, Clone)]
pub struct MemberContext<'a> {
    pub path: &'a Path,
    pub declared_type: Option<&'a TypeRef>,
    /// Runtime type of the expectation value.
    pub runtime_type: TypeRef,
}

impl MemberContext<'_> {
    pub fn member_name(&self) -> Option<&str> {
        self.path.last_member()
    }
}

/// Picks members or nodes by path, name, type or predicate.
#[derive(Clone)]
pub enum MemberSelector {
    /// Member path with indices and keys ignored: `Orders[].Total`.
    Path(Path),
    /// Any member with this name, at any depth.
    Name(String),
    /// Nodes whose declared or runtime type is, or derives from, this type.
    Type(String),
    Predicate {
        description: String,
        test: SelectorFn,
    },
}

impl MemberSelector {
    pub fn path(text: &str) -> Result<Self, UsageError> {
        Path::parse(text)
            .map(MemberSelector::Path)
            .map_err(|source| UsageError::InvalidPath {
                path: text.to_string(),
                source,
            })
    }

    pub fn name(name: impl Into<String>) -> Self {
        MemberSelector::Name(name.into())
    }

    pub fn of_type(name: impl Into<String>) -> Self {
        MemberSelector::Type(name.into())
    }

    pub fn predicate(
        description: impl Into<String>,
        test: impl Fn(&MemberContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        MemberSelector::Predicate {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    fn validate(&self) -> Result<(), UsageError> {
        match self {
            MemberSelector::Name(name) if name.trim().is_empty() => {
                Err(UsageError::EmptyMemberName)
            }
            MemberSelector::Type(name) if name.trim().is_empty() => Err(UsageError::EmptyTypeName),
            _ => Ok(()),
        }
    }

    /// The selector names exactly this node.
    pub fn matches(&self, ctx: &MemberContext<'_>) -> bool {
        match self {
            MemberSelector::Path(path) => !ctx.path.is_root() && path.same_members(ctx.path),
            MemberSelector::Name(name) => ctx.member_name() == Some(name.as_str()),
            MemberSelector::Type(name) => {
                ctx.runtime_type.is_named_or_derives(name)
                    || ctx
                        .declared_type
                        .is_some_and(|t| t.is_named_or_derives(name))
            }
            MemberSelector::Predicate { test, .. } => test(ctx),
        }
    }

    /// Inclusion is wider than [`MemberSelector::matches`]: an included path
    /// also admits its ancestors, so they are descended into, and everything
    /// below it.
    fn admits(&self, ctx: &MemberContext<'_>) -> bool {
        match self {
            MemberSelector::Path(path) => {
                path.is_member_prefix_of(ctx.path) || ctx.path.is_member_prefix_of(path)
            }
            MemberSelector::Name(name) => ctx.path.member_names().any(|n| n == name),
            _ => self.matches(ctx),
        }
    }
}

impl fmt::Debug for MemberSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberSelector::Path(path) => write!(f, "Path({path})"),
            MemberSelector::Name(name) => write!(f, "Name({name})"),
            MemberSelector::Type(name) => write!(f, "Type({name})"),
            MemberSelector::Predicate { description, .. } => write!(f, "Predicate({description})"),
        }
    }
}

impl fmt::Display for MemberSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberSelector::Path(path) => write!(f, "member {path}"),
            MemberSelector::Name(name) => write!(f, "members named {name}"),
            MemberSelector::Type(name) => write!(f, "type {name}"),
            MemberSelector::Predicate { description, .. } => f.write_str(description),
        }
    }
}

#[derive(Debug, Clone)]
enum SelectionRule {
    Include(MemberSelector),
    Exclude(MemberSelector),
}

#[derive(Clone)]
pub struct EqualityRule {
    selector: MemberSelector,
    comparer: ComparerFn,
}

impl EqualityRule {
    pub fn selector(&self) -> &MemberSelector {
        &self.selector
    }

    pub fn compare(&self, subject: &Value, expectation: &Value) -> Result<bool, ComparerError> {
        (self.comparer)(subject, expectation)
    }
}

impl fmt::Debug for EqualityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityRule")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    Strict,
    #[default]
    Ignore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumEquivalence {
    #[default]
    ByValue,
    ByName,
}

/// Declarative form of the options, loadable from JSON or TOML fixtures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsProfile {
    pub respect_runtime_types: bool,
    pub ordering: OrderingMode,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub compare_by_value: Vec<String>,
    pub enums: EnumEquivalence,
    pub ignore_missing_members: bool,
    /// `None` leaves recursion unlimited; `Some(0)` is rejected.
    pub max_recursion_depth: Option<usize>,
    pub allow_infinite_recursion: bool,
}

/// Immutable comparison configuration for one call.
#[derive(Debug, Clone)]
pub struct EquivalencyOptions {
    use_runtime_typing: bool,
    selection: Vec<SelectionRule>,
    equality_rules: Vec<EqualityRule>,
    default_ordering: OrderingMode,
    ordering_overrides: Vec<(MemberSelector, OrderingMode)>,
    value_types: Vec<String>,
    enum_equivalence: EnumEquivalence,
    ignore_missing_members: bool,
    max_depth: Option<usize>,
}

impl Default for EquivalencyOptions {
    fn default() -> Self {
        Self {
            use_runtime_typing: false,
            selection: Vec::new(),
            equality_rules: Vec::new(),
            default_ordering: OrderingMode::Ignore,
            ordering_overrides: Vec::new(),
            value_types: Vec::new(),
            enum_equivalence: EnumEquivalence::ByValue,
            ignore_missing_members: false,
            max_depth: None,
        }
    }
}

impl EquivalencyOptions {
    pub fn builder() -> EquivalencyOptionsBuilder {
        EquivalencyOptionsBuilder::new()
    }

    pub fn uses_runtime_typing(&self) -> bool {
        self.use_runtime_typing
    }

    /// Rules apply in order and the last one that applies wins. Without any
    /// inclusion every member starts selected; with one, none does.
    pub fn is_selected(&self, ctx: &MemberContext<'_>) -> bool {
        let mut selected = !self
            .selection
            .iter()
            .any(|r| matches!(r, SelectionRule::Include(_)));
        for rule in &self.selection {
            match rule {
                SelectionRule::Include(s) if s.admits(ctx) => selected = true,
                SelectionRule::Exclude(s) if s.matches(ctx) => selected = false,
                _ => {}
            }
        }
        selected
    }

    /// First custom equality rule whose selector matches.
    pub fn equality_rule_for(&self, ctx: &MemberContext<'_>) -> Option<&EqualityRule> {
        self.equality_rules.iter().find(|r| r.selector.matches(ctx))
    }

    /// The last matching override, else the default.
    pub fn ordering_for(&self, ctx: &MemberContext<'_>) -> OrderingMode {
        self.ordering_overrides
            .iter()
            .rev()
            .find(|(selector, _)| selector.matches(ctx))
            .map_or(self.default_ordering, |(_, mode)| *mode)
    }

    pub fn compares_by_value(&self, ty: &TypeRef) -> bool {
        ty.has_value_semantics() || self.value_types.iter().any(|t| ty.is_named_or_derives(t))
    }

    pub fn enum_equivalence(&self) -> EnumEquivalence {
        self.enum_equivalence
    }

    pub fn ignores_missing_members(&self) -> bool {
        self.ignore_missing_members
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}

/// Mutable, consumed-once options builder. Mistakes are remembered and
/// reported by [`EquivalencyOptionsBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct EquivalencyOptionsBuilder {
    options: EquivalencyOptions,
    errors: Vec<UsageError>,
}

impl EquivalencyOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profile(profile: &OptionsProfile) -> Self {
        let mut builder = Self::new();
        if profile.respect_runtime_types {
            builder = builder.respecting_runtime_types();
        }
        builder.options.default_ordering = profile.ordering;
        for path in &profile.include {
            builder = builder.including_path(path);
        }
        for path in &profile.exclude {
            builder = builder.excluding_path(path);
        }
        for name in &profile.compare_by_value {
            builder = builder.comparing_by_value(name.as_str());
        }
        builder.options.enum_equivalence = profile.enums;
        if profile.ignore_missing_members {
            builder = builder.excluding_missing_members();
        }
        if let Some(depth) = profile.max_recursion_depth {
            builder = builder.with_max_recursion_depth(depth);
        }
        if profile.allow_infinite_recursion {
            builder = builder.allowing_infinite_recursion();
        }
        builder
    }

    fn check(mut self, selector: &MemberSelector) -> Self {
        if let Err(e) = selector.validate() {
            self.errors.push(e);
        }
        self
    }

    fn parse_path(&mut self, text: &str) -> Option<MemberSelector> {
        match MemberSelector::path(text) {
            Ok(selector) => Some(selector),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    /// Member and key resolution follows the expectation's runtime types.
    pub fn respecting_runtime_types(mut self) -> Self {
        self.options.use_runtime_typing = true;
        self
    }

    pub fn respecting_declared_types(mut self) -> Self {
        self.options.use_runtime_typing = false;
        self
    }

    pub fn including(self, selector: MemberSelector) -> Self {
        let mut builder = self.check(&selector);
        builder.options.selection.push(SelectionRule::Include(selector));
        builder
    }

    pub fn including_path(mut self, path: &str) -> Self {
        match self.parse_path(path) {
            Some(selector) => self.including(selector),
            None => self,
        }
    }

    pub fn excluding(self, selector: MemberSelector) -> Self {
        let mut builder = self.check(&selector);
        builder.options.selection.push(SelectionRule::Exclude(selector));
        builder
    }

    pub fn excluding_path(mut self, path: &str) -> Self {
        match self.parse_path(path) {
            Some(selector) => self.excluding(selector),
            None => self,
        }
    }

    /// Compares selected nodes with `comparer` instead of structurally.
    pub fn using(
        self,
        selector: MemberSelector,
        comparer: impl Fn(&Value, &Value) -> Result<bool, ComparerError> + Send + Sync + 'static,
    ) -> Self {
        let mut builder = self.check(&selector);
        builder.options.equality_rules.push(EqualityRule {
            selector,
            comparer: Arc::new(comparer),
        });
        builder
    }

    pub fn with_strict_ordering(mut self) -> Self {
        self.options.default_ordering = OrderingMode::Strict;
        self
    }

    pub fn without_strict_ordering(mut self) -> Self {
        self.options.default_ordering = OrderingMode::Ignore;
        self
    }

    pub fn with_strict_ordering_for(self, selector: MemberSelector) -> Self {
        let mut builder = self.check(&selector);
        builder
            .options
            .ordering_overrides
            .push((selector, OrderingMode::Strict));
        builder
    }

    pub fn without_strict_ordering_for(self, selector: MemberSelector) -> Self {
        let mut builder = self.check(&selector);
        builder
            .options
            .ordering_overrides
            .push((selector, OrderingMode::Ignore));
        builder
    }

    /// Treats the named type, and types deriving from it, as a scalar.
    pub fn comparing_by_value(mut self, type_name: &str) -> Self {
        if type_name.trim().is_empty() {
            self.errors.push(UsageError::EmptyTypeName);
        } else {
            self.options.value_types.push(type_name.to_string());
        }
        self
    }

    pub fn comparing_enums_by_name(mut self) -> Self {
        self.options.enum_equivalence = EnumEquivalence::ByName;
        self
    }

    pub fn comparing_enums_by_value(mut self) -> Self {
        self.options.enum_equivalence = EnumEquivalence::ByValue;
        self
    }

    /// Members missing on the subject are skipped instead of reported.
    pub fn excluding_missing_members(mut self) -> Self {
        self.options.ignore_missing_members = true;
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        if depth == 0 {
            self.errors.push(UsageError::ZeroRecursionDepth);
        } else {
            self.options.max_depth = Some(depth);
        }
        self
    }

    pub fn allowing_infinite_recursion(mut self) -> Self {
        self.options.max_depth = None;
        self
    }

    pub fn build(self) -> Result<EquivalencyOptions, UsageError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.options),
        }
    }
}
