//! Type matching.
//!
//! Three layers, all driven by one [`Matcher`]:
//!
//! - [`Matcher::match_spec`]: one expected spec against one offered spec.
//! - [`Matcher::parse_accepts`]: an expected descriptor's accept list against
//!   an offered descriptor's return list. This is the parse-time decision:
//!   reject (`NotEqual`), accept (`Ident`) or check at run time.
//! - [`Matcher::runtime_accepts`]: a descriptor against a concrete value.
//!
//! The "offered side is `ALL`" rule makes every expected spec other than
//! `ALL` itself answer `Ambiguous` with `may_not_match` set, and an expected
//! `ALL` answers `Wildcard` to anything.

use quill_stack::ensure_sufficient_stack;

use crate::descriptor::{TypeDescriptor, TypeRef};
use crate::error::ParseTypeError;
use crate::hierarchy::{ClassHierarchyView, ClassId};
use crate::options::TypeOptions;
use crate::spec::{MatchResult, TypeSpec};
use crate::tag::TypeTag;
use crate::value::Value;

/// Side results of a spec match.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct MatchFlags {
    /// The match holds for some values of the offered type but not all.
    pub may_not_match: bool,
    /// Accepting a value requires folding container elements.
    pub may_need_filter: bool,
}

/// Result of [`Matcher::parse_accepts`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ParseAccepts {
    pub result: MatchResult,
    pub may_not_match: bool,
    pub may_need_filter: bool,
}

impl ParseAccepts {
    const fn new(result: MatchResult) -> Self {
        ParseAccepts {
            result,
            may_not_match: false,
            may_need_filter: false,
        }
    }

    #[inline]
    pub fn is_match(self) -> bool {
        self.result.is_match()
    }
}

/// Stateless matcher bound to a class hierarchy and engine options.
#[derive(Copy, Clone)]
pub struct Matcher<'a> {
    classes: &'a dyn ClassHierarchyView,
    options: TypeOptions,
}

impl<'a> Matcher<'a> {
    pub fn new(classes: &'a dyn ClassHierarchyView, options: TypeOptions) -> Self {
        Matcher { classes, options }
    }

    #[inline]
    pub fn classes(&self) -> &'a dyn ClassHierarchyView {
        self.classes
    }

    #[inline]
    pub fn options(&self) -> TypeOptions {
        self.options
    }

    /// Compare an expected spec with an offered spec.
    pub fn match_spec(
        &self,
        expected: &TypeSpec,
        offered: &TypeSpec,
        flags: &mut MatchFlags,
    ) -> MatchResult {
        ensure_sufficient_stack(|| self.match_spec_inner(expected, offered, flags))
    }

    fn match_spec_inner(
        &self,
        expected: &TypeSpec,
        offered: &TypeSpec,
        flags: &mut MatchFlags,
    ) -> MatchResult {
        if expected.is_all() {
            return MatchResult::Wildcard;
        }
        if offered.is_all() {
            flags.may_not_match = true;
            return MatchResult::Ambiguous;
        }

        match (expected, offered) {
            (TypeSpec::Class(a), TypeSpec::Class(b)) => self.match_class(*a, *b, flags),
            (TypeSpec::Class(_), TypeSpec::Simple(TypeTag::OBJECT)) => {
                flags.may_not_match = true;
                MatchResult::Ambiguous
            }

            (TypeSpec::Record(a), TypeSpec::Record(b)) => {
                if a.equal(b) {
                    MatchResult::Ident
                } else {
                    MatchResult::NotEqual
                }
            }

            (TypeSpec::Hash(e1), TypeSpec::Hash(e2))
            | (
                TypeSpec::List(e1) | TypeSpec::SoftList(e1),
                TypeSpec::List(e2) | TypeSpec::SoftList(e2),
            ) => self.match_elements(e1, e2, flags),
            (TypeSpec::Hash(_), TypeSpec::Simple(TypeTag::HASH))
            | (TypeSpec::List(_) | TypeSpec::SoftList(_), TypeSpec::Simple(TypeTag::LIST)) => {
                // Untyped elements are only checked when the value arrives.
                flags.may_not_match = true;
                MatchResult::Near
            }
            // A soft list wraps any value its element type accepts.
            (TypeSpec::SoftList(element), other) => self.match_wrapped(element, other, flags),

            (TypeSpec::Reference(e1), TypeSpec::Reference(e2)) => {
                if TypeDescriptor::equal(e1, e2) {
                    MatchResult::Ident
                } else if self.output_superset_of(e2, e1) {
                    MatchResult::Ambiguous
                } else {
                    MatchResult::NotEqual
                }
            }
            (TypeSpec::Reference(_), TypeSpec::Simple(TypeTag::REFERENCE)) => {
                MatchResult::Ambiguous
            }

            (TypeSpec::Simple(t), other) => {
                if *t != other.tag() {
                    MatchResult::NotEqual
                } else if (*t == TypeTag::LIST || *t == TypeTag::HASH) && !other.is_simple() {
                    MatchResult::Near
                } else {
                    MatchResult::Ident
                }
            }

            _ => MatchResult::NotEqual,
        }
    }

    fn match_class(
        &self,
        expected: ClassId,
        offered: ClassId,
        flags: &mut MatchFlags,
    ) -> MatchResult {
        if expected == offered {
            return MatchResult::Ident;
        }
        match self.classes.relation(expected, offered) {
            Some(inheritance) => {
                if inheritance.private {
                    flags.may_not_match = true;
                }
                MatchResult::Ambiguous
            }
            None => MatchResult::NotEqual,
        }
    }

    /// Container element comparison. Identical elements are `Ident`; any other
    /// compatible pair needs element folding and is `Ambiguous`.
    fn match_elements(
        &self,
        expected: &TypeRef,
        offered: &TypeRef,
        flags: &mut MatchFlags,
    ) -> MatchResult {
        if TypeDescriptor::equal(expected, offered) {
            return MatchResult::Ident;
        }
        let inner = self.parse_accepts(expected, offered);
        if !inner.is_match() {
            return MatchResult::NotEqual;
        }
        flags.may_not_match |= inner.may_not_match;
        flags.may_need_filter = true;
        MatchResult::Ambiguous
    }

    fn match_wrapped(
        &self,
        element: &TypeDescriptor,
        offered: &TypeSpec,
        flags: &mut MatchFlags,
    ) -> MatchResult {
        let mut inner = MatchFlags::default();
        let found = element
            .accepts()
            .iter()
            .any(|a| self.match_spec(&a.spec, offered, &mut inner).is_match());
        if !found {
            return MatchResult::NotEqual;
        }
        flags.may_not_match |= inner.may_not_match;
        flags.may_need_filter = true;
        MatchResult::Ambiguous
    }

    /// Compare what `expected` accepts with what `offered` returns.
    ///
    /// With [`TypeOptions::STRICT_TYPES`], any match that may not hold for
    /// every offered value is reported as `NotEqual`.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(expected = expected.name(), offered = offered.name())
    )]
    pub fn parse_accepts(
        &self,
        expected: &TypeDescriptor,
        offered: &TypeDescriptor,
    ) -> ParseAccepts {
        let out = self.parse_accepts_lenient(expected, offered);
        if out.may_not_match
            && out.result.is_match()
            && self.options.contains(TypeOptions::STRICT_TYPES)
        {
            return ParseAccepts {
                result: MatchResult::NotEqual,
                ..out
            };
        }
        out
    }

    fn parse_accepts_lenient(
        &self,
        expected: &TypeDescriptor,
        offered: &TypeDescriptor,
    ) -> ParseAccepts {
        if !expected.has_type() || !offered.has_type() {
            return ParseAccepts::new(MatchResult::Ambiguous);
        }
        if std::ptr::eq(expected, offered) {
            return ParseAccepts::new(MatchResult::Ident);
        }

        let mut flags = MatchFlags {
            may_not_match: offered.returns().len() > expected.accepts().len(),
            may_need_filter: false,
        };
        let ambiguous = |flags: MatchFlags| ParseAccepts {
            result: MatchResult::Ambiguous,
            may_not_match: flags.may_not_match,
            may_need_filter: flags.may_need_filter,
        };

        // Entries are scanned in order; the first matched entry settles the
        // result early once a mismatch is possible.
        let mut ok = false;
        let mut all_ident = true;
        for returned in offered.returns() {
            let mut best = MatchResult::NotEqual;
            for accepted in expected.accepts() {
                let result = self.match_spec(&accepted.spec, &returned.spec, &mut flags);
                if !result.is_match() {
                    continue;
                }
                if result == MatchResult::Ident && accepted.exact && returned.exact {
                    return ParseAccepts {
                        result: MatchResult::Ident,
                        may_not_match: false,
                        may_need_filter: flags.may_need_filter,
                    };
                }
                if !best.is_match() && !ok {
                    ok = true;
                    if flags.may_not_match {
                        return ambiguous(flags);
                    }
                }
                best = best.max(result);
            }
            if best.is_match() {
                all_ident &= best == MatchResult::Ident;
            } else if !flags.may_not_match {
                flags.may_not_match = true;
                if ok {
                    return ambiguous(flags);
                }
            }
        }

        if !ok {
            return ParseAccepts::new(MatchResult::NotEqual);
        }
        let same_arity = offered.returns().len() == expected.accepts().len();
        if same_arity && all_ident && !flags.may_need_filter {
            ParseAccepts {
                result: MatchResult::Ident,
                ..ambiguous(flags)
            }
        } else {
            ambiguous(flags)
        }
    }

    /// Like [`parse_accepts`](Self::parse_accepts), but a `NotEqual` outcome
    /// becomes an incompatibility error naming `context`.
    pub fn check_parse_accepts(
        &self,
        expected: &TypeDescriptor,
        offered: &TypeDescriptor,
        context: &str,
    ) -> Result<ParseAccepts, ParseTypeError> {
        let out = self.parse_accepts(expected, offered);
        if out.is_match() {
            return Ok(out);
        }
        Err(ParseTypeError::Incompatible {
            context: context.to_owned(),
            expected: expected.description(),
            found: offered.description(),
        })
    }

    /// How an expression of type `ty` relates to `spec`.
    pub fn parse_returns(&self, ty: &TypeDescriptor, spec: &TypeSpec) -> MatchResult {
        if !ty.has_type() {
            return MatchResult::Ambiguous;
        }
        let mut flags = MatchFlags::default();
        if let [only] = ty.returns() {
            return self.match_spec(spec, &only.spec, &mut flags);
        }
        ty.returns()
            .iter()
            .find(|r| self.match_spec(spec, &r.spec, &mut flags).is_match())
            .map_or(MatchResult::NotEqual, |r| {
                if r.exact {
                    MatchResult::Ident
                } else {
                    MatchResult::Ambiguous
                }
            })
    }

    /// Whether `ty` only ever returns `spec`.
    pub fn is_type(&self, ty: &TypeDescriptor, spec: &TypeSpec) -> bool {
        match ty.returns() {
            [only] => {
                let mut flags = MatchFlags::default();
                self.match_spec(spec, &only.spec, &mut flags) == MatchResult::Ident
            }
            _ => false,
        }
    }

    /// Whether some return of `second` is accepted by `first`.
    pub fn is_output_compatible(&self, first: &TypeDescriptor, second: &TypeDescriptor) -> bool {
        if !first.has_type() || !second.has_type() {
            return true;
        }
        second.returns().iter().any(|r| {
            first
                .accepts()
                .iter()
                .any(|a| self.match_spec(&a.spec, &r.spec, &mut MatchFlags::default()).is_match())
        })
    }

    /// Whether everything `b` may return is also something `a` may return.
    ///
    /// An untyped `a` is a superset of everything; an untyped `b` is only
    /// covered by an untyped `a`.
    pub fn output_superset_of(&self, a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
        if !a.has_type() {
            return true;
        }
        if !b.has_type() {
            return false;
        }
        b.returns().iter().all(|rb| {
            a.returns().iter().any(|ra| {
                let mut flags = MatchFlags::default();
                let result = self.match_spec(&ra.spec, &rb.spec, &mut flags);
                result.is_match() && !flags.may_not_match
            })
        })
    }

    fn superset_opt(&self, a: Option<&TypeRef>, b: &TypeDescriptor) -> bool {
        a.map_or(true, |a| self.output_superset_of(a, b))
    }

    /// Compare one spec with a concrete value.
    ///
    /// Typed containers report their element type, so no element is visited.
    /// Untyped or differently typed containers against a parameterized spec
    /// answer `Near`.
    pub fn runtime_accepts_spec(&self, spec: &TypeSpec, value: &Value, exact: bool) -> MatchResult {
        let hit = if exact {
            MatchResult::Ident
        } else {
            MatchResult::Ambiguous
        };

        match (spec, value) {
            (TypeSpec::Class(class), Value::Object(obj)) => {
                match self.classes.relation(*class, obj.class) {
                    Some(inheritance) if !inheritance.private => hit,
                    Some(_) => MatchResult::Ambiguous,
                    None => MatchResult::NotEqual,
                }
            }
            (TypeSpec::Record(record), Value::Hash(hash)) => match &hash.record {
                Some(r) if r.equal(record) => hit,
                _ => MatchResult::NotEqual,
            },
            (TypeSpec::Hash(element), Value::Hash(hash)) => match &hash.value_type {
                Some(ti) if TypeDescriptor::equal(element, ti) => hit,
                _ => MatchResult::Near,
            },
            (TypeSpec::List(element) | TypeSpec::SoftList(element), Value::List(list)) => {
                match &list.element_type {
                    Some(ti) if TypeDescriptor::equal(element, ti) => hit,
                    _ => MatchResult::Near,
                }
            }
            (TypeSpec::SoftList(_), _) => MatchResult::Ambiguous,
            (TypeSpec::Reference(element), Value::Reference(r)) => {
                let lvalue = r.lvalue_type.as_ref();
                if lvalue.is_some_and(|ti| TypeDescriptor::equal(element, ti)) {
                    MatchResult::Ident
                } else if self.superset_opt(lvalue, element) {
                    hit
                } else {
                    MatchResult::NotEqual
                }
            }
            (TypeSpec::Simple(TypeTag::HASH), Value::Hash(hash)) => {
                if hash.record.is_some() || hash.value_type.is_some() {
                    MatchResult::Near
                } else {
                    hit
                }
            }
            (TypeSpec::Simple(TypeTag::LIST), Value::List(list)) => {
                if list.element_type.is_some() {
                    MatchResult::Near
                } else {
                    hit
                }
            }
            (TypeSpec::Simple(t), v) if *t == TypeTag::ALL || *t == v.type_tag() => hit,
            _ => MatchResult::NotEqual,
        }
    }

    /// Compare a descriptor with a concrete value: the first accept entry
    /// that does not reject the value decides.
    pub fn runtime_accepts(&self, ty: &TypeDescriptor, value: &Value) -> MatchResult {
        if !ty.has_type() {
            return MatchResult::Ambiguous;
        }
        ty.accepts()
            .iter()
            .map(|a| self.runtime_accepts_spec(&a.spec, value, a.exact))
            .find(|r| r.is_match())
            .unwrap_or(MatchResult::NotEqual)
    }
}
