//! Overload selection.
//!
//! A [`VariantSet`] holds the parameter signatures of one callable's
//! overloads. At parse time, [`VariantSet::parse_select`] either settles on
//! a single variant or hands the surviving candidates to the runtime, where
//! [`VariantSet::runtime_select`] picks one from the concrete arguments.
//!
//! Both passes score a candidate as the sum of its per-parameter match ranks
//! and break ties by declaration order.

use crate::descriptor::{TypeDescriptor, TypeRef};
use crate::error::ParseTypeError;
use crate::registry::TypeRegistry;
use crate::spec::MatchResult;
use crate::value::Value;

/// Outcome of parse-time overload selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Exactly one variant fits and needs no runtime check.
    Resolved(usize),
    /// These variants may fit, best first; decide from the argument values.
    Deferred(Vec<usize>),
    /// No variant can accept the arguments.
    NoMatch,
}

#[derive(Copy, Clone, Debug)]
struct Candidate {
    index: usize,
    score: u32,
    exact: bool,
}

/// The overloads of one callable.
#[derive(Clone, Debug)]
pub struct VariantSet {
    name: String,
    variants: Vec<Vec<TypeRef>>,
}

impl VariantSet {
    pub fn new(name: impl Into<String>) -> Self {
        VariantSet {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn params(&self, index: usize) -> Option<&[TypeRef]> {
        self.variants.get(index).map(Vec::as_slice)
    }

    /// Add a variant, returning its index.
    ///
    /// A signature whose parameter types are all `equal` to an existing
    /// variant's is rejected.
    pub fn add(&mut self, params: Vec<TypeRef>) -> Result<usize, ParseTypeError> {
        let duplicate = self.variants.iter().any(|existing| {
            existing.len() == params.len()
                && existing
                    .iter()
                    .zip(&params)
                    .all(|(a, b)| TypeDescriptor::equal(a, b))
        });
        if duplicate {
            return Err(ParseTypeError::DuplicateVariant {
                name: self.name.clone(),
                signature: signature(&params),
            });
        }
        self.variants.push(params);
        Ok(self.variants.len() - 1)
    }

    /// Select a variant from the declared types of the arguments.
    ///
    /// A missing trailing argument is matched as `nothing`; a variant with
    /// fewer parameters than arguments never fits.
    pub fn parse_select(&self, registry: &TypeRegistry, args: &[TypeRef]) -> Selection {
        let matcher = registry.matcher();
        let nothing = registry.nothing();
        let mut candidates: Vec<Candidate> = self
            .variants
            .iter()
            .enumerate()
            .filter(|(_, params)| params.len() >= args.len())
            .filter_map(|(index, params)| {
                let mut score = 0;
                let mut exact = true;
                for (i, param) in params.iter().enumerate() {
                    let offered = args.get(i).unwrap_or(&nothing);
                    let out = matcher.parse_accepts(param, offered);
                    if !out.is_match() {
                        return None;
                    }
                    score += out.result.rank();
                    exact &= out.result == MatchResult::Ident && !out.may_not_match;
                }
                Some(Candidate {
                    index,
                    score,
                    exact,
                })
            })
            .collect();
        // Stable, so equal scores keep declaration order.
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        let selection = match candidates.as_slice() {
            [] => Selection::NoMatch,
            [best, rest @ ..]
                if best.exact
                    && rest
                        .first()
                        .map_or(true, |next| !next.exact || next.score < best.score) =>
            {
                Selection::Resolved(best.index)
            }
            _ => Selection::Deferred(candidates.iter().map(|c| c.index).collect()),
        };
        tracing::debug!(
            callable = %self.name,
            args = args.len(),
            ?selection,
            "parse-time variant selection"
        );
        selection
    }

    /// Select a variant from concrete argument values.
    ///
    /// Deterministic: the highest score wins and the earliest declared
    /// variant wins a tie.
    pub fn runtime_select(&self, registry: &TypeRegistry, args: &[Value]) -> Option<usize> {
        self.runtime_select_among(registry, 0..self.variants.len(), args)
    }

    /// Like [`runtime_select`](Self::runtime_select), restricted to the
    /// candidates a deferred parse-time selection left open. Ties go to the
    /// candidate listed first.
    pub fn runtime_select_among(
        &self,
        registry: &TypeRegistry,
        candidates: impl IntoIterator<Item = usize>,
        args: &[Value],
    ) -> Option<usize> {
        let matcher = registry.matcher();
        let mut best: Option<(usize, u32)> = None;
        for index in candidates {
            let Some(params) = self.variants.get(index) else {
                continue;
            };
            if params.len() < args.len() {
                continue;
            }
            let mut score = 0;
            let fits = params.iter().enumerate().all(|(i, param)| {
                let result = match args.get(i) {
                    Some(value) => matcher.runtime_accepts(param, value),
                    None => matcher.runtime_accepts(param, &Value::Nothing),
                };
                score += result.rank();
                result.is_match()
            });
            if fits && best.map_or(true, |(_, top)| score > top) {
                best = Some((index, score));
            }
        }
        tracing::debug!(
            callable = %self.name,
            selected = ?best.map(|(index, _)| index),
            "runtime variant selection"
        );
        best.map(|(index, _)| index)
    }
}

fn signature(params: &[TypeRef]) -> String {
    params
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}
