//! Type-name resolution.
//!
//! Turns annotation text such as `*string`, `list<int>`,
//! `hash<string, softlist<int>>`, `hash<MyRecord>` or `MyClass` into a
//! registry descriptor. Errors carry a span relative to the resolved text;
//! [`TypeRegistry::resolve_annotation`] rebases it onto the source span and
//! reports it into a diagnostic queue.
//!
//! Grammar:
//!
//! ```text
//! type  := one ('|' one)*
//! one   := '*'? ident ('<' type (',' type)* '>')?
//! ident := [A-Za-z_][A-Za-z0-9_]* ('::' ident)?
//! ```
//!
//! A `*` before the first member of a union applies to the whole union.

use quill_diagnostic::{DiagnosticQueue, ErrorGuaranteed};
use quill_ir::Span;
use quill_stack::ensure_sufficient_stack;

use crate::catalogue::BuiltinType;
use crate::descriptor::TypeRef;
use crate::error::{ParseTypeError, ResolveError};
use crate::options::TypeOptions;
use crate::registry::TypeRegistry;

const HASH_TAKES: &str =
    "a single hashdecl name as a subtype argument or two type names giving the key and value types";
const LIST_TAKES: &str = "a single type name giving list element value type";
const REFERENCE_TAKES: &str = "a single type name giving referenced lvalue type";
const OBJECT_TAKES: &str = "a single class name as a subtype argument";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Star,
    Lt,
    Gt,
    Comma,
    Pipe,
}

#[derive(Copy, Clone, Debug)]
struct Token {
    kind: TokenKind,
    span: Span,
}

fn tokenize(text: &str) -> Result<Vec<Token>, ResolveError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '*' => TokenKind::Star,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            ',' => TokenKind::Comma,
            '|' => TokenKind::Pipe,
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' || next == ':' {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Ident,
                    span: Span::from_range_saturating(start..end),
                });
                continue;
            }
            other => {
                let span = Span::from_range_saturating(start..start + other.len_utf8());
                return Err(malformed(text, format!("unexpected character '{other}'"), span));
            }
        };
        tokens.push(Token {
            kind,
            span: Span::from_range_saturating(start..start + c.len_utf8()),
        });
    }
    Ok(tokens)
}

fn malformed(text: &str, reason: impl Into<String>, span: Span) -> ResolveError {
    ResolveError::new(
        ParseTypeError::Malformed {
            text: text.to_owned(),
            reason: reason.into(),
        },
        span,
    )
}

/// One parsed annotation.
#[derive(Debug)]
enum TypeExpr {
    Named {
        or_nothing: bool,
        name: Span,
        args: Vec<TypeExpr>,
        span: Span,
    },
    /// A leading `*` applies to the whole union.
    Union {
        or_nothing: bool,
        members: Vec<TypeExpr>,
        span: Span,
    },
}

impl TypeExpr {
    fn span(&self) -> Span {
        match self {
            TypeExpr::Named { span, .. } | TypeExpr::Union { span, .. } => *span,
        }
    }

    /// The bare identifier, if this is a name without `*` or arguments.
    fn bare_name<'t>(&self, text: &'t str) -> Option<&'t str> {
        match self {
            TypeExpr::Named {
                or_nothing: false,
                name,
                args,
                ..
            } if args.is_empty() => name.slice(text),
            _ => None,
        }
    }
}

struct Parser<'t> {
    text: &'t str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn end_span(&self) -> Span {
        let end = self.tokens.last().map_or(0, |t| t.span.end);
        Span::new(end, end)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ResolveError> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(*token)
            }
            Some(token) => Err(malformed(self.text, format!("expected {what}"), token.span)),
            None => Err(malformed(self.text, format!("expected {what}"), self.end_span())),
        }
    }

    fn parse(mut self) -> Result<TypeExpr, ResolveError> {
        if self.tokens.is_empty() {
            return Err(malformed(self.text, "empty type annotation", Span::DUMMY));
        }
        let expr = self.parse_type()?;
        match self.tokens.get(self.pos) {
            None => Ok(expr),
            Some(token) => Err(malformed(self.text, "unexpected trailing input", token.span)),
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, ResolveError> {
        ensure_sufficient_stack(|| self.parse_type_inner())
    }

    fn parse_type_inner(&mut self) -> Result<TypeExpr, ResolveError> {
        let mut first = self.parse_one()?;
        if self.peek() != Some(TokenKind::Pipe) {
            return Ok(first);
        }
        let or_nothing = match &mut first {
            TypeExpr::Named { or_nothing, .. } => std::mem::take(or_nothing),
            TypeExpr::Union { .. } => false,
        };
        let start = first.span();
        let mut members = vec![first];
        while self.peek() == Some(TokenKind::Pipe) {
            self.pos += 1;
            members.push(self.parse_one()?);
        }
        let span = start.merge(members[members.len() - 1].span());
        Ok(TypeExpr::Union {
            or_nothing,
            members,
            span,
        })
    }

    fn parse_one(&mut self) -> Result<TypeExpr, ResolveError> {
        let star = if self.peek() == Some(TokenKind::Star) {
            Some(self.expect(TokenKind::Star, "'*'")?)
        } else {
            None
        };
        let name = self.expect(TokenKind::Ident, "a type name")?;
        let mut span = star.map_or(name.span, |s| s.span.merge(name.span));
        let mut args = Vec::new();
        if self.peek() == Some(TokenKind::Lt) {
            self.pos += 1;
            args.push(self.parse_type()?);
            while self.peek() == Some(TokenKind::Comma) {
                self.pos += 1;
                args.push(self.parse_type()?);
            }
            let close = self.expect(TokenKind::Gt, "'>' or ','")?;
            span = span.merge(close.span);
        }
        Ok(TypeExpr::Named {
            or_nothing: star.is_some(),
            name: name.span,
            args,
            span,
        })
    }
}

impl TypeRegistry {
    /// Resolve annotation text to a descriptor.
    ///
    /// With `or_nothing`, the `*T` twin of the resolved type is returned, as
    /// if the text were prefixed with `*`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve_type_name(&self, name: &str, or_nothing: bool) -> Result<TypeRef, ResolveError> {
        let tokens = tokenize(name)?;
        let expr = Parser {
            text: name,
            tokens,
            pos: 0,
        }
        .parse()?;
        let ty = self.resolve_expr(name, &expr)?;
        Ok(if or_nothing {
            self.get_or_nothing_type(&ty)
        } else {
            ty
        })
    }

    /// Resolve an annotation found at `span` in the source, reporting
    /// failures into `queue`.
    pub fn resolve_annotation(
        &self,
        text: &str,
        span: Span,
        queue: &mut DiagnosticQueue,
    ) -> Result<TypeRef, ErrorGuaranteed> {
        self.resolve_type_name(text, false).map_err(|err| {
            queue.emit_error(err.error.to_diagnostic(err.span.offset_by(span)))
        })
    }

    fn resolve_expr(&self, text: &str, expr: &TypeExpr) -> Result<TypeRef, ResolveError> {
        ensure_sufficient_stack(|| self.resolve_expr_inner(text, expr))
    }

    fn resolve_expr_inner(&self, text: &str, expr: &TypeExpr) -> Result<TypeRef, ResolveError> {
        match expr {
            TypeExpr::Union {
                or_nothing,
                members,
                span,
            } => {
                let ty = self.resolve_union(text, members, *span)?;
                Ok(if *or_nothing {
                    self.get_or_nothing_type(&ty)
                } else {
                    ty
                })
            }
            TypeExpr::Named {
                or_nothing,
                name,
                args,
                span,
            } => {
                let base = name.slice(text).unwrap_or_default();
                let ty = if args.is_empty() {
                    self.lookup_name(base, false).ok_or_else(|| {
                        ResolveError::new(
                            ParseTypeError::UnknownType {
                                name: base.to_owned(),
                            },
                            *name,
                        )
                    })?
                } else {
                    let full = span.slice(text).unwrap_or(text);
                    self.resolve_subtyped(text, full, base, *name, args, *span)?
                };
                Ok(if *or_nothing {
                    self.get_or_nothing_type(&ty)
                } else {
                    ty
                })
            }
        }
    }

    /// Unions are limited to the builtin numeric unions.
    fn resolve_union(
        &self,
        text: &str,
        members: &[TypeExpr],
        span: Span,
    ) -> Result<TypeRef, ResolveError> {
        let mut names = Vec::with_capacity(members.len());
        for member in members {
            let Some(name) = member.bare_name(text) else {
                let reason = "union members must be plain type names";
                return Err(malformed(text, reason, member.span()));
            };
            names.push(name);
        }
        let joined = names.join("|");
        match self.builtin_by_name(&joined) {
            Some(builtin) => Ok(self.builtin(builtin)),
            None => Err(malformed(
                text,
                format!("unsupported union type '{joined}'"),
                span,
            )),
        }
    }

    fn resolve_subtyped(
        &self,
        text: &str,
        full: &str,
        base: &str,
        base_span: Span,
        args: &[TypeExpr],
        span: Span,
    ) -> Result<TypeRef, ResolveError> {
        let arity = |takes: &'static str| {
            ResolveError::new(
                ParseTypeError::SubtypeArity {
                    text: full.to_owned(),
                    count: args.len(),
                    base: base.to_owned(),
                    takes,
                },
                span,
            )
        };
        let is_auto = |arg: &TypeExpr| arg.bare_name(text) == Some("auto");

        match (base, args) {
            ("hash", [arg]) if is_auto(arg) => Ok(self.builtin(BuiltinType::AutoHash)),
            ("hash", [arg]) => {
                let name = arg.bare_name(text).unwrap_or_default();
                self.record_type(name, false).ok_or_else(|| {
                    ResolveError::new(
                        ParseTypeError::UnknownRecord {
                            text: full.to_owned(),
                            name: arg.span().slice(text).unwrap_or_default().to_owned(),
                        },
                        arg.span(),
                    )
                })
            }
            ("hash", [key, value]) => {
                if key.bare_name(text) != Some("string") {
                    return Err(ResolveError::new(
                        ParseTypeError::InvalidHashKey {
                            text: full.to_owned(),
                            key: key.span().slice(text).unwrap_or_default().to_owned(),
                        },
                        key.span(),
                    ));
                }
                let element = self.resolve_expr(text, value)?;
                Ok(if element.has_type() {
                    self.get_complex_hash_type(&element)
                } else {
                    self.builtin(BuiltinType::Hash)
                })
            }
            ("hash", _) => Err(arity(HASH_TAKES)),

            ("list", [arg]) if is_auto(arg) => Ok(self.builtin(BuiltinType::AutoList)),
            ("list", [arg]) => {
                let element = self.resolve_expr(text, arg)?;
                Ok(if element.has_type() {
                    self.get_complex_list_type(&element)
                } else {
                    self.builtin(BuiltinType::List)
                })
            }
            ("list", _) => Err(arity(LIST_TAKES)),

            ("softlist", [arg]) if is_auto(arg) => Ok(self.builtin(BuiltinType::SoftAutoList)),
            ("softlist", [arg]) => {
                let element = self.resolve_expr(text, arg)?;
                Ok(if element.has_type() {
                    self.get_complex_soft_list_type(&element)
                } else {
                    self.builtin(BuiltinType::SoftList)
                })
            }
            ("softlist", _) => Err(arity(LIST_TAKES)),

            ("reference", [arg]) => {
                let element = self.resolve_expr(text, arg)?;
                Ok(if element.has_type() && !self.references_untyped() {
                    self.get_complex_reference_type(&element)
                } else {
                    self.lookup_name(base, false)
                        .unwrap_or_else(|| self.builtin(BuiltinType::Reference))
                })
            }
            ("reference", _) => Err(arity(REFERENCE_TAKES)),

            ("object", [arg]) if is_auto(arg) => Ok(self.builtin(BuiltinType::Object)),
            ("object", [arg]) => {
                let name = arg.bare_name(text).unwrap_or_default();
                self.lookup_name(name, false)
                    .filter(|ty| ty.unique_return_class().is_some())
                    .ok_or_else(|| {
                        ResolveError::new(
                            ParseTypeError::UnknownType {
                                name: arg.span().slice(text).unwrap_or_default().to_owned(),
                            },
                            arg.span(),
                        )
                    })
            }
            ("object", _) => Err(arity(OBJECT_TAKES)),

            _ if self.lookup_name(base, false).is_some() => Err(ResolveError::new(
                ParseTypeError::NoSubtypes {
                    text: full.to_owned(),
                    base: base.to_owned(),
                },
                base_span,
            )),
            _ => Err(ResolveError::new(
                ParseTypeError::UnknownType {
                    name: base.to_owned(),
                },
                base_span,
            )),
        }
    }

    fn references_untyped(&self) -> bool {
        self.options().contains(TypeOptions::BROKEN_REFERENCES)
    }
}
