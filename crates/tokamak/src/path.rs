/*
 * This file is part of the tokamak (https://github.com/cztomsik/tokamak) distribution.
 *
 * Copyright (c) the Tokamak contributors. All rights reserved.
 * Licensed under the MIT license. See LICENSE file in the project root for details.
 */

//! Path patterns: `/users/:id`, with an optional trailing `*` wildcard.

use std::borrow::Cow;

/// Up to this many named/wildcard parameters are allowed in a single [`PathPattern`].
///
/// Mirrors the hard ceiling in the design (`spec.md` §8 "16 path parameters: supported; 17:
/// build-time rejection").
pub const MAX_PATH_PARAMS: usize = 16;

/// Errors that can occur while building a [`PathPattern`] or a route tree on top of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RouteBuildError {
    /// More than [`MAX_PATH_PARAMS`] named/wildcard segments in a single pattern.
    #[error("path pattern {path:?} declares more than {MAX_PATH_PARAMS} parameters")]
    TooManyParams {
        /// The offending path literal.
        path: String,
    },
    /// The same `:name` appears twice in one pattern.
    #[error("path pattern {path:?} declares the parameter {name:?} more than once")]
    DuplicateParam {
        /// The offending path literal.
        path: String,
        /// The duplicated parameter name.
        name: String,
    },
    /// A `*` wildcard segment was not the last segment in the pattern.
    #[error("path pattern {path:?} has a `*` wildcard that is not the final segment")]
    WildcardNotLast {
        /// The offending path literal.
        path: String,
    },
    /// The pattern did not start with `/`.
    #[error("path pattern {path:?} must start with `/`")]
    MissingLeadingSlash {
        /// The offending path literal.
        path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(Cow<'static, str>),
    Param(Cow<'static, str>),
    Wildcard,
}

/// A parsed `/literal/:name/*` path pattern, matched segment-by-segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    pub(crate) segments: Vec<Segment>,
    pub(crate) param_count: usize,
}

impl PathPattern {
    /// Parses a path pattern such as `/users/:id/posts/*`.
    ///
    /// # Errors
    /// Returns [`RouteBuildError`] if the pattern doesn't start with `/`, declares the same
    /// parameter name twice, declares more than [`MAX_PATH_PARAMS`] parameters, or has a `*`
    /// that is not the trailing segment.
    pub fn parse(path: impl Into<Cow<'static, str>>) -> Result<Self, RouteBuildError> {
        let path = path.into();

        if !path.starts_with('/') {
            return Err(RouteBuildError::MissingLeadingSlash {
                path: path.into_owned(),
            });
        }

        let mut segments = Vec::new();
        let mut names = Vec::new();
        let raw_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let last_index = raw_segments.len().saturating_sub(1);

        for (index, raw) in raw_segments.iter().enumerate() {
            if *raw == "*" {
                if index != last_index {
                    return Err(RouteBuildError::WildcardNotLast {
                        path: path.into_owned(),
                    });
                }
                segments.push(Segment::Wildcard);
            } else if let Some(name) = raw.strip_prefix(':') {
                if names.contains(&name) {
                    return Err(RouteBuildError::DuplicateParam {
                        path: path.into_owned(),
                        name: name.to_owned(),
                    });
                }
                names.push(name);
                segments.push(Segment::Param(Cow::Owned(name.to_owned())));
            } else {
                segments.push(Segment::Literal(Cow::Owned((*raw).to_owned())));
            }
        }

        let param_count = segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_) | Segment::Wildcard))
            .count();

        if param_count > MAX_PATH_PARAMS {
            return Err(RouteBuildError::TooManyParams {
                path: path.into_owned(),
            });
        }

        Ok(Self {
            segments,
            param_count,
        })
    }

    /// Attempts to match `path` against this pattern, returning the captured parameter values
    /// in declaration order (wildcard capture is the raw, possibly-empty remainder joined by
    /// `/`).
    #[must_use]
    pub(crate) fn matches<'p>(&self, path: &'p str) -> Option<Vec<Cow<'p, str>>> {
        let raw_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut captures = Vec::with_capacity(self.param_count);
        let mut input = raw_segments.iter();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if input.next() != Some(&literal.as_ref()) {
                        return None;
                    }
                }
                Segment::Param(_) => match input.next() {
                    Some(value) => captures.push(Cow::Borrowed(*value)),
                    None => return None,
                },
                Segment::Wildcard => {
                    debug_assert_eq!(index, self.segments.len() - 1);
                    let remainder: Vec<&str> = input.by_ref().copied().collect();
                    captures.push(Cow::Owned(remainder.join("/")));
                    return Some(captures);
                }
            }
        }

        if input.next().is_some() {
            return None;
        }

        Some(captures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_literal_and_params() {
        let pattern = PathPattern::parse("/users/:id/posts").unwrap();
        let caps = pattern.matches("/users/42/posts").unwrap();
        assert_eq!(caps, vec![Cow::Borrowed("42")]);
        assert!(pattern.matches("/users/42/comments").is_none());
    }

    #[test]
    fn trailing_wildcard_matches_empty_remainder() {
        let pattern = PathPattern::parse("/static/*").unwrap();
        assert_eq!(pattern.matches("/static").unwrap(), vec![Cow::Borrowed("")]);
        assert_eq!(
            pattern.matches("/static/a/b").unwrap(),
            vec![Cow::Borrowed("a/b")]
        );
    }

    #[test]
    fn rejects_duplicate_param_names() {
        let err = PathPattern::parse("/:id/:id").unwrap_err();
        assert!(matches!(err, RouteBuildError::DuplicateParam { .. }));
    }

    #[test]
    fn rejects_wildcard_not_last() {
        let err = PathPattern::parse("/*/more").unwrap_err();
        assert!(matches!(err, RouteBuildError::WildcardNotLast { .. }));
    }

    #[test]
    fn rejects_too_many_params() {
        let path = (0..17).map(|i| format!(":p{i}")).collect::<Vec<_>>().join("/");
        let err = PathPattern::parse(format!("/{path}")).unwrap_err();
        assert!(matches!(err, RouteBuildError::TooManyParams { .. }));
    }

}
