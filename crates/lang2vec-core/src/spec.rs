//! Feature-set expression parser using nom
//!
//! Grammar:
//! ```text
//! spec     := segment ('+' segment)*
//! segment  := name ('|' name)*
//! name     := any run of characters other than '+', '|' and whitespace
//! ```
//!
//! `+` concatenates (column-wise stacking) and binds loosest; `|` is the
//! elementwise union of equal-length sets. Evaluation is left to right, so
//! the written order fixes the output column order.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    multi::separated_list1,
    sequence::delimited,
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Lang2VecError, Result};
use crate::feature_sets::{is_known_feature_set, FeatureSetKind};

/// A `|`-joined group of feature-set names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionSegment {
    sets: Vec<String>,
}

impl UnionSegment {
    /// Create a segment from set names
    pub fn new<S: Into<String>>(sets: impl IntoIterator<Item = S>) -> Self {
        Self {
            sets: sets.into_iter().map(Into::into).collect(),
        }
    }

    /// Set names, in evaluation order
    pub fn sets(&self) -> &[String] {
        &self.sets
    }
}

impl fmt::Display for UnionSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sets.join("|"))
    }
}

/// A parsed feature-set expression: `+`-joined union segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSetSpec {
    segments: Vec<UnionSegment>,
}

impl FeatureSetSpec {
    /// Create a spec from already-split segments
    pub fn new(segments: Vec<UnionSegment>) -> Self {
        Self { segments }
    }

    /// Build a spec from a list of segments, each of which may contain `|`
    ///
    /// An empty list is a valid spec that selects no columns.
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Result<Self> {
        segments
            .iter()
            .map(|s| parse_union_segment(s.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Union segments, in concatenation order
    pub fn segments(&self) -> &[UnionSegment] {
        &self.segments
    }

    /// Every set name, in evaluation order
    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .flat_map(|s| s.sets.iter().map(String::as_str))
    }

    /// Classify every token, failing on the first unknown one
    pub fn compile(&self) -> Result<CompiledSpec> {
        let segments = self
            .segments
            .iter()
            .map(|segment| {
                segment
                    .sets
                    .iter()
                    .map(|name| FeatureSetKind::from_name(name))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompiledSpec { segments })
    }
}

impl fmt::Display for FeatureSetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A spec whose tokens have all been classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSpec {
    segments: Vec<Vec<FeatureSetKind>>,
}

impl CompiledSpec {
    /// Classified union segments, in concatenation order
    pub fn segments(&self) -> &[Vec<FeatureSetKind>] {
        &self.segments
    }
}

/// Parse a feature-set expression such as `"syntax_wals|syntax_sswl+fam"`
pub fn parse_feature_sets(input: &str) -> Result<FeatureSetSpec> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Lang2VecError::invalid_feature_set(""));
    }

    match spec(trimmed) {
        Ok(("", result)) => Ok(result),
        _ => Err(Lang2VecError::invalid_feature_set(trimmed)),
    }
}

/// Parse a single `|`-joined segment (no `+` allowed)
fn parse_union_segment(input: &str) -> Result<UnionSegment> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Lang2VecError::invalid_feature_set(""));
    }

    match union_segment(trimmed) {
        Ok(("", segment)) => Ok(segment),
        _ => Err(Lang2VecError::invalid_feature_set(trimmed)),
    }
}

/// Parse whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse a full spec
fn spec(input: &str) -> IResult<&str, FeatureSetSpec> {
    map(separated_list1(char('+'), union_segment), FeatureSetSpec::new)(input)
}

/// Parse a `|`-joined segment
fn union_segment(input: &str) -> IResult<&str, UnionSegment> {
    map(separated_list1(char('|'), ws(set_name)), |names: Vec<&str>| {
        UnionSegment::new(names)
    })(input)
}

/// Parse a set name
fn set_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '+' && c != '|' && !c.is_whitespace())(input)
}

/// Join known feature sets into a union spec (`a|b|c`)
pub fn fs_union<S: AsRef<str>>(sets: &[S]) -> Result<String> {
    if sets.is_empty() {
        return Err(Lang2VecError::invalid_feature_set(""));
    }

    for set in sets {
        let name = set.as_ref();
        if !is_known_feature_set(name) {
            return Err(Lang2VecError::invalid_feature_set(name));
        }
    }

    Ok(join(sets, "|"))
}

/// Join feature sets or union segments into a concatenation spec (`a+b|c`)
pub fn fs_concatenation<S: AsRef<str>>(sets: &[S]) -> Result<String> {
    if sets.is_empty() {
        return Err(Lang2VecError::invalid_feature_set(""));
    }

    for set in sets {
        let segment = parse_union_segment(set.as_ref())?;
        if let Some(unknown) = segment.sets.iter().find(|n| !is_known_feature_set(n)) {
            return Err(Lang2VecError::invalid_feature_set(unknown.as_str()));
        }
    }

    Ok(join(sets, "+"))
}

fn join<S: AsRef<str>>(parts: &[S], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.as_ref().trim())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_sets::StoreFile;

    fn names(spec: &FeatureSetSpec) -> Vec<Vec<&str>> {
        spec.segments()
            .iter()
            .map(|s| s.sets().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_parse_single() {
        let spec = parse_feature_sets("fam").unwrap();
        assert_eq!(names(&spec), vec![vec!["fam"]]);
    }

    #[test]
    fn test_parse_plus_binds_loosest() {
        let spec = parse_feature_sets("syntax_wals|syntax_sswl+fam+geo|geo").unwrap();
        assert_eq!(
            names(&spec),
            vec![vec!["syntax_wals", "syntax_sswl"], vec!["fam"], vec!["geo", "geo"]]
        );
    }

    #[test]
    fn test_parse_whitespace_around_operators() {
        let spec = parse_feature_sets(" syntax_wals | syntax_sswl + fam ").unwrap();
        assert_eq!(spec.to_string(), "syntax_wals|syntax_sswl+fam");
    }

    #[test]
    fn test_parse_empty_tokens_rejected() {
        for input in ["", "   ", "fam+", "+fam", "fam||geo", "fam+|geo"] {
            let result = parse_feature_sets(input);
            assert!(
                matches!(result, Err(Lang2VecError::InvalidFeatureSet { .. })),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_parse_does_not_validate_names() {
        let spec = parse_feature_sets("fam+syntax_foo").unwrap();
        assert!(matches!(
            spec.compile(),
            Err(Lang2VecError::InvalidFeatureSet { ref name }) if name == "syntax_foo"
        ));
    }

    #[test]
    fn test_from_segments() {
        let spec = FeatureSetSpec::from_segments(&["syntax_wals|syntax_sswl", "fam"]).unwrap();
        assert_eq!(spec.to_string(), "syntax_wals|syntax_sswl+fam");
        assert_eq!(
            spec.set_names().collect::<Vec<_>>(),
            vec!["syntax_wals", "syntax_sswl", "fam"]
        );

        let empty = FeatureSetSpec::from_segments::<&str>(&[]).unwrap();
        assert!(empty.segments().is_empty());

        assert!(FeatureSetSpec::from_segments(&["fam+geo"]).is_err());
    }

    #[test]
    fn test_compile() {
        let compiled = parse_feature_sets("id+learned|learned+geo").unwrap().compile().unwrap();
        let segments = compiled.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], vec![FeatureSetKind::Identity]);
        assert_eq!(segments[1], vec![FeatureSetKind::Learned, FeatureSetKind::Learned]);
        assert_eq!(segments[2][0].store_file(), Some(StoreFile::Geocoord));
    }

    #[test]
    fn test_fs_union() {
        assert_eq!(
            fs_union(&["syntax_wals", "syntax_sswl"]).unwrap(),
            "syntax_wals|syntax_sswl"
        );
        assert!(fs_union(&["syntax_wals", "nope"]).is_err());
        assert!(fs_union(&["syntax_wals|syntax_sswl"]).is_err());
        assert!(fs_union::<&str>(&[]).is_err());
    }

    #[test]
    fn test_fs_concatenation() {
        let union = fs_union(&["syntax_wals", "syntax_sswl"]).unwrap();
        assert_eq!(
            fs_concatenation(&[union.as_str(), "fam", "learned"]).unwrap(),
            "syntax_wals|syntax_sswl+fam+learned"
        );
        assert!(matches!(
            fs_concatenation(&["fam", "syntax_wals|bogus"]),
            Err(Lang2VecError::InvalidFeatureSet { ref name }) if name == "bogus"
        ));
    }
}
