//! Union and concatenation of resolved feature sets

use ndarray::{Array2, ArrayView2, Axis, Zip};

use crate::error::{Lang2VecError, Result};
use crate::resolve::{NamedSet, Resolver};
use crate::spec::CompiledSpec;

/// Elementwise union of two sets of equal length
///
/// The result keeps the left operand's feature names. Each cell is the
/// larger of the two values, so a real observation (0 or 1) overrides the
/// `-1` sentinel and a 1 overrides a 0.
pub fn union_pair(mut left: NamedSet, right: NamedSet) -> Result<NamedSet> {
    if left.values().dim() != right.values().dim() {
        return Err(Lang2VecError::UnionArity {
            left: left.label().to_string(),
            left_len: left.len(),
            right: right.label().to_string(),
            right_len: right.len(),
        });
    }

    Zip::from(left.values_mut())
        .and(right.values())
        .for_each(|a, &b| *a = a.max(b));

    let label = format!("{}|{}", left.label(), right.label());
    left.set_label(label);
    Ok(left)
}

/// Fold a union over any number of operands
pub fn union<I>(first: NamedSet, rest: I) -> Result<NamedSet>
where
    I: IntoIterator<Item = NamedSet>,
{
    rest.into_iter().try_fold(first, union_pair)
}

/// Column-wise concatenation in the given order
///
/// With no parts the result has `num_languages` rows and zero columns.
pub fn concatenate<I>(num_languages: usize, parts: I) -> Result<NamedSet>
where
    I: IntoIterator<Item = NamedSet>,
{
    let parts: Vec<NamedSet> = parts.into_iter().collect();
    if parts.is_empty() {
        return Ok(NamedSet::new("", Vec::new(), Array2::zeros((num_languages, 0))));
    }

    let label = parts
        .iter()
        .map(NamedSet::label)
        .collect::<Vec<_>>()
        .join("+");
    let names: Vec<String> = parts.iter().flat_map(|p| p.names().iter().cloned()).collect();
    let views: Vec<ArrayView2<'_, f64>> = parts.iter().map(|p| p.values().view()).collect();
    let values = ndarray::concatenate(Axis(1), &views)?;

    Ok(NamedSet::new(label, names, values))
}

/// Evaluate a compiled spec against one language list
///
/// Sets resolve left to right and the first failure aborts evaluation.
pub fn evaluate(
    resolver: &mut Resolver<'_>,
    languages: &[String],
    spec: &CompiledSpec,
) -> Result<NamedSet> {
    let mut parts = Vec::with_capacity(spec.segments().len());

    for segment in spec.segments() {
        let Some((first, rest)) = segment.split_first() else {
            continue;
        };

        let mut acc = resolver.resolve(languages, *first)?;
        for kind in rest {
            let next = resolver.resolve(languages, *kind)?;
            acc = union_pair(acc, next)?;
        }
        parts.push(acc);
    }

    concatenate(languages.len(), parts)
}
