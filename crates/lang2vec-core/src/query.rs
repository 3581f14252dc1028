//! Top-level query façade
//!
//! [`Lang2Vec`] owns the immutable lookup state (configuration, alias table,
//! language catalog). Each [`Lang2Vec::query`] call opens the backing files
//! it needs, evaluates the feature-set spec, optionally masks uninformative
//! columns and returns a [`QueryResult`].

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

use crate::algebra::evaluate;
use crate::catalog::LanguageCatalog;
use crate::codes::CodeNormalizer;
use crate::config::Lang2VecConfig;
use crate::error::{Lang2VecError, Result};
use crate::feature_sets::available_feature_sets;
use crate::resolve::{CoverageWarning, NamedSet, Resolver, MISSING_VALUE};
use crate::spec::{parse_feature_sets, FeatureSetSpec};

/// Display token for [`FeatureValue::Missing`]
pub const MISSING_TOKEN: &str = "--";

/// Requested languages: a whitespace-separated string or an explicit list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Languages {
    Text(String),
    List(Vec<String>),
}

impl Languages {
    /// Codes in request order
    pub fn codes(&self) -> Vec<String> {
        match self {
            Languages::Text(text) => text.split_whitespace().map(str::to_string).collect(),
            Languages::List(codes) => codes.clone(),
        }
    }
}

impl From<&str> for Languages {
    fn from(text: &str) -> Self {
        Languages::Text(text.to_string())
    }
}

impl From<String> for Languages {
    fn from(text: String) -> Self {
        Languages::Text(text)
    }
}

impl From<Vec<String>> for Languages {
    fn from(codes: Vec<String>) -> Self {
        Languages::List(codes)
    }
}

impl From<Vec<&str>> for Languages {
    fn from(codes: Vec<&str>) -> Self {
        Languages::List(codes.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Languages {
    fn from(codes: &[&str]) -> Self {
        Languages::List(codes.iter().map(|c| c.to_string()).collect())
    }
}

impl TryFrom<&Value> for Languages {
    type Error = Lang2VecError;

    fn try_from(value: &Value) -> Result<Self> {
        string_or_list(value, "languages").map(|input| match input {
            StringOrList::Text(text) => Languages::Text(text),
            StringOrList::List(list) => Languages::List(list),
        })
    }
}

/// Requested feature sets: a spec string, a list of `+`-segments, or a parsed spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureSetInput {
    Text(String),
    List(Vec<String>),
    Parsed(FeatureSetSpec),
}

impl FeatureSetInput {
    /// Parse into a spec without touching any store
    pub fn parse(&self) -> Result<FeatureSetSpec> {
        match self {
            FeatureSetInput::Text(text) => parse_feature_sets(text),
            FeatureSetInput::List(segments) => FeatureSetSpec::from_segments(segments),
            FeatureSetInput::Parsed(spec) => Ok(spec.clone()),
        }
    }
}

impl From<&str> for FeatureSetInput {
    fn from(text: &str) -> Self {
        FeatureSetInput::Text(text.to_string())
    }
}

impl From<String> for FeatureSetInput {
    fn from(text: String) -> Self {
        FeatureSetInput::Text(text)
    }
}

impl From<Vec<String>> for FeatureSetInput {
    fn from(segments: Vec<String>) -> Self {
        FeatureSetInput::List(segments)
    }
}

impl From<Vec<&str>> for FeatureSetInput {
    fn from(segments: Vec<&str>) -> Self {
        FeatureSetInput::List(segments.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for FeatureSetInput {
    fn from(segments: &[&str]) -> Self {
        FeatureSetInput::List(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<FeatureSetSpec> for FeatureSetInput {
    fn from(spec: FeatureSetSpec) -> Self {
        FeatureSetInput::Parsed(spec)
    }
}

impl TryFrom<&Value> for FeatureSetInput {
    type Error = Lang2VecError;

    fn try_from(value: &Value) -> Result<Self> {
        string_or_list(value, "feature_sets").map(|input| match input {
            StringOrList::Text(text) => FeatureSetInput::Text(text),
            StringOrList::List(list) => FeatureSetInput::List(list),
        })
    }
}

enum StringOrList {
    Text(String),
    List(Vec<String>),
}

fn string_or_list(value: &Value, argument: &'static str) -> Result<StringOrList> {
    let invalid = |found: &str| Lang2VecError::InvalidInputType {
        argument,
        found: found.to_string(),
    };

    match value {
        Value::String(text) => Ok(StringOrList::Text(text.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(invalid(&format!("list containing {}", json_type_name(other)))),
            })
            .collect::<Result<Vec<_>>>()
            .map(StringOrList::List),
        other => Err(invalid(json_type_name(other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Output switches for a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Emit the feature-name header row
    pub header: bool,
    /// Drop columns constant at 0, 1 or -1 across the requested languages
    pub minimal: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_minimal(mut self, minimal: bool) -> Self {
        self.minimal = minimal;
        self
    }
}

/// One emitted cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Value(f64),
    Missing,
}

impl FeatureValue {
    /// Convert a stored value, mapping the sentinel to [`FeatureValue::Missing`]
    pub fn from_raw(value: f64) -> Self {
        if value == MISSING_VALUE {
            FeatureValue::Missing
        } else {
            FeatureValue::Value(value)
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Value(v) => Some(*v),
            FeatureValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }

    /// Render with a custom missing-value token
    pub fn render(&self, missing_token: &str) -> String {
        match self {
            FeatureValue::Value(v) => format!("{:?}", v),
            FeatureValue::Missing => missing_token.to_string(),
        }
    }

    fn to_json(self, missing_token: &str) -> Value {
        match self {
            FeatureValue::Value(v) => serde_json::Number::from_f64(v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FeatureValue::Missing => Value::String(missing_token.to_string()),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(MISSING_TOKEN))
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Value(v) => serializer.serialize_f64(*v),
            FeatureValue::Missing => serializer.serialize_str(MISSING_TOKEN),
        }
    }
}

/// Per-language feature vectors with an optional header
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    header_key: String,
    missing_token: String,
    header: Option<Vec<String>>,
    rows: Vec<(String, Vec<FeatureValue>)>,
    warnings: Vec<CoverageWarning>,
}

impl QueryResult {
    /// Feature names in column order, when requested
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Rows keyed by the language code as the caller wrote it
    pub fn rows(&self) -> &[(String, Vec<FeatureValue>)] {
        &self.rows
    }

    /// Values for one requested language
    pub fn get(&self, language: &str) -> Option<&[FeatureValue]> {
        self.rows
            .iter()
            .find(|(code, _)| code == language)
            .map(|(_, values)| values.as_slice())
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(code, _)| code.as_str())
    }

    /// Number of emitted columns
    pub fn num_features(&self) -> usize {
        match (&self.header, self.rows.first()) {
            (Some(header), _) => header.len(),
            (None, Some((_, values))) => values.len(),
            (None, None) => 0,
        }
    }

    /// Partial-coverage diagnostics gathered during the query
    pub fn warnings(&self) -> &[CoverageWarning] {
        &self.warnings
    }

    /// Render as a JSON object: header key first (if any), then one key per language
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        if let Some(header) = &self.header {
            object.insert(
                self.header_key.clone(),
                Value::Array(header.iter().cloned().map(Value::String).collect()),
            );
        }
        for (code, values) in &self.rows {
            let values = values.iter().map(|v| v.to_json(&self.missing_token)).collect();
            object.insert(code.clone(), Value::Array(values));
        }
        Value::Object(object)
    }

    /// Render as tab-separated lines: optional header, then `code\tvalues...`
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str(&self.header_key);
            for name in header {
                out.push('\t');
                out.push_str(name);
            }
            out.push('\n');
        }
        for (code, values) in &self.rows {
            out.push_str(code);
            for value in values {
                out.push('\t');
                out.push_str(&value.render(&self.missing_token));
            }
            out.push('\n');
        }
        out
    }
}

/// Columns that vary across the requested languages
///
/// A column constant at 0, 1 or -1 over every row is dropped. With zero
/// rows every column is vacuously constant.
pub fn informative_columns(values: &Array2<f64>) -> Vec<usize> {
    values
        .axis_iter(Axis(1))
        .enumerate()
        .filter(|(_, column)| {
            ![0.0, 1.0, MISSING_VALUE]
                .iter()
                .any(|constant| column.iter().all(|v| v == constant))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Entry point for language-vector queries
#[derive(Debug, Clone)]
pub struct Lang2Vec {
    config: Lang2VecConfig,
    normalizer: CodeNormalizer,
    catalog: LanguageCatalog,
}

impl Lang2Vec {
    /// Open the dataset described by `config`
    ///
    /// Reads the alias table and the language axes of every store. The
    /// stores' value tensors are only read by queries.
    pub fn new(config: Lang2VecConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = CodeNormalizer::load_or_builtin(&config.letter_codes_path())?;
        let catalog = LanguageCatalog::load(&config)?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            aliases = normalizer.len(),
            "opened lang2vec dataset"
        );

        Ok(Self {
            config,
            normalizer,
            catalog,
        })
    }

    /// Open the dataset found by [`Lang2VecConfig::discover`]
    pub fn discover() -> Result<Self> {
        Self::new(Lang2VecConfig::discover())
    }

    pub fn config(&self) -> &Lang2VecConfig {
        &self.config
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    pub fn normalizer(&self) -> &CodeNormalizer {
        &self.normalizer
    }

    /// Map a 2-letter alias to its 3-letter code
    pub fn normalize<'a>(&'a self, code: &'a str) -> &'a str {
        self.normalizer.normalize(code)
    }

    /// URIEL-backed and learned-backed languages, sorted
    pub fn available_languages(&self) -> BTreeSet<String> {
        self.catalog.all_languages()
    }

    pub fn uriel_languages(&self) -> &BTreeSet<String> {
        self.catalog.uriel_languages()
    }

    pub fn learned_languages(&self) -> &BTreeSet<String> {
        self.catalog.learned_languages()
    }

    pub fn available_feature_sets(&self) -> Vec<&'static str> {
        available_feature_sets()
    }

    /// Start a resolver for ad-hoc feature-set lookups
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.config, &self.normalizer, &self.catalog)
    }

    /// Resolve a single named set for the given languages
    pub fn resolve_named_set(&self, languages: &[String], name: &str) -> Result<NamedSet> {
        self.resolver().resolve_name(languages, name)
    }

    /// Evaluate a spec into one unmasked matrix plus its diagnostics
    pub fn feature_matrix(
        &self,
        languages: &[String],
        spec: &FeatureSetSpec,
    ) -> Result<(NamedSet, Vec<CoverageWarning>)> {
        let compiled = spec.compile()?;
        let mut resolver = self.resolver();
        let matrix = evaluate(&mut resolver, languages, &compiled)?;
        Ok((matrix, resolver.into_warnings()))
    }

    /// Look up feature vectors for languages
    ///
    /// ```no_run
    /// use lang2vec_core::{Lang2Vec, QueryOptions};
    ///
    /// let l2v = Lang2Vec::discover()?;
    /// let result = l2v.query("deu eng", "syntax_wals|syntax_sswl+fam", QueryOptions::new())?;
    /// for (code, values) in result.rows() {
    ///     println!("{}: {} features", code, values.len());
    /// }
    /// # Ok::<(), lang2vec_core::Lang2VecError>(())
    /// ```
    pub fn query(
        &self,
        languages: impl Into<Languages>,
        feature_sets: impl Into<FeatureSetInput>,
        options: QueryOptions,
    ) -> Result<QueryResult> {
        let languages = languages.into().codes();
        let spec = feature_sets.into().parse()?;

        let (matrix, warnings) = self.feature_matrix(&languages, &spec)?;
        let (_, names, values) = matrix.into_parts();

        let (names, values) = if options.minimal {
            let keep = informative_columns(&values);
            let names = keep.iter().map(|&i| names[i].clone()).collect();
            (names, values.select(Axis(1), &keep))
        } else {
            (names, values)
        };

        let header = options.header.then(|| {
            names
                .iter()
                .map(|name| name.replace(' ', "_"))
                .collect::<Vec<_>>()
        });

        let rows = languages
            .into_iter()
            .zip(values.outer_iter())
            .map(|(code, row)| (code, row.iter().map(|&v| FeatureValue::from_raw(v)).collect()))
            .collect();

        tracing::info!(
            spec = %spec,
            features = names.len(),
            warnings = warnings.len(),
            "query complete"
        );

        Ok(QueryResult {
            header_key: self.config.header_key.clone(),
            missing_token: self.config.missing_token.clone(),
            header,
            rows,
            warnings,
        })
    }

    /// Query with JSON-typed arguments
    ///
    /// Each argument must be a string or an array of strings.
    pub fn query_json(
        &self,
        languages: &Value,
        feature_sets: &Value,
        options: QueryOptions,
    ) -> Result<QueryResult> {
        let languages = Languages::try_from(languages)?;
        let feature_sets = FeatureSetInput::try_from(feature_sets)?;
        self.query(languages, feature_sets, options)
    }
}
