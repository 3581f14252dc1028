//! Language code normalization
//!
//! Maps 2-letter ISO 639-1 aliases to the canonical 3-letter ISO 639-3 codes
//! used as keys in every store. Codes without an alias pass through
//! unchanged; whether they exist is decided later, per store.

use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{Lang2VecError, Result};

lazy_static! {
    static ref BUILTIN_LETTER_CODES: HashMap<String, String> = BUILTIN_PAIRS
        .iter()
        .map(|&(alias, code)| (alias.to_string(), code.to_string()))
        .collect();
}

/// ISO 639-1 -> ISO 639-3, used when the data directory has no alias table
#[rustfmt::skip]
const BUILTIN_PAIRS: &[(&str, &str)] = &[
    ("aa", "aar"), ("ab", "abk"), ("ae", "ave"), ("af", "afr"), ("ak", "aka"), ("am", "amh"),
    ("an", "arg"), ("ar", "ara"), ("as", "asm"), ("av", "ava"), ("ay", "aym"), ("az", "aze"),
    ("ba", "bak"), ("be", "bel"), ("bg", "bul"), ("bi", "bis"), ("bm", "bam"), ("bn", "ben"),
    ("bo", "bod"), ("br", "bre"), ("bs", "bos"), ("ca", "cat"), ("ce", "che"), ("ch", "cha"),
    ("co", "cos"), ("cr", "cre"), ("cs", "ces"), ("cu", "chu"), ("cv", "chv"), ("cy", "cym"),
    ("da", "dan"), ("de", "deu"), ("dv", "div"), ("dz", "dzo"), ("ee", "ewe"), ("el", "ell"),
    ("en", "eng"), ("eo", "epo"), ("es", "spa"), ("et", "est"), ("eu", "eus"), ("fa", "fas"),
    ("ff", "ful"), ("fi", "fin"), ("fj", "fij"), ("fo", "fao"), ("fr", "fra"), ("fy", "fry"),
    ("ga", "gle"), ("gd", "gla"), ("gl", "glg"), ("gn", "grn"), ("gu", "guj"), ("gv", "glv"),
    ("ha", "hau"), ("he", "heb"), ("hi", "hin"), ("ho", "hmo"), ("hr", "hrv"), ("ht", "hat"),
    ("hu", "hun"), ("hy", "hye"), ("hz", "her"), ("ia", "ina"), ("id", "ind"), ("ie", "ile"),
    ("ig", "ibo"), ("ii", "iii"), ("ik", "ipk"), ("io", "ido"), ("is", "isl"), ("it", "ita"),
    ("iu", "iku"), ("ja", "jpn"), ("jv", "jav"), ("ka", "kat"), ("kg", "kon"), ("ki", "kik"),
    ("kj", "kua"), ("kk", "kaz"), ("kl", "kal"), ("km", "khm"), ("kn", "kan"), ("ko", "kor"),
    ("kr", "kau"), ("ks", "kas"), ("ku", "kur"), ("kv", "kom"), ("kw", "cor"), ("ky", "kir"),
    ("la", "lat"), ("lb", "ltz"), ("lg", "lug"), ("li", "lim"), ("ln", "lin"), ("lo", "lao"),
    ("lt", "lit"), ("lu", "lub"), ("lv", "lav"), ("mg", "mlg"), ("mh", "mah"), ("mi", "mri"),
    ("mk", "mkd"), ("ml", "mal"), ("mn", "mon"), ("mr", "mar"), ("ms", "msa"), ("mt", "mlt"),
    ("my", "mya"), ("na", "nau"), ("nb", "nob"), ("nd", "nde"), ("ne", "nep"), ("ng", "ndo"),
    ("nl", "nld"), ("nn", "nno"), ("no", "nor"), ("nr", "nbl"), ("nv", "nav"), ("ny", "nya"),
    ("oc", "oci"), ("oj", "oji"), ("om", "orm"), ("or", "ori"), ("os", "oss"), ("pa", "pan"),
    ("pi", "pli"), ("pl", "pol"), ("ps", "pus"), ("pt", "por"), ("qu", "que"), ("rm", "roh"),
    ("rn", "run"), ("ro", "ron"), ("ru", "rus"), ("rw", "kin"), ("sa", "san"), ("sc", "srd"),
    ("sd", "snd"), ("se", "sme"), ("sg", "sag"), ("sh", "hbs"), ("si", "sin"), ("sk", "slk"),
    ("sl", "slv"), ("sm", "smo"), ("sn", "sna"), ("so", "som"), ("sq", "sqi"), ("sr", "srp"),
    ("ss", "ssw"), ("st", "sot"), ("su", "sun"), ("sv", "swe"), ("sw", "swa"), ("ta", "tam"),
    ("te", "tel"), ("tg", "tgk"), ("th", "tha"), ("ti", "tir"), ("tk", "tuk"), ("tl", "tgl"),
    ("tn", "tsn"), ("to", "ton"), ("tr", "tur"), ("ts", "tso"), ("tt", "tat"), ("tw", "twi"),
    ("ty", "tah"), ("ug", "uig"), ("uk", "ukr"), ("ur", "urd"), ("uz", "uzb"), ("ve", "ven"),
    ("vi", "vie"), ("vo", "vol"), ("wa", "wln"), ("wo", "wol"), ("xh", "xho"), ("yi", "yid"),
    ("yo", "yor"), ("za", "zha"), ("zh", "zho"), ("zu", "zul"),
];

/// Alias table mapping short codes to canonical codes
#[derive(Debug, Clone, Default)]
pub struct CodeNormalizer {
    aliases: HashMap<String, String>,
}

impl CodeNormalizer {
    /// Normalizer backed by the compiled-in ISO 639-1 table
    pub fn builtin() -> Self {
        Self {
            aliases: BUILTIN_LETTER_CODES.clone(),
        }
    }

    /// Build a normalizer from explicit (alias, canonical) pairs
    pub fn from_pairs<I, A, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        Self {
            aliases: pairs
                .into_iter()
                .map(|(a, c)| (a.into(), c.into()))
                .collect(),
        }
    }

    /// Parse a JSON object of `"alias": "code"` entries
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self> {
        let aliases: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| Lang2VecError::InvalidAliasTable {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { aliases })
    }

    /// Load the alias table from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Lang2VecError::InvalidAliasTable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let normalizer = Self::from_json_str(&contents, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), aliases = normalizer.len(), "loaded alias table");
        Ok(normalizer)
    }

    /// Load the alias table if the file exists, else use the built-in table
    pub fn load_or_builtin(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(
                path = %path.display(),
                "alias table not found, using built-in ISO 639-1 codes"
            );
            Ok(Self::builtin())
        }
    }

    /// Map a code to its canonical form
    ///
    /// Never fails: unknown codes are assumed to be canonical already.
    pub fn normalize<'a>(&'a self, code: &'a str) -> &'a str {
        self.aliases.get(code).map(String::as_str).unwrap_or(code)
    }

    /// Check whether a code is a known alias
    pub fn is_alias(&self, code: &str) -> bool {
        self.aliases.contains_key(code)
    }

    /// Every canonical code reachable through an alias
    pub fn canonical_codes(&self) -> BTreeSet<&str> {
        self.aliases.values().map(String::as_str).collect()
    }

    /// Number of aliases
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
