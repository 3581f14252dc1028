//! Test dataset builder
//!
//! Writes a miniature URIEL dataset (five stores, the learned table and the
//! alias file) into a temporary directory.
//!
//! | store        | languages                |
//! |--------------|--------------------------|
//! | features     | deu eng fra swe          |
//! | predictions  | deu eng fra swe jpn      |
//! | averages     | deu eng fra swe jpn      |
//! | family       | deu eng fra swe jpn      |
//! | geocoord     | deu eng fra swe jpn      |
//! | learned      | deu eng fra lrn          |

use lang2vec_core::{Lang2Vec, Lang2VecConfig};
use npyz::{DType, TypeStr, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const LEARNED_DIMENSION: usize = 512;

pub const TYPOLOGY_FEATURES: &[&str] = &[
    "S_SVO",
    "S_SOV",
    "S_ADJ_BEFORE_NOUN",
    "P_TONE",
    "P_NASAL VOWELS",
    "INV_P",
    "INV_B",
];

pub const FAMILY_FEATURES: &[&str] = &[
    "FAM_INDO-EUROPEAN",
    "FAM_GERMANIC",
    "FAM_WEST_GERMANIC",
    "FAM_NORTH_GERMANIC",
    "FAM_ROMANCE",
    "FAM_JAPONIC",
];

const OBSERVED_LANGS: &[&str] = &["deu", "eng", "fra", "swe"];
const ALL_URIEL_LANGS: &[&str] = &["deu", "eng", "fra", "swe", "jpn"];
const LEARNED_LANGS: &[&str] = &["deu", "eng", "fra", "lrn"];
const OBSERVED_SOURCES: &[&str] = &["WALS", "SSWL", "ETHNO", "PHOIBLE_AA"];

// Rows follow TYPOLOGY_FEATURES; one block per language in OBSERVED_LANGS.
#[rustfmt::skip]
const WALS: [[f64; 7]; 4] = [
    [ 0.0,  1.0,  1.0,  0.0, -1.0,  1.0,  1.0],
    [ 1.0,  0.0,  1.0,  0.0,  0.0,  1.0,  1.0],
    [ 1.0,  0.0,  0.0,  0.0,  1.0,  1.0,  1.0],
    [-1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0],
];

#[rustfmt::skip]
const SSWL: [[f64; 7]; 4] = [
    [-1.0,  1.0,  1.0, -1.0, -1.0, -1.0, -1.0],
    [ 1.0,  0.0,  1.0, -1.0, -1.0, -1.0, -1.0],
    [ 0.0,  1.0,  0.0, -1.0, -1.0, -1.0, -1.0],
    [ 1.0,  0.0,  1.0, -1.0, -1.0, -1.0, -1.0],
];

#[rustfmt::skip]
const ETHNO: [[f64; 7]; 4] = [
    [ 0.0,  1.0,  1.0,  0.0,  0.0,  1.0,  1.0],
    [ 1.0,  0.0,  1.0,  0.0,  0.0,  1.0,  1.0],
    [ 1.0,  0.0,  0.0,  0.0,  1.0,  1.0,  1.0],
    [ 1.0,  0.0,  1.0,  1.0,  0.0,  1.0,  1.0],
];

#[rustfmt::skip]
const PHOIBLE_AA: [[f64; 7]; 4] = [
    [-1.0, -1.0, -1.0, -1.0, -1.0,  1.0,  1.0],
    [-1.0, -1.0, -1.0, -1.0, -1.0,  1.0,  1.0],
    [-1.0, -1.0, -1.0, -1.0, -1.0,  1.0,  1.0],
    [-1.0, -1.0, -1.0, -1.0, -1.0,  1.0,  0.0],
];

// Rows follow ALL_URIEL_LANGS.
#[rustfmt::skip]
const PREDICTED: [[f64; 7]; 5] = [
    [0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
    [1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0],
    [0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0],
];

#[rustfmt::skip]
const AVERAGED: [[f64; 7]; 5] = [
    [0.0,  1.0, 1.0, 0.0, 0.5, 1.0, 1.0],
    [1.0,  0.0, 1.0, 0.0, 0.0, 1.0, 1.0],
    [0.5,  0.5, 0.0, 0.0, 1.0, 1.0, 1.0],
    [1.0,  0.0, 1.0, 1.0, 0.0, 1.0, 0.5],
    [0.0,  1.0, 1.0, 0.0, 0.0, 1.0, 1.0],
];

#[rustfmt::skip]
pub const FAMILY: [[f64; 6]; 5] = [
    [1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
];

#[rustfmt::skip]
const GEOCOORDS: [[f64; 2]; 5] = [
    [0.52,  0.13],
    [0.51, -0.01],
    [0.48,  0.02],
    [0.59,  0.18],
    [0.35,  0.77],
];

/// Learned vector component for a language
pub fn learned_value(language: &str, index: usize) -> f64 {
    let i = index as f64 / LEARNED_DIMENSION as f64;
    match language {
        "deu" => i,
        "eng" => -i / 2.0,
        "fra" => 0.5,
        _ => 0.25,
    }
}

/// A dataset on disk plus a façade opened over it
pub struct TestData {
    pub dir: TempDir,
    pub l2v: Lang2Vec,
}

impl TestData {
    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[allow(dead_code)]
    pub fn config(&self) -> Lang2VecConfig {
        Lang2VecConfig::with_data_dir(self.dir.path())
    }
}

/// Full dataset including the learned table
pub fn dataset() -> TestData {
    let dir = write_dataset(true);
    let l2v = Lang2Vec::new(Lang2VecConfig::with_data_dir(dir.path())).unwrap();
    TestData { dir, l2v }
}

/// Dataset without `learned.npz`
#[allow(dead_code)]
pub fn dataset_without_learned() -> TestData {
    let dir = write_dataset(false);
    let l2v = Lang2Vec::new(Lang2VecConfig::with_data_dir(dir.path())).unwrap();
    TestData { dir, l2v }
}

fn write_dataset(with_learned: bool) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path();

    let observed: Vec<&[[f64; 7]; 4]> = vec![&WALS, &SSWL, &ETHNO, &PHOIBLE_AA];
    let mut data = Vec::new();
    for lang in 0..OBSERVED_LANGS.len() {
        for feat in 0..TYPOLOGY_FEATURES.len() {
            for table in &observed {
                data.push(table[lang][feat]);
            }
        }
    }
    write_store(
        &path.join("features.npz"),
        OBSERVED_LANGS,
        TYPOLOGY_FEATURES,
        OBSERVED_SOURCES,
        &data,
    );

    write_store(
        &path.join("feature_predictions.npz"),
        ALL_URIEL_LANGS,
        TYPOLOGY_FEATURES,
        &["predicted"],
        &PREDICTED.concat(),
    );
    write_store(
        &path.join("feature_averages.npz"),
        ALL_URIEL_LANGS,
        TYPOLOGY_FEATURES,
        &["avg"],
        &AVERAGED.concat(),
    );
    write_store(
        &path.join("family_features.npz"),
        ALL_URIEL_LANGS,
        FAMILY_FEATURES,
        &["FAM"],
        &FAMILY.concat(),
    );
    write_store(
        &path.join("geocoord_features.npz"),
        ALL_URIEL_LANGS,
        &["GC_LAT", "GC_LON"],
        &["GEOCOORDS"],
        &GEOCOORDS.concat(),
    );

    if with_learned {
        let values: Vec<f64> = LEARNED_LANGS
            .iter()
            .flat_map(|lang| (0..LEARNED_DIMENSION).map(move |i| learned_value(lang, i)))
            .collect();
        write_npz(
            &path.join("learned.npz"),
            &[
                ("langs", npy_strings(LEARNED_LANGS)),
                (
                    "data",
                    npy_f64(&[LEARNED_LANGS.len() as u64, LEARNED_DIMENSION as u64], &values),
                ),
            ],
        );
    }

    std::fs::write(
        path.join("letter_codes.json"),
        r#"{"de": "deu", "en": "eng", "fr": "fra", "sv": "swe", "ja": "jpn"}"#,
    )
    .unwrap();

    dir
}

/// Write a three-axis store; `data` is in (langs, feats, sources) C order
pub fn write_store(path: &Path, langs: &[&str], feats: &[&str], sources: &[&str], data: &[f64]) {
    assert_eq!(data.len(), langs.len() * feats.len() * sources.len());
    write_npz(
        path,
        &[
            ("langs", npy_strings(langs)),
            ("feats", npy_strings(feats)),
            ("sources", npy_strings(sources)),
            (
                "data",
                npy_f64(
                    &[langs.len() as u64, feats.len() as u64, sources.len() as u64],
                    data,
                ),
            ),
        ],
    );
}

fn npy_strings(values: &[&str]) -> Vec<u8> {
    let width = values.iter().map(|v| v.chars().count()).max().unwrap_or(1).max(1);
    let dtype = DType::Plain(TypeStr::from_str(&format!("<U{}", width)).unwrap());
    let mut buf = Vec::new();
    let mut writer = npyz::WriteOptions::<String>::new()
        .dtype(dtype)
        .shape(&[values.len() as u64])
        .writer(&mut buf)
        .begin_nd()
        .unwrap();
    writer.extend(values.iter().map(|v| v.to_string())).unwrap();
    writer.finish().unwrap();
    buf
}

fn npy_f64(shape: &[u64], values: &[f64]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(shape)
        .writer(&mut buf)
        .begin_nd()
        .unwrap();
    writer.extend(values.iter().copied()).unwrap();
    writer.finish().unwrap();
    buf
}

fn write_npz(path: &Path, members: &[(&str, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, bytes) in members {
        zip.start_file(format!("{}.npy", name), SimpleFileOptions::default())
            .unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}
