//! NumPy `.npz` archive reader
//!
//! An `.npz` file is a zip archive whose members are `.npy` arrays. This
//! reader supports:
//! - Unicode string axes (`<U` dtype)
//! - Float and integer tensors of any rank, widened to f64
//! - C and Fortran memory order

use crate::reader::{store_name, ArrayArchive, StoreError, StoreResult};
use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use npyz::{DType, NpyFile, Order};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// NPZ archive reader
pub struct NpzReader {
    path: String,
    name: String,
    archive: ZipArchive<BufReader<File>>,
}

impl NpzReader {
    /// Open an `.npz` archive
    pub fn open(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            return Err(StoreError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)
            .map_err(|e| StoreError::OpenFailed(format!("{}: {}", path.display(), e)))?;
        let archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| StoreError::InvalidFormat(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), members = archive.len(), "opened npz archive");

        Ok(Self {
            path: path.display().to_string(),
            name: store_name(path),
            archive,
        })
    }

    /// Open the `.npy` member for an array and parse its header
    fn open_member(&mut self, name: &str) -> StoreResult<NpyFile<Box<dyn Read + '_>>> {
        let member = format!("{}.npy", name);
        let archive_name = self.name.clone();

        let entry = self.archive.by_name(&member).map_err(|e| match e {
            ZipError::FileNotFound => StoreError::ArrayNotFound {
                archive: archive_name.clone(),
                name: name.to_string(),
            },
            other => StoreError::InvalidFormat(format!("{}/{}: {}", archive_name, member, other)),
        })?;

        let reader: Box<dyn Read + '_> = Box::new(entry);
        NpyFile::new(reader)
            .map_err(|e| StoreError::InvalidFormat(format!("{}/{}: {}", archive_name, member, e)))
    }
}

impl ArrayArchive for NpzReader {
    fn array_names(&self) -> Vec<String> {
        self.archive
            .file_names()
            .filter_map(|n| n.strip_suffix(".npy"))
            .map(|n| n.to_string())
            .collect()
    }

    fn read_strings(&mut self, name: &str) -> StoreResult<Vec<String>> {
        let archive_name = self.name.clone();
        let npy = self.open_member(name)?;

        if npy.shape().len() != 1 {
            return Err(StoreError::ShapeMismatch {
                name: name.to_string(),
                expected: "1-D".to_string(),
                actual: format!("{:?}", npy.shape()),
            });
        }

        npy.into_vec::<String>()
            .map_err(|e| StoreError::InvalidFormat(format!("{}/{}: {}", archive_name, name, e)))
    }

    fn read_numeric(&mut self, name: &str) -> StoreResult<ArrayD<f64>> {
        let archive_name = self.name.clone();
        let npy = self.open_member(name)?;

        let shape: Vec<usize> = npy.shape().iter().map(|&d| d as usize).collect();
        let order = npy.order();
        let type_code = match npy.dtype() {
            DType::Plain(type_str) => type_str.to_string(),
            other => {
                return Err(StoreError::InvalidFormat(format!(
                    "{}/{}: unsupported dtype {:?}",
                    archive_name, name, other
                )))
            }
        };

        let read_err =
            |e: std::io::Error| StoreError::Io(format!("{}/{}: {}", archive_name, name, e));

        // Byte-order marker is handled by npyz; only the kind and width matter here
        let data: Vec<f64> = match type_code.trim_start_matches(['<', '>', '|', '=']) {
            "f8" => npy.into_vec::<f64>().map_err(read_err)?,
            "f4" => widen(npy.into_vec::<f32>().map_err(read_err)?),
            "i8" => npy
                .into_vec::<i64>()
                .map_err(read_err)?
                .into_iter()
                .map(|v| v as f64)
                .collect(),
            "i4" => widen(npy.into_vec::<i32>().map_err(read_err)?),
            "i1" => widen(npy.into_vec::<i8>().map_err(read_err)?),
            other => {
                return Err(StoreError::InvalidFormat(format!(
                    "{}/{}: unsupported numeric type '{}'",
                    archive_name, name, other
                )))
            }
        };

        let array = match order {
            Order::C => ArrayD::from_shape_vec(IxDyn(&shape), data),
            Order::Fortran => ArrayD::from_shape_vec(IxDyn(&shape).f(), data),
        };

        array.map_err(|e| StoreError::ShapeMismatch {
            name: name.to_string(),
            expected: format!("{:?}", shape),
            actual: e.to_string(),
        })
    }

    fn path(&self) -> Option<&str> {
        Some(&self.path)
    }

    fn format_name(&self) -> &'static str {
        "NPZ"
    }
}

fn widen<T: Into<f64>>(values: Vec<T>) -> Vec<f64> {
    values.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use npyz::WriterBuilder;
    use std::io::Write;
    use std::str::FromStr;
    use zip::write::SimpleFileOptions;

    fn npy_strings(values: &[&str]) -> Vec<u8> {
        let width = values.iter().map(|v| v.chars().count()).max().unwrap_or(1).max(1);
        let dtype = DType::Plain(npyz::TypeStr::from_str(&format!("<U{}", width)).unwrap());
        let mut buf = Vec::new();
        let mut writer = npyz::WriteOptions::<String>::new()
            .dtype(dtype)
            .shape(&[values.len() as u64])
            .writer(&mut buf)
            .begin_nd()
            .unwrap();
        writer
            .extend(values.iter().map(|v| v.to_string()))
            .unwrap();
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

    #[test]
    fn test_read_strings_and_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.npz");
        write_npz(
            &path,
            &[
                ("langs", npy_strings(&["deu", "eng"])),
                ("data", npy_f64(&[2, 3], &[1.0, 0.0, -1.0, 0.5, 1.0, 0.0])),
            ],
        );

        let mut reader = NpzReader::open(&path).unwrap();
        let mut names = reader.array_names();
        names.sort();
        assert_eq!(names, vec!["data", "langs"]);
        assert!(reader.contains("langs"));

        assert_eq!(reader.read_strings("langs").unwrap(), vec!["deu", "eng"]);

        let data = reader.read_numeric("data").unwrap();
        assert_eq!(data.shape(), &[2, 3]);
        assert_eq!(data[[0, 2]], -1.0);
        assert_eq!(data[[1, 0]], 0.5);
    }

    #[test]
    fn test_missing_member() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.npz");
        write_npz(&path, &[("langs", npy_strings(&["deu"]))]);

        let mut reader = NpzReader::open(&path).unwrap();
        let err = reader.read_numeric("data").unwrap_err();
        assert!(matches!(err, StoreError::ArrayNotFound { ref name, .. } if name == "data"));
    }

    #[test]
    fn test_missing_file() {
        let result = NpzReader::open(Path::new("/nonexistent/features.npz"));
        assert!(matches!(result, Err(StoreError::FileNotFound(_))));
    }

    #[test]
    fn test_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.npz");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let result = NpzReader::open(&path);
        assert!(matches!(result, Err(StoreError::InvalidFormat(_))));
    }
}
