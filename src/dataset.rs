use crate::error::{Error, Result};
use crate::{ArrayView1, Matrix};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Field separator of a dataset file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delimiter {
    #[default]
    Comma,
    /// Any run of spaces or tabs.
    Whitespace,
}

impl Delimiter {
    fn split(self, line: &str) -> Vec<&str> {
        match self {
            Delimiter::Comma => line.split(',').map(str::trim).collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "comma" | "," => Ok(Delimiter::Comma),
            "whitespace" | "white" | "space" => Ok(Delimiter::Whitespace),
            _ => Err(format!("Invalid delimiter: {}. Must be 'comma' or 'whitespace'", s)),
        }
    }
}

/// One observation: its feature vector and its ground-truth label.
#[derive(Clone, Copy, Debug)]
pub struct LabeledPoint<'a> {
    pub features: ArrayView1<'a, f64>,
    pub label: &'a str,
}

/// Labeled observations. Rows of `features` are points; labels are stored
/// as indices into `classes`, which lists each distinct label once in order
/// of first appearance.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Matrix,
    labels: Vec<usize>,
    classes: Vec<String>,
}

impl Dataset {
    pub fn new(features: Matrix, labels: Vec<String>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(Error::DimensionMismatch {
                expected: features.nrows(),
                found: labels.len(),
            });
        }

        if features.nrows() == 0 || features.ncols() == 0 {
            return Err(Error::EmptyInput);
        }

        if let Some(((row, col), value)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidFeature {
                line: row + 1,
                column: col + 1,
                value: value.to_string(),
            });
        }

        let mut classes: Vec<String> = Vec::new();
        let labels = labels
            .into_iter()
            .map(|label| match classes.iter().position(|c| *c == label) {
                Some(idx) => idx,
                None => {
                    classes.push(label);
                    classes.len() - 1
                }
            })
            .collect();

        Ok(Self {
            features,
            labels,
            classes,
        })
    }

    /// Load a dataset file. See [`Dataset::from_reader`] for the format.
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: Delimiter) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let dataset = Self::from_reader(BufReader::new(file), delimiter)?;
        log::info!(
            "loaded {} samples with {} features and {} labels from {}",
            dataset.n_samples(),
            dataset.n_features(),
            dataset.classes.len(),
            path.as_ref().display()
        );
        Ok(dataset)
    }

    /// Parse records of `D` numeric fields followed by one label field.
    ///
    /// Blank lines are skipped. `D` comes from the first record and every
    /// later record must have the same field count. A `,` inside a numeric
    /// field is read as a decimal point.
    pub fn from_reader<R: BufRead>(reader: R, delimiter: Delimiter) -> Result<Self> {
        let mut n_fields: Option<usize> = None;
        let mut values = Vec::new();
        let mut labels = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let fields = delimiter.split(trimmed);
            let expected = *n_fields.get_or_insert(fields.len());
            if expected < 2 {
                return Err(Error::FieldCount {
                    line: line_no,
                    expected: 2,
                    found: fields.len(),
                });
            }
            if fields.len() != expected {
                return Err(Error::FieldCount {
                    line: line_no,
                    expected,
                    found: fields.len(),
                });
            }

            if let Some((label, raw)) = fields.split_last() {
                for (column, field) in raw.iter().enumerate() {
                    let value = parse_feature(field).ok_or_else(|| Error::InvalidFeature {
                        line: line_no,
                        column: column + 1,
                        value: field.to_string(),
                    })?;
                    values.push(value);
                }
                labels.push(label.to_string());
            }
        }

        let n_features = n_fields.ok_or(Error::EmptyInput)? - 1;
        let expected = labels.len() * n_features;
        let found = values.len();
        let features = Matrix::from_shape_vec((labels.len(), n_features), values)
            .map_err(|_| Error::DimensionMismatch { expected, found })?;

        Self::new(features, labels)
    }

    pub fn parse(text: &str, delimiter: Delimiter) -> Result<Self> {
        Self::from_reader(text.as_bytes(), delimiter)
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Class index of every sample.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Distinct labels in order of first appearance.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn label(&self, idx: usize) -> &str {
        &self.classes[self.labels[idx]]
    }

    pub fn point(&self, idx: usize) -> LabeledPoint<'_> {
        LabeledPoint {
            features: self.features.row(idx),
            label: self.label(idx),
        }
    }

    pub fn points(&self) -> impl Iterator<Item = LabeledPoint<'_>> + '_ {
        (0..self.n_samples()).map(move |idx| self.point(idx))
    }
}

fn parse_feature(field: &str) -> Option<f64> {
    field
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
