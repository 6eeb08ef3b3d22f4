use csv::{ReaderBuilder, StringRecord};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::DatasetError;
use crate::features::{Feature, FeatureVector, FEATURE_COUNT};

/// Column holding the "did it rain the next day" label.
pub const LABEL_COLUMN: &str = "RainTomorrow";

/// Default per-class cap used for balancing.
pub const DEFAULT_CLASS_CAP: usize = 5000;

/// How label cells map to `{0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Exactly `"Yes"` is rain; every other non-empty value counts as no rain.
    #[default]
    YesOrElseNo,
    /// `"Yes"` and `"No"` only; anything else rejects the row.
    Strict,
}

impl LabelPolicy {
    fn parse(self, cell: &str) -> Option<u8> {
        match (self, cell) {
            (_, "Yes") => Some(1),
            (LabelPolicy::YesOrElseNo, _) => Some(0),
            (LabelPolicy::Strict, "No") => Some(0),
            (LabelPolicy::Strict, _) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetOptions {
    /// Maximum examples kept per class.
    pub class_cap: usize,
    pub label_policy: LabelPolicy,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            class_cap: DEFAULT_CLASS_CAP,
            label_policy: LabelPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledExample {
    pub features: FeatureVector,
    /// 1 when it rained the next day.
    pub label: u8,
}

/// Why a dataset row was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    MissingFeature(Feature),
    NonNumericFeature(Feature),
    MissingLabel,
    UnknownLabel,
}

/// Counts gathered while scanning the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub positives: usize,
    pub negatives: usize,
    /// Rows that failed validation.
    pub rejected: usize,
    /// Valid rows skipped because their class had reached the cap.
    pub over_cap: usize,
}

/// Class-balanced, order-preserving examples.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub examples: Vec<LabeledExample>,
    pub report: LoadReport,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Raw features as an `N x 5` matrix.
    pub fn feature_matrix(&self) -> Array2<f64> {
        let flat: Vec<f64> = self
            .examples
            .iter()
            .flat_map(|e| e.features.as_array().iter().copied())
            .collect();
        Array2::from_shape_vec((self.examples.len(), FEATURE_COUNT), flat)
            .unwrap_or_else(|_| Array2::zeros((0, FEATURE_COUNT)))
    }

    pub fn labels(&self) -> Array1<f64> {
        self.examples.iter().map(|e| f64::from(e.label)).collect()
    }
}

/// Reads a CSV file with a header row into a balanced [`TrainingSet`].
pub fn load_training_set(
    path: impl AsRef<Path>,
    options: &DatasetOptions,
) -> Result<TrainingSet, DatasetError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading weather dataset");
    let file = File::open(path)?;
    read_training_set(file, options)
}

/// Same as [`load_training_set`] over any reader.
pub fn read_training_set<R: Read>(
    reader: R,
    options: &DatasetOptions,
) -> Result<TrainingSet, DatasetError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns = ColumnMap::locate(rdr.headers()?)?;
    let mut set = TrainingSet::default();

    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::debug!(row = line + 1, error = %e, "Skipping undecodable dataset row");
                set.report.rows_read += 1;
                set.report.rejected += 1;
                continue;
            }
        };
        set.report.rows_read += 1;

        let example = match columns.parse_row(&record, options.label_policy) {
            Ok(example) => example,
            Err(reason) => {
                tracing::debug!(row = line + 1, ?reason, "Skipping invalid dataset row");
                set.report.rejected += 1;
                continue;
            }
        };

        let kept = if example.label == 1 {
            &mut set.report.positives
        } else {
            &mut set.report.negatives
        };
        if *kept >= options.class_cap {
            set.report.over_cap += 1;
            continue;
        }
        *kept += 1;
        set.examples.push(example);
    }

    tracing::info!(
        positives = set.report.positives,
        negatives = set.report.negatives,
        rejected = set.report.rejected,
        over_cap = set.report.over_cap,
        "Dataset loaded"
    );
    Ok(set)
}

struct ColumnMap {
    features: [usize; FEATURE_COUNT],
    label: usize,
}

impl ColumnMap {
    fn locate(headers: &StringRecord) -> Result<Self, DatasetError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(DatasetError::MissingColumn(name))
        };

        let mut features = [0; FEATURE_COUNT];
        for feature in Feature::ALL {
            features[feature.index()] = find(feature.column())?;
        }
        Ok(Self {
            features,
            label: find(LABEL_COLUMN)?,
        })
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        policy: LabelPolicy,
    ) -> Result<LabeledExample, RowRejection> {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            let cell = record
                .get(self.features[feature.index()])
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or(RowRejection::MissingFeature(feature))?;
            values[feature.index()] = cell
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(RowRejection::NonNumericFeature(feature))?;
        }

        let label_cell = record
            .get(self.label)
            .filter(|c| !c.trim().is_empty())
            .ok_or(RowRejection::MissingLabel)?;
        let label = policy.parse(label_cell).ok_or(RowRejection::UnknownLabel)?;

        let features = FeatureVector::try_from_slice(&values)
            .map_err(|_| RowRejection::NonNumericFeature(Feature::Temperature))?;
        Ok(LabeledExample { features, label })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "Temp9am,Humidity9am,Pressure9am,WindSpeed9am,Cloud9am,RainTomorrow\n";

    fn load(body: &str, options: &DatasetOptions) -> TrainingSet {
        let csv = format!("{HEADER}{body}");
        read_training_set(csv.as_bytes(), options).unwrap()
    }

    #[test]
    fn parses_valid_rows_in_order() {
        let set = load(
            "20.1,70,1010.5,9,5,Yes\n15,40,1020,4,1,No\n",
            &DatasetOptions::default(),
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.examples[0].label, 1);
        assert_eq!(
            set.examples[0].features.as_array(),
            &[20.1, 70.0, 1010.5, 9.0, 5.0]
        );
        assert_eq!(set.examples[1].label, 0);
    }

    #[test]
    fn skips_rows_with_missing_or_non_numeric_features() {
        let set = load(
            "NA,70,1010,9,5,Yes\n20,,1010,9,5,No\n20,70,1010,9,5,No\n20,70,1010,9\n",
            &DatasetOptions::default(),
        );
        assert_eq!(set.len(), 1);
        assert_eq!(set.report.rejected, 3);
        assert_eq!(set.report.rows_read, 4);
    }

    #[test]
    fn skips_rows_with_missing_label() {
        let set = load("20,70,1010,9,5,\n", &DatasetOptions::default());
        assert!(set.is_empty());
        assert_eq!(set.report.rejected, 1);
    }

    #[test]
    fn non_yes_label_counts_as_no_rain_by_default() {
        let set = load("20,70,1010,9,5,NA\n", &DatasetOptions::default());
        assert_eq!(set.len(), 1);
        assert_eq!(set.examples[0].label, 0);
    }

    #[test]
    fn strict_policy_rejects_unknown_labels() {
        let options = DatasetOptions {
            label_policy: LabelPolicy::Strict,
            ..DatasetOptions::default()
        };
        let set = load("20,70,1010,9,5,NA\n20,70,1010,9,5,No\n", &options);
        assert_eq!(set.len(), 1);
        assert_eq!(set.report.rejected, 1);
    }

    #[test]
    fn undecodable_row_is_skipped_not_fatal() {
        let mut csv = HEADER.as_bytes().to_vec();
        csv.extend_from_slice(b"20,80,1005,12,70,Yes\n");
        csv.extend_from_slice(b"18,60,1012,8,30,N\xff\n");
        csv.extend_from_slice(b"25,40,1021,4,10,No\n");

        let set = read_training_set(csv.as_slice(), &DatasetOptions::default()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.report.rejected, 1);
        assert_eq!(set.report.rows_read, 3);
        assert_eq!(set.examples[0].label, 1);
        assert_eq!(set.examples[1].label, 0);
    }

    #[test]
    fn label_must_be_exactly_yes() {
        let set = load(
            "20, 70 ,1010,9,5, Yes\n20,70,1010,9,5,Yes \n20,70,1010,9,5,Yes\n",
            &DatasetOptions::default(),
        );
        assert_eq!(set.len(), 3);
        let labels: Vec<u8> = set.examples.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec![0, 0, 1]);
        assert_eq!(set.examples[0].features.humidity(), 70.0);
    }

    #[test]
    fn padded_headers_still_match() {
        let csv = "Temp9am, Humidity9am ,Pressure9am,WindSpeed9am,Cloud9am, RainTomorrow\n\
                   20,70,1010,9,5,Yes\n";
        let set = read_training_set(csv.as_bytes(), &DatasetOptions::default()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.examples[0].label, 1);
    }

    #[test]
    fn locates_columns_by_name() {
        let csv = "Date,RainTomorrow,Cloud9am,WindSpeed9am,Pressure9am,Humidity9am,Temp9am\n\
                   2008-12-01,Yes,8,20,1007.7,71,16.9\n";
        let set = read_training_set(csv.as_bytes(), &DatasetOptions::default()).unwrap();
        assert_eq!(
            set.examples[0].features.as_array(),
            &[16.9, 71.0, 1007.7, 20.0, 8.0]
        );
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "Temp9am,Humidity9am,Pressure9am,WindSpeed9am,RainTomorrow\n1,2,3,4,Yes\n";
        let err = read_training_set(csv.as_bytes(), &DatasetOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn("Cloud9am")));
    }

    #[test]
    fn caps_each_class_preserving_order() {
        let mut body = String::new();
        for i in 0..6000 {
            body.push_str(&format!("{},60,1012,5,4,Yes\n", i));
            if i % 60 == 0 {
                body.push_str(&format!("{},30,1022,2,1,No\n", -(i as f64)));
            }
        }
        let set = load(&body, &DatasetOptions::default());

        assert_eq!(set.report.positives, 5000);
        assert_eq!(set.report.negatives, 100);
        assert_eq!(set.report.over_cap, 1000);

        let positives: Vec<f64> = set
            .examples
            .iter()
            .filter(|e| e.label == 1)
            .map(|e| e.features.temperature())
            .collect();
        let expected: Vec<f64> = (0..5000).map(f64::from).collect();
        assert_eq!(positives, expected);

        let negatives = set.examples.iter().filter(|e| e.label == 0).count();
        assert_eq!(negatives, 100);
    }

    #[test]
    fn matrix_and_labels_line_up() {
        let set = load("1,2,3,4,5,Yes\n6,7,8,9,10,No\n", &DatasetOptions::default());
        let x = set.feature_matrix();
        assert_eq!(x.shape(), &[2, 5]);
        assert_eq!(x[[1, 4]], 10.0);
        assert_eq!(set.labels().to_vec(), vec![1.0, 0.0]);
    }
}
