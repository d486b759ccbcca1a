/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, info};

use crate::NumT;
use crate::config::Config;
use crate::error::{Error, Result};

/// Number of numeric predictor fields in a record.
pub const NFEATURES: usize = 8;

/// Column names in file order.
pub const COLUMN_NAMES: [&str; NFEATURES + 1] = [
    "BranchID", "ClueID", "PersonnelID", "Status", "IsAccount", "HourOfDay",
    "CreatedYear", "CreatedMonth", "CreatedDay",
];

/// Feature names in feature vector order; `Status` is the label and is left out.
pub const FEATURE_NAMES: [&str; NFEATURES] = [
    "BranchID", "ClueID", "PersonnelID", "IsAccount", "HourOfDay",
    "CreatedYear", "CreatedMonth", "CreatedDay",
];

const STATUS_COLUMN: usize = 3;

/// The numeric input of the model for one call.
pub type FeatureVector = [NumT; NFEATURES];

/// One row of the call activity file.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub branch_id: NumT,
    pub clue_id: NumT,
    pub personnel_id: NumT,
    pub status: bool,
    pub is_account: NumT,
    pub hour_of_day: NumT,
    pub created_year: NumT,
    pub created_month: NumT,
    pub created_day: NumT,
}

impl CallRecord {
    /// Build a record without label from a feature vector, e.g. for console input.
    pub fn from_features(f: &FeatureVector) -> CallRecord {
        CallRecord {
            branch_id: f[0],
            clue_id: f[1],
            personnel_id: f[2],
            status: false,
            is_account: f[3],
            hour_of_day: f[4],
            created_year: f[5],
            created_month: f[6],
            created_day: f[7],
        }
    }

    pub fn features(&self) -> FeatureVector {
        [
            self.branch_id,
            self.clue_id,
            self.personnel_id,
            self.is_account,
            self.hour_of_day,
            self.created_year,
            self.created_month,
            self.created_day,
        ]
    }

    pub fn label(&self) -> bool { self.status }

    fn from_csv_record(record: &csv::StringRecord, record_id: usize) -> Result<CallRecord> {
        if record.len() != COLUMN_NAMES.len() {
            return Err(Error::ColumnCount {
                record: record_id,
                found: record.len(),
                expected: COLUMN_NAMES.len(),
            });
        }

        let mut features = [0.0; NFEATURES];
        let feature_columns = (0..COLUMN_NAMES.len()).filter(|&c| c != STATUS_COLUMN);
        for (feat_id, column) in feature_columns.enumerate() {
            features[feat_id] = parse_num(&record[column], record_id, COLUMN_NAMES[column])?;
        }

        let status = parse_status(&record[STATUS_COLUMN])
            .ok_or_else(|| Error::Parse {
                record: record_id,
                column: COLUMN_NAMES[STATUS_COLUMN],
                value: record[STATUS_COLUMN].to_string(),
            })?;

        let mut call = CallRecord::from_features(&features);
        call.status = status;
        Ok(call)
    }
}

fn parse_num(value: &str, record_id: usize, column: &'static str) -> Result<NumT> {
    value.trim().parse::<NumT>().map_err(|_| Error::Parse {
        record: record_id,
        column,
        value: value.to_string(),
    })
}

/// Accepts the usual spellings of a boolean label.
pub fn parse_status(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "f" | "n" => Some(false),
        _ => None,
    }
}

pub fn read_records_from_path<P: AsRef<Path>>(config: &Config, path: P) -> Result<Vec<CallRecord>> {
    let path = path.as_ref();
    info!("loading call records from {}", path.display());
    let file = BufReader::new(File::open(path)?);
    let is_gzip = path.extension().map(|ext| ext == "gz").unwrap_or(false);
    if is_gzip {
        debug!("decompressing gzip input");
        read_records(config, GzDecoder::new(file))
    } else {
        read_records(config, file)
    }
}

pub fn read_records<R: Read>(config: &Config, reader: R) -> Result<Vec<CallRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(config.csv_has_header)
        .delimiter(config.csv_delimiter)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        if record.iter().all(|field| field.trim().is_empty()) { continue; }
        records.push(CallRecord::from_csv_record(&record, records.len())?);
    }

    info!("read {} call records", records.len());
    Ok(records)
}




// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    const CSV: &str = "BranchID,ClueID,PersonnelID,Status,IsAccount,HourOfDay,CreatedYear,CreatedMonth,CreatedDay
1,1001,7,True,1,9,2023,4,12
2,1002,8,false,0,14,2023,5,1

3,1003,9,1,1,17.5,2024,1,30
";

    #[test]
    fn basic_with_header() {
        let config = Config::new();
        let records = read_records(&config, CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].branch_id, 1.0);
        assert_eq!(records[0].clue_id, 1001.0);
        assert!(records[0].label());
        assert!(!records[1].label());
        assert!(records[2].label());
        assert_eq!(records[2].hour_of_day, 17.5);
        assert_eq!(records[1].features(), [2.0, 1002.0, 8.0, 0.0, 14.0, 2023.0, 5.0, 1.0]);
    }

    #[test]
    fn without_header_other_delimiter() {
        let mut config = Config::new();
        config.csv_has_header = false;
        config.csv_delimiter = b';';

        let records = read_records(&config, "4;5;6;no;0;8;2022;12;31\n".as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].features(), [4.0, 5.0, 6.0, 0.0, 8.0, 2022.0, 12.0, 31.0]);
        assert!(!records[0].status);
    }

    #[test]
    fn features_roundtrip_record() {
        let f = [1.0, 2.0, 3.0, 1.0, 10.0, 2023.0, 6.0, 15.0];
        let record = CallRecord::from_features(&f);
        assert_eq!(record.features(), f);
        assert!(!record.label());
    }

    #[test]
    fn invalid_value() {
        let config = Config::new();
        let csv = "a,b,c,d,e,f,g,h,i\n1,2,x,true,1,9,2023,4,12\n";
        match read_records(&config, csv.as_bytes()) {
            Err(Error::Parse { record, column, value }) => {
                assert_eq!(record, 0);
                assert_eq!(column, "PersonnelID");
                assert_eq!(value, "x");
            },
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn invalid_status() {
        let config = Config::new();
        let csv = "a,b,c,d,e,f,g,h,i\n1,2,3,maybe,1,9,2023,4,12\n";
        assert!(matches!(read_records(&config, csv.as_bytes()),
                         Err(Error::Parse { column: "Status", .. })));
    }

    #[test]
    fn wrong_column_count() {
        let config = Config::new();
        let csv = "a,b,c,d,e,f,g,h,i\n1,2,3,true,1,9,2023,4,12\n1,2,3\n";
        assert!(matches!(read_records(&config, csv.as_bytes()),
                         Err(Error::ColumnCount { record: 1, found: 3, expected: 9 })));
    }

    #[test]
    fn gzip_input() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(CSV.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let config = Config::new();
        let records = read_records(&config, GzDecoder::new(&compressed[..])).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn missing_file() {
        let config = Config::new();
        assert!(matches!(read_records_from_path(&config, "/nonexistent/calls.csv"),
                         Err(Error::Io(_))));
    }

    #[test]
    fn status_spellings() {
        for v in &["true", "TRUE", " 1 ", "yes", "t", "Y"] { assert_eq!(parse_status(v), Some(true)); }
        for v in &["false", "0", "No", "f", "n"] { assert_eq!(parse_status(v), Some(false)); }
        assert_eq!(parse_status("2"), None);
    }
}
