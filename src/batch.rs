//! CSV batch scoring.
//!
//! The output keeps every input column and value and appends the four result
//! columns, one output row per input row in input order. Original fields are
//! written back byte for byte; only the columns the model reads have to be
//! valid UTF-8.

use crate::error::PredictionError;
use crate::predictor::RiskPredictor;
use crate::types::customer::{CustomerAttributes, CustomerData};
use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use tracing::info;

/// Columns appended to every output row
pub const RESULT_COLUMNS: [&str; 4] = ["risk_score", "risk_level", "recommended_action", "reason"];

/// `risk_level` written for rows that could not be scored
pub const ERROR_LEVEL: &str = "ERROR";

/// Scored CSV plus row counts
#[derive(Debug)]
pub struct CsvBatchOutcome {
    pub csv: Vec<u8>,
    pub rows: usize,
    pub failed: usize,
}

/// Score every row of a CSV document.
///
/// Fails only when the document as a whole cannot be read or written; a row
/// that cannot be parsed or scored is reported in its own result columns.
/// Short rows are padded and over-long rows cut to the header width, so the
/// result columns always sit under their headers.
pub fn score_csv(predictor: &RiskPredictor, input: &[u8]) -> Result<CsvBatchOutcome, csv::Error> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.byte_headers()?.clone();
    let width = headers.len();

    let mut field_names = headers.clone();
    field_names.trim();

    let mut rows: Vec<ByteRecord> = Vec::new();
    let mut parsed: Vec<Result<CustomerAttributes, PredictionError>> = Vec::new();

    for result in reader.byte_records() {
        match result {
            Ok(record) => {
                parsed.push(parse_row(&record, &field_names));
                rows.push(record);
            }
            Err(e) => {
                parsed.push(Err(PredictionError::FeatureEngineering(e.to_string())));
                rows.push(ByteRecord::new());
            }
        }
    }

    let results = predictor.predict_batch(parsed);

    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    let mut header_row = headers.clone();
    for column in RESULT_COLUMNS {
        header_row.push_field(column.as_bytes());
    }
    writer.write_byte_record(&header_row)?;

    let mut failed = 0;
    for (record, result) in rows.iter().zip(&results) {
        let mut out =
            ByteRecord::with_capacity(record.as_slice().len(), width + RESULT_COLUMNS.len());
        for i in 0..width {
            out.push_field(record.get(i).unwrap_or_default());
        }

        match result {
            Ok(assessment) => {
                out.push_field(assessment.probability.to_string().as_bytes());
                out.push_field(assessment.tier.label().as_bytes());
                out.push_field(assessment.action.as_bytes());
                out.push_field(assessment.reason.as_bytes());
            }
            Err(failure) => {
                failed += 1;
                out.push_field(b"");
                out.push_field(ERROR_LEVEL.as_bytes());
                out.push_field(b"");
                out.push_field(failure.error.to_string().as_bytes());
            }
        }

        writer.write_byte_record(&out)?;
    }

    let csv = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    info!(rows = results.len(), failed = failed, "CSV batch scored");

    Ok(CsvBatchOutcome {
        csv,
        rows: results.len(),
        failed,
    })
}

/// Deserialize one row by header name. Values are trimmed for parsing only.
fn parse_row(
    record: &ByteRecord,
    field_names: &ByteRecord,
) -> Result<CustomerAttributes, PredictionError> {
    if record.len() > field_names.len() {
        return Err(PredictionError::FeatureEngineering(format!(
            "row has {} fields, header has {}",
            record.len(),
            field_names.len()
        )));
    }

    let mut values = record.clone();
    values.trim();
    values
        .deserialize::<CustomerData>(Some(field_names))
        .map(CustomerAttributes::from)
        .map_err(|e| PredictionError::FeatureEngineering(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::FeatureVector;
    use crate::metrics::PredictionMetrics;
    use crate::models::classifier::{Classifier, RiskClassifier};
    use std::sync::Arc;

    struct UtilizationModel;

    impl Classifier for UtilizationModel {
        fn name(&self) -> &str {
            "utilization"
        }

        fn predict_probability(&self, features: &FeatureVector) -> anyhow::Result<f64> {
            Ok(features.utilization_avg.clamp(0.0, 1.0))
        }
    }

    const HEADER: &str = "ID,limit_bal,sex,education,marriage,age,\
pay_0,pay_2,pay_3,pay_4,pay_5,pay_6,\
bill_amt1,bill_amt2,bill_amt3,bill_amt4,bill_amt5,bill_amt6,\
pay_amt1,pay_amt2,pay_amt3,pay_amt4,pay_amt5,pay_amt6";

    /// Low-utilization customer fields, without the leading ID column
    const ROW: &str = "100000,2,2,1,35,0,0,0,0,0,0,10000,10000,10000,10000,10000,10000,0,0,0,0,0,0";

    fn predictor(classifier: RiskClassifier) -> RiskPredictor {
        RiskPredictor::new(classifier, Arc::new(PredictionMetrics::new()))
    }

    fn score_with_utilization(input: &[u8]) -> CsvBatchOutcome {
        score_csv(&predictor(RiskClassifier::from_model(UtilizationModel)), input).unwrap()
    }

    fn parse_output(bytes: &[u8]) -> Vec<Vec<String>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);
        reader
            .byte_records()
            .map(|r| {
                r.unwrap()
                    .iter()
                    .map(|f| String::from_utf8_lossy(f).into_owned())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_scores_rows_and_keeps_columns() {
        let input = format!(
            "{}\n\
             a,100000,2,2,1,35,0,0,0,0,0,0,10000,10000,10000,10000,10000,10000,0,0,0,0,0,0\n\
             b,100000,1,1,2,50,2,2,2,2,2,2,90000,90000,90000,90000,90000,90000,0,0,0,0,0,0\n",
            HEADER
        );

        let outcome = score_with_utilization(input.as_bytes());
        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.failed, 0);

        let rows = parse_output(&outcome.csv);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 24 + 4);
        assert_eq!(&rows[0][24..], &RESULT_COLUMNS.map(String::from));

        assert_eq!(rows[1][0], "a");
        assert_eq!(rows[1][25], "LOW RISK");
        assert_eq!(rows[1][26], "Approve normally");
        let score: f64 = rows[1][24].parse().unwrap();
        assert!((score - 10000.0 / 100001.0).abs() < 1e-12);

        assert_eq!(rows[2][0], "b");
        assert_eq!(rows[2][25], "HIGH RISK");
        assert_eq!(rows[2][27], "strong default signals");
    }

    #[test]
    fn test_malformed_row_fails_alone() {
        let input = format!(
            "{}\n\
             a,100000,2,2,1,35,0,0,0,0,0,0,10000,10000,10000,10000,10000,10000,0,0,0,0,0,0\n\
             b,lots,2,2,1,35,0,0,0,0,0,0,10000,10000,10000,10000,10000,10000,0,0,0,0,0,0\n\
             c,100000,2,2\n\
             d,100000,2,2,1,35,0,0,0,0,0,0,10000,10000,10000,10000,10000,10000,0,0,0,0,0,0\n",
            HEADER
        );

        let outcome = score_with_utilization(input.as_bytes());
        assert_eq!(outcome.rows, 4);
        assert_eq!(outcome.failed, 2);

        let rows = parse_output(&outcome.csv);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1][25], "LOW RISK");
        assert_eq!(rows[2][1], "lots");
        assert_eq!(rows[2][25], ERROR_LEVEL);
        assert!(rows[2][27].starts_with("invalid customer attributes"));
        // short row is padded to the header width before the result columns
        assert_eq!(rows[3].len(), 28);
        assert_eq!(rows[3][0], "c");
        assert_eq!(rows[3][25], ERROR_LEVEL);
        assert_eq!(rows[4][0], "d");
        assert_eq!(rows[4][25], "LOW RISK");
    }

    #[test]
    fn test_upper_case_dataset_headers() {
        let input = "LIMIT_BAL,SEX,EDUCATION,MARRIAGE,AGE,PAY_0,PAY_2,PAY_3,PAY_4,PAY_5,PAY_6,\
BILL_AMT1,BILL_AMT2,BILL_AMT3,BILL_AMT4,BILL_AMT5,BILL_AMT6,\
PAY_AMT1,PAY_AMT2,PAY_AMT3,PAY_AMT4,PAY_AMT5,PAY_AMT6\n\
50000,1,2,2,24,3,2,3,2,2,1,45000,46000,47000,48000,49000,50000,500,400,300,200,100,500\n";

        let outcome = score_with_utilization(input.as_bytes());
        assert_eq!(outcome.failed, 0);
        let rows = parse_output(&outcome.csv);
        assert_eq!(rows[1][24], "HIGH RISK");
    }

    #[test]
    fn test_every_row_fails_when_model_unavailable() {
        let input = format!(
            "{}\na,100000,2,2,1,35,0,0,0,0,0,0,1,1,1,1,1,1,0,0,0,0,0,0\n",
            HEADER
        );

        let outcome = score_csv(
            &predictor(RiskClassifier::unavailable("no model")),
            input.as_bytes(),
        )
        .unwrap();
        assert_eq!(outcome.failed, 1);
        let rows = parse_output(&outcome.csv);
        assert!(rows[1][27].starts_with("model unavailable"));
    }

    #[test]
    fn test_header_only() {
        let outcome = score_with_utilization(HEADER.as_bytes());
        assert_eq!(outcome.rows, 0);
        assert_eq!(parse_output(&outcome.csv).len(), 1);
    }

    #[test]
    fn test_long_row_keeps_result_columns_aligned() {
        let input = format!("{HEADER},name\na,{ROW},Ann\nb,{ROW},Ann,EXTRA\n");

        let outcome = score_with_utilization(input.as_bytes());
        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.failed, 1);

        let rows = parse_output(&outcome.csv);
        assert_eq!(rows[0].len(), 29);
        assert_eq!(rows[0][25], "risk_score");

        assert_eq!(rows[1].len(), 29);
        assert_eq!(rows[1][24], "Ann");
        assert_eq!(rows[1][26], "LOW RISK");

        assert_eq!(rows[2].len(), 29);
        assert_eq!(rows[2][24], "Ann");
        assert_eq!(rows[2][25], "");
        assert_eq!(rows[2][26], ERROR_LEVEL);
        assert!(rows[2][28].contains("row has 26 fields, header has 25"));
    }

    #[test]
    fn test_invalid_utf8_outside_model_columns() {
        let mut input = format!("{},name\n", HEADER).into_bytes();
        input.extend_from_slice(format!("a,{ROW},").as_bytes());
        input.extend_from_slice(b"Jos\xe9\n");

        let outcome = score_with_utilization(&input);
        assert_eq!(outcome.failed, 0);

        let mut reader = ReaderBuilder::new().from_reader(outcome.csv.as_slice());
        let row = reader.byte_records().next().unwrap().unwrap();
        assert_eq!(&row[0], b"a");
        assert_eq!(&row[1], b"100000");
        assert_eq!(&row[24], b"Jos\xe9");
        assert_eq!(&row[26], b"LOW RISK");
    }

    #[test]
    fn test_values_written_back_untrimmed() {
        let input = format!(
            "{}\n\
             a , 100000,2,2,1,35,0,0,0,0,0,0,10000,10000,10000,10000,10000,10000,0,0,0,0,0,0\n",
            HEADER
        );

        let outcome = score_with_utilization(input.as_bytes());
        assert_eq!(outcome.failed, 0);

        let rows = parse_output(&outcome.csv);
        assert_eq!(rows[1][0], "a ");
        assert_eq!(rows[1][1], " 100000");
        assert_eq!(rows[1][25], "LOW RISK");
    }
}
