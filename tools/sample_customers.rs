//! Sample Customer Generator
//!
//! Writes a CSV of synthetic customers in the format accepted by
//! `/predict_csv`, mixing customers who repay on time with customers
//! showing delinquency signals.
//!
//! Usage: sample_customers [count] [delinquent_rate] [output.csv]

use delinquency_risk::types::{CustomerAttributes, CustomerData};
use rand::Rng;
use std::io;
use tracing::info;

const DEFAULT_DELINQUENT_RATE: f64 = 0.2;

/// Customer generator for batch scoring tests
struct CustomerGenerator {
    rng: rand::rngs::ThreadRng,
}

impl CustomerGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Customer who pays duly and keeps utilization low
    fn generate_on_time(&mut self) -> CustomerAttributes {
        let credit_limit = round_to(self.rng.gen_range(100_000.0..500_000.0), 10_000.0);
        let age = self.rng.gen_range(25..65);
        let mut attrs = self.base(credit_limit, age);

        for i in 0..attrs.pay.len() {
            attrs.pay[i] = self.rng.gen_range(-2..=0);
            let bill = credit_limit * self.rng.gen_range(0.05..0.35);
            attrs.bill_amounts[i] = round_to(bill, 100.0);
            attrs.payment_amounts[i] = round_to(bill * self.rng.gen_range(0.3..1.0), 100.0);
        }
        attrs
    }

    /// Customer with repeated late payments, high utilization and a small
    /// repayment share
    fn generate_delinquent(&mut self) -> CustomerAttributes {
        let credit_limit = round_to(self.rng.gen_range(20_000.0..120_000.0), 10_000.0);
        let age = self.rng.gen_range(21..45);
        let mut attrs = self.base(credit_limit, age);

        for i in 0..attrs.pay.len() {
            attrs.pay[i] = self.rng.gen_range(1..=4);
            let bill = credit_limit * self.rng.gen_range(0.8..1.05);
            attrs.bill_amounts[i] = round_to(bill, 100.0);
            attrs.payment_amounts[i] = round_to(bill * self.rng.gen_range(0.0..0.05), 100.0);
        }
        attrs
    }

    fn base(&mut self, credit_limit: f64, age: i32) -> CustomerAttributes {
        let mut attrs = CustomerAttributes::new(credit_limit, age);
        attrs.sex = self.rng.gen_range(1..=2);
        attrs.education = self.rng.gen_range(1..=4);
        attrs.marital_status = self.rng.gen_range(1..=3);
        attrs
    }
}

/// Delinquent share in [0, 1]; unparsable or non-finite input uses the default
fn parse_rate(arg: Option<&str>) -> f64 {
    arg.and_then(|s| s.parse::<f64>().ok())
        .filter(|rate| rate.is_finite())
        .unwrap_or(DEFAULT_DELINQUENT_RATE)
        .clamp(0.0, 1.0)
}

fn round_to(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the CSV can be piped from stdout
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_customers=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(100);
    let delinquent_rate = parse_rate(args.get(2).map(String::as_str));
    let output = args.get(3);

    info!(
        count = count,
        delinquent_rate = delinquent_rate,
        output = output.map(String::as_str).unwrap_or("stdout"),
        "Generating sample customers"
    );

    let sink: Box<dyn io::Write> = match output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(sink);

    let mut generator = CustomerGenerator::new();
    let mut rng = rand::thread_rng();
    let mut on_time_count = 0;
    let mut delinquent_count = 0;

    for _ in 0..count {
        let attrs = if rng.gen_bool(delinquent_rate) {
            delinquent_count += 1;
            generator.generate_delinquent()
        } else {
            on_time_count += 1;
            generator.generate_on_time()
        };
        writer.serialize(CustomerData::from(&attrs))?;
    }
    writer.flush()?;

    info!(
        "Completed! Wrote {} customers ({} on time, {} delinquent)",
        count, on_time_count, delinquent_count
    );

    Ok(())
}
