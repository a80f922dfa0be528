//! Customer attribute data structures for credit card delinquency scoring

use serde::{Deserialize, Serialize};

/// Number of monthly statement periods carried per customer
pub const PERIODS: usize = 6;

/// Raw financial attributes of a credit-card customer.
///
/// Every per-period array is ordered from the most recent statement to the
/// oldest one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAttributes {
    /// Credit limit
    pub credit_limit: f64,
    /// Sex (1 = male, 2 = female)
    pub sex: i32,
    /// Education level (1 = graduate school ... 6 = unknown)
    pub education: i32,
    /// Marital status (1 = married, 2 = single, 3 = others)
    pub marital_status: i32,
    /// Age in years
    pub age: i32,
    /// Repayment status per period (-1 = pay duly, 1 = one month late, ...)
    pub pay: [i32; PERIODS],
    /// Bill statement amount per period, negative for a credit balance
    pub bill_amounts: [f64; PERIODS],
    /// Amount paid per period
    pub payment_amounts: [f64; PERIODS],
}

/// Flat wire form of [`CustomerAttributes`], using the dataset's column names.
///
/// Upper-case aliases let raw dataset exports be deserialized unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerData {
    #[serde(alias = "LIMIT_BAL")]
    pub limit_bal: f64,

    #[serde(alias = "SEX")]
    pub sex: i32,

    #[serde(alias = "EDUCATION")]
    pub education: i32,

    #[serde(alias = "MARRIAGE")]
    pub marriage: i32,

    #[serde(alias = "AGE")]
    pub age: i32,

    #[serde(alias = "PAY_0")]
    pub pay_0: i32,

    #[serde(alias = "PAY_2")]
    pub pay_2: i32,

    #[serde(alias = "PAY_3")]
    pub pay_3: i32,

    #[serde(alias = "PAY_4")]
    pub pay_4: i32,

    #[serde(alias = "PAY_5")]
    pub pay_5: i32,

    #[serde(alias = "PAY_6")]
    pub pay_6: i32,

    #[serde(alias = "BILL_AMT1")]
    pub bill_amt1: f64,

    #[serde(alias = "BILL_AMT2")]
    pub bill_amt2: f64,

    #[serde(alias = "BILL_AMT3")]
    pub bill_amt3: f64,

    #[serde(alias = "BILL_AMT4")]
    pub bill_amt4: f64,

    #[serde(alias = "BILL_AMT5")]
    pub bill_amt5: f64,

    #[serde(alias = "BILL_AMT6")]
    pub bill_amt6: f64,

    #[serde(alias = "PAY_AMT1")]
    pub pay_amt1: f64,

    #[serde(alias = "PAY_AMT2")]
    pub pay_amt2: f64,

    #[serde(alias = "PAY_AMT3")]
    pub pay_amt3: f64,

    #[serde(alias = "PAY_AMT4")]
    pub pay_amt4: f64,

    #[serde(alias = "PAY_AMT5")]
    pub pay_amt5: f64,

    #[serde(alias = "PAY_AMT6")]
    pub pay_amt6: f64,
}

impl From<CustomerData> for CustomerAttributes {
    fn from(d: CustomerData) -> Self {
        Self {
            credit_limit: d.limit_bal,
            sex: d.sex,
            education: d.education,
            marital_status: d.marriage,
            age: d.age,
            pay: [d.pay_0, d.pay_2, d.pay_3, d.pay_4, d.pay_5, d.pay_6],
            bill_amounts: [
                d.bill_amt1,
                d.bill_amt2,
                d.bill_amt3,
                d.bill_amt4,
                d.bill_amt5,
                d.bill_amt6,
            ],
            payment_amounts: [
                d.pay_amt1, d.pay_amt2, d.pay_amt3, d.pay_amt4, d.pay_amt5, d.pay_amt6,
            ],
        }
    }
}

impl From<&CustomerAttributes> for CustomerData {
    fn from(a: &CustomerAttributes) -> Self {
        let [pay_0, pay_2, pay_3, pay_4, pay_5, pay_6] = a.pay;
        let [bill_amt1, bill_amt2, bill_amt3, bill_amt4, bill_amt5, bill_amt6] = a.bill_amounts;
        let [pay_amt1, pay_amt2, pay_amt3, pay_amt4, pay_amt5, pay_amt6] = a.payment_amounts;

        Self {
            limit_bal: a.credit_limit,
            sex: a.sex,
            education: a.education,
            marriage: a.marital_status,
            age: a.age,
            pay_0,
            pay_2,
            pay_3,
            pay_4,
            pay_5,
            pay_6,
            bill_amt1,
            bill_amt2,
            bill_amt3,
            bill_amt4,
            bill_amt5,
            bill_amt6,
            pay_amt1,
            pay_amt2,
            pay_amt3,
            pay_amt4,
            pay_amt5,
            pay_amt6,
        }
    }
}

/// A stored customer: identity plus an immutable attribute snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub id: u64,
    pub name: String,
    pub account_number: String,
    pub attributes: CustomerAttributes,
}

/// Payload for registering a new customer
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(rename = "accountNumber")]
    pub account_number: String,
    #[serde(flatten)]
    pub data: CustomerData,
}

impl CustomerAttributes {
    /// Create attributes with the given limit and age and an otherwise
    /// clean, fully paid history
    pub fn new(credit_limit: f64, age: i32) -> Self {
        Self {
            credit_limit,
            sex: 1,
            education: 1,
            marital_status: 1,
            age,
            pay: [0; PERIODS],
            bill_amounts: [0.0; PERIODS],
            payment_amounts: [0.0; PERIODS],
        }
    }

    /// Mean repayment status over all periods
    pub fn mean_delay(&self) -> f64 {
        self.pay.iter().map(|&p| p as f64).sum::<f64>() / PERIODS as f64
    }

    /// Bill amount of the last column in the dataset (`bill_amt6`)
    pub fn last_bill(&self) -> f64 {
        self.bill_amounts[PERIODS - 1]
    }
}
