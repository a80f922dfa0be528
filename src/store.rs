//! Customer store abstraction and the in-memory demo implementation

use crate::types::customer::{CustomerAttributes, CustomerRecord, NewCustomer};
use std::sync::RwLock;
use tracing::info;

/// Source of stored customers.
///
/// Records are returned as owned snapshots; callers never observe later
/// mutations through a record they already hold.
pub trait CustomerStore: Send + Sync {
    fn list_all(&self) -> Vec<CustomerRecord>;

    fn get(&self, id: u64) -> Option<CustomerRecord>;

    /// Store a new customer and return it with its assigned id
    fn append(&self, customer: NewCustomer) -> CustomerRecord;
}

/// Non-durable store backed by a vector
pub struct InMemoryCustomerStore {
    customers: RwLock<Vec<CustomerRecord>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::with_customers(Vec::new())
    }

    pub fn with_customers(customers: Vec<CustomerRecord>) -> Self {
        Self {
            customers: RwLock::new(customers),
        }
    }

    /// Store pre-populated with the demo portfolio
    pub fn seeded() -> Self {
        Self::with_customers(demo_customers())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<CustomerRecord>> {
        // Writers never panic while holding the lock, so a poisoned lock
        // still guards a consistent vector.
        self.customers.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryCustomerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerStore for InMemoryCustomerStore {
    fn list_all(&self) -> Vec<CustomerRecord> {
        self.read().clone()
    }

    fn get(&self, id: u64) -> Option<CustomerRecord> {
        self.read().iter().find(|c| c.id == id).cloned()
    }

    fn append(&self, customer: NewCustomer) -> CustomerRecord {
        let mut customers = self.customers.write().unwrap_or_else(|e| e.into_inner());

        let id = customers.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let record = CustomerRecord {
            id,
            name: customer.name,
            account_number: customer.account_number,
            attributes: CustomerAttributes::from(customer.data),
        };
        customers.push(record.clone());

        info!(customer_id = id, account = %record.account_number, "Customer added");
        record
    }
}

fn demo_customer(
    id: u64,
    name: &str,
    account_number: &str,
    attributes: CustomerAttributes,
) -> CustomerRecord {
    CustomerRecord {
        id,
        name: name.to_string(),
        account_number: account_number.to_string(),
        attributes,
    }
}

/// The five demo customers served by a fresh instance
pub fn demo_customers() -> Vec<CustomerRecord> {
    vec![
        demo_customer(
            1,
            "Rohan Sharma",
            "ACC-10021",
            CustomerAttributes {
                credit_limit: 200000.0,
                sex: 2,
                education: 2,
                marital_status: 1,
                age: 35,
                pay: [0, 0, 1, 0, 0, 0],
                bill_amounts: [50000.0, 48000.0, 47000.0, 46000.0, 45000.0, 44000.0],
                payment_amounts: [5000.0, 6000.0, 7000.0, 6000.0, 6000.0, 8000.0],
            },
        ),
        demo_customer(
            2,
            "Priya Patel",
            "ACC-10022",
            CustomerAttributes {
                credit_limit: 150000.0,
                sex: 2,
                education: 3,
                marital_status: 2,
                age: 28,
                pay: [1, 0, 0, 1, 0, 0],
                bill_amounts: [35000.0, 34000.0, 33000.0, 32000.0, 31000.0, 30000.0],
                payment_amounts: [3000.0, 3000.0, 4000.0, 3000.0, 3000.0, 3500.0],
            },
        ),
        demo_customer(
            3,
            "Amit Kumar",
            "ACC-10023",
            CustomerAttributes {
                credit_limit: 75000.0,
                sex: 1,
                education: 1,
                marital_status: 1,
                age: 42,
                pay: [2, 1, 2, 1, 0, 1],
                bill_amounts: [25000.0, 26000.0, 27000.0, 28000.0, 29000.0, 30000.0],
                payment_amounts: [1000.0, 1200.0, 800.0, 900.0, 1000.0, 1100.0],
            },
        ),
        demo_customer(
            4,
            "Neha Singh",
            "ACC-10024",
            CustomerAttributes {
                credit_limit: 300000.0,
                sex: 2,
                education: 4,
                marital_status: 1,
                age: 31,
                pay: [-1, -1, 0, 0, -1, 0],
                bill_amounts: [80000.0, 78000.0, 76000.0, 74000.0, 72000.0, 70000.0],
                payment_amounts: [10000.0, 10000.0, 9000.0, 9000.0, 8000.0, 8000.0],
            },
        ),
        demo_customer(
            5,
            "Vikram Mehta",
            "ACC-10025",
            CustomerAttributes {
                credit_limit: 50000.0,
                sex: 1,
                education: 2,
                marital_status: 2,
                age: 24,
                pay: [3, 2, 3, 2, 2, 1],
                bill_amounts: [45000.0, 46000.0, 47000.0, 48000.0, 49000.0, 50000.0],
                payment_amounts: [500.0, 400.0, 300.0, 200.0, 100.0, 500.0],
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::customer::CustomerData;

    fn new_customer(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            account_number: "ACC-20000".to_string(),
            data: CustomerData::from(&CustomerAttributes::new(10000.0, 22)),
        }
    }

    #[test]
    fn test_seeded_store() {
        let store = InMemoryCustomerStore::seeded();
        assert_eq!(store.len(), 5);

        let rohan = store.get(1).unwrap();
        assert_eq!(rohan.name, "Rohan Sharma");
        assert_eq!(rohan.attributes.pay, [0, 0, 1, 0, 0, 0]);
        assert!(store.get(42).is_none());
    }

    #[test]
    fn test_append_assigns_next_id() {
        let store = InMemoryCustomerStore::seeded();
        let record = store.append(new_customer("New Person"));

        assert_eq!(record.id, 6);
        assert_eq!(store.len(), 6);
        assert_eq!(store.get(6).unwrap().name, "New Person");
    }

    #[test]
    fn test_append_to_empty_store() {
        let store = InMemoryCustomerStore::new();
        assert!(store.is_empty());
        assert_eq!(store.append(new_customer("First")).id, 1);
        assert_eq!(store.append(new_customer("Second")).id, 2);
    }

    #[test]
    fn test_snapshots_are_independent() {
        let store = InMemoryCustomerStore::seeded();
        let before = store.list_all();
        store.append(new_customer("Later"));
        assert_eq!(before.len(), 5);
        assert_eq!(store.list_all().len(), 6);
    }
}
