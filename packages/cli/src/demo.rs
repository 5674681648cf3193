//! Sample data walkthrough: populate `users`, list and decode it, then delete
//! one record and finally the whole collection.

use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use shelf_json_store::JSONLocalStore;

use crate::CliError;

pub const COLLECTION: &str = "users";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: Number,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub name: String,
    pub age: Number,
    pub contact: String,
    pub company: String,
    pub address: Address,
}

fn user(
    name: &str,
    age: u64,
    contact: &str,
    company: &str,
    (city, state, pincode): (&str, &str, u64),
) -> User {
    User {
        name: name.to_string(),
        age: Number::from(age),
        contact: contact.to_string(),
        company: company.to_string(),
        address: Address {
            city: city.to_string(),
            state: state.to_string(),
            country: "USA".to_string(),
            pincode: Number::from(pincode),
        },
    }
}

pub fn sample_users() -> Vec<User> {
    vec![
        user(
            "John Doe",
            30,
            "123-456-7890",
            "TechCorp",
            ("San Francisco", "CA", 94105),
        ),
        user(
            "Jane Smith",
            28,
            "987-654-3210",
            "Innovatech",
            ("New York", "NY", 10001),
        ),
        user(
            "Alice Johnson",
            35,
            "555-123-4567",
            "WebSolutions",
            ("Los Angeles", "CA", 90001),
        ),
        user(
            "Bob Brown",
            40,
            "444-555-6666",
            "DataAnalytics",
            ("Chicago", "IL", 60601),
        ),
    ]
}

pub fn run(store: &JSONLocalStore, out: &mut dyn Write) -> Result<(), CliError> {
    for user in sample_users() {
        store.write(COLLECTION, &user.name, &user)?;
    }

    let records = store.read_all(COLLECTION)?;
    writeln!(out, "All user records:")?;
    for record in &records {
        write!(out, "{}", record)?;
    }

    let mut users = Vec::with_capacity(records.len());
    for record in &records {
        users.push(serde_json::from_str::<User>(record)?);
    }
    writeln!(out, "All users decoded:")?;
    for user in &users {
        writeln!(
            out,
            "  {} ({}), {} in {}",
            user.name, user.age, user.company, user.address.city
        )?;
    }

    store.delete_resource(COLLECTION, "Alice Johnson")?;
    writeln!(out, "Deleted Alice Johnson")?;

    store.delete_collection(COLLECTION)?;
    writeln!(out, "Deleted all user records")?;

    Ok(())
}
