use std::io::Write;

use shelf_json_store::JSONLocalStore;

use crate::{demo, CliError, Command};

pub fn execute(
    store: &JSONLocalStore,
    command: &Command,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Write {
            collection,
            resource,
            json,
        } => {
            let value: serde_json::Value = serde_json::from_str(json)?;
            store.write(collection, resource, &value)?;
            writeln!(out, "Wrote {}/{}", collection, resource)?;
        }
        Command::Read {
            collection,
            resource,
        } => {
            let value: serde_json::Value = store.read(collection, resource)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        Command::ReadAll { collection } => {
            for record in store.read_all(collection)? {
                // Documents already end with a newline.
                write!(out, "{}", record)?;
            }
        }
        Command::Delete {
            collection,
            resource: Some(resource),
        } => {
            store.delete_resource(collection, resource)?;
            writeln!(out, "Deleted {}/{}", collection, resource)?;
        }
        Command::Delete {
            collection,
            resource: None,
        } => {
            store.delete_collection(collection)?;
            writeln!(out, "Deleted collection {}", collection)?;
        }
        Command::Demo => demo::run(store, out)?,
    }

    Ok(())
}
