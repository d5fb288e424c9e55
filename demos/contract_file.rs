//! Loading contracts from a YAML contract file.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p contract-schema-demos --example contract_file
//! ```
//!
//! This example writes a temporary contract file to demonstrate the API.

use contract_schema_service::ContractFile;
use serde_json::json;

const CONTRACTS: &str = r#"version: "1.0"
endpoints:
  getOrder:
    method: get
    auth: "YES"
    path: /orders
    body: { type: object }
    params:
      type: object
      fields:
        id: { type: object_id }
    query:
      type: object
      fields:
        expand: { type: optional, inner: { type: boolean } }
    response: { type: any }
commands:
  migrate:
    key: "db:migrate"
    body: { type: any }
    params:
      type: object
      fields:
        steps: { type: number, integer: true, min: 1 }
        dry: { type: boolean }
    response: { type: any }
    token_separator: " "
documents:
  order:
    key: order
    id_field: _id
    document:
      type: object
      fields:
        total: { type: number, min: 0 }
"#;

fn main() {
    let path = std::env::temp_dir().join("contract_schema_example.yml");
    std::fs::write(&path, CONTRACTS).unwrap();

    let contracts = ContractFile::load(&path).unwrap().build().unwrap();
    println!("loaded {} contract(s)", contracts.len());

    if let Some(get_order) = contracts.endpoint("getOrder") {
        let params = json!({ "id": { "$oid": "65E1F0A2B3C4D5E6F7A8B9C0" } });
        println!("{} {}", get_order.method(), get_order.make_full_path(&params, &["id"]).unwrap());
    }

    if let Some(migrate) = contracts.command("migrate") {
        let line = migrate.make_full_path(&json!({ "steps": 2, "dry": true })).unwrap();
        println!("{line}");
    }

    if let Some(order) = contracts.document("order") {
        println!("{} keyed by {}", order.full_key(), order.id_field());
    }

    std::fs::remove_file(&path).ok();
}
