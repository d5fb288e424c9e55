//! Document contracts with identifier and timestamp augmentation.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p contract-schema-demos --example document_schema
//! ```

use contract_schema_core::{ObjectId, Shape, json_object};
use contract_schema_service::document;
use serde_json::json;

fn main() {
    let user = document::make_schema(
        document::DocumentConfig::new().key("user").document(Shape::object([
            ("name", Shape::string()),
            ("age", Shape::integer().min(0.0)),
            ("settings", json_object(Shape::object([("theme", Shape::string())]))),
        ])),
    )
    .unwrap();

    println!("collection: {}", user.full_key());

    let id = ObjectId::from_bytes([0x65, 0xe1, 0xf0, 0xa2, 0xb3, 0xc4, 0xd5, 0xe6, 0xf7, 0xa8, 0xb9, 0xc0]);
    if let Some(created) = id.timestamp() {
        println!("id {id} minted at {created}");
    }

    // `settings` arrives as slightly broken JSON text and is repaired.
    let stored = json!({
        "name": "Ada",
        "age": 36,
        "settings": "{theme: 'dark',}",
        "id": id.to_hex(),
        "createdAt": "2024-03-01T13:00:00+01:00",
        "updatedAt": "2024-03-02T08:30:00Z",
    });
    let canonical = user.make_full_document(&stored).unwrap();
    println!("{}", serde_json::to_string_pretty(&canonical).unwrap());

    let draft = json!({ "name": "Ada", "age": 36, "settings": { "theme": "light" } });
    println!("draft is a base document: {}", user.document().is_valid(&draft));
    println!("draft is a full document: {}", user.full_document().is_valid(&draft));
    if let Err(err) = user.make_full_document(&draft) {
        println!("{err}");
    }
}
