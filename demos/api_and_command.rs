//! Endpoint and command contracts side by side.
//!
//! Builds a paginated-list endpoint and a `start` command, then renders a
//! concrete path and command line from sample params.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p contract-schema-demos --example api_and_command
//! ```

use contract_schema_core::{ResponseShape, Shape};
use contract_schema_service::{api, command};
use serde_json::json;

fn main() {
    let list_people = api::make_schema(
        api::ApiConfig::new()
            .auth("YES")
            .path("/sss")
            .method("get")
            .body(Shape::empty_object())
            .params(Shape::object([
                ("pageSize", Shape::number()),
                ("currentPage", Shape::number()),
            ]))
            .query(Shape::object([("isMarid", Shape::boolean())]))
            .response(
                ResponseShape::new(Shape::object([
                    ("name", Shape::string()),
                    ("age", Shape::number()),
                    ("isMarid", Shape::boolean()),
                ]))
                .list()
                .simple(),
            ),
    )
    .unwrap();

    let order = ["pageSize", "currentPage"];
    let params = json!({ "currentPage": 10, "pageSize": 12 });
    println!("path template: {}", list_people.make_full_path_shape(&order).unwrap());
    println!("path:          {}", list_people.make_full_path(&params, &order).unwrap());

    let start = command::make_schema(
        command::CommandConfig::new()
            .key("start")
            .body(Shape::string())
            .params(Shape::object([
                ("global", Shape::boolean()),
                ("flat", Shape::literal("UAE")),
            ]))
            .response(Shape::empty_object()),
    )
    .unwrap();

    let params = json!({ "global": true, "flat": "UAE" });
    let rendered = start.stringify_params(&params).unwrap();
    println!("command shape: {} {}", start.key(), rendered.shape);
    println!("command line:  {}", start.make_full_path(&params).unwrap());

    // Rejected values report every issue with its path.
    if let Err(err) = start.make_params(&json!({ "global": "yes", "flat": "UK" })) {
        println!("rejected params:\n{err}");
    }
}
