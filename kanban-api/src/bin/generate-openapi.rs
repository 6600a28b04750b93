//! OpenAPI Document Generator Binary
//!
//! Prints the Kanban OpenAPI document as JSON to stdout.
//!
//! Usage:
//!   cargo run -p kanban-api --bin generate-openapi > openapi.json

use kanban_api::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let doc = ApiDoc::openapi();

    match serde_json::to_string_pretty(&doc) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI document: {}", e);
            std::process::exit(1);
        }
    }
}
