//! Simple inspector for GhJSON documents.
//!
//! Usage: `cargo run --example inspect_document [path.ghjson]`
//! Without a path, a small built-in document is inspected.
//! Set `RUST_LOG=debug` to see handler resolution.

use std::fs;

use ghjson::model::{create_node, CanvasNodeBuilder, CanvasObject, ComponentKind, DataTree, Document, TypedValue};
use ghjson::{validate::document_errors, Engine, SerializationOptions};
use serde_json::Value as Json;

fn demo_document(engine: &Engine) -> Document {
    let slider = CanvasNodeBuilder::number_slider(5.5, 0.0, 10.0, 1).build();
    let panel = CanvasNodeBuilder::panel("hello").build();
    let mut tree = DataTree::new();
    tree.append(vec![0].into(), TypedValue::Number(1.0));
    tree.append_null(vec![0].into());
    tree.append(vec![1].into(), TypedValue::Text("pointXYZ:not really".into()));
    let addition = CanvasNodeBuilder::new(ComponentKind::named("Addition"))
        .nick_name("Sum")
        .input("A", |p| p.persistent_data(tree))
        .input("B", |p| p)
        .output("Result", |p| p)
        .build();

    let nodes: [(u32, &dyn CanvasObject); 3] = [(1, &slider), (2, &panel), (3, &addition)];
    engine
        .serialize_document(nodes, &SerializationOptions::standard())
        .value
}

fn describe(engine: &Engine, json: &Json) -> String {
    match json {
        Json::String(s) if engine.codecs().is_encoded(s) => match engine.decode_value(s) {
            Ok(value) => format!("{:?}", value),
            Err(err) => format!("<{}>", err),
        },
        Json::Object(_) => {
            let tree = engine.tree_codec().unflatten_values(json);
            match tree {
                Ok(tree) => format!("tree({} paths, {} items)", tree.path_count(), tree.data_count()),
                Err(_) => json.to_string(),
            }
        }
        other => other.to_string(),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let engine = Engine::new();
    let doc = match std::env::args().nth(1) {
        Some(path) => {
            println!("Reading: {}", path);
            let text = fs::read_to_string(&path).expect("Failed to read file");
            Document::from_json(&text).expect("Failed to parse document")
        }
        None => demo_document(&engine),
    };

    println!("\n=== Document ===");
    println!("Schema: {}", doc.schema_version.as_deref().unwrap_or("(unset)"));
    println!("Components: {}", doc.components.len());
    println!("Connections: {}", doc.connections.len());

    let errors = document_errors(&doc);
    if errors.is_empty() {
        println!("Valid");
    } else {
        for err in &errors {
            println!("  INVALID: {}", err);
        }
    }

    println!("\n=== Components ===");
    for record in &doc.components {
        println!("[{}] {}", record.id, record.kind());
        for (name, value) in &record.properties {
            println!("      {} = {}", name, describe(&engine, value));
        }
        for settings in record.input_settings.iter().chain(&record.output_settings) {
            println!("      param {}", settings.parameter_name);
            for (name, value) in &settings.properties {
                println!("        {} = {}", name, describe(&engine, value));
            }
        }
        if !record.component_state.is_empty() {
            let state = serde_json::to_string(&record.component_state).expect("state serializes");
            println!("      state {}", state);
        }
    }

    println!("\n=== Rebuild ===");
    match engine.deserialize_document(&doc, &create_node) {
        Ok(nodes) => {
            println!("Rebuilt {} nodes, {} warnings", nodes.value.len(), nodes.warnings.len());
            for warning in &nodes.warnings {
                println!("  {}", warning);
            }
        }
        Err(err) => println!("Failed: {}", err),
    }
}
