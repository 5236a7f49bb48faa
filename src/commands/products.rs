// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Patch, json_flags};
use crate::api::ApiClient;
use crate::models::ProductType;
use crate::utils::{maybe_print_json, opt_arg, pretty_table};
use anyhow::Result;
use serde_json::{Map, Value, json};

pub fn handle(api: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let items: Vec<ProductType> = api.get("/product-types")?;
            if !maybe_print_json(json_flag, jsonl_flag, &items)? {
                let rows = items
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.to_string(),
                            p.name.clone(),
                            p.description.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Name", "Description"], rows));
            }
        }
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let body = json!({ "name": name, "description": opt_arg(sub, "description") });
            let p: ProductType = api.post("/product-types", &body)?;
            println!("Added product type '{}' (id {})", p.name, p.id);
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let body = product_fields(sub)?;
            let p: ProductType = api.put(&format!("/product-types/{}", id), &body)?;
            println!("Updated product type '{}' (id {})", p.name, p.id);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            api.delete(&format!("/product-types/{}", id))?;
            println!("Removed product type {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Partial body for `products update`.
pub fn product_fields(sub: &clap::ArgMatches) -> Result<Map<String, Value>> {
    let mut p = Patch::default();
    p.text(sub, "name", "name");
    p.text(sub, "description", "description");
    p.finish()
}
