//! `list` command.

use anyhow::Result;
use blipprep_core::registry::ProcessorRegistry;
use colored::*;
use serde_json::json;

/// One-line description of a built-in processor.
fn describe(name: &str) -> &'static str {
    match name {
        "blip_coco_text" => "caption -> lower-cased, punctuation-free, prompted caption",
        "blip_question" => "question -> lower-cased, punctuation-free question",
        "blip_coco_vis_train" => "image -> random crop, flip, RandAugment, normalized tensor",
        "blip_coco_vis_eval" => "image -> bicubic resize, normalized tensor",
        _ => "",
    }
}

pub fn handle_list_command(registry: &ProcessorRegistry, as_json: bool) -> Result<()> {
    let names = registry.names();

    if as_json {
        let entries: Vec<_> = names
            .iter()
            .map(|name| json!({ "name": name, "description": describe(name) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", "Registered processors:".bold().cyan());
    for name in names {
        println!("  {:<22} {}", name.green(), describe(name).dimmed());
    }
    Ok(())
}
