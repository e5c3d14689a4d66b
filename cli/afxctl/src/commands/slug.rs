//! Offline slug inspection.

use anyhow::Result;
use archfx_slug::{AnySlug, Slug};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, print_single, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct SlugArgs {
    /// Slug to parse, e.g. `d--1234` or `sl--0001--0002--5051`.
    slug: String,
}

#[derive(Debug, Serialize, Tabled)]
struct SlugField {
    field: &'static str,
    value: String,
}

fn field(field: &'static str, value: impl ToString) -> SlugField {
    SlugField {
        field,
        value: value.to_string(),
    }
}

pub fn run(ctx: CommandContext, args: SlugArgs) -> Result<()> {
    let slug = AnySlug::parse(&args.slug)?;
    let fields = describe(&slug);

    match ctx.format {
        OutputFormat::Json => {
            let object: serde_json::Map<_, _> = fields
                .into_iter()
                .map(|f| (f.field.to_string(), serde_json::Value::String(f.value)))
                .collect();
            print_single(&object);
        }
        OutputFormat::Table => print_output(&fields, ctx.format),
    }
    Ok(())
}

/// Canonical form and parts of a slug.
fn describe(slug: &AnySlug) -> Vec<SlugField> {
    let mut fields = vec![
        field("kind", slug.kind()),
        field("slug", slug.text()),
        field("id", slug.formatted_id()),
    ];
    if let Ok(value) = slug.single_id() {
        fields.push(field("value", value));
    }

    match slug {
        AnySlug::Parent(parent) => {
            fields.push(field("type", parent.parent_type()));
        }
        AnySlug::Device(device) => {
            fields.push(field("block", device.block()));
            fields.push(field("device_id", device.device_id()));
            fields.push(field("block_slug", device.block_slug()));
        }
        AnySlug::Variable(variable) => {
            fields.push(field("scope", variable.scope_hex()));
            fields.push(field("var", variable.var_hex()));
        }
        AnySlug::Stream(stream) => {
            let parts = stream.parts();
            fields.push(field("parent", parts.parent));
            fields.push(field("block", parts.block));
            fields.push(field("scope", parts.scope));
            fields.push(field("device", parts.device));
            fields.push(field("variable", parts.variable));
            if let Some(start) = parts.start {
                fields.push(field("start", start));
            }
        }
        AnySlug::Streamer(streamer) => {
            fields.push(field("device", streamer.device_slug()));
            fields.push(field("index", streamer.index()));
        }
    }

    fields
}
