use std::fmt::Write as _;
use std::path::Path;

use anyhow::{anyhow, Context};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use idpath_gen::{IdContainer, IdpathConfig};
use idpath_types::{Address, Id};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let format = cli.format;
    let output = match cli.command {
        Command::Generate(args) => cmd_generate(&args, &config, format)?,
        Command::Id(args) => cmd_id(&args, format)?,
        Command::Address(args) => cmd_address(&args, format)?,
        Command::Contains(args) => cmd_contains(&args, format)?,
        Command::Prefix(args) => cmd_prefix(&args, format)?,
        Command::Config => cmd_config(&config, format)?,
    };
    println!("{output}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<IdpathConfig> {
    match path {
        Some(path) => IdpathConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(IdpathConfig::default()),
    }
}

#[derive(Serialize)]
struct IdView {
    fancy: String,
    simple: String,
    len: u8,
    valid: bool,
    last_byte: u8,
}

#[derive(Serialize)]
struct AddressView {
    text: String,
    ids: Vec<String>,
    id_count: usize,
    buffer: String,
    valid: bool,
    last_byte: u8,
}

#[derive(Serialize)]
struct CheckView {
    left: String,
    right: String,
    result: bool,
}

fn mark(ok: bool) -> colored::ColoredString {
    if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    }
}

fn parse_id(text: &str) -> anyhow::Result<Id> {
    Id::try_parse(text).with_context(|| format!("parsing id {text:?}"))
}

fn parse_address(text: &str) -> anyhow::Result<Address> {
    Address::try_parse(text).with_context(|| format!("parsing address {text:?}"))
}

fn cmd_generate(
    args: &GenerateArgs,
    config: &IdpathConfig,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let mut config = config.clone();
    if let Some(size) = args.size {
        config.container.id_size = size;
    }
    let container = IdContainer::from_config(&config)?;

    let mut ids = Vec::with_capacity(args.count);
    for _ in 0..args.count {
        let id = container
            .generate_id(true)
            .map_err(|failure| anyhow!("{failure}"))?;
        ids.push(if args.fancy {
            id.to_string_fancy()
        } else {
            id.to_string_simple()
        });
    }
    debug!(count = ids.len(), size = config.container.id_size, "generated ids");

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ids)?),
        OutputFormat::Text => Ok(ids.join("\n")),
    }
}

fn cmd_id(args: &IdArgs, format: OutputFormat) -> anyhow::Result<String> {
    let id = parse_id(&args.text)?;
    let view = IdView {
        fancy: id.to_string_fancy(),
        simple: id.to_string_simple(),
        len: id.len(),
        valid: id.is_valid(),
        last_byte: id.last_byte(),
    };
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&view)?);
    }

    let mut out = format!("{} {}\n", "Id".bold(), view.fancy.cyan());
    writeln!(out, "  simple:    {}", view.simple)?;
    writeln!(out, "  length:    {}", view.len)?;
    writeln!(out, "  valid:     {}", mark(view.valid))?;
    write!(out, "  last byte: {:#04x}", view.last_byte)?;
    Ok(out)
}

fn cmd_address(args: &AddressArgs, format: OutputFormat) -> anyhow::Result<String> {
    let address = if args.raw {
        let bytes = hex::decode(&args.text).context("decoding raw address buffer")?;
        Address::from_bytes(bytes)
    } else {
        parse_address(&args.text)?
    };
    let view = AddressView {
        text: address.to_string(),
        ids: address.ids().map(|id| id.to_string_fancy()).collect(),
        id_count: address.id_count(),
        buffer: hex::encode_upper(address.as_bytes()),
        valid: address.is_valid(),
        last_byte: address.last_byte(),
    };
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&view)?);
    }

    let mut out = format!("{} {}\n", "Address".bold(), view.text.cyan());
    writeln!(out, "  valid:  {}", mark(view.valid))?;
    writeln!(out, "  ids:    {}", view.id_count)?;
    for (n, id) in view.ids.iter().enumerate() {
        writeln!(out, "    [{n}] {}", id.yellow())?;
    }
    write!(out, "  buffer: {}", view.buffer.dimmed())?;
    Ok(out)
}

fn cmd_contains(args: &ContainsArgs, format: OutputFormat) -> anyhow::Result<String> {
    let haystack = parse_address(&args.haystack)?;
    let needle = parse_address(&args.needle)?;
    let view = CheckView {
        left: haystack.to_string(),
        right: needle.to_string(),
        result: haystack.contains(&needle),
    };
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&view)?);
    }
    let verb = if view.result { "contains" } else { "does not contain" };
    Ok(format!("{} {} {verb} {}", mark(view.result), view.left.cyan(), view.right.cyan()))
}

fn cmd_prefix(args: &PrefixArgs, format: OutputFormat) -> anyhow::Result<String> {
    let partial = parse_address(&args.partial)?;
    let full = parse_address(&args.full)?;
    let view = CheckView {
        left: partial.to_string(),
        right: full.to_string(),
        result: partial.is_partial_address(&full),
    };
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&view)?);
    }
    let verb = if view.result { "is a prefix of" } else { "is not a prefix of" };
    Ok(format!("{} {} {verb} {}", mark(view.result), view.left.cyan(), view.right.cyan()))
}

fn cmd_config(config: &IdpathConfig, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Text => Ok(config.to_toml_string()?),
    }
}
