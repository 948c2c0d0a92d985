//! Purpose: `cmskit` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Successful commands print exactly one JSON document on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::collections::HashMap;
use std::error::Error as StdError;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use cmskit::api::{Client, ClientConfig, Error, ErrorKind, Parameter, to_exit_code};
use cmskit::core::content::{Block, Section};
use cmskit::core::element::{Element, elements_from_map};
use cmskit::core::mapping::apply_mapping;

#[derive(Parser, Debug)]
#[command(
    name = "cmskit",
    version,
    about = "Inspect and fetch headless CMS content as normalized JSON",
    after_help = r#"EXAMPLES
  $ cmskit inspect section payload.json
  $ cat elements.json | cmskit inspect elements -
  $ cmskit map section.json title=headline cover=media.cover
  $ CMSKIT_API_TOKEN=... cmskit fetch blocks --sections --elements
  $ cmskit fetch --dev section 101 --elements"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, help = "Emit pretty JSON even when stdout is not a terminal")]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an entity from a JSON payload and print its normalized form.
    Inspect {
        #[arg(value_enum)]
        entity: Entity,
        #[arg(help = "Payload file, or `-` for stdin", value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },
    /// Project a section's elements onto a JSON object by key path.
    Map {
        #[arg(help = "Section payload file, or `-` for stdin", value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[arg(help = "Mappings as ELEMENT=KEY.PATH", required = true)]
        mappings: Vec<String>,
    },
    /// Request content from the CMS.
    Fetch {
        #[command(flatten)]
        connection: ConnectionArgs,
        #[command(subcommand)]
        target: FetchTarget,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Entity {
    Section,
    Block,
    Elements,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    #[arg(long, env = "CMSKIT_API_TOKEN", hide_env_values = true, help = "Project api token")]
    token: Option<String>,
    #[arg(long, env = "CMSKIT_DEVELOPMENT", help = "Use the development host")]
    dev: bool,
    #[arg(long, env = "CMSKIT_LOCALE", help = "Content locale (two letters)")]
    locale: Option<String>,
    #[arg(long, env = "CMSKIT_BASE_URL", help = "Override the api base url")]
    base_url: Option<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, help = "Number of items to skip")]
    skip: Option<u64>,
    #[arg(long, help = "Number of items to return")]
    take: Option<u64>,
    #[arg(long, help = "Sort field; prefix with `-` for descending")]
    sort: Option<String>,
    #[arg(long = "filter", value_name = "FIELD=VALUE", help = "Filter (repeatable)")]
    filters: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum FetchTarget {
    Project {
        #[arg(long)]
        contracts: bool,
    },
    Blocks {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        sections: bool,
        #[arg(long, requires = "sections")]
        elements: bool,
    },
    Block {
        id: i64,
        #[arg(long)]
        sections: bool,
        #[arg(long, requires = "sections")]
        elements: bool,
    },
    Sections {
        block_id: i64,
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        elements: bool,
    },
    Section {
        id: i64,
        #[arg(long)]
        elements: bool,
    },
    Elements {
        section_id: i64,
    },
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<i32, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(exit_code);
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `cmskit --help`."));
            }
        },
    };

    let value = match cli.command {
        Command::Inspect { entity, input } => inspect(entity, &read_payload(&input)?)?,
        Command::Map { input, mappings } => map_section(&read_payload(&input)?, &mappings)?,
        Command::Fetch { connection, target } => fetch(connection, target)?,
    };
    emit_json(&value, cli.pretty);
    Ok(0)
}

fn read_payload(input: &Path) -> Result<Value, Error> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read stdin")
                .with_source(err)
        })?;
        buf
    } else {
        std::fs::read_to_string(input).map_err(|err| {
            let kind = if err.kind() == io::ErrorKind::NotFound {
                ErrorKind::NotFound
            } else {
                ErrorKind::Io
            };
            Error::new(kind)
                .with_message(format!("failed to read {}", input.display()))
                .with_source(err)
        })?
    };
    let value: Value = serde_json::from_str(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("input is not valid json")
            .with_source(err)
    })?;
    Ok(unwrap_envelope(value))
}

/// Accepts either a bare entity or a `{status_code, body}` response envelope.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut object)
            if object.contains_key("status_code")
                && object.get("body").is_some_and(Value::is_object) =>
        {
            object.remove("body").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn inspect(entity: Entity, payload: &Value) -> Result<Value, Error> {
    if !payload.is_object() {
        return Err(Error::new(ErrorKind::Usage).with_message("payload must be a json object"));
    }
    match entity {
        Entity::Section => to_json(&Section::from_payload(payload)),
        Entity::Block => to_json(&Block::from_payload(payload)),
        Entity::Elements => to_json(&element_map(payload)),
    }
}

/// Accepts an `{items: {...}}` response payload or a bare name → descriptor map.
fn element_map(payload: &Value) -> HashMap<String, Element> {
    match payload.get("items") {
        Some(Value::Object(items)) => elements_from_map(items),
        _ => payload
            .as_object()
            .map(elements_from_map)
            .unwrap_or_default(),
    }
}

fn map_section(payload: &Value, mappings: &[String]) -> Result<Value, Error> {
    let pairs = mappings
        .iter()
        .map(|raw| {
            raw.split_once('=')
                .filter(|(name, path)| !name.is_empty() && !path.is_empty())
                .ok_or_else(|| {
                    Error::new(ErrorKind::Usage)
                        .with_message(format!("invalid mapping `{raw}`"))
                        .with_hint("Use ELEMENT=KEY.PATH, for example title=card.headline.")
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let section = Section::from_payload(payload);
    Ok(apply_mapping(&section, pairs, Value::Object(Map::new())))
}

fn fetch(connection: ConnectionArgs, target: FetchTarget) -> Result<Value, Error> {
    let client = Client::connect(client_config(connection)?);
    match target {
        FetchTarget::Project { contracts } => to_json(&client.get_project(contracts)?),
        FetchTarget::Blocks {
            list,
            sections,
            elements,
        } => {
            let (blocks, meta) = client.get_blocks(&list_parameters(&list)?, sections, elements)?;
            Ok(json!({"items": to_json(&blocks)?, "meta": to_json(&meta)?}))
        }
        FetchTarget::Block {
            id,
            sections,
            elements,
        } => to_json(&client.get_block(id, &[], sections, elements)?),
        FetchTarget::Sections {
            block_id,
            list,
            elements,
        } => {
            let (sections, meta) =
                client.get_sections(block_id, &list_parameters(&list)?, elements)?;
            Ok(json!({"items": to_json(&sections)?, "meta": to_json(&meta)?}))
        }
        FetchTarget::Section { id, elements } => to_json(&client.get_section(id, elements)?),
        FetchTarget::Elements { section_id } => to_json(&client.get_elements(section_id)?),
    }
}

fn client_config(connection: ConnectionArgs) -> Result<ClientConfig, Error> {
    let token = connection.token.ok_or_else(|| {
        Error::new(ErrorKind::Usage)
            .with_message("missing api token")
            .with_hint("Pass --token or set CMSKIT_API_TOKEN.")
    })?;
    let mut config = ClientConfig::new(token)?.with_development(connection.dev);
    if let Some(locale) = connection.locale {
        config = config.with_locale(&locale);
    }
    if let Some(base_url) = connection.base_url {
        config = config.with_base_url(&base_url)?;
    }
    Ok(config)
}

fn list_parameters(list: &ListArgs) -> Result<Vec<Parameter>, Error> {
    let mut parameters = Vec::new();
    for raw in &list.filters {
        let (field, value) = raw.split_once('=').ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid filter `{raw}`"))
                .with_hint("Use FIELD=VALUE, for example id=4,5.")
        })?;
        parameters.push(Parameter::filter(field, value));
    }
    if let Some(sort) = &list.sort {
        parameters.push(match sort.strip_prefix('-') {
            Some(field) => Parameter::sort(field, false),
            None => Parameter::sort(sort.as_str(), true),
        });
    }
    if list.skip.is_some() || list.take.is_some() {
        parameters.push(Parameter::Pagination {
            skip: list.skip.unwrap_or(0),
            take: list.take.unwrap_or(10),
        });
    }
    Ok(parameters)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode json")
            .with_source(err)
    })
}

fn emit_json(value: &Value, pretty: bool) {
    let pretty = pretty || io::stdout().is_terminal();
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {}", error_message(err));
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Decode => "decoding failed".to_string(),
        ErrorKind::Api => "api error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
