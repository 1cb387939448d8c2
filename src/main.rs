use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use serde::Serialize;
use serde_json::Value;

use preset_engine::contract::ContentMount;
use preset_engine::discovery::{discover_presets, load_json, preset_id_for};
use preset_engine::logging::{init_logging, LoggingConfig};
use preset_engine::{
    aggregate_contract, build_all_pages, build_page_from_preset, build_site_schema_from_preset,
    build_structural_tree, verify_page, verify_site, CompileOptions, ContentContract,
    RenderIssue, SitePreset, WidgetRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "preset-engine", version, about = "Compile site presets into render-ready schemas")]
struct Cli {
    /// Log filter in env_logger syntax, e.g. "debug" or "preset_engine=debug".
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the site-level schema.
    Site {
        #[command(flatten)]
        compile: CompileArgs,
    },
    /// Compile one page (or every page with --all).
    Page {
        #[command(flatten)]
        compile: CompileArgs,
        /// Page id or slug; unknown pages fall back to the first page.
        #[arg(long)]
        page: Option<String>,
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },
    /// Aggregate a JSON array of content mounts into a contract.
    Contract {
        mounts: PathBuf,
    },
    /// Map contract fields onto the places in a preset that use them.
    Structure {
        preset: PathBuf,
        /// Contract JSON, or a mounts array when --mounts is set.
        contract: PathBuf,
        #[arg(long)]
        mounts: bool,
    },
    /// List presets discovered under a directory.
    List {
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CompileArgs {
    preset: PathBuf,
    #[arg(long)]
    content: Option<PathBuf>,
    #[arg(long)]
    no_intro: bool,
    #[arg(long)]
    no_transition: bool,
    /// Exit non-zero when the output is not render ready.
    #[arg(long)]
    strict: bool,
}

impl CompileArgs {
    fn load_preset(&self) -> Result<(String, SitePreset)> {
        let id = preset_id_for(&self.preset)
            .with_context(|| format!("cannot derive a preset id from {}", self.preset.display()))?;
        let preset = load_json(&self.preset)?;
        Ok((id, preset))
    }

    fn load_content(&self) -> Result<Option<Value>> {
        match &self.content {
            Some(path) => Ok(Some(load_json(path)?)),
            None => Ok(None),
        }
    }

    fn options(&self, content: Option<Value>) -> CompileOptions {
        CompileOptions {
            content,
            include_intro: !self.no_intro,
            include_transition: !self.no_transition,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(issues: &[RenderIssue], strict: bool) -> Result<()> {
    for issue in issues {
        warn!("[{}] {} at {}", issue.code, issue.message, issue.location);
    }
    if strict && !issues.is_empty() {
        bail!("{} render-ready issue(s)", issues.len());
    }
    Ok(())
}

fn load_contract(path: &Path, as_mounts: bool) -> Result<ContentContract> {
    if as_mounts {
        let mounts: Vec<ContentMount> = load_json(path)?;
        Ok(aggregate_contract(&mounts)?)
    } else {
        Ok(load_json(path)?)
    }
}

fn run(command: Command) -> Result<()> {
    let registry = WidgetRegistry::standard();
    match command {
        Command::Site { compile } => {
            let (id, preset) = compile.load_preset()?;
            let content = compile.load_content()?;
            let site = build_site_schema_from_preset(&id, &preset, &compile.options(content.clone()));
            print_json(&site)?;
            // without content the chrome legitimately keeps its placeholders
            if content.is_some() {
                report(&verify_site(&site, &registry), compile.strict)?;
            }
        }
        Command::Page { compile, page, all } => {
            let (_, preset) = compile.load_preset()?;
            let content = compile.load_content()?.unwrap_or_else(|| Value::Object(Default::default()));
            let pages = if all {
                build_all_pages(&preset, &content)
            } else {
                build_page_from_preset(&preset, page.as_deref(), &content)
                    .into_iter()
                    .collect()
            };
            if pages.is_empty() {
                bail!("preset {} declares no pages", compile.preset.display());
            }
            let issues: Vec<RenderIssue> = pages
                .iter()
                .flat_map(|page| verify_page(page, &registry))
                .collect();
            if all {
                print_json(&pages)?;
            } else {
                print_json(&pages[0])?;
            }
            report(&issues, compile.strict)?;
        }
        Command::Contract { mounts } => {
            let mounts: Vec<ContentMount> = load_json(&mounts)?;
            print_json(&aggregate_contract(&mounts)?)?;
        }
        Command::Structure {
            preset,
            contract,
            mounts,
        } => {
            let preset: SitePreset = load_json(&preset)?;
            let contract = load_contract(&contract, mounts)?;
            print_json(&build_structural_tree(&preset, &contract))?;
        }
        Command::List { dir } => {
            let presets = discover_presets(&dir)?;
            let listing: Vec<Value> = presets
                .iter()
                .map(|(id, preset)| {
                    serde_json::json!({
                        "id": id,
                        "pages": preset.pages.keys().collect::<Vec<_>>(),
                    })
                })
                .collect();
            print_json(&listing)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::with_filter(cli.log));
    run(cli.command)
}
