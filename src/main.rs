use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term::{
    self,
    termcolor::{ColorChoice, StandardStream},
};
use indexmap::IndexMap;
use serde::Deserialize;

use nineml::ir::ast::{BoundDynamics, Dynamics};
use nineml::{ComposeOptions, MultiDynamics, PortConnection, PortExposure};

#[derive(Parser, Debug)]
#[command(version, about = "NineML Dynamics binder and composer", long_about = None)]
struct Args {
    /// The JSON model document
    #[arg(name = "MODEL_FILE")]
    model_file: String,

    /// Bind the components and stop
    #[arg(short, long, default_value_t = false)]
    bind_only: bool,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// Components plus an optional composition of them.
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    components: Vec<Dynamics>,
    #[serde(default)]
    multi: Option<MultiDocument>,
    #[serde(default)]
    options: ComposeOptions,
}

#[derive(Debug, Deserialize)]
struct MultiDocument {
    name: String,
    /// Sub-component name to component class name.
    sub_components: IndexMap<String, String>,
    #[serde(default)]
    exposures: Vec<PortExposure>,
    #[serde(default)]
    connections: Vec<PortConnection>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    nineml::init_logger();

    let source = std::fs::read_to_string(&args.model_file)
        .with_context(|| format!("reading {}", args.model_file))?;
    let doc: Document = match serde_json::from_str(&source) {
        Ok(doc) => doc,
        Err(err) => {
            let span = byte_span(&source, err.line(), err.column());
            report(&args.model_file, &source, &err.to_string(), span)?;
            bail!("failed to load {}", args.model_file);
        }
    };
    let bar = "=".repeat(40);

    if args.verbose {
        println!("\n\n{}", bar);
        println!("DOCUMENT");
        println!("{}", bar);
        println!("{:#?}", doc);
    }

    let mut bound: HashMap<String, Arc<BoundDynamics>> = HashMap::new();
    for component in doc.components {
        let name = component.name().to_string();
        let component = component
            .bind()
            .with_context(|| format!("binding component '{name}'"))?;
        if bound.insert(name.clone(), Arc::new(component)).is_some() {
            bail!("component '{name}' is defined twice");
        }
    }
    log::info!("bound {} components", bound.len());

    let multi = match doc.multi {
        Some(multi) if !args.bind_only => multi,
        _ => {
            let mut names: Vec<&String> = bound.keys().collect();
            names.sort();
            let components: Vec<Dynamics> = names
                .into_iter()
                .map(|name| bound[name].as_ref().clone().unbind())
                .collect();
            println!("{}", serde_json::to_string_pretty(&components)?);
            return Ok(());
        }
    };

    let mut sub_components = Vec::new();
    for (sub_name, class) in &multi.sub_components {
        let Some(component) = bound.get(class) else {
            bail!("sub-component '{sub_name}' refers to unknown component '{class}'");
        };
        sub_components.push((sub_name.clone(), Arc::clone(component)));
    }
    let composite = MultiDynamics::compose(
        multi.name.clone(),
        sub_components,
        multi.exposures,
        multi.connections,
        &doc.options,
    )
    .with_context(|| format!("composing '{}'", multi.name))?;
    // The composite must bind like any other component.
    composite
        .clone()
        .bind()
        .with_context(|| format!("binding composite '{}'", multi.name))?;

    println!("{}", serde_json::to_string_pretty(&composite)?);
    Ok(())
}

/// Byte range of the character at 1-based `line` and `column`.
fn byte_span(source: &str, line: usize, column: usize) -> Range<usize> {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let start = (line_start + column.saturating_sub(1)).min(source.len());
    start..(start + 1).min(source.len())
}

fn report(name: &str, source: &str, message: &str, span: Range<usize>) -> Result<()> {
    let file = SimpleFile::new(name, source);
    let diagnostic = Diagnostic::error()
        .with_message("invalid model document")
        .with_labels(vec![Label::primary((), span).with_message(message)]);
    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = term::Config::default();
    term::emit(&mut writer.lock(), &config, &file, &diagnostic)?;
    Ok(())
}
