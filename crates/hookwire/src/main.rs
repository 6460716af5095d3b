mod cli;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Weak};

use clap::{Parser, Subcommand};
use log::debug;
use tracing_subscriber::EnvFilter;

use hookwire_core::event::{Dispatcher, PluginEvent};
use hookwire_core::kernel::constants::PLUGIN_CONTEXT_ENTRY_POINT;
use hookwire_core::kernel::error::Result;
use hookwire_core::plugin_system::catalog;
use hookwire_core::plugin_system::identity::identity_key;
use hookwire_core::plugin_system::{ExecutionEnvironment, HookAdapter, HostCall, ModuleDescriptor, RoutingTable};
use hookwire_core::storage::{ConfigData, SharedConfig};

use crate::cli::{CliInstrumentation, SIMULATED_PACKAGE};

/// Hookwire: inspect and simulate plugin-load dispatch offline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the routed identities and the modules in every bucket
    Identities,
    /// Show which modules a plugin load would activate, without running any
    Explain {
        /// Option snapshot (.json, .yaml, .yml or .toml)
        #[arg(long)]
        config: PathBuf,
        /// Component class name, or `package/class`
        identity: String,
    },
    /// Fire simulated plugin loads through the hook adapter
    Simulate {
        /// Option snapshot (.json, .yaml, .yml or .toml)
        #[arg(long)]
        config: PathBuf,
        /// Component class names, or `package/class`
        #[arg(required = true)]
        identities: Vec<String>,
        /// Drop each plugin's environment before dispatch
        #[arg(long)]
        expired: bool,
    },
}

fn main() {
    init_logging();

    let args = CliArgs::parse();
    if let Err(e) = run(args.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    // hookwire-core logs through `log`; forward those records into tracing.
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
        return;
    }
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {}", e);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Identities => {
            let table = build_table(&SharedConfig::default())?;
            print_table(&table);
        }
        Commands::Explain { config, identity } => {
            let dispatcher = build_dispatcher(load_config(&config)?)?;
            let key = identity_key(&cli::component_for(&identity));
            print!("{}", dispatcher.plan(&key));
        }
        Commands::Simulate {
            config,
            identities,
            expired,
        } => simulate(load_config(&config)?, &identities, expired)?,
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<SharedConfig> {
    let data = ConfigData::load_file(path)?;
    debug!("Loaded {} options from {}", data.len(), path.display());
    Ok(SharedConfig::new(data))
}

fn build_table(config: &SharedConfig) -> Result<RoutingTable> {
    let table = catalog::standard_table(|feature| cli::placeholder_module(feature, config.clone()))?;
    Ok(table)
}

fn build_dispatcher(config: SharedConfig) -> Result<Dispatcher> {
    let table = build_table(&config)?;
    Ok(Dispatcher::new(Arc::new(table), Arc::new(config)))
}

fn print_table(table: &RoutingTable) {
    print_bucket("always", table.always());
    for key in table.identities() {
        print_bucket(key, table.lookup(key).modules);
    }
    print_bucket("default", table.default_bucket());
}

fn print_bucket(label: &str, modules: &[ModuleDescriptor]) {
    println!("{}:", label);
    for descriptor in modules {
        println!("  {} when {}", descriptor.name(), descriptor.predicate());
    }
}

fn simulate(config: SharedConfig, identities: &[String], expired: bool) -> Result<()> {
    let dispatcher = Arc::new(build_dispatcher(config)?);

    if expired {
        // No environment ever outlives the call, so bypass the host-call path
        // and dispatch events whose handle is already dead.
        for identity in identities {
            let event = PluginEvent::from_factory(&cli::component_for(identity), Weak::new());
            print!("{}", dispatcher.dispatch(&event));
        }
        return Ok(());
    }

    let adapter = Arc::new(HookAdapter::new(dispatcher).with_report_sink(|report| print!("{}", report)));
    let instrumentation = CliInstrumentation::default();
    adapter.install(&instrumentation)?;

    for identity in identities {
        let environment = Arc::new(ExecutionEnvironment::new(SIMULATED_PACKAGE, "simulated"));
        let call = HostCall::plugin_context(Arc::new(cli::component_for(identity)), environment);
        instrumentation.fire(PLUGIN_CONTEXT_ENTRY_POINT, &call);
    }
    Ok(())
}
