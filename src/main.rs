use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xplc::config::Config;
use xplc::explainer::ErrorExplainer;

const CONFIG_USAGE: &str = "Usage: xplc config [--set-key PROVIDER KEY] [--default PROVIDER] [--list]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with the wrapped command's stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let mut config = Config::load()?;

    if let Some(config_matches) = matches.subcommand_matches("config") {
        return handle_config(&mut config, config_matches);
    }

    let command_args: Vec<String> = matches
        .get_many::<String>("command")
        .unwrap_or_default()
        .cloned()
        .collect();

    if command_args.is_empty() {
        print_usage();
        return Ok(());
    }

    let provider = matches.get_one::<String>("provider").map(String::as_str);
    let explainer = ErrorExplainer::new(config)?;
    let outcome = explainer.explain(&command_args, provider).await?;
    debug!("Finished with {:?}", outcome);

    Ok(())
}

fn cli() -> Command {
    Command::new("xplc")
        .about("xplc - AI-powered CLI error explainer")
        .long_about("Runs a command and, if it fails, asks an AI provider to explain the error and suggest a fix")
        .version(env!("CARGO_PKG_VERSION"))
        .disable_help_subcommand(true)
        .args_conflicts_with_subcommands(true)
        .arg(Arg::new("provider")
            .long("provider")
            .short('p')
            .help("AI provider (openai, claude, gemini)")
            .value_name("PROVIDER")
            .num_args(1))
        .arg(Arg::new("command")
            .help("Command to run and explain")
            .num_args(1..)
            .trailing_var_arg(true)
            .allow_hyphen_values(true))
        .subcommand(Command::new("config")
            .about("Configure xplc")
            .arg(Arg::new("set-key")
                .long("set-key")
                .help("Set API key for provider")
                .value_names(["PROVIDER", "KEY"])
                .num_args(2))
            .arg(Arg::new("default")
                .long("default")
                .help("Set default AI provider")
                .value_name("PROVIDER")
                .num_args(1))
            .arg(Arg::new("list")
                .long("list")
                .help("List current configuration")
                .action(ArgAction::SetTrue)))
}

fn handle_config(config: &mut Config, matches: &ArgMatches) -> anyhow::Result<()> {
    if let Some(values) = matches.get_many::<String>("set-key") {
        let values: Vec<&String> = values.collect();
        if let [provider, key] = values.as_slice() {
            config.set_api_key(provider, key)?;
        }
    } else if let Some(provider) = matches.get_one::<String>("default") {
        config.set_default_provider(provider)?;
    } else if matches.get_flag("list") {
        config.show_config_info();
    } else {
        println!("{}", CONFIG_USAGE);
    }
    Ok(())
}

fn print_usage() {
    println!("Usage: xplc [--provider PROVIDER] <command>");
    println!("       xplc config [--set-key PROVIDER KEY] [--default PROVIDER] [--list]");
    println!("\nExamples:");
    println!("  xplc python script.py");
    println!("  xplc --provider gemini npm start");
    println!("  xplc config --set-key gemini YOUR_API_KEY");
}
