use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use std::path::PathBuf;

use nullbatch::commands;
use nullbatch::core::config::Config;
use nullbatch::ui::press_enter_to_exit;

fn build_cli() -> Command {
    let files_arg = Arg::new("files")
        .help("Installers (.exe, .msi), archives (.zip, .7z) or folders to queue")
        .value_name("FILES")
        .value_parser(clap::value_parser!(PathBuf))
        .num_args(1..);

    Command::new("nullbatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Queue installers and archives, run them one by one, watch the log and host load")
        .args_conflicts_with_subcommands(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Config file to use instead of the default location")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Install log file (default: install_log.txt)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .long("silent")
                .help("Pass /quiet /norestart to every installer")
                .action(ArgAction::SetTrue)
                .conflicts_with("interactive")
                .global(true),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Run installers with their own UI, no extra arguments")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(files_arg.clone())
        .subcommand(
            Command::new("tui")
                .about("Open the installer dashboard (default)")
                .arg(files_arg.clone()),
        )
        .subcommand(
            Command::new("run")
                .about("Install files without the dashboard, printing the log")
                .arg(files_arg.required(true))
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Do not ask for confirmation")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_name("SECS")
                        .help("Kill an installer that runs longer than this")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("kill-on-stop")
                        .long("kill-on-stop")
                        .help("Kill the running installer on Ctrl+C instead of leaving it running")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("metrics")
                .about("Print CPU, memory and disk usage snapshots")
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .help("Number of snapshots to print")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("5"),
                )
                .arg(
                    Arg::new("backend")
                        .long("backend")
                        .help("Metrics source (default from config)")
                        .value_parser(["native", "command"]),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output one JSON object per snapshot")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or create the config file (use 'nullbatch config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Show the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(
                    Command::new("init").about("Write a config file with defaults").arg(
                        Arg::new("force")
                            .long("force")
                            .help("Overwrite an existing config file")
                            .action(ArgAction::SetTrue),
                    ),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for")
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .required(true)
                        .index(1),
                ),
        )
}

fn init_diagnostics(matches: &ArgMatches) {
    let dashboard = matches!(matches.subcommand(), None | Some(("tui", _)));

    if !dashboard {
        nullbatch::init_logging();
        return;
    }

    // The dashboard owns the terminal, so diagnostics go to a file
    match Config::get_diagnostics_path() {
        Ok(path) => nullbatch::init_file_logging(&path),
        Err(_) => nullbatch::init_file_logging(&PathBuf::from("nullbatch-diagnostics.log")),
    }
}

fn dispatch(matches: &ArgMatches) -> Result<i32> {
    match matches.subcommand() {
        Some(("tui", sub_matches)) => commands::tui(sub_matches)?,
        Some(("run", sub_matches)) => return commands::run(sub_matches),
        Some(("metrics", sub_matches)) => commands::metrics(sub_matches)?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        Some(("completions", sub_matches)) => {
            commands::completions::execute(sub_matches, &mut build_cli())?
        }
        _ => commands::tui(matches)?,
    }

    Ok(0)
}

fn main() {
    let matches = build_cli().get_matches();

    init_diagnostics(&matches);

    match dispatch(&matches) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            press_enter_to_exit();
            std::process::exit(1);
        }
    }
}
