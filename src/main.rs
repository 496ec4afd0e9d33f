use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use antdb::cli::{Cli, Commands};
use antdb::core::Config;

fn main() -> Result<()> {
    // Terminate silently on a closed pipe (`antdb species list | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let config = Config::load();
    let filter = EnvFilter::try_new(config.log_filter(global.verbose))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Db(cmd) => antdb::cli::commands::db::run(cmd, &global),
        Commands::Species(cmd) => antdb::cli::commands::species::run(cmd, &global),
        Commands::Genus(cmd) => antdb::cli::commands::genus::run(cmd, &global),
        Commands::Region(cmd) => antdb::cli::commands::region::run(cmd, &global),
        Commands::Flight(cmd) => antdb::cli::commands::flight::run(cmd, &global),
        Commands::Import(cmd) => antdb::cli::commands::import::run(cmd, &global),
        Commands::Completions(args) => antdb::cli::commands::completions::run(args),
    }
}
