//! Network Speed Tester - Main CLI Application

use clap::Parser;
use network_speed_tester::{
    app::App,
    cli::Cli,
    config::EnvManager,
    error::{AppError, ErrorReporter},
};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let use_color = cli.use_colors();
    std::panic::set_hook(Box::new(move |panic_info| {
        let error = AppError::internal(format!("application panic: {}", panic_info));
        ErrorReporter::new(use_color, true).report_error(&error);
        process::exit(error.exit_code());
    }));

    if cli.env_help {
        print!("{}", EnvManager::help_text());
        return;
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    match App::new(cli).run().await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            reporter.report_error(&e);
            print_error_suggestions(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - URLs must start with http:// or https://");
            eprintln!("  - Run with --env-help to list supported environment variables");
        }
        AppError::Selection(_) => {
            eprintln!();
            eprintln!("Server selection help:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Try --document-format json with a JSON server list");
            eprintln!("  - Raise --timeout-ms if the directory download is slow");
        }
        AppError::Network(_) | AppError::Timeout(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Verify firewall or proxy settings");
        }
        _ => {}
    }
}
