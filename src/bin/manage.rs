//! Management interface for the mail application
//!
//! ```text
//! manage check
//! manage admin-models
//! manage resolve /admin/mail/email/3/change/ --render
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use mail::admin::{AdminRequest, AdminRouter, InMemoryDatabase, ModelAdmin};
use mail::config::{Settings, configure_admin, init_logging};
use mail::models::User;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Mail application management CLI
#[derive(Debug, Parser)]
#[command(name = "manage")]
#[command(about = "Mail application management interface", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Settings file (overrides MAIL_SETTINGS)
	#[arg(long, value_name = "FILE", global = true)]
	settings: Option<PathBuf>,

	/// Verbosity level (can be repeated for more output)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
	/// Build the admin site and report its registrations
	Check,

	/// Print every admin registration as JSON
	AdminModels,

	/// Resolve an admin path to its view
	Resolve {
		#[arg(value_name = "PATH")]
		path: String,

		/// Also render the view for a superuser against an empty store
		#[arg(long)]
		render: bool,
	},
}

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();
	match run(cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("Error: {:#}", err);
			ExitCode::FAILURE
		}
	}
}

async fn run(cli: Cli) -> anyhow::Result<()> {
	let mut settings =
		Settings::load(cli.settings.as_deref()).context("failed to load settings")?;
	match cli.verbosity {
		0 => {}
		1 => settings.logging.level = "debug".to_string(),
		_ => settings.logging.level = "trace".to_string(),
	}
	init_logging(&settings.logging);

	let site = configure_admin(&settings).context("failed to configure admin site")?;

	match cli.command {
		Commands::Check => {
			for registration in site.registrations() {
				println!(
					"{} -> {}",
					registration.meta().qualified_name(),
					registration.admin().admin_class()
				);
			}
			println!(
				"System check identified no issues ({} models registered).",
				site.len()
			);
		}
		Commands::AdminModels => {
			let models: Vec<_> = site
				.registrations()
				.iter()
				.map(|registration| {
					let meta = registration.meta();
					let admin = registration.admin();
					json!({
						"model": meta.qualified_name(),
						"table": meta.table_name,
						"admin_class": admin.admin_class(),
						"admin_url": format!(
							"{}{}/{}/",
							site.url_prefix(),
							meta.app_label,
							meta.model_name.to_lowercase()
						),
						"list_display": admin.list_display(),
						"list_filter": admin.list_filter(),
						"search_fields": admin.search_fields(),
					})
				})
				.collect();
			println!("{}", serde_json::to_string_pretty(&models)?);
		}
		Commands::Resolve { path, render } => {
			let router = AdminRouter::new(Arc::new(site), Arc::new(InMemoryDatabase::new()));
			let route = router
				.resolve(&path)
				.with_context(|| format!("cannot resolve {}", path))?;
			println!("{:?}", route);

			if render {
				let user = User::new_superuser("manage");
				let response = router
					.dispatch(&user, &AdminRequest::get(path.as_str()))
					.await?;
				println!("{}", serde_json::to_string_pretty(&response)?);
			}
		}
	}
	Ok(())
}
