// server/src/bin/admin.rs

//! Operator commands: migrations, reference and demo data, the expired-booking sweep,
//! account creation and the permission matrix.

use carshare_core::{Permission, Role, Workflows};
use carshare_server::config::AppConfig;
use carshare_server::db::{self, reference, seed, users};
use carshare_server::errors::{AppError, Result as AppResult};
use carshare_server::pipelines::{self, expired_bookings_pipeline, signup_pipeline};
use carshare_server::services::auth_service;
use carshare_server::state::AppState;
use carshare_server::telemetry;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "carshare-admin", version, about = "Administrative commands for the car-sharing service")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Apply the embedded database migrations.
  Migrate,
  /// Load transmission types and car categories.
  LoadInitialData,
  /// Load reference data, demo users and demo cars.
  Seed {
    /// Delete reviews, payments, bookings, images and cars first.
    #[arg(long)]
    clear: bool,
  },
  /// Complete active bookings whose end date has passed.
  UpdateBookingStatuses,
  /// Create an account with the given role.
  CreateUser {
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
    #[arg(long, default_value = "manager")]
    role: String,
  },
  /// Print the role to permission matrix.
  Permissions,
}

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();
  telemetry::init_tracing(telemetry::log_format_from_env(), "warn,carshare_server=info");
  let cli = Cli::parse();
  if let Err(err) = run(cli.command).await {
    tracing::error!(error = %err, "Command failed.");
    eprintln!("error: {}", err);
    std::process::exit(1);
  }
}

async fn run(command: Command) -> AppResult<()> {
  if let Command::Permissions = command {
    print_permissions();
    return Ok(());
  }

  let config = AppConfig::from_env()?;
  let pool = db::connect(&config.database_url, config.database_max_connections).await?;

  match command {
    Command::Migrate => {
      db::run_migrations(&pool).await?;
      println!("Migrations applied.");
    }
    Command::LoadInitialData => {
      let created = reference::load_initial_data(&pool).await?;
      println!("Reference data loaded ({} new rows).", created);
    }
    Command::Seed { clear } => {
      let report = seed::seed(&pool, clear).await?;
      println!(
        "Seed complete: {} reference rows, {} users, {} cars created.",
        report.reference_rows, report.users_created, report.cars_created
      );
      for demo in &seed::DEMO_USERS {
        println!("  {:<13} {:<26} {}", demo.role.display_name(), demo.email, demo.password);
      }
    }
    Command::UpdateBookingStatuses => {
      let workflows = Arc::new(Workflows::<AppError>::new());
      pipelines::register_all_pipelines(&workflows);
      let state = AppState {
        db_pool: pool,
        workflows,
        config: Arc::new(config),
      };
      let report = expired_bookings_pipeline::run_sweep(&state).await?;
      println!(
        "Completed {} expired bookings, purged {} expired sessions.",
        report.completed, report.sessions_purged
      );
    }
    Command::CreateUser {
      email,
      username,
      password,
      role,
    } => {
      let role: Role = role.parse()?;
      signup_pipeline::validate_email(&email)?;
      signup_pipeline::validate_username(&username)?;
      auth_service::validate_new_password(&password)?;
      if let Some(field) = users::taken_identifier(&pool, &email, &username).await? {
        return Err(AppError::Conflict(format!("A user with that {} already exists.", field)));
      }
      let user = users::insert_user(
        &pool,
        &users::NewUser {
          email,
          username,
          password_hash: auth_service::hash_password(&password)?,
          first_name: String::new(),
          last_name: String::new(),
          phone: None,
          driver_license: None,
          role,
        },
      )
      .await?;
      println!("Created {} '{}' ({}).", user.role.display_name(), user.username, user.id);
    }
    Command::Permissions => unreachable!("handled before connecting"),
  }
  Ok(())
}

fn print_permissions() {
  for role in Role::ALL {
    let codenames: Vec<&str> = role.permissions().iter().map(|p| p.codename()).collect();
    println!("{} ({}): {}", role.display_name(), codenames.len(), codenames.join(", "));
  }
  println!("{} permissions in total.", Permission::ALL.len());
}
