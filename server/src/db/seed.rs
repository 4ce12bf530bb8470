// server/src/db/seed.rs

//! Demo data for local runs. Safe to apply repeatedly.

use crate::db::{reference, users};
use crate::errors::{AppError, Result as AppResult};
use crate::services::auth_service;
use carshare_core::Role;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

pub struct DemoUser {
  pub email: &'static str,
  pub username: &'static str,
  pub password: &'static str,
  pub first_name: &'static str,
  pub last_name: &'static str,
  pub role: Role,
}

pub const DEMO_USERS: [DemoUser; 4] = [
  DemoUser {
    email: "admin@carshare.local",
    username: "admin",
    password: "admin-pass-123",
    first_name: "Alex",
    last_name: "Admin",
    role: Role::Admin,
  },
  DemoUser {
    email: "manager@carshare.local",
    username: "manager",
    password: "manager-pass-123",
    first_name: "Maria",
    last_name: "Manager",
    role: Role::Manager,
  },
  DemoUser {
    email: "partner@carshare.local",
    username: "partner",
    password: "partner-pass-123",
    first_name: "Pavel",
    last_name: "Partner",
    role: Role::Partner,
  },
  DemoUser {
    email: "client@carshare.local",
    username: "client",
    password: "client-pass-123",
    first_name: "Cora",
    last_name: "Client",
    role: Role::Client,
  },
];

/// (brand, model, year, transmission, engine, category, per hour, per day)
const DEMO_CARS: [(&str, &str, i32, &str, &str, &str, i64, i64); 6] = [
  ("Kia", "Rio", 2021, "automatic", "petrol", "Economy", 450_00, 2_900_00),
  ("Hyundai", "Solaris", 2022, "manual", "petrol", "Economy", 400_00, 2_600_00),
  ("Skoda", "Octavia", 2022, "automatic", "petrol", "Comfort", 650_00, 4_200_00),
  ("Toyota", "Camry", 2023, "automatic", "hybrid", "Business", 950_00, 6_500_00),
  ("Toyota", "RAV4", 2022, "automatic", "petrol", "SUV", 900_00, 6_000_00),
  ("BMW", "5 Series", 2023, "automatic", "diesel", "Premium", 1_500_00, 10_000_00),
];

#[derive(Debug, Default)]
pub struct SeedReport {
  pub reference_rows: u64,
  pub users_created: usize,
  pub cars_created: usize,
}

/// Removes reviews, payments, bookings, images and cars. Users and reference data stay.
pub async fn clear(pool: &PgPool) -> AppResult<()> {
  let mut tx = pool.begin().await?;
  for table in ["reviews", "payments", "bookings", "car_images", "cars"] {
    sqlx::query(&format!("DELETE FROM {}", table)).execute(&mut *tx).await?;
  }
  tx.commit().await?;
  info!("Cleared car and booking data.");
  Ok(())
}

#[instrument(skip(pool))]
pub async fn seed(pool: &PgPool, clear_first: bool) -> AppResult<SeedReport> {
  if clear_first {
    clear(pool).await?;
  }
  let mut report = SeedReport {
    reference_rows: reference::load_initial_data(pool).await?,
    ..SeedReport::default()
  };

  let mut partner_id = None;
  for demo in &DEMO_USERS {
    let user = match users::find_by_email(pool, demo.email).await? {
      Some(existing) => existing,
      None => {
        let new_user = users::NewUser {
          email: demo.email.to_string(),
          username: demo.username.to_string(),
          password_hash: auth_service::hash_password(demo.password)?,
          first_name: demo.first_name.to_string(),
          last_name: demo.last_name.to_string(),
          phone: None,
          driver_license: None,
          role: demo.role,
        };
        report.users_created += 1;
        users::insert_user(pool, &new_user).await?
      }
    };
    if demo.role == Role::Partner {
      partner_id = Some(user.id);
    }
  }
  let partner_id = partner_id.ok_or_else(|| AppError::Internal("Demo partner missing".to_string()))?;

  report.cars_created = seed_cars(pool, partner_id).await?;
  info!(
    reference_rows = report.reference_rows,
    users_created = report.users_created,
    cars_created = report.cars_created,
    "Seed complete."
  );
  Ok(report)
}

async fn seed_cars(pool: &PgPool, partner_id: Uuid) -> AppResult<usize> {
  let mut created = 0;
  for (brand, model, year, transmission, engine, category, per_hour, per_day) in DEMO_CARS {
    let exists = sqlx::query_scalar::<_, bool>(
      "SELECT EXISTS(SELECT 1 FROM cars WHERE partner_id = $1 AND brand = $2 AND model = $3)",
    )
    .bind(partner_id)
    .bind(brand)
    .bind(model)
    .fetch_one(pool)
    .await?;
    if exists {
      continue;
    }
    let transmission_id = reference::transmission_id(pool, transmission)
      .await?
      .ok_or_else(|| AppError::Internal(format!("Transmission '{}' not loaded", transmission)))?;
    let category_id = reference::category_id(pool, category).await?;
    sqlx::query(
      "INSERT INTO cars (brand, model, year, transmission_id, engine_type, description, price_per_hour_cents, \
         price_per_day_cents, mileage_limit, address, partner_id, category_id) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 300, 'Central parking, level -1', $9, $10)",
    )
    .bind(brand)
    .bind(model)
    .bind(year)
    .bind(transmission_id)
    .bind(engine)
    .bind(format!("{} {} {}, {} engine.", year, brand, model, engine))
    .bind(per_hour)
    .bind(per_day)
    .bind(partner_id)
    .bind(category_id)
    .execute(pool)
    .await?;
    created += 1;
  }
  Ok(created)
}
