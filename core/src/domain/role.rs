// core/src/domain/role.rs

//! User roles and the role → permission matrix.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(
  feature = "postgres",
  derive(sqlx::Type),
  sqlx(type_name = "user_role", rename_all = "snake_case")
)]
pub enum Role {
  Client,
  Partner,
  Manager,
  Admin,
}

impl Role {
  pub const ALL: [Role; 4] = [Role::Client, Role::Partner, Role::Manager, Role::Admin];

  pub fn as_str(self) -> &'static str {
    match self {
      Role::Client => "client",
      Role::Partner => "partner",
      Role::Manager => "manager",
      Role::Admin => "admin",
    }
  }

  /// Human-facing role name.
  pub fn display_name(self) -> &'static str {
    match self {
      Role::Client => "Client",
      Role::Partner => "Partner",
      Role::Manager => "Manager",
      Role::Admin => "Administrator",
    }
  }

  /// Managers and administrators.
  pub fn is_staff(self) -> bool {
    matches!(self, Role::Manager | Role::Admin)
  }

  pub fn is_manager(self) -> bool {
    self == Role::Manager
  }

  pub fn is_client(self) -> bool {
    self == Role::Client
  }

  pub fn is_admin(self) -> bool {
    self == Role::Admin
  }

  pub fn can(self, permission: Permission) -> bool {
    self.permissions().contains(&permission)
  }

  pub fn permissions(self) -> &'static [Permission] {
    use Permission::*;
    match self {
      Role::Admin => Permission::ALL,
      Role::Manager => &[
        ViewCar,
        ViewBooking,
        ChangeBooking,
        ViewReview,
        ChangeReview,
        AddSupportChat,
        ViewSupportChat,
        ChangeSupportChat,
        AddSupportMessage,
        ViewSupportMessage,
        ChangeSupportMessage,
        ViewUser,
        ViewPartnerPayout,
        ChangePartnerPayout,
        ChangePayment,
      ],
      Role::Partner => &[
        ViewCar,
        AddCar,
        ChangeCar,
        DeleteCar,
        ViewBooking,
        ViewReview,
        ViewPartnerPayout,
        AddPartnerPayout,
      ],
      Role::Client => &[
        ViewCar,
        ViewBooking,
        AddBooking,
        AddPayment,
        AddReview,
        ViewReview,
        AddSupportChat,
        ViewSupportChat,
        ChangeSupportChat,
        AddSupportMessage,
        ViewSupportMessage,
      ],
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "client" => Ok(Role::Client),
      "partner" => Ok(Role::Partner),
      "manager" => Ok(Role::Manager),
      "admin" | "administrator" => Ok(Role::Admin),
      other => Err(DomainError::Invalid(format!("Unknown role '{}'.", other))),
    }
  }
}

/// Model-level actions, named after the model they apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
  ViewCar,
  AddCar,
  ChangeCar,
  DeleteCar,
  ViewBooking,
  AddBooking,
  ChangeBooking,
  AddPayment,
  ChangePayment,
  AddReview,
  ViewReview,
  ChangeReview,
  AddSupportChat,
  ViewSupportChat,
  ChangeSupportChat,
  AddSupportMessage,
  ViewSupportMessage,
  ChangeSupportMessage,
  ViewPartnerPayout,
  AddPartnerPayout,
  ChangePartnerPayout,
  ViewUser,
  ChangeUser,
  ViewDashboard,
}

impl Permission {
  pub const ALL: &'static [Permission] = &[
    Permission::ViewCar,
    Permission::AddCar,
    Permission::ChangeCar,
    Permission::DeleteCar,
    Permission::ViewBooking,
    Permission::AddBooking,
    Permission::ChangeBooking,
    Permission::AddPayment,
    Permission::ChangePayment,
    Permission::AddReview,
    Permission::ViewReview,
    Permission::ChangeReview,
    Permission::AddSupportChat,
    Permission::ViewSupportChat,
    Permission::ChangeSupportChat,
    Permission::AddSupportMessage,
    Permission::ViewSupportMessage,
    Permission::ChangeSupportMessage,
    Permission::ViewPartnerPayout,
    Permission::AddPartnerPayout,
    Permission::ChangePartnerPayout,
    Permission::ViewUser,
    Permission::ChangeUser,
    Permission::ViewDashboard,
  ];

  /// Codename in `<action>_<model>` form.
  pub fn codename(self) -> &'static str {
    match self {
      Permission::ViewCar => "view_car",
      Permission::AddCar => "add_car",
      Permission::ChangeCar => "change_car",
      Permission::DeleteCar => "delete_car",
      Permission::ViewBooking => "view_booking",
      Permission::AddBooking => "add_booking",
      Permission::ChangeBooking => "change_booking",
      Permission::AddPayment => "add_payment",
      Permission::ChangePayment => "change_payment",
      Permission::AddReview => "add_review",
      Permission::ViewReview => "view_review",
      Permission::ChangeReview => "change_review",
      Permission::AddSupportChat => "add_supportchat",
      Permission::ViewSupportChat => "view_supportchat",
      Permission::ChangeSupportChat => "change_supportchat",
      Permission::AddSupportMessage => "add_supportmessage",
      Permission::ViewSupportMessage => "view_supportmessage",
      Permission::ChangeSupportMessage => "change_supportmessage",
      Permission::ViewPartnerPayout => "view_partnerpayout",
      Permission::AddPartnerPayout => "add_partnerpayout",
      Permission::ChangePartnerPayout => "change_partnerpayout",
      Permission::ViewUser => "view_user",
      Permission::ChangeUser => "change_user",
      Permission::ViewDashboard => "view_dashboard",
    }
  }
}

impl fmt::Display for Permission {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.codename())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn admin_holds_every_permission() {
    for p in Permission::ALL {
      assert!(Role::Admin.can(*p), "admin lacks {}", p);
    }
  }

  #[test]
  fn managers_handle_bookings_and_support_but_not_cars() {
    assert!(Role::Manager.can(Permission::ChangeBooking));
    assert!(Role::Manager.can(Permission::ChangeSupportChat));
    assert!(Role::Manager.can(Permission::ViewUser));
    assert!(!Role::Manager.can(Permission::AddCar));
    assert!(!Role::Manager.can(Permission::ChangeUser));
    assert!(!Role::Manager.can(Permission::ViewDashboard));
  }

  #[test]
  fn partners_manage_cars_and_request_payouts() {
    assert!(Role::Partner.can(Permission::AddCar));
    assert!(Role::Partner.can(Permission::DeleteCar));
    assert!(Role::Partner.can(Permission::AddPartnerPayout));
    assert!(!Role::Partner.can(Permission::ChangePartnerPayout));
    assert!(!Role::Partner.can(Permission::AddSupportMessage));
  }

  #[test]
  fn clients_book_review_and_chat() {
    assert!(Role::Client.can(Permission::AddBooking));
    assert!(Role::Client.can(Permission::AddReview));
    assert!(Role::Client.can(Permission::AddSupportMessage));
    assert!(!Role::Client.can(Permission::ChangeBooking));
    assert!(!Role::Client.can(Permission::AddCar));
  }

  #[test]
  fn role_predicates() {
    assert!(Role::Manager.is_staff() && Role::Manager.is_manager());
    assert!(Role::Admin.is_staff() && !Role::Admin.is_manager());
    assert!(Role::Client.is_client() && !Role::Partner.is_client());
    assert_eq!(Role::Admin.display_name(), "Administrator");
    assert_eq!("Administrator".parse::<Role>(), Ok(Role::Admin));
  }
}
