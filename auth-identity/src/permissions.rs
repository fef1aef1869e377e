//! Permission scopes and navigation.
//!
//! Permissions are open string scopes (`"employee.manage"`), not a closed
//! enum; stores and role definitions can introduce new ones freely. A scope
//! ending in `.*` grants everything under that prefix.

use crate::models::NavigationAction;
use std::collections::BTreeSet;

pub const MANAGE_EMPLOYEE: &str = "employee.manage";
pub const VIEW_EMPLOYEE: &str = "employee.view";
pub const CREATE_EMPLOYEE: &str = "employee.create";
pub const CREATE_ROLE: &str = "role.create";
pub const ASSIGN_ROLE: &str = "role.assign";
pub const VIEW_SUPPLIER: &str = "supplier.view";
pub const VIEW_CONSUMER: &str = "consumer.view";
pub const VIEW_OWN_PROFILE: &str = "profile.view";
pub const EDIT_OWN_PROFILE: &str = "profile.edit";
pub const VIEW_OWN_RECORDS: &str = "records.view";

/// Scopes granted to every new administrator
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &[
    VIEW_EMPLOYEE,
    CREATE_EMPLOYEE,
    CREATE_ROLE,
    ASSIGN_ROLE,
    VIEW_SUPPLIER,
    VIEW_CONSUMER,
    VIEW_OWN_PROFILE,
    EDIT_OWN_PROFILE,
];

/// Scopes granted to every new consumer account
pub const DEFAULT_CONSUMER_PERMISSIONS: &[&str] =
    &[VIEW_OWN_PROFILE, EDIT_OWN_PROFILE, VIEW_OWN_RECORDS];

/// (title, route, required scope)
const NAVIGATION_CATALOG: &[(&str, &str, Option<&str>)] = &[
    ("Home", "/home", None),
    ("My Profile", "/profile", Some(VIEW_OWN_PROFILE)),
    ("My Records", "/records", Some(VIEW_OWN_RECORDS)),
    ("Employees", "/admin/employees", Some(VIEW_EMPLOYEE)),
    ("Add Employee", "/admin/employees/new", Some(CREATE_EMPLOYEE)),
    ("Roles", "/admin/roles", Some(CREATE_ROLE)),
    ("Suppliers", "/admin/suppliers", Some(VIEW_SUPPLIER)),
    ("Consumers", "/admin/consumers", Some(VIEW_CONSUMER)),
];

pub fn scope_set(scopes: &[&str]) -> BTreeSet<String> {
    scopes.iter().map(|s| (*s).to_string()).collect()
}

pub fn has_permission(granted: &BTreeSet<String>, required: &str) -> bool {
    if granted.contains(required) {
        return true;
    }
    granted.iter().any(|scope| {
        scope.strip_suffix(".*").is_some_and(|prefix| {
            required
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'))
        })
    })
}

/// Navigation entries visible to a holder of `granted`
pub fn navigation_for(granted: &BTreeSet<String>) -> Vec<NavigationAction> {
    NAVIGATION_CATALOG
        .iter()
        .filter(|(_, _, required)| required.map_or(true, |r| has_permission(granted, r)))
        .map(|(title, route, required)| NavigationAction {
            title: (*title).to_string(),
            route: (*route).to_string(),
            required_permission: required.map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_scope() {
        let granted = scope_set(&[MANAGE_EMPLOYEE]);
        assert!(has_permission(&granted, MANAGE_EMPLOYEE));
        assert!(!has_permission(&granted, CREATE_ROLE));
    }

    #[test]
    fn test_wildcard_scope() {
        let granted = scope_set(&["employee.*"]);
        assert!(has_permission(&granted, MANAGE_EMPLOYEE));
        assert!(has_permission(&granted, VIEW_EMPLOYEE));
        assert!(!has_permission(&granted, "employees.view"));
        assert!(!has_permission(&granted, CREATE_ROLE));
    }

    #[test]
    fn test_admin_defaults_do_not_include_manage() {
        let granted = scope_set(DEFAULT_ADMIN_PERMISSIONS);
        assert!(!has_permission(&granted, MANAGE_EMPLOYEE));
    }

    #[test]
    fn test_navigation_filtered_by_scope() {
        let consumer = navigation_for(&scope_set(DEFAULT_CONSUMER_PERMISSIONS));
        let routes: Vec<&str> = consumer.iter().map(|n| n.route.as_str()).collect();
        assert_eq!(routes, vec!["/home", "/profile", "/records"]);

        let admin = navigation_for(&scope_set(DEFAULT_ADMIN_PERMISSIONS));
        assert!(admin.iter().any(|n| n.route == "/admin/employees"));
        assert!(!admin.iter().any(|n| n.route == "/records"));
    }
}
