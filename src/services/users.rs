//! User lookups (assignee pickers and the like).

use serde_json::Value;

use super::{unwrap_item, unwrap_list};
use crate::client::{CallOpts, GhlClient};
use crate::error::Result;

/// List users in the location. GET /users/ with locationId only.
pub fn list_users(client: &mut GhlClient) -> Result<Vec<Value>> {
    let response = client.get("/users/", &[], &CallOpts::default())?;
    Ok(unwrap_list(response, &["users"]))
}

pub fn get_user(client: &mut GhlClient, user_id: &str) -> Result<Value> {
    let response = client.get(&format!("/users/{user_id}"), &[], &CallOpts::default())?;
    Ok(unwrap_item(response, "user"))
}

pub fn current_user(client: &mut GhlClient) -> Result<Value> {
    let response = client.get("/users/me", &[], &CallOpts::default())?;
    Ok(unwrap_item(response, "user"))
}

/// Search users by name or email. List + client-side filter, so it works
/// with location-scoped auth (the search endpoint wants a companyId).
pub fn search_users(client: &mut GhlClient, query: &str) -> Result<Vec<Value>> {
    let query = query.trim().to_lowercase();
    let users = list_users(client)?;
    if query.is_empty() {
        return Ok(users);
    }
    Ok(users
        .into_iter()
        .filter(|user| user_matches(user, &query))
        .collect())
}

fn user_matches(user: &Value, query: &str) -> bool {
    ["name", "email", "firstName", "lastName"].iter().any(|key| {
        user.get(*key)
            .and_then(Value::as_str)
            .is_some_and(|value| value.to_lowercase().contains(query))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_matches_any_name_field() {
        let user = json!({
            "name": "Admin User",
            "email": "admin@example.com",
            "firstName": "Admin",
            "lastName": "User",
        });
        assert!(user_matches(&user, "admin"));
        assert!(user_matches(&user, "example.com"));
        assert!(user_matches(&user, "user"));
        assert!(!user_matches(&user, "nobody"));
        assert!(!user_matches(&json!({"id": "u-1"}), "admin"));
    }
}
