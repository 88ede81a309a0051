use thiserror::Error;
use tracing::warn;

use super::session::SessionRegistry;
use crate::ownership::Owner;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("auth_token needed in payload")]
    MissingToken,

    #[error("token does not grant access to this resource")]
    Unauthorized,
}

/// Allow the request only if `token` is the live token of the resource owner.
pub fn authorize(sessions: &SessionRegistry, owner: &Owner, token: Option<&str>) -> Result<(), AccessError> {
    let Owner::User(owner_id) = owner else {
        return Ok(());
    };
    let token = token.ok_or(AccessError::MissingToken)?;

    if sessions.token_for(owner_id) != Some(token) {
        warn!(owner_id = %owner_id, "Access denied: token does not belong to owner");
        return Err(AccessError::Unauthorized);
    }
    Ok(())
}

/// Resolve the user behind `token`.
pub fn authenticate<'a>(sessions: &'a SessionRegistry, token: Option<&str>) -> Result<&'a str, AccessError> {
    let token = token.ok_or(AccessError::MissingToken)?;
    sessions.user_for(token).ok_or_else(|| {
        warn!("Access denied: unknown token");
        AccessError::Unauthorized
    })
}

/// Allow attaching a record under `owner` only if the token's user is that
/// owner. Used on create and when a patch moves a record to a new parent.
pub fn authorize_create(sessions: &SessionRegistry, owner: &Owner, token: Option<&str>) -> Result<(), AccessError> {
    let Owner::User(owner_id) = owner else {
        return Ok(());
    };
    let caller = authenticate(sessions, token)?;

    if caller != owner_id.as_str() {
        warn!(caller, owner_id = %owner_id, "Attach denied: parent belongs to another user");
        return Err(AccessError::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Collection, Record, Store};
    use serde_json::json;

    fn logged_in(emails: &[&str]) -> (SessionRegistry, Vec<(String, String)>) {
        let mut store = Store::in_memory();
        let mut sessions = SessionRegistry::default();
        let mut users = Vec::new();
        for email in emails {
            let id = store
                .insert(
                    Collection::Users,
                    Record::from_json(json!({"email": email, "password_hash": "h", "name": "x"})).unwrap(),
                )
                .unwrap();
            let session = sessions.login(&store, &json!(email), &json!("h")).unwrap();
            users.push((id, session.token));
        }
        (sessions, users)
    }

    #[test]
    fn owner_token_is_accepted() {
        let (sessions, users) = logged_in(&["a@b.c"]);
        let (id, token) = &users[0];
        authorize(&sessions, &Owner::User(id.clone()), Some(token.as_str())).unwrap();
    }

    #[test]
    fn other_users_token_is_rejected() {
        let (sessions, users) = logged_in(&["a@b.c", "z@b.c"]);
        let owner = Owner::User(users[0].0.clone());
        assert_eq!(
            authorize(&sessions, &owner, Some(users[1].1.as_str())),
            Err(AccessError::Unauthorized)
        );
        assert_eq!(
            authorize(&sessions, &owner, Some("deadbeef")),
            Err(AccessError::Unauthorized)
        );
    }

    #[test]
    fn missing_token_is_distinct_from_a_bad_one() {
        let (sessions, users) = logged_in(&["a@b.c"]);
        assert_eq!(
            authorize(&sessions, &Owner::User(users[0].0.clone()), None),
            Err(AccessError::MissingToken)
        );
    }

    #[test]
    fn unowned_resources_skip_the_check() {
        let sessions = SessionRegistry::default();
        authorize(&sessions, &Owner::Nobody, None).unwrap();
        authorize_create(&sessions, &Owner::Nobody, None).unwrap();
    }

    #[test]
    fn create_derives_the_caller_from_the_token() {
        let (sessions, users) = logged_in(&["a@b.c", "z@b.c"]);
        let (alice, alice_token) = &users[0];
        let owner = Owner::User(alice.clone());

        authorize_create(&sessions, &owner, Some(alice_token.as_str())).unwrap();
        assert_eq!(
            authorize_create(&sessions, &owner, Some(users[1].1.as_str())),
            Err(AccessError::Unauthorized)
        );
        assert_eq!(
            authorize_create(&sessions, &owner, Some("unknown")),
            Err(AccessError::Unauthorized)
        );
        assert_eq!(authorize_create(&sessions, &owner, None), Err(AccessError::MissingToken));
    }

    #[test]
    fn authenticate_names_the_token_holder() {
        let (sessions, users) = logged_in(&["a@b.c"]);
        let (id, token) = &users[0];
        assert_eq!(authenticate(&sessions, Some(token.as_str())), Ok(id.as_str()));
        assert_eq!(authenticate(&sessions, Some("nope")), Err(AccessError::Unauthorized));
        assert_eq!(authenticate(&sessions, None), Err(AccessError::MissingToken));
    }
}
