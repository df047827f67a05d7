use crate::common::{TestApp, routes};
use serde_json::json;

mod user_creation {
    use super::*;

    #[tokio::test]
    async fn creates_a_participant_by_default() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::USERS,
                &json!({ "username": "ada", "email": "Ada@Example.org" }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["username"], "ada");
        assert_eq!(res.body["email"], "ada@example.org");
        assert_eq!(res.body["role"], "participant");

        let fetched = app.get(&routes::user(res.id())).await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body["username"], "ada");
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.create_user("ada", "participant").await;

        let res = app
            .post(
                routes::USERS,
                &json!({ "username": "ada", "email": "other@example.org" }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::USERS, &json!({ "username": "ada", "email": "nope" }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.post_raw(routes::USERS, r#"{"username": "#).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::user(999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
