use std::time::Duration;

use crate::common::{TestApp, routes};
use serde_json::json;

const QUIET: Duration = Duration::from_millis(300);

mod protocol {
    use super::*;

    #[tokio::test]
    async fn ping_is_answered_with_pong() {
        let app = TestApp::spawn().await;
        let mut ws = app.connect_ws().await;

        ws.send(&json!({ "type": "ping" })).await;

        assert_eq!(ws.recv().await, json!({ "type": "pong" }));
    }

    #[tokio::test]
    async fn malformed_frame_gets_an_error_and_keeps_the_connection() {
        let app = TestApp::spawn().await;
        let mut ws = app.connect_ws().await;

        ws.send_text("{not json").await;
        let reply = ws.recv().await;
        assert_eq!(reply["type"], "error");
        assert!(reply["message"].is_string());

        ws.send(&json!({ "type": "ping" })).await;
        assert_eq!(ws.recv().await["type"], "pong");
    }

    #[tokio::test]
    async fn join_is_acknowledged() {
        let app = TestApp::spawn().await;
        let mut ws = app.connect_ws().await;

        ws.send(&json!({ "type": "join_event", "eventId": 3, "participantId": 12 }))
            .await;

        assert_eq!(
            ws.recv().await,
            json!({ "type": "joined", "eventId": 3, "participantId": 12 })
        );
    }
}

mod broadcasting {
    use super::*;

    #[tokio::test]
    async fn vote_reaches_subscribers_of_that_event_only() {
        let app = TestApp::spawn().await;
        let event = app.create_event("RustConf").await;
        let other = app.create_event("Elsewhere").await;
        let session = app.create_session(event, "Keynote", true).await;
        let ada = app.register(event, "ada").await;
        let poll = app.create_poll(session, &["A", "B"]).await;

        let mut watcher = app.connect_ws().await;
        watcher.join(event, None).await;
        let mut bystander = app.connect_ws().await;
        bystander.join(other, None).await;
        let mut unscoped = app.connect_ws().await;

        assert_eq!(app.vote(poll, ada, 1).await.status, 200);

        let results = watcher.recv_type("poll_results").await;
        assert_eq!(results["pollId"], poll);
        assert_eq!(results["results"]["totalResponses"], 1);
        assert_eq!(results["results"]["options"][1]["count"], 1);

        let stats = watcher.recv_type("stats_updated").await;
        assert_eq!(stats["eventId"], event);
        assert_eq!(stats["stats"]["avgEngagement"].as_f64(), Some(5.0));

        bystander.expect_silence(QUIET).await;
        unscoped.expect_silence(QUIET).await;
    }

    #[tokio::test]
    async fn second_join_moves_the_connection() {
        let app = TestApp::spawn().await;
        let first = app.create_event("First").await;
        let second = app.create_event("Second").await;

        let mut ws = app.connect_ws().await;
        ws.join(first, None).await;
        ws.join(second, None).await;

        app.post(&routes::activate(first), &json!({})).await;
        ws.expect_silence(QUIET).await;

        app.post(&routes::activate(second), &json!({})).await;
        assert_eq!(
            ws.recv().await,
            json!({ "type": "event_activated", "eventId": second })
        );
    }

    #[tokio::test]
    async fn leave_event_stops_delivery() {
        let app = TestApp::spawn().await;
        let event = app.create_event("RustConf").await;

        let mut ws = app.connect_ws().await;
        ws.join(event, None).await;
        ws.send(&json!({ "type": "leave_event" })).await;
        // The pong proves the leave frame was processed first.
        ws.send(&json!({ "type": "ping" })).await;
        assert_eq!(ws.recv().await["type"], "pong");

        app.post(&routes::activate(event), &json!({})).await;
        ws.expect_silence(QUIET).await;
    }

    #[tokio::test]
    async fn closed_connection_does_not_affect_the_others() {
        let app = TestApp::spawn().await;
        let event = app.create_event("RustConf").await;
        let session = app.create_session(event, "Keynote", true).await;
        let ada = app.register(event, "ada").await;

        let mut gone = app.connect_ws().await;
        gone.join(event, None).await;
        let mut staying = app.connect_ws().await;
        staying.join(event, None).await;
        gone.close().await;

        let res = app.check_in(session, ada).await;
        assert_eq!(res.status, 201);

        let checkin = staying.recv_type("checkin").await;
        assert_eq!(checkin["sessionId"], session);
        assert_eq!(checkin["participantId"], ada);
    }

    #[tokio::test]
    async fn question_lifecycle_is_pushed() {
        let app = TestApp::spawn().await;
        let event = app.create_event("RustConf").await;
        let session = app.create_session(event, "Keynote", true).await;
        let ada = app.register(event, "ada").await;
        let bob = app.register(event, "bob").await;

        let mut ws = app.connect_ws().await;
        ws.join(event, None).await;

        let asked = app
            .post(
                &routes::questions(session),
                &json!({ "participantId": ada, "question": "Why Rust?", "isAnonymous": true }),
            )
            .await;
        let question = asked.id();

        let posted = ws.recv_type("question_posted").await;
        assert_eq!(posted["question"]["id"], question);
        assert!(posted["question"]["participantId"].is_null());

        app.post(&routes::upvotes(question), &json!({ "participantId": bob }))
            .await;
        let upvoted = ws.recv_type("question_upvoted").await;
        assert_eq!(
            upvoted,
            json!({ "type": "question_upvoted", "questionId": question, "upvotes": 1 })
        );

        app.post(&routes::answer(question), &json!({ "answer": "Speed." }))
            .await;
        let answered = ws.recv_type("question_answered").await;
        assert_eq!(answered["question"]["answer"], "Speed.");
    }

    #[tokio::test]
    async fn replacing_a_poll_announces_its_end() {
        let app = TestApp::spawn().await;
        let event = app.create_event("RustConf").await;
        let session = app.create_session(event, "Keynote", true).await;
        let first = app.create_poll(session, &["A", "B"]).await;

        let mut ws = app.connect_ws().await;
        ws.join(event, None).await;

        let second = app.create_poll(session, &["C", "D"]).await;

        let ended = ws.recv().await;
        assert_eq!(ended["type"], "poll_ended");
        assert_eq!(ended["pollId"], first);
        assert_eq!(ended["results"]["totalResponses"], 0);

        let created = ws.recv().await;
        assert_eq!(created["type"], "poll_created");
        assert_eq!(created["poll"]["id"], second);
    }
}
