use crate::common::{TestApp, routes};
use futures::future::join_all;
use serde_json::json;

/// An event with one active session and one registered participant.
async fn setup(app: &TestApp) -> (i32, i32, i32) {
    let event = app.create_event("RustConf").await;
    let session = app.create_session(event, "Keynote", true).await;
    let participant = app.register(event, "ada").await;
    (event, session, participant)
}

mod poll_results {
    use super::*;

    #[tokio::test]
    async fn poll_without_responses_lists_every_option_at_zero() {
        let app = TestApp::spawn().await;
        let (_, session, _) = setup(&app).await;
        let poll = app.create_poll(session, &["A", "B"]).await;

        let res = app.get(&routes::poll_results(poll)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body,
            json!({
                "pollId": poll,
                "totalResponses": 0,
                "options": [
                    { "option": 0, "label": "A", "count": 0, "percentage": 0.0 },
                    { "option": 1, "label": "B", "count": 0, "percentage": 0.0 },
                ],
            })
        );
    }

    #[tokio::test]
    async fn percentages_follow_the_votes() {
        let app = TestApp::spawn().await;
        let (event, session, ada) = setup(&app).await;
        let bob = app.register(event, "bob").await;
        let cy = app.register(event, "cy").await;
        let dee = app.register(event, "dee").await;
        let poll = app.create_poll(session, &["A", "B", "C"]).await;

        for (participant, option) in [(ada, 0), (bob, 0), (cy, 0), (dee, 2)] {
            assert_eq!(app.vote(poll, participant, option).await.status, 200);
        }

        let res = app.get(&routes::poll_results(poll)).await;
        assert_eq!(res.body["totalResponses"], 4);
        let options = res.body["options"].as_array().unwrap();
        assert_eq!(options[0]["count"], 3);
        assert_eq!(options[0]["percentage"].as_f64(), Some(75.0));
        assert_eq!(options[1]["count"], 0);
        assert_eq!(options[2]["percentage"].as_f64(), Some(25.0));
    }

    #[tokio::test]
    async fn unknown_poll_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::poll_results(31337)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod poll_voting {
    use super::*;

    #[tokio::test]
    async fn voting_again_replaces_the_earlier_choice() {
        let app = TestApp::spawn().await;
        let (event, session, ada) = setup(&app).await;
        let poll = app.create_poll(session, &["A", "B"]).await;

        let first = app.vote(poll, ada, 0).await;
        assert_eq!(first.status, 200, "{}", first.text);
        let second = app.vote(poll, ada, 1).await;

        assert_eq!(second.body["totalResponses"], 1);
        assert_eq!(second.body["options"][0]["count"], 0);
        assert_eq!(second.body["options"][1]["count"], 1);
        // One vote, counted once.
        assert_eq!(app.score_of(event, ada).await, 5.0);
    }

    #[tokio::test]
    async fn out_of_range_option_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, session, ada) = setup(&app).await;
        let poll = app.create_poll(session, &["A", "B"]).await;

        for option in [2, -1] {
            let res = app.vote(poll, ada, option).await;
            assert_eq!(res.status, 400, "option {option}");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
        let tally = app.get(&routes::poll_results(poll)).await;
        assert_eq!(tally.body["totalResponses"], 0);
    }

    #[tokio::test]
    async fn ended_poll_rejects_votes() {
        let app = TestApp::spawn().await;
        let (_, session, ada) = setup(&app).await;
        let poll = app.create_poll(session, &["A", "B"]).await;

        let ended = app.post(&routes::poll_end(poll), &json!({})).await;
        assert_eq!(ended.status, 200);
        assert_eq!(ended.body["isActive"], false);
        assert!(ended.body["endedAt"].is_string());

        let res = app.vote(poll, ada, 0).await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn participant_of_another_event_cannot_vote() {
        let app = TestApp::spawn().await;
        let (_, session, _) = setup(&app).await;
        let other_event = app.create_event("Elsewhere").await;
        let outsider = app.register(other_event, "outsider").await;
        let poll = app.create_poll(session, &["A", "B"]).await;

        let res = app.vote(poll, outsider, 0).await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn unknown_participant_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, session, _) = setup(&app).await;
        let poll = app.create_poll(session, &["A", "B"]).await;

        let res = app.vote(poll, 9999, 0).await;

        assert_eq!(res.status, 404);
    }
}

mod poll_lifecycle {
    use super::*;

    #[tokio::test]
    async fn new_poll_ends_the_previous_one() {
        let app = TestApp::spawn().await;
        let (_, session, _) = setup(&app).await;
        let first = app.create_poll(session, &["A", "B"]).await;
        let second = app.create_poll(session, &["C", "D"]).await;

        let active = app.get(&routes::active_poll(session)).await;
        assert_eq!(active.id(), second);
        assert_eq!(active.body["options"], json!(["C", "D"]));

        let all = app.get(&routes::polls(session)).await;
        let polls = all.body.as_array().unwrap();
        assert_eq!(polls.len(), 2);
        let old = polls.iter().find(|p| p["id"] == first).unwrap();
        assert_eq!(old["isActive"], false);
    }

    #[tokio::test]
    async fn votes_racing_the_end_all_land_in_the_final_tally() {
        let app = TestApp::spawn().await;
        let (event, session, ada) = setup(&app).await;
        let mut voters = vec![ada];
        for name in ["bob", "cy", "dee", "eve", "fay", "gus", "hal"] {
            voters.push(app.register(event, name).await);
        }
        let poll = app.create_poll(session, &["A", "B"]).await;
        let mut ws = app.connect_ws().await;
        ws.join(event, None).await;

        let votes = join_all(voters.iter().map(|&p| app.vote(poll, p, 0)));
        let end_path = routes::poll_end(poll);
        let end_body = json!({});
        let end = app.post(&end_path, &end_body);
        let (votes, end) = tokio::join!(votes, end);

        assert_eq!(end.status, 200, "{}", end.text);
        let accepted = votes.iter().filter(|v| v.status == 200).count();
        assert!(votes.iter().all(|v| v.status == 200 || v.status == 400));

        let ended = ws.recv_type("poll_ended").await;
        assert_eq!(ended["results"]["totalResponses"], accepted);
        let tally = app.get(&routes::poll_results(poll)).await;
        assert_eq!(tally.body["totalResponses"], accepted);
        ws.close().await;
    }

    #[tokio::test]
    async fn session_without_active_poll_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, session, _) = setup(&app).await;

        let res = app.get(&routes::active_poll(session)).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn poll_needs_two_options() {
        let app = TestApp::spawn().await;
        let (_, session, _) = setup(&app).await;

        let res = app
            .post(
                &routes::polls(session),
                &json!({ "question": "Yes?", "options": ["Only"] }),
            )
            .await;

        assert_eq!(res.status, 400);
    }
}
