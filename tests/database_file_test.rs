// ABOUTME: File-backed SQLite tests: migrations are repeatable and state survives a restart
// ABOUTME: Uses a temporary directory so runs never touch the working tree
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{init_test_logging, tuesday_at, RecordingSender, PLANNER, SAM};
use huddle_sms::config::environment::DatabaseUrl;
use huddle_sms::conversation::ConversationRouter;
use huddle_sms::database::{guest_states, planners, Database};
use huddle_sms::server::AppResources;
use huddle_sms::sms::SmsSender;
use tempfile::TempDir;

fn router_over(database: Database) -> ConversationRouter {
    let sender: Arc<dyn SmsSender> = Arc::new(RecordingSender::default());
    ConversationRouter::new(Arc::new(AppResources::new(database, sender, None, None)))
}

#[tokio::test]
async fn test_migrations_are_repeatable() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let url = DatabaseUrl::SQLite {
        path: dir.path().join("nested").join("huddle.db"),
    };

    let database = Database::new(&url).await.unwrap();
    database.migrate().await.unwrap();

    assert!(dir.path().join("nested").join("huddle.db").exists());
}

#[tokio::test]
async fn test_conversation_survives_restart() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let url = DatabaseUrl::SQLite {
        path: dir.path().join("huddle.db"),
    };

    {
        let router = router_over(Database::new(&url).await.unwrap());
        for body in ["hi", "Jordan", "Sam 510-555-0199", "done", "Friday", "1"] {
            router
                .handle_inbound_at(PLANNER, "", body, tuesday_at(12, 0))
                .await
                .unwrap();
        }
    }

    let database = Database::new(&url).await.unwrap();
    let mut conn = database.pool().acquire().await.unwrap();
    let planner = planners::find_by_phone(&mut conn, PLANNER).await.unwrap().unwrap();
    assert_eq!(planner.name.as_deref(), Some("Jordan"));
    assert!(guest_states::find_by_phone(&mut conn, SAM).await.unwrap().is_some());
    drop(conn);

    let router = router_over(database);
    let reply = router
        .handle_inbound_at(SAM, "", "2-4", tuesday_at(13, 0))
        .await
        .unwrap();
    assert!(reply.starts_with("Got it!"));
}
