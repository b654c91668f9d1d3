// ABOUTME: Inbound message router deciding guest vs planner and committing handler results
// ABOUTME: One transaction per message under a per-phone lock; SMS goes out only after commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Router
//!
//! The only place where the planner-vs-guest decision is made:
//!
//! 1. A guest conversation row for the sender routes to the guest machine.
//! 2. Otherwise a planner row routes to the planner machine, starting an
//!    event when none is in flight.
//! 3. Otherwise a nameless planner is created and welcomed.
//!
//! Store failures roll the whole message back and the sender gets a generic
//! "try again" reply.
//!
//! ## Turn phases
//!
//! 1. Read a [`Snapshot`] with plain autocommit reads.
//! 2. Run the handler on it with recording collaborators. LLM and venue
//!    latency is paid here, while no write lock is held.
//! 3. Open the write transaction, re-read the snapshot, re-run the handler
//!    against the recorded answers, apply and commit. Only this phase is
//!    retried on lock contention.
//! 4. Deliver the reply and notifications from a spawned task, so a
//!    cancelled request cannot cut the dispatch short after commit.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use huddle_core::models::{Contact, Event, Guest, GuestConversation, Planner};
use huddle_parsers::phone::{mask_phone, normalize_phone};
use huddle_parsers::GuestWindow;
use sqlx::SqliteConnection;
use tracing::{error, info, instrument, warn};

use super::guest::{self, GuestContext};
use super::planner::{self, PlannerContext};
use super::tape::CollaboratorTape;
use super::{Collaborators, Mutation, NextState, SideEffect, TransitionResult};
use crate::database::{
    availability, contacts, events, guest_states, guests, planners, retry_transaction,
    DEFAULT_MAX_RETRIES,
};
use crate::errors::{AppError, AppResult};
use crate::formatters::generic_failure;
use crate::server::AppResources;
use crate::sms::Messenger;

/// Rows one turn needs, read before any collaborator call and again inside
/// the write transaction
enum Snapshot {
    Welcome,
    CollectName {
        planner: Planner,
        contacts: Vec<Contact>,
    },
    StartEvent {
        planner: Planner,
        contacts: Vec<Contact>,
    },
    Planner {
        planner: Planner,
        contacts: Vec<Contact>,
        event: Event,
        guests: Vec<Guest>,
        windows: Vec<GuestWindow>,
    },
    Guest {
        conversation: GuestConversation,
        guest: Guest,
        event: Event,
        planner: Planner,
        guests: Vec<Guest>,
    },
}

/// A snapshot plus the guest conversation that turned out to be stale
struct Loaded {
    snapshot: Snapshot,
    stale: Option<GuestConversation>,
}

/// Entry point for every inbound SMS
#[derive(Clone)]
pub struct ConversationRouter {
    resources: Arc<AppResources>,
}

impl ConversationRouter {
    /// Router over the shared resources
    #[must_use]
    pub const fn new(resources: Arc<AppResources>) -> Self {
        Self { resources }
    }

    /// Shared resources
    #[must_use]
    pub fn resources(&self) -> &AppResources {
        &self.resources
    }

    fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            llm: self.resources.llm.as_deref(),
            venues: self.resources.venues.as_ref(),
        }
    }

    /// Handle one inbound message at the current local time
    ///
    /// # Errors
    ///
    /// Returns an error only when the sender phone cannot be normalized.
    pub async fn handle_inbound(&self, from: &str, to: &str, body: &str) -> AppResult<String> {
        self.handle_inbound_at(from, to, body, Local::now().naive_local())
            .await
    }

    /// Handle one inbound message as if received at `now` (local wall clock)
    ///
    /// The reply is sent to the sender and also returned. Delivery runs on
    /// its own task: if this future is dropped mid-dispatch, the remaining
    /// messages still go out.
    ///
    /// # Errors
    ///
    /// Returns an error only when the sender phone cannot be normalized.
    #[instrument(skip(self, body), fields(from = %mask_phone(from), to = %mask_phone(to)))]
    pub async fn handle_inbound_at(
        &self,
        from: &str,
        to: &str,
        body: &str,
        now: NaiveDateTime,
    ) -> AppResult<String> {
        let phone = normalize_phone(from)
            .map_err(|e| AppError::invalid_input(format!("Invalid sender phone: {e}")))?;

        let sender_lock = self.resources.locks.acquire(&phone).await;
        let (reply, side_effects) = match self.run_turn(&phone, body, now).await {
            Ok(result) => (result.reply, result.side_effects),
            Err(e) => {
                error!(error = %e, "Inbound message failed; transaction rolled back");
                (generic_failure(), Vec::new())
            }
        };

        let delivery = tokio::spawn(deliver(
            self.resources.messenger.clone(),
            phone,
            reply.clone(),
            side_effects,
        ));
        if let Err(e) = delivery.await {
            error!(error = %e, "Delivery task failed");
        }

        drop(sender_lock);
        self.resources.locks.prune();
        Ok(reply)
    }

    /// Read, consult collaborators, then write under a short transaction
    async fn run_turn(
        &self,
        phone: &str,
        body: &str,
        now: NaiveDateTime,
    ) -> AppResult<TransitionResult> {
        let loaded = {
            let mut conn = self
                .resources
                .database
                .pool()
                .acquire()
                .await
                .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
            load(&mut conn, phone, false).await?
        };

        let tape = CollaboratorTape::default();
        let live = self.collaborators();
        let recorder = tape.recording(live);
        decide(&loaded.snapshot, &recorder.collaborators(), phone, body, now).await;

        let replayer = tape.replaying(live.llm.is_some());
        let replay = replayer.collaborators();
        retry_transaction(
            || self.commit_turn(phone, body, now, &replay),
            DEFAULT_MAX_RETRIES,
        )
        .await
    }

    /// One write attempt: re-read, decide from recorded answers, apply, commit
    async fn commit_turn(
        &self,
        phone: &str,
        body: &str,
        now: NaiveDateTime,
        deps: &Collaborators<'_>,
    ) -> AppResult<TransitionResult> {
        let mut transaction = self.resources.database.begin().await?;
        let conn = transaction.executor()?;
        let loaded = load(conn, phone, true).await?;
        if let Some(stale) = &loaded.stale {
            warn!(event_id = %stale.event_id, "Dropping stale guest conversation");
            guest_states::delete(conn, &stale.phone).await?;
        }
        let result = decide(&loaded.snapshot, deps, phone, body, now).await;
        apply(conn, &result).await?;
        transaction.commit().await?;
        Ok(result)
    }
}

/// Send the reply, then every notification in order
async fn deliver(
    messenger: Messenger,
    phone: String,
    reply: String,
    side_effects: Vec<SideEffect>,
) {
    messenger.reply(&phone, &reply).await;
    for SideEffect::Notify { to, body } in side_effects {
        messenger.notify(&to, &body).await;
    }
}

/// Read what the sender's turn needs. With `lock`, the event row is written
/// first so concurrent turns on one event serialize.
async fn load(conn: &mut SqliteConnection, phone: &str, lock: bool) -> AppResult<Loaded> {
    let mut stale = None;
    if let Some(conversation) = guest_states::find_by_phone(conn, phone).await? {
        if let Some(snapshot) = load_guest(conn, &conversation, lock).await? {
            return Ok(Loaded {
                snapshot,
                stale: None,
            });
        }
        stale = Some(conversation);
    }

    let snapshot = load_planner(conn, phone, lock).await?;
    Ok(Loaded { snapshot, stale })
}

async fn load_planner(conn: &mut SqliteConnection, phone: &str, lock: bool) -> AppResult<Snapshot> {
    let Some(planner) = planners::find_by_phone(conn, phone).await? else {
        return Ok(Snapshot::Welcome);
    };
    let saved_contacts = contacts::list_for_planner(conn, &planner.id).await?;
    if planner.name.is_none() {
        return Ok(Snapshot::CollectName {
            planner,
            contacts: saved_contacts,
        });
    }
    let Some(active) = events::active_for_planner(conn, &planner.id).await? else {
        return Ok(Snapshot::StartEvent {
            planner,
            contacts: saved_contacts,
        });
    };

    let event = if lock {
        events::lock(conn, &active.id).await?;
        events::get(conn, &active.id).await?.unwrap_or(active)
    } else {
        active
    };
    let event_guests = guests::list_for_event(conn, &event.id).await?;
    let windows = if event.stage.is_availability_stage() {
        availability::windows_for_overlap(conn, &event.id).await?
    } else {
        Vec::new()
    };
    Ok(Snapshot::Planner {
        planner,
        contacts: saved_contacts,
        event,
        guests: event_guests,
        windows,
    })
}

/// `None` when the conversation no longer points at a live guest
async fn load_guest(
    conn: &mut SqliteConnection,
    conversation: &GuestConversation,
    lock: bool,
) -> AppResult<Option<Snapshot>> {
    let Some(event) = events::get(conn, &conversation.event_id).await? else {
        return Ok(None);
    };
    if lock {
        events::lock(conn, &event.id).await?;
    }
    let Some(guest) =
        guests::find_by_event_and_phone(conn, &event.id, &conversation.phone).await?
    else {
        return Ok(None);
    };
    let Some(planner) = planners::get(conn, &event.planner_id).await? else {
        return Ok(None);
    };
    let event_guests = guests::list_for_event(conn, &event.id).await?;
    Ok(Some(Snapshot::Guest {
        conversation: conversation.clone(),
        guest,
        event,
        planner,
        guests: event_guests,
    }))
}

/// Run the matching state machine over a snapshot
async fn decide(
    snapshot: &Snapshot,
    deps: &Collaborators<'_>,
    phone: &str,
    body: &str,
    now: NaiveDateTime,
) -> TransitionResult {
    match snapshot {
        Snapshot::Welcome => {
            info!(role = "new_planner", "Routing inbound message");
            planner::welcome(phone)
        }
        Snapshot::CollectName { planner, contacts } => {
            info!(role = "onboarding", "Routing inbound message");
            planner::collect_name(planner, contacts, body)
        }
        Snapshot::StartEvent { planner, contacts } => {
            info!(role = "planner", stage = "new_event", "Routing inbound message");
            planner::start_event(planner, contacts, body)
        }
        Snapshot::Planner {
            planner,
            contacts,
            event,
            guests,
            windows,
        } => {
            info!(role = "planner", event_id = %event.id, stage = %event.stage, "Routing inbound message");
            let ctx = PlannerContext {
                planner,
                event,
                guests,
                contacts,
                windows,
                now,
            };
            planner::handle(&ctx, deps, body).await
        }
        Snapshot::Guest {
            conversation,
            guest,
            event,
            planner,
            guests,
        } => {
            info!(role = "guest", event_id = %event.id, step = %conversation.step, "Routing inbound message");
            let ctx = GuestContext {
                conversation,
                guest,
                event,
                planner,
                guests,
                today: now.date(),
            };
            guest::handle(&ctx, deps, body).await
        }
    }
}

/// Apply a handler's writes and next state inside the open transaction
async fn apply(conn: &mut SqliteConnection, result: &TransitionResult) -> AppResult<()> {
    for mutation in &result.mutations {
        apply_mutation(conn, mutation).await?;
    }
    match &result.next_state {
        NextState::Unchanged => {}
        NextState::Planner { event_id, stage } => events::set_stage(conn, event_id, *stage).await?,
        NextState::Guest(conversation) => guest_states::put(conn, conversation).await?,
        NextState::GuestCompleted { phone } => guest_states::delete(conn, phone).await?,
    }
    Ok(())
}

async fn apply_mutation(conn: &mut SqliteConnection, mutation: &Mutation) -> AppResult<()> {
    match mutation {
        Mutation::CreatePlanner(planner) => planners::insert(conn, planner).await,
        Mutation::SetPlannerName { planner_id, name } => {
            planners::set_name(conn, planner_id, name).await
        }
        Mutation::SaveEvent(event) => events::save(conn, event).await,
        Mutation::DeleteEvent { event_id } => {
            guest_states::delete_for_event(conn, event_id).await?;
            events::delete(conn, event_id).await
        }
        Mutation::UpsertGuest(guest) => guests::upsert(conn, guest).await,
        Mutation::DeleteGuest {
            guest_id,
            phone,
            event_id,
        } => {
            guests::delete(conn, guest_id).await?;
            let open = guest_states::find_by_phone(conn, phone).await?;
            if open.is_some_and(|conversation| conversation.event_id == *event_id) {
                guest_states::delete(conn, phone).await?;
            }
            Ok(())
        }
        Mutation::UpsertContact(contact) => contacts::upsert(conn, contact).await,
        Mutation::DeleteContact { contact_id } => contacts::delete(conn, contact_id).await,
        Mutation::ReplaceAvailability {
            event_id,
            guest_id,
            windows,
        } => availability::replace_for_guest(conn, event_id, guest_id, windows).await,
        Mutation::PutGuestState(conversation) => guest_states::put(conn, conversation).await,
    }
}
