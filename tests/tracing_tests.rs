//! Span fields filled in while a request is handled.

mod common;

use axum::http::StatusCode;
use common::{call, register, spawn_app};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Id, Record};
use tracing_subscriber::{Layer, layer::Context, prelude::*, registry::LookupSpan};

/// Collects `(span name, user_id)` for every `user_id` recorded after creation.
#[derive(Clone, Default)]
struct UserIdRecords(Arc<Mutex<Vec<(String, String)>>>);

impl<S> Layer<S> for UserIdRecords
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = UserIdVisitor(None);
        values.record(&mut visitor);
        if let Some(user_id) = visitor.0 {
            self.0
                .lock()
                .unwrap()
                .push((span.name().to_string(), user_id));
        }
    }
}

struct UserIdVisitor(Option<String>);

impl Visit for UserIdVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        if field.name() == "user_id" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "user_id" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

#[tokio::test]
async fn test_request_span_records_user_id() {
    let records = UserIdRecords::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(records.clone()));

    let app = spawn_app().await;
    let token = register(&app, "traced@example.com").await;

    let (status, _) = call(&app, "GET", "/api/user/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let recorded = records.0.lock().unwrap().clone();
    assert_eq!(recorded, vec![("request".to_string(), "1".to_string())]);
}

#[tokio::test]
async fn test_rejected_request_records_no_user() {
    let records = UserIdRecords::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(records.clone()));

    let app = spawn_app().await;

    let (status, _) = call(&app, "GET", "/api/user/me", Some("0".repeat(40).as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(records.0.lock().unwrap().is_empty());
}
