//! Capture flow integration tests
//!
//! Exercises resource substitution and traffic capture end-to-end through
//! the mock proxy transport: one-shot preloads, persistent cache entries,
//! preload-over-cache priority, capture windows and flush semantics.

mod common;

use common::{snapshot, start_session};
use trawler::intercept::InterceptedRequest;

#[tokio::test]
async fn test_preload_substitutes_at_most_once() {
    let t = start_session().await;
    t.session
        .preload(snapshot("http://ex.com", "<html>stored</html>"))
        .unwrap();

    // First request is satisfied from the preload entry, verbatim
    let (forward, response) = t
        .transport
        .drive(&InterceptedRequest::get("http://ex.com"))
        .await
        .unwrap();
    assert!(!forward);
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "<html>stored</html>");
    assert_eq!(response.remote_addr.as_deref(), Some("203.0.113.7"));
    assert_eq!(response.http_version, "HTTP/1.1");

    // Second request to the same URL is a miss and goes to the wire
    let (forward, response) = t
        .transport
        .drive(&InterceptedRequest::get("http://ex.com"))
        .await
        .unwrap();
    assert!(forward);
    assert_eq!(response.status, 0);
}

#[tokio::test]
async fn test_cache_substitutes_persistently() {
    let t = start_session().await;
    t.session
        .cache(snapshot("http://ex.com", "<html>cached</html>"))
        .unwrap();

    for _ in 0..3 {
        let (forward, response) = t
            .transport
            .drive(&InterceptedRequest::get("http://ex.com"))
            .await
            .unwrap();
        assert!(!forward);
        assert_eq!(response.body, "<html>cached</html>");
    }

    assert_eq!(t.session.cached().unwrap().len(), 1);
}

#[tokio::test]
async fn test_preload_wins_over_cache_then_yields_to_it() {
    let t = start_session().await;
    t.session
        .preload(snapshot("http://ex.com", "<html>one-shot</html>"))
        .unwrap();
    t.session
        .cache(snapshot("http://ex.com", "<html>persistent</html>"))
        .unwrap();

    let (_, response) = t
        .transport
        .drive(&InterceptedRequest::get("http://ex.com"))
        .await
        .unwrap();
    assert_eq!(response.body, "<html>one-shot</html>");

    // The preload entry is consumed; the cache entry was left untouched
    let (_, response) = t
        .transport
        .drive(&InterceptedRequest::get("http://ex.com"))
        .await
        .unwrap();
    assert_eq!(response.body, "<html>persistent</html>");
}

#[tokio::test]
async fn test_capture_window_bounds_recording() {
    let t = start_session().await;
    t.session.load("http://ex.com").await.unwrap();

    t.session.start_capture();
    t.transport
        .drive(&InterceptedRequest::get("http://ex.com/inside"))
        .await
        .unwrap();
    t.session.stop_capture();

    t.transport
        .drive(&InterceptedRequest::get("http://ex.com/outside"))
        .await
        .unwrap();

    let pages = t.session.flush_pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].links.len(), 1);
    assert_eq!(pages[0].links[0].action_url, "http://ex.com/inside");
}

#[tokio::test]
async fn test_flush_drains_exactly_once() {
    let t = start_session().await;
    t.session.load("http://ex.com").await.unwrap();
    t.session.start_capture();
    t.transport
        .drive(&InterceptedRequest::get("http://ex.com"))
        .await
        .unwrap();

    let first = t.session.flush_pages().unwrap();
    assert!(!first.is_empty());

    let second = t.session.flush_pages().unwrap();
    assert!(second.is_empty());
}

#[tokio::test]
async fn test_top_level_get_becomes_link_on_its_own_page() {
    let t = start_session().await;
    t.session.start_capture();
    t.session.load("http://ex.com").await.unwrap();

    t.transport
        .drive(&InterceptedRequest::get("http://ex.com"))
        .await
        .unwrap();

    let pages = t.session.flush_pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url(), "http://ex.com");
    assert_eq!(pages[0].links[0].page_url, "http://ex.com");
    assert_eq!(pages[0].links[0].action_url, "http://ex.com");
}

#[tokio::test]
async fn test_xhr_requests_join_the_current_page() {
    let t = start_session().await;
    t.session.start_capture();
    t.session.load("http://ex.com").await.unwrap();

    t.transport
        .drive(&InterceptedRequest::get("http://ex.com"))
        .await
        .unwrap();
    // An XHR fired from the same page lands on the same Page entry
    t.transport
        .drive(&InterceptedRequest::get("http://ex.com/api"))
        .await
        .unwrap();

    let pages = t.session.flush_pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].links.len(), 2);
}

#[tokio::test]
async fn test_post_body_becomes_form_inputs() {
    let t = start_session().await;
    t.session.start_capture();
    t.session.load("http://ex.com").await.unwrap();

    t.transport
        .drive(&InterceptedRequest::post(
            "http://ex.com/login",
            &b"user=a&pass=b"[..],
        ))
        .await
        .unwrap();

    let pages = t.session.flush_pages().unwrap();
    let form = &pages[0].forms[0];
    assert_eq!(form.page_url, "http://ex.com");
    assert_eq!(form.action_url, "http://ex.com/login");
    assert_eq!(form.inputs.len(), 2);
    assert_eq!(form.inputs["user"], "a");
    assert_eq!(form.inputs["pass"], "b");
}

#[tokio::test]
async fn test_capture_creates_page_for_elementless_methods() {
    let t = start_session().await;
    t.session.start_capture();
    t.session.load("http://ex.com").await.unwrap();

    let mut request = InterceptedRequest::get("http://ex.com/health");
    request.method = trawler::model::Method::Head;
    t.transport.drive(&request).await.unwrap();

    let pages = t.session.flush_pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url(), "http://ex.com");
    assert!(pages[0].links.is_empty());
    assert!(pages[0].forms.is_empty());
}

#[tokio::test]
async fn test_concurrent_requests_consume_preload_exactly_once() {
    let t = start_session().await;
    t.session
        .preload(snapshot("http://ex.com", "<html>stored</html>"))
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let transport = t.transport.clone();
        handles.push(tokio::spawn(async move {
            transport
                .drive(&InterceptedRequest::get("http://ex.com"))
                .await
                .unwrap()
        }));
    }

    let results = futures_util::future::join_all(handles).await;
    let satisfied = results
        .into_iter()
        .map(|r| r.unwrap())
        .filter(|(forward, _)| !forward)
        .count();

    assert_eq!(satisfied, 1);
}

#[tokio::test]
async fn test_flush_racing_appends_loses_nothing() {
    let t = start_session().await;
    t.session.start_capture();
    t.session.load("http://ex.com").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..50 {
        let transport = t.transport.clone();
        handles.push(tokio::spawn(async move {
            transport
                .drive(&InterceptedRequest::get(format!("http://ex.com/{}", i)))
                .await
                .unwrap();
        }));
    }

    // Flush concurrently with the in-flight appends
    let mut collected = Vec::new();
    for _ in 0..5 {
        collected.extend(t.session.flush_pages().unwrap());
        tokio::task::yield_now().await;
    }

    for handle in handles {
        handle.await.unwrap();
    }
    collected.extend(t.session.flush_pages().unwrap());

    let total_links: usize = collected.iter().map(|p| p.links.len()).sum();
    assert_eq!(total_links, 50);
}
