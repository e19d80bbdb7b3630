//! Integration tests for the rendered public site.
//!
//! Requires the API and the site to be running; see the crate docs.

use atelier_integration_tests::{TestContext, site_base_url, unique_suffix};
use reqwest::{Client, StatusCode, header};
use serde_json::json;

fn client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
}

#[tokio::test]
#[ignore = "Requires running site and API servers"]
async fn test_site_ready_when_api_up() {
    let resp = client()
        .get(format!("{}/health/ready", site_base_url()))
        .send()
        .await
        .expect("Failed to reach site");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running site and API servers"]
async fn test_pages_render_with_security_headers() {
    for path in ["/", "/services", "/portfolio", "/blog", "/care", "/contacts"] {
        let resp = client()
            .get(format!("{}{path}", site_base_url()))
            .send()
            .await
            .expect("Failed to reach site");

        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
        let csp = resp
            .headers()
            .get(header::CONTENT_SECURITY_POLICY)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(csp.contains("'nonce-"), "GET {path} has no CSP nonce");
        assert_eq!(
            resp.headers().get(header::X_FRAME_OPTIONS).map(|v| v.as_bytes()),
            Some(b"DENY".as_slice())
        );
    }
}

#[tokio::test]
#[ignore = "Requires running site and API servers"]
async fn test_new_care_article_is_rendered() {
    let ctx = TestContext::admin().await;
    let slug = format!("nail-care-{}", unique_suffix());
    let id = ctx
        .create(
            "/api/care",
            json!({
                "slug": slug,
                "title": "Nail care at home",
                "content": "<p>File in one direction.</p>",
                "sidebarTitle": "Quick tip",
            }),
        )
        .await;

    let resp = client()
        .get(format!("{}/care/{slug}", site_base_url()))
        .send()
        .await
        .expect("Failed to reach site");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read page");
    assert!(body.contains("Nail care at home"));
    assert!(body.contains("<p>File in one direction.</p>"));
    assert!(body.contains("Quick tip"));

    let _ = ctx.delete(&format!("/api/care/{id}")).await;
}

#[tokio::test]
#[ignore = "Requires running site and API servers"]
async fn test_unknown_article_is_404_page() {
    let resp = client()
        .get(format!("{}/blog/definitely-not-a-post-{}", site_base_url(), unique_suffix()))
        .send()
        .await
        .expect("Failed to reach site");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = resp.text().await.expect("Failed to read page");
    assert!(body.contains("Page not found"));
}
