//! Integration tests for trusted-header URL and address resolution.

use ssr_gateway::app::BuildManifest;

mod common;
use common::{client, config_for, spawn_gateway, write_build, TestApp};

#[tokio::test]
async fn origin_override_rewrites_scheme_and_host_only() {
    let build = write_build(&[]);
    let mut config = config_for(build.path());
    config.forwarded.origin = Some("https://example.com".to_string());

    let app = TestApp::new();
    let gateway = spawn_gateway(config, BuildManifest::default(), app.clone()).await;

    let res = client()
        .get(gateway.url("/foo?x=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        app.seen_uri.lock().unwrap().as_deref(),
        Some("https://example.com/foo?x=1"),
        "path and query preserved, scheme and host replaced"
    );
}

#[tokio::test]
async fn host_and_protocol_headers_rewrite_the_url() {
    let build = write_build(&[]);
    let mut config = config_for(build.path());
    config.forwarded.host_header = Some("x-forwarded-host".to_string());
    config.forwarded.protocol_header = Some("x-forwarded-proto".to_string());

    let app = TestApp::new();
    let gateway = spawn_gateway(config, BuildManifest::default(), app.clone()).await;

    let res = client()
        .get(gateway.url("/path"))
        .header("x-forwarded-host", "public.example")
        .header("x-forwarded-proto", "https")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        app.seen_uri.lock().unwrap().as_deref(),
        Some("https://public.example/path")
    );
}

#[tokio::test]
async fn forwarded_for_depth_selects_from_the_right() {
    let build = write_build(&[]);
    let mut config = config_for(build.path());
    config.forwarded.address_header = Some("x-forwarded-for".to_string());
    config.forwarded.xff_depth = 1;

    let app = TestApp::new();
    let gateway = spawn_gateway(config, BuildManifest::default(), app.clone()).await;

    let res = client()
        .get(gateway.url("/"))
        .header("x-forwarded-for", "1.1.1.1, 2.2.2.2, 3.3.3.3")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "ssr:3.3.3.3");
}

#[tokio::test]
async fn forwarded_for_depth_two_steps_left() {
    let build = write_build(&[]);
    let mut config = config_for(build.path());
    config.forwarded.address_header = Some("x-forwarded-for".to_string());
    config.forwarded.xff_depth = 2;

    let app = TestApp::new();
    let gateway = spawn_gateway(config, BuildManifest::default(), app.clone()).await;

    let res = client()
        .get(gateway.url("/"))
        .header("x-forwarded-for", "1.1.1.1, 2.2.2.2, 3.3.3.3")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "ssr:2.2.2.2");
}

#[tokio::test]
async fn forwarded_for_depth_beyond_chain_fails_that_request_only() {
    let build = write_build(&[]);
    let mut config = config_for(build.path());
    config.forwarded.address_header = Some("x-forwarded-for".to_string());
    config.forwarded.xff_depth = 4;

    let app = TestApp::new();
    let gateway = spawn_gateway(config, BuildManifest::default(), app.clone()).await;

    let res = client()
        .get(gateway.url("/"))
        .header("x-forwarded-for", "1.1.1.1, 2.2.2.2, 3.3.3.3")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    let body = res.text().await.unwrap();
    assert!(body.contains("XFF_DEPTH"));
    assert!(body.contains("only found 3 addresses"));

    // the process survived; the next request is fine
    let res = client()
        .get(gateway.url("/"))
        .header("x-forwarded-for", "1.1.1.1, 2.2.2.2, 3.3.3.3, 4.4.4.4")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "ssr:1.1.1.1");
}

#[tokio::test]
async fn absent_configured_address_header_names_itself() {
    let build = write_build(&[]);
    let mut config = config_for(build.path());
    config.forwarded.address_header = Some("x-real-ip".to_string());

    let app = TestApp::new();
    let gateway = spawn_gateway(config, BuildManifest::default(), app.clone()).await;

    let res = client().get(gateway.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 500);
    let body = res.text().await.unwrap();
    assert!(body.contains("ADDRESS_HEADER"));
    assert!(body.contains("x-real-ip"));
    assert_eq!(
        app.call_count(),
        0,
        "the application must not run on a misconfigured request"
    );
}

#[tokio::test]
async fn non_list_address_header_is_used_verbatim() {
    let build = write_build(&[]);
    let mut config = config_for(build.path());
    config.forwarded.address_header = Some("x-real-ip".to_string());

    let app = TestApp::new();
    let gateway = spawn_gateway(config, BuildManifest::default(), app.clone()).await;

    let res = client()
        .get(gateway.url("/"))
        .header("x-real-ip", "203.0.113.9")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "ssr:203.0.113.9");
}

#[tokio::test]
async fn without_configured_header_the_transport_address_is_used() {
    let build = write_build(&[]);
    let app = TestApp::new();
    let gateway = spawn_gateway(
        config_for(build.path()),
        BuildManifest::default(),
        app.clone(),
    )
    .await;

    let res = client()
        .get(gateway.url("/"))
        // untrusted header, must be ignored
        .header("x-forwarded-for", "6.6.6.6")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "ssr:127.0.0.1");
}
