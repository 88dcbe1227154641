//! Configuration constant check tests.

use serde_json::json;

use wp_redis_doctor_core::{CheckKind, Diagnostic, MemoryCache, Status};

use super::helpers::{run_captured, FakeHost, Site, StaticProbe};

#[tokio::test]
async fn disabled_flag_warns() {
    let site = Site::healthy();
    let host = FakeHost::healthy(&site).with_constant("WP_REDIS_DISABLED", json!(true));
    let diagnostic = Diagnostic::new(host, StaticProbe::full(), MemoryCache::new());

    let (result, text) = run_captured(&diagnostic).await;
    let report = result.unwrap();

    let check = report.check(CheckKind::Configuration).unwrap();
    assert_eq!(check.findings[0].status, Status::Warn);
    assert_eq!(check.findings[1].status, Status::Pass);
    assert!(text.contains("⚠️ WP_REDIS_DISABLED is set to true - Redis cache is disabled\n"));
}

#[tokio::test]
async fn falsy_disabled_flag_is_ignored() {
    for value in [json!(false), json!(0), json!("0"), json!("")] {
        let site = Site::healthy();
        let host = FakeHost::healthy(&site).with_constant("WP_REDIS_DISABLED", value.clone());
        let diagnostic = Diagnostic::new(host, StaticProbe::full(), MemoryCache::new());

        let report = diagnostic.run(std::io::sink()).await.unwrap();
        let check = report.check(CheckKind::Configuration).unwrap();

        assert!(!check.has(Status::Warn), "{} should not warn", value);
    }
}

#[tokio::test]
async fn config_fields_are_printed() {
    let site = Site::healthy();
    let host = FakeHost::healthy(&site).with_constant(
        "WP_REDIS_CONFIG",
        json!({"host": "redis", "port": 6379, "database": 3, "prefix": "wp"}),
    );
    let diagnostic = Diagnostic::new(host, StaticProbe::full(), MemoryCache::new());

    let (result, text) = run_captured(&diagnostic).await;
    result.unwrap();

    assert!(text.contains(
        "✅ WP_REDIS_CONFIG is defined\n   Host: redis\n   Port: 6379\n   Database: 3\n"
    ));
}

#[tokio::test]
async fn absent_config_fields_are_not_set() {
    let site = Site::healthy();
    let host = FakeHost::healthy(&site).with_constant("WP_REDIS_CONFIG", json!({"host": "cache"}));
    let diagnostic = Diagnostic::new(host, StaticProbe::full(), MemoryCache::new());

    let (result, _) = run_captured(&diagnostic).await;
    let report = result.unwrap();

    let check = report.check(CheckKind::Configuration).unwrap();
    assert_eq!(
        check.findings[0].details,
        vec!["Host: cache", "Port: not set", "Database: not set"]
    );
}

#[tokio::test]
async fn undefined_config_fails() {
    let site = Site::healthy();
    let host = FakeHost::healthy(&site).without_constant("WP_REDIS_CONFIG");
    let diagnostic = Diagnostic::new(host, StaticProbe::full(), MemoryCache::new());

    let (result, text) = run_captured(&diagnostic).await;
    let report = result.unwrap();

    let check = report.check(CheckKind::Configuration).unwrap();
    assert_eq!(check.findings.len(), 1);
    assert_eq!(check.findings[0].status, Status::Fail);
    assert!(text.contains("❌ WP_REDIS_CONFIG is not defined in wp-config.php\n"));
}
