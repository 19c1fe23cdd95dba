//! Tests for the metrics bridge engine

use super::*;
use crate::config::DeviceDefaults;
use crate::error::{Error, ErrorCategory};
use crate::http::DeviceTarget;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Mutex;

/// Canned device behaviour
enum Reply {
    Body(&'static str),
    Status(u16),
    Timeout,
}

struct FakeDevice {
    reply: Reply,
    seen: Mutex<Vec<DeviceTarget>>,
}

impl FakeDevice {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PayloadSource for FakeDevice {
    async fn fetch_raw(&self, target: &DeviceTarget) -> Result<String> {
        self.seen.lock().unwrap().push(target.clone());
        match self.reply {
            Reply::Body(body) => Ok(body.to_string()),
            Reply::Status(status) => Err(Error::http_status(status, "")),
            Reply::Timeout => Err(Error::Timeout { timeout_ms: 8000 }),
        }
    }
}

fn request(value: serde_json::Value) -> MetricsRequest {
    MetricsRequest::from_value(value).unwrap()
}

// ============================================================================
// Request Parsing
// ============================================================================

#[test]
fn test_request_from_body() {
    let req = MetricsRequest::from_body(
        br#"{"ip": "10.0.0.2", "port": 8080, "user": "u", "password": "p"}"#,
    )
    .unwrap();

    assert_eq!(req.ip, Some(Some("10.0.0.2".to_string())));
    assert_eq!(req.port, Some(8080));
    assert_eq!(req.user.as_deref(), Some("u"));
    assert_eq!(req.password.as_deref(), Some("p"));
}

#[test]
fn test_request_rejects_bad_bodies() {
    let bodies: [&[u8]; 6] = [b"", b"not json", b"{}", b"[]", b"null", b"\"ip\""];
    for body in bodies {
        let err = MetricsRequest::from_body(body).unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON body");
        assert_eq!(err.category(), ErrorCategory::Client);
    }
}

#[test]
fn test_request_rejects_wrong_field_types() {
    let err = MetricsRequest::from_value(json!({"port": "eighty"})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Client);
    assert!(err.to_string().starts_with("Invalid request field"));

    let err = MetricsRequest::from_value(json!({"port": 70000})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Client);
}

#[test]
fn test_request_ignores_unknown_fields() {
    let req = request(json!({"host": "zabbix", "ip": "10.0.0.2"}));
    assert_eq!(req.ip, Some(Some("10.0.0.2".to_string())));
}

// ============================================================================
// Default Resolution
// ============================================================================

#[test]
fn test_resolve_uses_defaults_for_absent_keys() {
    let config = BridgeConfig::default();
    let target = request(json!({"port": 81})).resolve(&config).unwrap();

    assert_eq!(target.host, "192.168.0.136");
    assert_eq!(target.port, 81);
    assert_eq!(target.credentials.user, "admin");
    assert_eq!(target.credentials.password, "admin");
}

#[test]
fn test_resolve_prefers_request_values() {
    let target = request(json!({
        "ip": " 10.1.1.1 ",
        "port": 8081,
        "user": "monitor",
        "password": "secret"
    }))
    .resolve(&BridgeConfig::default())
    .unwrap();

    assert_eq!(target.host, "10.1.1.1");
    assert_eq!(target.port, 8081);
    assert_eq!(target.credentials.user, "monitor");
    assert_eq!(target.credentials.password, "secret");
}

#[test]
fn test_resolve_null_port_falls_back() {
    let target = request(json!({"ip": "10.0.0.2", "port": null}))
        .resolve(&BridgeConfig::default())
        .unwrap();
    assert_eq!(target.port, 80);
}

#[test]
fn test_resolve_blank_ip_is_client_error() {
    for value in [json!({"ip": ""}), json!({"ip": "   "}), json!({"ip": null})] {
        let err = request(value).resolve(&BridgeConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "IP missing");
        assert_eq!(err.category(), ErrorCategory::Client);
    }
}

#[test]
fn test_resolve_empty_default_ip_is_client_error() {
    let config = BridgeConfig {
        device: DeviceDefaults {
            ip: String::new(),
            ..DeviceDefaults::default()
        },
        ..BridgeConfig::default()
    };
    let err = request(json!({"port": 80})).resolve(&config).unwrap_err();
    assert_eq!(err.to_string(), "IP missing");
}

#[test]
fn test_resolve_follows_configured_device() {
    let config = BridgeConfig::from_yaml_str(
        "device:\n  ip: 10.9.9.9\n  port: 8080\n  user: operator\n  password: pw",
    )
    .unwrap();
    let target = request(json!({"user": "monitor"})).resolve(&config).unwrap();

    assert_eq!(target.host, "10.9.9.9");
    assert_eq!(target.port, 8080);
    assert_eq!(target.credentials.user, "monitor");
    assert_eq!(target.credentials.password, "pw");
}

// ============================================================================
// Bridge
// ============================================================================

#[tokio::test]
async fn test_collect_decodes_payload() {
    let device = FakeDevice::new(Reply::Body(
        "tuner:1,a,b,42,57,c,12 db,-30 dbm,2e-6,0,,,,,,,,,3,a,b,x,y,c,9 dB,-50 dBm,1e-3,7",
    ));
    let bridge = MetricsBridge::new(device, &BridgeConfig::default());

    let result = bridge
        .collect(&request(json!({"ip": "10.0.0.9"})))
        .await
        .unwrap();

    let ids: Vec<i64> = result.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(result.records[1].quality, 0);
    assert_eq!(result.skipped_count(), 1);
    assert_eq!(result.tail_tokens, 1);

    let seen = bridge.source.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].host, "10.0.0.9");
    assert_eq!(seen[0].port, 80);
}

#[tokio::test]
async fn test_collect_untagged_payload_is_empty() {
    let bridge = MetricsBridge::new(
        FakeDevice::new(Reply::Body("<html>busy</html>")),
        &BridgeConfig::default(),
    );

    let result = bridge
        .collect(&request(json!({"ip": "10.0.0.9"})))
        .await
        .unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_collect_client_error_skips_device() {
    let bridge = MetricsBridge::new(FakeDevice::new(Reply::Body("tuner:")), &BridgeConfig::default());

    let err = bridge.collect(&request(json!({"ip": ""}))).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Client);
    assert!(bridge.source.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_collect_relays_transport_errors() {
    let bridge = MetricsBridge::new(FakeDevice::new(Reply::Status(500)), &BridgeConfig::default());
    let err = bridge
        .collect(&request(json!({"ip": "10.0.0.9"})))
        .await
        .unwrap_err();
    assert_eq!(err.upstream_status(), Some(500));

    let bridge = MetricsBridge::new(FakeDevice::new(Reply::Timeout), &BridgeConfig::default());
    let err = bridge
        .collect(&request(json!({"ip": "10.0.0.9"})))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Timeout);
}

#[test]
fn test_bridge_uses_configured_decoder() {
    let config = BridgeConfig::from_yaml_str("decoder:\n  chunk_width: 12\n  ber_policy: strict")
        .unwrap();
    let bridge = MetricsBridge::new(FakeDevice::new(Reply::Body("")), &config);

    assert_eq!(bridge.decoder().layout().chunk_width(), 12);
    assert_eq!(bridge.decoder().ber_policy(), crate::decode::BerPolicy::Strict);
}

#[test]
fn test_bridge_from_config() {
    let bridge = MetricsBridge::from_config(&BridgeConfig::default()).unwrap();
    assert_eq!(bridge.decoder().layout().chunk_width(), 9);
}
