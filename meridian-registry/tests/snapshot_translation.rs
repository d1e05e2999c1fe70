//! Registry listings translated into published snapshots.

use meridian_core::weight::WarmupEngine;
use meridian_core::{Endpoint, EndpointStatus, EndpointUrl, RegistryDecodeError};
use meridian_registry::paths::child_path;
use meridian_registry::{RegistryEntry, ServicePaths, SnapshotTranslator};

const PROVIDER_PATH: &str = "/dev/dev/meridian-rpc/com.acme.simple.api.SimpleApi/providers";
const PROVIDER_1: &str = "/dev/dev/meridian-rpc/com.acme.simple.api.SimpleApi/providers/rest%3A%2F%2F172.20.136.45%3A8888%3Fversion%3D1.0%26accepts%3D100000%26appName%3Dsimple-server%26weight%3D100%26language%3Djava%26pid%3D14074%26interface%3Dcom.acme.simple.api.SimpleApi%26timeout%3D3000%26serialization%3Dhessian2%26protocol%3Drest%26delay%3D-1%26dynamic%3Dfalse%26startTime%3D1562221505822%26id%3Drpc-cfg-1%26uniqueId%3D%26rpcVer%3D50600";
const PROVIDER_2: &str = "/dev/dev/meridian-rpc/com.acme.simple.api.SimpleApi/providers/rest%3A%2F%2F172.20.136.46%3A8888%3Fversion%3D1.0%26accepts%3D100000%26appName%3Dsimple-server%26weight%3D100%26language%3Djava%26pid%3D14074%26interface%3Dcom.acme.simple.api.SimpleApi%26timeout%3D3000%26serialization%3Dhessian2%26protocol%3Drest%26delay%3D-1%26dynamic%3Dfalse%26startTime%3D1562221505822%26id%3Drpc-cfg-1%26uniqueId%3D%26rpcVer%3D50600";
const CONFIGURATOR_1: &str = "/dev/dev/meridian-rpc/com.acme.simple.api.SimpleApi/configurators/configurator%3a%2f%2f172.20.136.45%3a8888%3fweight%3d45%26up%3d1";
const CONFIGURATOR_2: &str = "/dev/dev/meridian-rpc/com.acme.simple.api.SimpleApi/configurators/configurator%3a%2f%2f172.20.136.46%3a8888%3fweight%3d46";

fn providers() -> Vec<RegistryEntry> {
    vec![RegistryEntry::new(PROVIDER_1), RegistryEntry::new(PROVIDER_2)]
}

fn configurators() -> Vec<RegistryEntry> {
    vec![
        RegistryEntry::new(CONFIGURATOR_1),
        RegistryEntry::new(CONFIGURATOR_2),
    ]
}

#[test]
fn configurators_override_matching_providers() {
    let endpoints = SnapshotTranslator::default()
        .translate(PROVIDER_PATH, &providers(), &configurators())
        .unwrap();

    assert_eq!(endpoints.len(), 2);
    for endpoint in &endpoints {
        assert!(endpoint.host().ends_with(&endpoint.declared_weight().to_string()));
    }

    let a = &endpoints[0];
    assert_eq!(a.host(), "172.20.136.45");
    assert_eq!(a.declared_weight(), 45);
    assert_eq!(a.static_attr("up"), Some("1"));
    assert_eq!(a.static_attr("appName"), Some("simple-server"));
    assert_eq!(a.static_attr("uniqueId"), Some(""));

    let b = &endpoints[1];
    assert_eq!(b.host(), "172.20.136.46");
    assert_eq!(b.declared_weight(), 46);
    assert_eq!(b.static_attr("up"), None);
}

#[test]
fn provider_without_configurator_is_untouched() {
    let endpoints = SnapshotTranslator::default()
        .translate(
            PROVIDER_PATH,
            &providers(),
            &[RegistryEntry::new(CONFIGURATOR_1)],
        )
        .unwrap();
    assert_eq!(endpoints[1].declared_weight(), 100);
}

#[test]
fn translation_is_idempotent() {
    let translator = SnapshotTranslator::default();
    let first = translator
        .translate(PROVIDER_PATH, &providers(), &configurators())
        .unwrap();
    let second = translator
        .translate(PROVIDER_PATH, &providers(), &configurators())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn warmup_runs_after_merge() {
    let paths = ServicePaths::new("/", "meridian-rpc", "com.acme.Echo");
    let url = EndpointUrl::parse("bolt://10.0.0.1:12200?weight=200&startTime=1000&warmupTime=500")
        .unwrap();
    let configurator = EndpointUrl::parse("configurator://10.0.0.1:12200?warmupWeight=20").unwrap();

    let endpoints = SnapshotTranslator::default()
        .translate(
            &paths.providers(),
            &[RegistryEntry::new(child_path(&paths.providers(), &url))],
            &[RegistryEntry::new(child_path(&paths.configurators(), &configurator))],
        )
        .unwrap();

    let endpoint = &endpoints[0];
    assert_eq!(endpoint.static_attr("warmupTime"), None);
    assert_eq!(endpoint.static_attr("warmupWeight"), None);
    assert_eq!(endpoint.status_at(1_200), EndpointStatus::WarmingUp);
    assert_eq!(endpoint.weight_at(1_200), 20);
    assert_eq!(endpoint.weight_at(1_500), 200);
}

#[test]
fn warmup_processing_is_stable_on_rebuilt_endpoints() {
    let url = EndpointUrl::parse("bolt://h:1?weight=9&startTime=5&warmupTime=5&warmupWeight=1")
        .unwrap();
    let mut first = Endpoint::from_url(&url, 100);
    let mut second = Endpoint::from_url(&url, 100);
    WarmupEngine::process(&mut first).unwrap();
    WarmupEngine::process(&mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn malformed_provider_aborts_translation() {
    let broken = RegistryEntry::new(format!("{PROVIDER_PATH}/rest%3A%2F%2Fh%3A1%3Fa%3D%2"));
    let err = SnapshotTranslator::default()
        .translate(PROVIDER_PATH, &[RegistryEntry::new(PROVIDER_1), broken], &configurators())
        .unwrap_err();
    assert!(matches!(err, RegistryDecodeError::MalformedPercentEncoding { .. }));
}

#[test]
fn configurator_outside_the_service_is_rejected() {
    let stray = RegistryEntry::new("/dev/dev/meridian-rpc/other.Api/configurators/configurator%3a%2f%2fh%3a1");
    let err = SnapshotTranslator::default()
        .translate(PROVIDER_PATH, &providers(), &[stray])
        .unwrap_err();
    assert!(matches!(err, RegistryDecodeError::PathOutsideBase { .. }));
}

#[test]
fn blank_warmup_does_not_reject_the_listing() {
    let paths = ServicePaths::new("/", "meridian-rpc", "com.acme.Echo");
    let entry = |raw: &str| {
        RegistryEntry::new(child_path(&paths.providers(), &EndpointUrl::parse(raw).unwrap()))
    };
    let providers = vec![
        entry("bolt://10.0.0.1:1?weight=7"),
        entry("bolt://10.0.0.2:1?weight=5&startTime=1&warmupTime=&warmupWeight="),
    ];

    let endpoints = SnapshotTranslator::default()
        .translate(&paths.providers(), &providers, &[])
        .unwrap();

    assert_eq!(endpoints.len(), 2);
    let blank = &endpoints[1];
    assert_eq!(blank.status_at(1), EndpointStatus::Available);
    assert_eq!(blank.weight_at(1), 5);
    assert_eq!(blank.static_attr("warmupTime"), None);
    assert_eq!(blank.static_attr("warmupWeight"), None);
}
