use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Mounts every upstream endpoint the engine talks to on one server.
    pub async fn create_upstream_mock() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"bitcoin": {"usd": 65000.0}, "ethereum": {"usd": 3500.0}}"#,
            ))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"rates": {"USD": 1.0, "EUR": 0.9, "GBP": 0.8, "INR": 83.0, "JPY": 150.0}}"#,
            ))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/spot"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"gold": 2000.0, "silver": 25.0}"#),
            )
            .mount(&mock_server)
            .await;

        for (symbol, price) in [
            ("AAPL", 150.0),
            ("GOOGL", 140.0),
            ("MSFT", 420.0),
            ("TSLA", 250.0),
            ("RELIANCE.NS", 2950.0),
            ("TCS.NS", 3800.0),
            ("INFY.NS", 1500.0),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("/v8/finance/chart/{symbol}")))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                    r#"{{"chart": {{"result": [{{"meta": {{"regularMarketPrice": {price}}}}}]}}}}"#
                )))
                .mount(&mock_server)
                .await;
        }

        mock_server
    }

    /// Mock server where every upstream call fails.
    pub async fn create_failing_mock() -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        mock_server
    }

    pub fn write_config(base_url: &str, data_path: &std::path::Path) -> String {
        format!(
            r#"
providers:
  coingecko:
    base_url: {base_url}
  exchange_rate:
    base_url: {base_url}
  metals:
    base_url: {base_url}
  yahoo:
    base_url: {base_url}
data_path: "{}"
"#,
            data_path.display()
        )
    }
}

#[test_log::test(tokio::test)]
async fn test_convert_resolves_every_asset_class() {
    use equiv::asset::{Mode, Region};
    use equiv::engine::ConversionRequest;

    let mock_server = test_utils::create_upstream_mock().await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config: equiv::config::AppConfig =
        serde_yaml::from_str(&test_utils::write_config(&mock_server.uri(), data_dir.path()))
            .expect("Failed to parse config");
    let engine = equiv::build_engine(&config).expect("Failed to build engine");

    let results = engine
        .convert(&ConversionRequest {
            value: 100.0,
            asset: "USD".to_string(),
            region: Region::Us,
            mode: Mode::Short,
        })
        .await
        .expect("Conversion failed");
    info!(count = results.len(), "Received conversion results");

    let find = |asset: &str| {
        results
            .iter()
            .find(|e| e.asset == asset)
            .unwrap_or_else(|| panic!("Missing target {asset}"))
    };

    // USD itself is excluded from its own result set.
    assert!(results.iter().all(|e| e.asset != "USD"));

    let btc = find("BTC");
    assert!((btc.value - 100.0 / 65000.0).abs() < 1e-12);
    assert!(!btc.stale);
    assert_eq!(btc.sparkline.len(), 31);

    let eur = find("EUR");
    assert!((eur.value - 90.0).abs() < 1e-9);
    assert_eq!(eur.equiv, "$100.00 ≈ 90.00 €");

    let gold = find("GOLD");
    assert!((gold.value - 100.0 / (2000.0 / 31.1035)).abs() < 1e-9);
    assert!(gold.equiv.contains("grams GOLD"));

    let aapl = find("AAPL");
    assert!((aapl.value - 100.0 / 150.0).abs() < 1e-9);

    let tesla = find("Tesla Model 3");
    assert!((tesla.value - 100.0 / 38000.0).abs() < 1e-12);

    // IN-scoped assets are absent from a US request.
    assert!(results.iter().all(|e| e.asset != "RELIANCE"));
    assert!(results.iter().all(|e| e.asset != "Maruti Swift"));
}

#[test_log::test(tokio::test)]
async fn test_convert_from_vehicle_in_region() {
    use equiv::asset::{Mode, Region};
    use equiv::engine::ConversionRequest;

    let mock_server = test_utils::create_upstream_mock().await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config: equiv::config::AppConfig =
        serde_yaml::from_str(&test_utils::write_config(&mock_server.uri(), data_dir.path()))
            .expect("Failed to parse config");
    let engine = equiv::build_engine(&config).expect("Failed to build engine");

    let results = engine
        .convert(&ConversionRequest {
            value: 1.0,
            asset: "Maruti Swift".to_string(),
            region: Region::In,
            mode: Mode::Short,
        })
        .await
        .expect("Conversion failed");

    // 850000 INR at 83 INR/USD is ~10240.96 USD.
    let usd = results
        .iter()
        .find(|e| e.asset == "USD")
        .expect("Missing USD target");
    assert!((usd.value - 850000.0 / 83.0).abs() < 1e-6);

    // The source vehicle itself is excluded, its regional siblings are not.
    assert!(results.iter().all(|e| e.asset != "Maruti Swift"));
    assert!(results.iter().any(|e| e.asset == "Tata Nexon"));
}

#[test_log::test(tokio::test)]
async fn test_stale_cache_served_when_upstreams_fail() {
    use chrono::Utc;
    use equiv::asset::{Mode, Region};
    use equiv::engine::ConversionRequest;
    use equiv::store::{CacheEntry, Store, disk::DiskStore};
    use std::collections::HashMap;

    let mock_server = test_utils::create_failing_mock().await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");

    // Seed the on-disk cache with entries well past their TTL, then release
    // the keyspace before the engine opens it.
    {
        let store = DiskStore::open(&data_dir.path().join("cache")).expect("Failed to open store");
        let old = Utc::now().timestamp() - 86400;
        store.write(
            "fiat",
            &CacheEntry::new(
                old,
                HashMap::from([("USD".to_string(), 1.0), ("EUR".to_string(), 0.9)]),
            ),
        );
        store.write(
            "crypto",
            &CacheEntry::new(old, HashMap::from([("BTC".to_string(), 65000.0)])),
        );
    }

    let config: equiv::config::AppConfig =
        serde_yaml::from_str(&test_utils::write_config(&mock_server.uri(), data_dir.path()))
            .expect("Failed to parse config");
    let engine = equiv::build_engine(&config).expect("Failed to build engine");

    let results = engine
        .convert(&ConversionRequest {
            value: 100.0,
            asset: "USD".to_string(),
            region: Region::Us,
            mode: Mode::Short,
        })
        .await
        .expect("Conversion failed");

    // Stale payloads are served rather than dropped, and badged as stale.
    let eur = results
        .iter()
        .find(|e| e.asset == "EUR")
        .expect("Missing EUR target");
    assert!((eur.value - 90.0).abs() < 1e-9);
    assert!(eur.stale);

    let btc = results
        .iter()
        .find(|e| e.asset == "BTC")
        .expect("Missing BTC target");
    assert!(btc.stale);

    // Metals degrade to the adapter's hardcoded fallback rather than
    // disappearing; equities had no cache and no upstream, so they are
    // simply omitted.
    assert!(results.iter().any(|e| e.asset == "GOLD"));
    assert!(results.iter().all(|e| e.asset != "AAPL"));
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_upstream_mock().await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    fs::write(
        config_path,
        test_utils::write_config(&mock_server.uri(), data_dir.path()),
    )
    .expect("Failed to write config file");

    let result = equiv::run_command(
        equiv::AppCommand::Convert {
            value: 250.0,
            asset: "EUR".to_string(),
            region: equiv::asset::Region::Us,
            mode: equiv::asset::Mode::Short,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );

    let result = equiv::run_command(
        equiv::AppCommand::Overview {
            asset: "BTC".to_string(),
            mode: equiv::asset::Mode::Long,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Overview command failed with: {:?}",
        result.err()
    );

    let result = equiv::run_command(
        equiv::AppCommand::Refresh,
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Refresh command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_invalid_amount_is_a_request_error() {
    let mock_server = test_utils::create_upstream_mock().await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        config_file.path(),
        test_utils::write_config(&mock_server.uri(), data_dir.path()),
    )
    .expect("Failed to write config file");

    let result = equiv::run_command(
        equiv::AppCommand::Convert {
            value: -1.0,
            asset: "USD".to_string(),
            region: equiv::asset::Region::Us,
            mode: equiv::asset::Mode::Short,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("amount must be a positive number")
    );
}
