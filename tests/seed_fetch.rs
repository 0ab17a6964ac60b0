//! Integration tests for first-run seeding from a remote URL, a file, or the
//! built-in list.

use std::sync::Arc;

use linkhub::seed::{SeedLoader, SeedOrigin};
use linkhub::storage::{LinkStore, LoadOutcome, MemoryStore};
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REMOTE_SEED: &str = r#"[
    {"title":"Remote One","url":"https://one.example","category":"Tools"},
    {"title":"Remote Two","urls":["https://two.example","https://two.mirror"],"category":"AI"}
]"#;

const EMBEDDED: &str = r#"[{"title":"Built In","url":"https://builtin.example"}]"#;

fn seed_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/links.json", server.uri())).unwrap()
}

fn temp_seed_file(name: &str, content: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("linkhub-seed-{}-{}.json", name, std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_remote_seed_is_fetched_with_cache_buster() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/links.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REMOTE_SEED))
        .mount(&mock_server)
        .await;

    let loader = SeedLoader::new(reqwest::Client::new())
        .with_remote(Some(seed_url(&mock_server)))
        .with_embedded(EMBEDDED);
    let seed = loader.load().await.unwrap();

    assert_eq!(seed.origin, SeedOrigin::Remote);
    let titles: Vec<_> = seed.links.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Remote One", "Remote Two"]);
    assert_eq!(seed.links[1].urls, vec!["https://two.example", "https://two.mirror"]);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let has_buster = requests[0]
        .url
        .query_pairs()
        .any(|(key, value)| key == "t" && value.parse::<u128>().is_ok());
    assert!(has_buster, "missing t= query: {}", requests[0].url);
}

#[tokio::test]
async fn test_remote_failure_falls_back_to_seed_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let file = temp_seed_file(
        "fallback",
        r#"[{"title":"From File","url":"https://file.example"}]"#,
    );
    let loader = SeedLoader::new(reqwest::Client::new())
        .with_remote(Some(seed_url(&mock_server)))
        .with_file(Some(file.clone()))
        .with_embedded(EMBEDDED);

    let seed = loader.load().await.unwrap();
    assert_eq!(seed.origin, SeedOrigin::File);
    assert_eq!(seed.links[0].title, "From File");

    let _ = std::fs::remove_file(&file);
}

#[tokio::test]
async fn test_invalid_remote_and_missing_file_use_embedded_seed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let loader = SeedLoader::new(reqwest::Client::new())
        .with_remote(Some(seed_url(&mock_server)))
        .with_file(Some(std::env::temp_dir().join("linkhub-no-such-seed.json")))
        .with_embedded(EMBEDDED);

    let seed = loader.load().await.unwrap();
    assert_eq!(seed.origin, SeedOrigin::Embedded);
    assert_eq!(seed.links[0].title, "Built In");
}

#[tokio::test]
async fn test_empty_remote_seed_is_skipped_during_migration() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&mock_server)
        .await;

    let loader = SeedLoader::new(reqwest::Client::new())
        .with_remote(Some(seed_url(&mock_server)))
        .with_embedded(EMBEDDED);
    let backend = Arc::new(MemoryStore::new());
    let mut links = LinkStore::new(backend.clone());

    let outcome = links.load(&loader).await.unwrap();

    assert_eq!(
        outcome,
        LoadOutcome::Migrated {
            count: 1,
            origin: SeedOrigin::Embedded
        }
    );
    assert_eq!(backend.write_count(), 1);
}

#[tokio::test]
async fn test_no_seed_anywhere_leaves_store_untouched() {
    let backend = Arc::new(MemoryStore::new());
    let mut links = LinkStore::new(backend.clone());

    let outcome = links
        .load(&SeedLoader::offline().with_embedded("[]"))
        .await
        .unwrap();

    assert!(matches!(outcome, LoadOutcome::NoSeedData { .. }));
    assert!(links.is_empty());
    assert_eq!(backend.write_count(), 0);
}
