use pinhole_generator::RandomGenerator;
use pinhole_shortener::{ShortenerError, ShortenerService, ShortenerSettings};
use pinhole_storage::JsonFileStore;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BASE_URL: &str = "http://localhost:5000";

struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    fn start() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("urls.json");
        Self { _dir: dir, path }
    }

    async fn open(&self) -> Result<ShortenerService<JsonFileStore, RandomGenerator>, ShortenerError> {
        open_at(&self.path).await
    }
}

async fn open_at(
    path: &Path,
) -> Result<ShortenerService<JsonFileStore, RandomGenerator>, ShortenerError> {
    ShortenerService::open(
        JsonFileStore::new(path),
        RandomGenerator::default(),
        ShortenerSettings::builder().base_url(BASE_URL).build(),
    )
    .await
}

#[tokio::test]
async fn scenario_survives_a_restart() {
    let fixture = Fixture::start();

    let service = fixture.open().await.unwrap();
    let created = service.shorten("example.com").await.unwrap();
    assert_eq!(created.original_url, "https://example.com");
    assert_eq!(created.short_url, format!("{BASE_URL}/{}", created.short_code));

    let record = service.resolve(created.short_code.as_str()).await.unwrap();
    assert_eq!(record.clicks, 1);
    service.shutdown().await.unwrap();

    let restarted = fixture.open().await.unwrap();
    let again = restarted.shorten("example.com").await.unwrap();
    assert_eq!(again.short_code, created.short_code);

    let stats = restarted.stats(created.short_code.as_str()).await.unwrap();
    assert_eq!(stats.clicks, 1);
    assert_eq!(stats.original_url, "https://example.com");
    assert_eq!(stats.created_at, record.created_at);

    let err = restarted.resolve("doesnotexist").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn every_mutation_is_on_disk_before_it_returns() {
    let fixture = Fixture::start();
    let service = fixture.open().await.unwrap();

    let code = service.shorten("example.com").await.unwrap().short_code;
    for _ in 0..3 {
        service.resolve(code.as_str()).await.unwrap();
    }

    // Open a second, independent service without shutting the first down.
    let observer = fixture.open().await.unwrap();
    assert_eq!(observer.stats(code.as_str()).await.unwrap().clicks, 3);
}

#[tokio::test]
async fn stats_and_idempotent_shorten_do_not_touch_the_file() {
    let fixture = Fixture::start();
    let service = fixture.open().await.unwrap();
    let code = service.shorten("example.com").await.unwrap().short_code;
    let before = std::fs::read(&fixture.path).unwrap();

    service.stats(code.as_str()).await.unwrap();
    service.shorten("https://example.com").await.unwrap();

    assert_eq!(std::fs::read(&fixture.path).unwrap(), before);
}

#[tokio::test]
async fn corrupt_file_refuses_to_open() {
    let fixture = Fixture::start();
    std::fs::write(&fixture.path, "{\"abc\": ").unwrap();

    let err = fixture.open().await.err().expect("open must fail");
    assert!(matches!(err, ShortenerError::StorageRead(_)));

    // The corrupt file is left as it was.
    assert_eq!(std::fs::read_to_string(&fixture.path).unwrap(), "{\"abc\": ");
}

#[tokio::test]
async fn unwritable_location_reports_write_failure() {
    let fixture = Fixture::start();
    let missing_dir = fixture.path.with_file_name("missing").join("urls.json");
    let service = open_at(&missing_dir).await.unwrap();

    let err = service.shorten("example.com").await.unwrap_err();

    assert!(matches!(err, ShortenerError::StorageWrite(_)));
    assert!(service.is_empty().await);
}
