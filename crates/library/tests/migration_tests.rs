//! Migration sweep tests.

mod common;

use bytes::Bytes;
use common::{FailingMetadataStore, MemoryAssetStore, book_with_payload};
use shelf_core::AssetId;
use shelf_library::{MigrationReport, load_book_content, migrate};
use shelf_metadata::{BookRecord, JsonFileStore, MemoryMetadataStore, MetadataStore};
use shelf_storage::{AssetStore, FilesystemAssetStore};
use tempfile::TempDir;

fn id(s: &str) -> AssetId {
    AssetId::new(s).unwrap()
}

#[tokio::test]
async fn migrates_every_inline_payload_once() {
    let metadata = MemoryMetadataStore::with_records(vec![
        book_with_payload("book-1", b"one"),
        book_with_payload("book-2", b"two"),
        book_with_payload("book-3", b"three"),
    ]);
    let assets = MemoryAssetStore::new();

    let report = migrate(&metadata, assets.as_ref()).await.unwrap();
    assert_eq!(
        report,
        MigrationReport {
            migrated: 3,
            failed: 0,
            skipped: 0
        }
    );
    assert_eq!(assets.save_count(), 3);
    assert_eq!(assets.get("book-2").unwrap(), Bytes::from_static(b"two"));

    for record in metadata.list_all().await.unwrap() {
        assert!(!record.has_inline_payload(), "{} still inline", record.id);
    }

    let second = migrate(&metadata, assets.as_ref()).await.unwrap();
    assert_eq!(second.migrated, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(assets.save_count(), 3, "second sweep must not write");
}

#[tokio::test]
async fn attributes_survive_migration() {
    let metadata = MemoryMetadataStore::with_records(vec![book_with_payload("book-1", b"abc")]);
    let assets = MemoryAssetStore::new();

    migrate(&metadata, assets.as_ref()).await.unwrap();

    let record = metadata.get(&id("book-1")).await.unwrap().unwrap();
    assert_eq!(record.title(), Some("Title of book-1"));
    assert_eq!(
        record.attributes.get("author").and_then(|v| v.as_str()),
        Some("Unknown")
    );
}

#[tokio::test]
async fn records_without_payload_are_skipped() {
    let metadata = MemoryMetadataStore::with_records(vec![
        BookRecord::new(id("plain")).with_attribute("title", "No payload"),
        book_with_payload("inline", b"data"),
    ]);
    let assets = MemoryAssetStore::new();

    let report = migrate(&metadata, assets.as_ref()).await.unwrap();
    assert_eq!(report.migrated, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(assets.save_count(), 1);
    assert!(assets.get("plain").is_none());
}

#[tokio::test]
async fn empty_library_is_a_no_op() {
    let metadata = MemoryMetadataStore::new();
    let assets = MemoryAssetStore::new();

    let report = migrate(&metadata, assets.as_ref()).await.unwrap();
    assert_eq!(report, MigrationReport::default());
    assert_eq!(assets.save_count(), 0);
}

#[tokio::test]
async fn failed_save_keeps_payload_and_is_retried() {
    let metadata = MemoryMetadataStore::with_records(vec![
        book_with_payload("book-1", b"one"),
        book_with_payload("book-2", b"two"),
    ]);
    let assets = MemoryAssetStore::new();
    assets.fail_saves_for("book-2");

    let report = migrate(&metadata, assets.as_ref()).await.unwrap();
    assert_eq!(report.migrated, 1);
    assert_eq!(report.failed, 1);

    let stuck = metadata.get(&id("book-2")).await.unwrap().unwrap();
    assert_eq!(
        stuck.inline_payload,
        Some(Bytes::from_static(b"two")),
        "payload must stay inline until its asset is written"
    );

    // Still readable through the fallback while unmigrated.
    let content = load_book_content(&metadata, assets.as_ref(), &id("book-2"))
        .await
        .unwrap();
    assert_eq!(content, Bytes::from_static(b"two"));

    assets.stop_failing("book-2");
    let retry = migrate(&metadata, assets.as_ref()).await.unwrap();
    assert_eq!(retry.migrated, 1);
    assert_eq!(retry.skipped, 1);
    assert!(
        !metadata
            .get(&id("book-2"))
            .await
            .unwrap()
            .unwrap()
            .has_inline_payload()
    );
    assert_eq!(assets.get("book-2").unwrap(), Bytes::from_static(b"two"));
}

#[tokio::test]
async fn failed_clear_leaves_both_copies_and_resolves_next_sweep() {
    let metadata = FailingMetadataStore::with_records(vec![book_with_payload("book-1", b"one")]);
    let assets = MemoryAssetStore::new();
    metadata.fail_updates_for("book-1");

    let report = migrate(metadata.as_ref(), assets.as_ref()).await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.migrated, 0);
    assert_eq!(assets.get("book-1").unwrap(), Bytes::from_static(b"one"));
    assert!(
        metadata
            .get(&id("book-1"))
            .await
            .unwrap()
            .unwrap()
            .has_inline_payload()
    );

    metadata.stop_failing_updates("book-1");
    let retry = migrate(metadata.as_ref(), assets.as_ref()).await.unwrap();
    assert_eq!(retry.migrated, 1);
    assert_eq!(assets.save_count(), 2, "asset is rewritten once on retry");
    assert!(
        !metadata
            .get(&id("book-1"))
            .await
            .unwrap()
            .unwrap()
            .has_inline_payload()
    );
}

#[tokio::test]
async fn migrates_into_filesystem_and_json_stores() {
    let dir = TempDir::new().unwrap();
    let books_path = dir.path().join("books.json");
    let assets = FilesystemAssetStore::new(dir.path().join("assets"));
    let payload = common_payload();

    {
        let metadata = JsonFileStore::open(&books_path).await.unwrap();
        metadata
            .put(book_with_payload("book-1", &payload))
            .await
            .unwrap();
        metadata
            .put(BookRecord::new(id("book-2")).with_attribute("title", "Already moved"))
            .await
            .unwrap();

        let report = migrate(&metadata, &assets).await.unwrap();
        assert_eq!(report.migrated, 1);
        assert_eq!(report.skipped, 1);
    }

    // Reopen from disk: the cleared payload must have been persisted.
    let metadata = JsonFileStore::open(&books_path).await.unwrap();
    let record = metadata.get(&id("book-1")).await.unwrap().unwrap();
    assert!(!record.has_inline_payload());
    assert_eq!(record.title(), Some("Title of book-1"));

    let stored = assets.read(&id("book-1")).await.unwrap();
    assert_eq!(stored.as_ref(), payload.as_slice());
    assert!(dir.path().join("assets").join("book-1.epub").is_file());

    let report = migrate(&metadata, &assets).await.unwrap();
    assert_eq!(report.migrated, 0);
    assert_eq!(report.skipped, 2);
}

fn common_payload() -> Vec<u8> {
    (0..64 * 1024).map(|i| (i % 251) as u8).collect()
}
