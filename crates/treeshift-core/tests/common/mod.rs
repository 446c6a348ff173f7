use serde_json::Value;
use treeshift_core::{
    ContentInfo, ExecutorConfig, MemoryRepository, ReferenceStore, Result, StepExecutor,
    StepOutcome,
};

pub const FOLDER: i64 = 1;
pub const ARTICLE: i64 = 16;

/// Fixture tree used by every scenario
///
/// ```text
/// 1 (Root) ─┬─ 2 (Home) ── 10 (News) ── 11 (Item)
///           └─ 20 (Media)
/// ```
///
/// Contents 55 (About) and 56 (Contact) exist but are not placed yet.
#[allow(dead_code)]
pub fn fixture_repository() -> MemoryRepository {
    let mut repo = MemoryRepository::new();
    repo.insert_content_type(FOLDER, "folder");
    repo.insert_content_type(ARTICLE, "article");

    for (id, name, content_type) in [
        (100, "Root", FOLDER),
        (102, "Home", FOLDER),
        (110, "News", FOLDER),
        (111, "Item", ARTICLE),
        (120, "Media", FOLDER),
        (55, "About", ARTICLE),
        (56, "Contact", ARTICLE),
    ] {
        repo.insert_content(ContentInfo::new(id, format!("content-{}", id), name, content_type));
    }

    repo.insert_location(1, None, 100).unwrap();
    repo.insert_location(2, Some(1), 102).unwrap();
    repo.insert_location(10, Some(2), 110).unwrap();
    repo.insert_location(11, Some(10), 111).unwrap();
    repo.insert_location(20, Some(1), 120).unwrap();
    repo
}

/// Run one raw step with the default configuration
#[allow(dead_code)]
pub fn run(repo: &mut MemoryRepository, refs: &mut ReferenceStore, raw: Value) -> Result<StepOutcome> {
    run_with(repo, refs, ExecutorConfig::default(), raw)
}

#[allow(dead_code)]
pub fn run_with(
    repo: &mut MemoryRepository,
    refs: &mut ReferenceStore,
    config: ExecutorConfig,
    raw: Value,
) -> Result<StepOutcome> {
    StepExecutor::new(repo, refs, config).execute(&raw)
}
