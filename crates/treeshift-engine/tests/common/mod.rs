use treeshift_core::{ContentInfo, MemoryRepository};

/// ```text
/// 1 ─┬─ 2 ── 10
///    └─ 20
/// ```
///
/// Content 55 exists but is not placed.
#[allow(dead_code)]
pub fn small_tree() -> MemoryRepository {
    let mut repo = MemoryRepository::new();
    repo.insert_content_type(1, "folder");
    for (id, name) in [(100, "Root"), (102, "Home"), (110, "News"), (120, "Media"), (55, "About")] {
        repo.insert_content(ContentInfo::new(id, format!("content-{}", id), name, 1));
    }
    repo.insert_location(1, None, 100).unwrap();
    repo.insert_location(2, Some(1), 102).unwrap();
    repo.insert_location(10, Some(2), 110).unwrap();
    repo.insert_location(20, Some(1), 120).unwrap();
    repo
}
