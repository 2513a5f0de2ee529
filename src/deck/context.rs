use crate::package::archive::Archive;
use crate::package::rels::RelationshipMap;
use crate::package::theme::Theme;

/// Everything slide parsing may read, owned by one parse call.
///
/// Built once the archive, relationships and themes are loaded, then shared immutably with
/// every slide worker. Dropping it releases the archive.
#[derive(Debug)]
pub struct ParseContext {
    pub archive: Archive,
    pub rels: RelationshipMap,
    pub themes: Vec<Theme>,
}

impl ParseContext {
    pub fn new(archive: Archive, rels: RelationshipMap, themes: Vec<Theme>) -> Self {
        Self {
            archive,
            rels,
            themes,
        }
    }
}
