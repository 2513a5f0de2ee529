use std::collections::BTreeMap;

use crate::foundation::error::ReelResult;
use crate::package::archive::Archive;
use crate::package::xml::parse_xml;

pub const GLOBAL_RELS: &str = "_rels/.rels";

/// Which relationship part a relationship id belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelScope {
    Global,
    Slide(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Archive path for internal targets, the verbatim URI for external ones.
    pub target: String,
    pub external: bool,
}

/// Relationship ids resolved per scope.
#[derive(Clone, Debug, Default)]
pub struct RelationshipMap {
    scopes: BTreeMap<RelScope, BTreeMap<String, Relationship>>,
}

impl RelationshipMap {
    /// Load the package-level rels and every slide rels part.
    ///
    /// Missing parts leave their scope empty; a malformed part is logged and skipped.
    pub fn load(archive: &Archive) -> Self {
        let mut map = Self::default();

        if archive.contains(GLOBAL_RELS) {
            map.load_part(archive, GLOBAL_RELS, "", RelScope::Global);
        }

        for path in archive.list_entries(super::slide_rels_pattern()) {
            let Some(n) = super::slide_number(&path) else {
                continue;
            };
            map.load_part(archive, &path, "ppt/slides", RelScope::Slide(n));
        }

        tracing::debug!(scopes = map.scopes.len(), "relationships loaded");
        map
    }

    fn load_part(&mut self, archive: &Archive, path: &str, base_dir: &str, scope: RelScope) {
        let parsed = archive
            .read_text(path)
            .and_then(|text| parse_rels_part(&text, base_dir));
        match parsed {
            Ok(rels) => self.insert_all(scope, rels),
            Err(err) => tracing::warn!(part = path, error = %err, "ignoring unreadable relationships part"),
        }
    }

    pub fn insert_all(&mut self, scope: RelScope, rels: Vec<Relationship>) {
        let entry = self.scopes.entry(scope).or_default();
        for rel in rels {
            entry.insert(rel.id.clone(), rel);
        }
    }

    pub fn get(&self, scope: RelScope, id: &str) -> Option<&Relationship> {
        self.scopes.get(&scope)?.get(id)
    }

    /// Internal target path for `id`, if it resolves inside the package.
    pub fn target(&self, scope: RelScope, id: &str) -> Option<&str> {
        self.get(scope, id)
            .filter(|r| !r.external)
            .map(|r| r.target.as_str())
    }

    pub fn scope_len(&self, scope: RelScope) -> usize {
        self.scopes.get(&scope).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(BTreeMap::is_empty)
    }
}

/// Parse one `.rels` part; internal targets are resolved relative to `base_dir`.
pub fn parse_rels_part(xml: &str, base_dir: &str) -> ReelResult<Vec<Relationship>> {
    let root = parse_xml(xml)?;
    let mut out = Vec::new();
    for rel in root.children_named("Relationship") {
        let (Some(id), Some(target)) = (rel.attr("Id"), rel.attr("Target")) else {
            continue;
        };
        let external = rel
            .attr("TargetMode")
            .is_some_and(|m| m.eq_ignore_ascii_case("external"));
        let target = if external {
            target.to_owned()
        } else {
            resolve_target(base_dir, target)
        };
        out.push(Relationship {
            id: id.to_owned(),
            rel_type: rel.attr("Type").unwrap_or_default().to_owned(),
            target,
            external,
        });
    }
    Ok(out)
}

/// Join a relative part reference onto `base_dir`, folding `.` and `..` segments.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let rest = match target.strip_prefix('/') {
        Some(abs) => abs,
        None => {
            segments.extend(base_dir.split('/').filter(|s| !s.is_empty()));
            target
        }
    };
    for seg in rest.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

#[cfg(test)]
#[path = "../../tests/unit/package/rels.rs"]
mod tests;
