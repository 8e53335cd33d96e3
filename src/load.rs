//! JSON knowledge base files.
//!
//! A file declares nodes and links; links reference their targets by name
//! rather than by id, so files are portable across stores. Names resolve
//! against the file itself: node names, plus optional aliases on links so
//! later links can nest them.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::atom::{AtomId, LinkKind, NodeKind};
use crate::error::LoadError;
use crate::store::AtomStore;
use crate::truth::TruthValue;

/// On-disk knowledge base schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KbFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

/// A node declaration. A missing truth value means certain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truth: Option<TruthValue>,
}

/// A link declaration. Targets are names; `alias` makes the link itself
/// referenceable by later links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub kind: LinkKind,
    pub outgoing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truth: Option<TruthValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// What a load added to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub nodes: usize,
    pub links: usize,
}

impl KbFile {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|e| LoadError::Json {
            message: e.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        serde_json::to_string_pretty(self).map_err(|e| LoadError::Json {
            message: e.to_string(),
        })
    }

    /// Apply the file to a store. Nodes first, then links in declaration
    /// order; a link may reference any node or any earlier link's alias.
    pub fn apply(&self, store: &AtomStore) -> Result<LoadStats, LoadError> {
        let mut by_name: HashMap<&str, AtomId> = HashMap::new();

        for node in &self.nodes {
            let truth = node.truth.unwrap_or_default();
            let id = store.add_node(node.kind, node.name.clone(), truth)?;
            by_name.entry(node.name.as_str()).or_insert(id);
        }
        for link in &self.links {
            let outgoing = link
                .outgoing
                .iter()
                .map(|name| {
                    by_name
                        .get(name.as_str())
                        .copied()
                        .ok_or_else(|| LoadError::Unresolved { name: name.clone() })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let truth = link.truth.unwrap_or_default();
            let id = store.add_link(link.kind, outgoing, truth)?;
            if let Some(alias) = &link.alias {
                by_name.insert(alias.as_str(), id);
            }
        }

        let stats = LoadStats {
            nodes: self.nodes.len(),
            links: self.links.len(),
        };
        info!(
            kb = self.name.as_deref().unwrap_or("unnamed"),
            nodes = stats.nodes,
            links = stats.links,
            "loaded knowledge base"
        );
        Ok(stats)
    }

    /// Snapshot a store into the file schema. Every link gets a generated
    /// alias so nested links survive a round trip; node name collisions
    /// fall back to an id-qualified reference.
    pub fn from_store(store: &AtomStore) -> Self {
        let atoms = store.atoms();
        let mut names: HashMap<AtomId, String> = HashMap::new();
        let mut taken: HashMap<String, AtomId> = HashMap::new();

        let mut nodes = Vec::new();
        for atom in &atoms {
            if let (Some(kind), Some(name)) = (atom.node_kind(), atom.name()) {
                let reference = if taken.contains_key(name) {
                    format!("{name}#{}", atom.id)
                } else {
                    taken.insert(name.to_string(), atom.id);
                    name.to_string()
                };
                names.insert(atom.id, reference.clone());
                nodes.push(NodeSpec {
                    kind,
                    name: reference,
                    truth: Some(atom.truth),
                });
            }
        }
        // Links are stored in insertion order, so every outgoing target
        // precedes its link and already has a reference.
        let mut links = Vec::new();
        for atom in &atoms {
            if let (Some(kind), Some(outgoing)) = (atom.link_kind(), atom.outgoing()) {
                let alias = format!("link#{}", atom.id);
                names.insert(atom.id, alias.clone());
                links.push(LinkSpec {
                    kind,
                    outgoing: outgoing
                        .iter()
                        .map(|id| names.get(id).cloned().unwrap_or_else(|| id.to_string()))
                        .collect(),
                    truth: Some(atom.truth),
                    alias: Some(alias),
                });
            }
        }

        KbFile {
            name: None,
            nodes,
            links,
        }
    }
}

/// Load a knowledge base file from disk into the store.
pub fn load_file(store: &AtomStore, path: impl AsRef<Path>) -> Result<LoadStats, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    KbFile::from_json(&text)?.apply(store)
}

/// Write the store's contents to a knowledge base file.
pub fn export_file(store: &AtomStore, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let path = path.as_ref();
    let json = KbFile::from_store(store).to_json()?;
    std::fs::write(path, json).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
