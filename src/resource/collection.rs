//! Ordered collection of resources, unique by current identity.

use super::id::ResId;
use super::resource::Resource;
use crate::error::{PatchError, Result};
use crate::patch::codec;
use crate::selector::{SelectorMatcher, TargetSelector};
use crate::value::Value;

/// ResourceCollection holds resources in insertion order.
///
/// No two resources ever share a current identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceCollection {
    resources: Vec<Resource>,
}

impl ResourceCollection {
    pub fn new() -> Self {
        ResourceCollection {
            resources: Vec::new(),
        }
    }

    /// Builds a collection, rejecting duplicate identities.
    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Result<Self> {
        let mut collection = ResourceCollection::new();
        for res in resources {
            collection.append(res)?;
        }
        Ok(collection)
    }

    /// Parses multi-document YAML into a collection.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let docs = codec::parse_documents(text)?;
        ResourceCollection::from_resources(docs.into_iter().map(Resource::new))
    }

    /// Renders the collection as multi-document YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        let docs: Vec<&Value> = self.resources.iter().map(Resource::content).collect();
        codec::render_documents(&docs)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn ids(&self) -> Vec<ResId> {
        self.resources.iter().map(Resource::cur_id).collect()
    }

    /// Appends a resource at the end of the collection.
    pub fn append(&mut self, res: Resource) -> Result<()> {
        let id = res.cur_id();
        if self.get_by_cur_id(&id).is_some() {
            return Err(PatchError::config(format!(
                "may not add resource with an already registered id: {}",
                id
            )));
        }
        self.resources.push(res);
        Ok(())
    }

    pub fn get_by_cur_id(&self, id: &ResId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.cur_id() == *id)
    }

    /// Finds the single resource whose original or current identity is `id`.
    ///
    /// Zero matches is a not-found error; several matches means the id is
    /// ambiguous and is reported as a config error.
    pub fn get_by_id(&self, id: &ResId, patch: &str) -> Result<&Resource> {
        let matches: Vec<&Resource> = self
            .resources
            .iter()
            .filter(|r| r.org_id() == id || r.cur_id() == *id)
            .collect();
        match matches.as_slice() {
            [] => Err(PatchError::not_found(id.clone(), patch)),
            [only] => Ok(only),
            many => Err(PatchError::config(format!(
                "multiple matches for id {}: [{}]",
                id,
                many.iter()
                    .map(|r| r.cur_id().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Returns the current identities of all resources the selector matches,
    /// in collection order.
    pub fn select(&self, selector: &TargetSelector) -> Result<Vec<ResId>> {
        let matcher = SelectorMatcher::compile(selector)?;
        Ok(self
            .resources
            .iter()
            .filter(|r| matcher.matches(r))
            .map(Resource::cur_id)
            .collect())
    }

    /// Replaces the resource currently identified by `id`.
    ///
    /// The replacement may carry a new identity, but not one held by any
    /// other resource.
    pub fn replace(&mut self, id: &ResId, res: Resource) -> Result<()> {
        let new_id = res.cur_id();
        let clash = self
            .resources
            .iter()
            .any(|r| r.cur_id() == new_id && new_id != *id);
        if clash {
            return Err(PatchError::config(format!(
                "resource {} would take the already registered id {}",
                id, new_id
            )));
        }
        let slot = self
            .resources
            .iter_mut()
            .find(|r| r.cur_id() == *id)
            .ok_or_else(|| PatchError::not_found(id.clone(), "replace"))?;
        *slot = res;
        Ok(())
    }

    /// Removes the resource currently identified by `id`.
    pub fn remove(&mut self, id: &ResId) -> Result<Resource> {
        let index = self
            .resources
            .iter()
            .position(|r| r.cur_id() == *id)
            .ok_or_else(|| PatchError::not_found(id.clone(), "remove"))?;
        Ok(self.resources.remove(index))
    }
}
