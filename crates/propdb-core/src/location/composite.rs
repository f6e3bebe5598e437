//! Joint property and placement queries.

use propdb_pack::FragmentLocation;

use crate::error::Error;
use crate::props::{PropMap, PropertyResolver};
use crate::query::AttributeQuery;
use crate::store::{AttrValue, Store};

use super::store::LocationStore;

/// One entity with its merged properties and, when embedded, its placement.
#[derive(Debug, Clone)]
pub struct PlacedElement {
    /// Entity id.
    pub db_id: i64,
    /// Merged properties of the entity.
    pub properties: PropMap,
    /// Embedded location, if this entity has one.
    pub location: Option<FragmentLocation>,
}

/// Composite queries joining resolved properties with embedded locations.
///
/// Every operation requires the location side table to exist and fails with
/// [`Error::FeatureUnavailable`] otherwise, so "locations were never
/// embedded" is always distinguishable from "no matches".
pub struct ModelQuery {
    resolver: PropertyResolver,
    attributes: AttributeQuery,
    locations: LocationStore,
}

impl ModelQuery {
    /// Assemble a composite query layer from its parts.
    pub fn new(
        resolver: PropertyResolver,
        attributes: AttributeQuery,
        locations: LocationStore,
    ) -> Self {
        Self {
            resolver,
            attributes,
            locations,
        }
    }

    /// Open a composite query layer over one backing file, with a shared
    /// read handle for property queries and a dedicated one for locations.
    pub fn open(store: &Store) -> Result<Self, Error> {
        let props_handle = store.reader()?;
        Ok(Self {
            resolver: PropertyResolver::new(props_handle.clone()),
            attributes: AttributeQuery::new(props_handle),
            locations: LocationStore::new(store.clone())?,
        })
    }

    /// The property resolver in use.
    pub fn resolver(&self) -> &PropertyResolver {
        &self.resolver
    }

    /// The attribute query layer in use.
    pub fn attributes(&self) -> &AttributeQuery {
        &self.attributes
    }

    /// The location store in use.
    pub fn locations(&self) -> &LocationStore {
        &self.locations
    }

    /// Merged properties plus placement for one entity.
    pub async fn placed_element(&self, db_id: i64) -> Result<PlacedElement, Error> {
        self.require_embedded().await?;
        let properties = self.resolver.merged_properties(db_id).await?;
        let location = self.locations.get_location(db_id).await?;
        Ok(PlacedElement {
            db_id,
            properties,
            location,
        })
    }

    /// Merged properties plus placement for a batch of entities, resolving
    /// shared ancestors once.
    pub async fn placed_elements(&self, ids: &[i64]) -> Result<Vec<PlacedElement>, Error> {
        self.require_embedded().await?;
        let mut merged = self.resolver.merged_properties_many(ids).await?;
        let mut out = Vec::with_capacity(ids.len());
        for &db_id in ids {
            let properties = merged.remove(&db_id).unwrap_or_default();
            let location = self.locations.get_location(db_id).await?;
            out.push(PlacedElement {
                db_id,
                properties,
                location,
            });
        }
        Ok(out)
    }

    /// Entities whose attribute equals `value` AND that have an embedded
    /// location: the intersection of the property match set and the side
    /// table.
    pub async fn find_placed_by_property(
        &self,
        category: &str,
        display_name: &str,
        value: &AttrValue,
    ) -> Result<Vec<PlacedElement>, Error> {
        self.require_embedded().await?;
        let ids = self
            .attributes
            .find_by_property(category, display_name, value)
            .await?;
        let mut merged = self.resolver.merged_properties_many(&ids).await?;

        let mut out = Vec::new();
        for db_id in ids {
            let Some(location) = self.locations.get_location(db_id).await? else {
                continue;
            };
            out.push(PlacedElement {
                db_id,
                properties: merged.remove(&db_id).unwrap_or_default(),
                location: Some(location),
            });
        }
        Ok(out)
    }

    async fn require_embedded(&self) -> Result<(), Error> {
        if self.locations.has_embedded_locations().await? {
            Ok(())
        } else {
            Err(Error::FeatureUnavailable)
        }
    }
}
