use crate::error::CatalogError;
use async_trait::async_trait;
use media_player_models::{Episode, SeriesInfo};

/// Read-only view of the streaming backend needed by the player.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Every episode of a series, unpaginated, in backend order.
    async fn episodes(&self, series_id: &str) -> Result<Vec<Episode>, CatalogError>;

    async fn series(&self, series_id: &str) -> Result<SeriesInfo, CatalogError>;
}
