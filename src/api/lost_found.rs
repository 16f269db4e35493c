//! Lost & found endpoints.

use super::client::{file_part, text_form};
use super::ApiClient;
use crate::error::Result;
use crate::models::lost_found::ClaimRequest;
use crate::models::{LostFoundFilter, LostFoundItem, LostFoundUpdate, NewLostFoundItem};
use serde_json::Value;
use validator::Validate;

impl ApiClient {
    pub async fn lost_found_items(&self, filter: &LostFoundFilter) -> Result<Vec<LostFoundItem>> {
        self.get_query("/lost-found/items", filter).await
    }

    pub async fn lost_found_item(&self, item_id: i64) -> Result<LostFoundItem> {
        self.get(&format!("/lost-found/items/{}", item_id)).await
    }

    /// Report an item. A photo must pass image validation.
    pub async fn create_lost_found_item(&self, item: &NewLostFoundItem) -> Result<LostFoundItem> {
        item.validate()?;
        let mut form = text_form(item.form_fields());
        if let Some(image) = &item.image {
            image.validate_image()?;
            form = form.part("image", file_part(image)?);
        }
        self.post_multipart("/lost-found/items", form).await
    }

    pub async fn update_lost_found_item(
        &self,
        item_id: i64,
        update: &LostFoundUpdate,
    ) -> Result<LostFoundItem> {
        self.put(&format!("/lost-found/items/{}", item_id), update)
            .await
    }

    pub async fn delete_lost_found_item(&self, item_id: i64) -> Result<Value> {
        self.delete(&format!("/lost-found/items/{}", item_id)).await
    }

    /// Claim an item; the owner reviews the message server-side.
    pub async fn claim_item(&self, item_id: i64, claim_message: &str) -> Result<Value> {
        self.post(
            &format!("/lost-found/items/{}/claim", item_id),
            &ClaimRequest { claim_message },
        )
        .await
    }
}
