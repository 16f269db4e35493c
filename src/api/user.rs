//! Profile and user administration endpoints.

use super::client::file_part;
use super::ApiClient;
use crate::error::Result;
use crate::models::{ProfileUpdate, Upload, User};
use reqwest::multipart::Form;
use serde_json::Value;

impl ApiClient {
    pub async fn profile(&self) -> Result<User> {
        self.get("/user/profile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.put("/user/profile", update).await
    }

    /// Upload a new profile picture. Must be a JPEG or PNG of at most 5 MB.
    pub async fn upload_profile_image(&self, image: &Upload) -> Result<Value> {
        image.validate_image()?;
        let form = Form::new().part("image", file_part(image)?);
        self.post_multipart("/user/profile/image", form).await
    }

    pub async fn delete_profile_image(&self) -> Result<Value> {
        self.delete("/user/profile/image").await
    }

    /// Every account (admin only).
    pub async fn all_users(&self) -> Result<Vec<User>> {
        self.get("/user/all").await
    }

    /// Delete an account (admin only).
    pub async fn delete_user(&self, user_id: i64) -> Result<Value> {
        self.delete(&format!("/user/{}", user_id)).await
    }
}
