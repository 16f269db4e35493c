//! Achievement endpoints.

use super::ApiClient;
use crate::error::Result;
use crate::models::comment::CommentInput;
use crate::models::{Achievement, AchievementCategory, AchievementInput, Comment};
use serde_json::Value;
use validator::Validate;

impl ApiClient {
    pub async fn approved_achievements(&self) -> Result<Vec<Achievement>> {
        self.get("/achievements/approved").await
    }

    pub async fn achievements_by_category(
        &self,
        category: AchievementCategory,
    ) -> Result<Vec<Achievement>> {
        self.get(&format!("/achievements/approved/category/{}", category))
            .await
    }

    pub async fn student_achievements(&self, student_id: i64) -> Result<Vec<Achievement>> {
        self.get(&format!("/achievements/student/{}", student_id))
            .await
    }

    pub async fn achievement(&self, achievement_id: i64) -> Result<Achievement> {
        self.get(&format!("/achievements/{}", achievement_id)).await
    }

    pub async fn popular_achievements(&self) -> Result<Vec<Achievement>> {
        self.get("/achievements/popular").await
    }

    pub async fn recent_achievements(&self) -> Result<Vec<Achievement>> {
        self.get("/achievements/recent").await
    }

    pub async fn create_achievement(&self, input: &AchievementInput) -> Result<Achievement> {
        input.validate()?;
        self.post("/achievements", input).await
    }

    pub async fn update_achievement(
        &self,
        achievement_id: i64,
        input: &AchievementInput,
    ) -> Result<Achievement> {
        input.validate()?;
        self.put(&format!("/achievements/{}", achievement_id), input)
            .await
    }

    pub async fn delete_achievement(&self, achievement_id: i64) -> Result<Value> {
        self.delete(&format!("/achievements/{}", achievement_id))
            .await
    }

    pub async fn like_achievement(&self, achievement_id: i64) -> Result<Value> {
        self.post_empty(&format!("/achievements/{}/like", achievement_id))
            .await
    }

    pub async fn unlike_achievement(&self, achievement_id: i64) -> Result<Value> {
        self.post_empty(&format!("/achievements/{}/unlike", achievement_id))
            .await
    }

    pub async fn share_achievement(&self, achievement_id: i64) -> Result<Value> {
        self.post_empty(&format!("/achievements/{}/share", achievement_id))
            .await
    }

    pub async fn achievement_comments(&self, achievement_id: i64) -> Result<Vec<Comment>> {
        self.get(&format!("/achievements/{}/comments", achievement_id))
            .await
    }

    pub async fn add_achievement_comment(
        &self,
        achievement_id: i64,
        comment: &str,
    ) -> Result<Comment> {
        self.post(
            &format!("/achievements/{}/comments", achievement_id),
            &CommentInput { comment },
        )
        .await
    }

    pub async fn delete_achievement_comment(&self, comment_id: i64) -> Result<Value> {
        self.delete(&format!("/achievements/comments/{}", comment_id))
            .await
    }
}
