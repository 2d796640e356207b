//! Blog listing, CRUD, likes, reviews and comments

use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use super::BlogApi;
use super::types::{Blog, BlogFilter, BlogForm, HomeData, NewReview};
use crate::http_client::ApiResult;

fn blog_form(form: &BlogForm, default_schedule: bool) -> ApiResult<Form> {
    let mut multipart = Form::new()
        .text("title", form.title.clone())
        .text("description", form.description.clone())
        .text("category", form.category.clone())
        .text("stage", form.stage.as_str());
    match (&form.scheduled_at, default_schedule) {
        (Some(at), _) => multipart = multipart.text("scheduled_at", at.clone()),
        (None, true) => multipart = multipart.text("scheduled_at", chrono::Utc::now().to_rfc3339()),
        (None, false) => {}
    }
    if let Some(created_at) = &form.created_at {
        multipart = multipart.text("created_at", created_at.clone());
    }
    if let Some(image) = &form.image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)?;
        multipart = multipart.part("image", part);
    }
    Ok(multipart)
}

impl BlogApi {
    /// Published posts plus the reader's profile
    pub async fn home_data(&self, filter: &BlogFilter) -> ApiResult<HomeData> {
        let mut options = self.authed()?.no_cache();
        options.query = filter.query_pairs(false);
        self.client.get("homeData").options(options).send_json().await
    }

    /// Every post, any stage
    pub async fn admin_blogs(&self, filter: &BlogFilter) -> ApiResult<Vec<Blog>> {
        let mut options = self.authed()?;
        options.query = filter.query_pairs(true);
        self.client.get("homeData/all/data").options(options).send_json().await
    }

    /// A single post with its likes, reviews and comments
    pub async fn blog(&self, id: &str) -> ApiResult<Value> {
        let options = self.authed()?;
        self.client.get(format!("homeData/{id}")).options(options).send_json().await
    }

    pub async fn admin_blog(&self, id: &str) -> ApiResult<Value> {
        let options = self.authed()?;
        self.client
            .get(format!("homeData/blog/{id}"))
            .options(options)
            .send_json()
            .await
    }

    /// Current values for the update form
    pub async fn blog_for_update(&self, id: &str) -> ApiResult<Value> {
        self.client.get(format!("homeData/viewupdate/{id}")).send_json().await
    }

    pub async fn create_blog(&self, form: &BlogForm) -> ApiResult<Value> {
        let multipart = blog_form(form, true)?;
        self.client.post("homeData").multipart(multipart).send_json().await
    }

    pub async fn update_blog(&self, id: &str, form: &BlogForm) -> ApiResult<Value> {
        let multipart = blog_form(form, false)?;
        self.client
            .patch(format!("homeData/update/{id}"))
            .multipart(multipart)
            .send_json()
            .await
    }

    /// Flip a post between its live and hidden stage (the admin "delete")
    pub async fn toggle_blog_stage(&self, id: &str) -> ApiResult<()> {
        let options = self.authed()?;
        self.client
            .patch(format!("homeData/blog/{id}"))
            .options(options)
            .json(&json!({}))
            .send()
            .await?;
        Ok(())
    }

    /// Like or unlike a post without touching the global indicator.
    ///
    /// Callers update their view optimistically and revert on error.
    pub async fn toggle_like(&self, blog_id: &str) -> ApiResult<()> {
        let options = self.authed()?.skip_global_loading(true);
        self.client
            .post(format!("like/toggle/{blog_id}"))
            .options(options)
            .json(&json!({}))
            .send()
            .await?;
        Ok(())
    }

    pub async fn add_review(&self, blog_id: &str, rating: u8, review: &str) -> ApiResult<()> {
        let options = self.authed()?;
        self.client
            .post(format!("review/{blog_id}"))
            .options(options)
            .json(&NewReview { rating, review })
            .send()
            .await?;
        Ok(())
    }

    pub async fn edit_review(&self, review_id: &str, review: &str) -> ApiResult<()> {
        let options = self.authed()?;
        self.client
            .patch(format!("review/{review_id}"))
            .options(options)
            .json(&json!({ "review": review }))
            .send()
            .await?;
        Ok(())
    }

    pub async fn delete_review(&self, review_id: &str) -> ApiResult<()> {
        let options = self.authed()?;
        self.client
            .delete(format!("review/{review_id}"))
            .options(options)
            .send()
            .await?;
        Ok(())
    }

    pub async fn add_comment(&self, blog_id: &str, comment: &str) -> ApiResult<()> {
        let options = self.authed()?;
        self.client
            .post(format!("comment/{blog_id}"))
            .options(options)
            .json(&json!({ "comment": comment }))
            .send()
            .await?;
        Ok(())
    }

    pub async fn edit_comment(&self, comment_id: &str, comment: &str) -> ApiResult<()> {
        let options = self.authed()?;
        self.client
            .patch(format!("comment/{comment_id}"))
            .options(options)
            .json(&json!({ "comment": comment }))
            .send()
            .await?;
        Ok(())
    }

    pub async fn delete_comment(&self, comment_id: &str) -> ApiResult<()> {
        let options = self.authed()?;
        self.client
            .delete(format!("comment/{comment_id}"))
            .options(options)
            .send()
            .await?;
        Ok(())
    }
}
