use std::sync::Arc;

use aide::{
	axum::{routing::get, ApiRouter, IntoApiResponse},
	openapi::OpenApi,
};
use axum::{response::IntoResponse, Extension, Json};

use crate::AppState;

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().route("/docs/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(api).into_response()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_serve_docs(pool: Database) {
		let app = app(pool);

		let response = app.get("/docs/api.json").await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["info"]["title"], "Blogicum");
		assert!(body["paths"]["/posts/{post_id}/"]["get"].is_object());
		assert!(body["paths"]["/auth/login/"]["post"].is_object());

		let index = &body["paths"]["/"]["get"]["responses"]["200"];

		assert!(index["content"]["application/json"]["schema"].is_object());
		assert!(body["paths"]["/posts/create/"]["post"]["responses"]["200"].is_object());

		let missing = &body["paths"]["/posts/{post_id}/"]["get"]["responses"]["404"];

		assert!(missing["content"]["application/json"]["schema"].is_object());
	}
}
