use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::application::content_type_for;
use crate::domain::{Document, PDF_CONTENT_TYPE, TEXT_CONTENT_TYPES};

const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub name: String,
    pub content: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            content_type: doc.content_type,
            chunks: None,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

impl DocumentResponse {
    fn with_chunks(mut self, chunks: usize) -> Self {
        self.chunks = Some(chunks);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchDocumentsRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultResponse {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: usize,
    pub content: String,
    pub score: f32,
}

pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let (doc, chunks) = state
        .documents
        .ingest(&request.name, &request.content, request.content_type.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentResponse::from(doc).with_chunks(chunks.len())),
    ))
}

/// Accepts a `file` field holding a PDF or UTF-8 text.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or("upload.txt").to_string();
        let content_type = resolve_content_type(&name, field.content_type()).ok_or_else(|| {
            ApiError::BadRequest(format!("unsupported file type: {name}"))
        })?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let (doc, chunks) = state
            .documents
            .ingest_bytes(&name, &bytes, content_type)
            .await?;

        return Ok((
            StatusCode::CREATED,
            Json(DocumentResponse::from(doc).with_chunks(chunks.len())),
        ));
    }

    Err(ApiError::BadRequest("missing 'file' field".into()))
}

/// Prefers the declared part type, falling back to the file extension.
fn resolve_content_type(file_name: &str, declared: Option<&str>) -> Option<&'static str> {
    let declared = declared
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    declared
        .and_then(|ct| {
            TEXT_CONTENT_TYPES
                .iter()
                .copied()
                .chain(std::iter::once(PDF_CONTENT_TYPE))
                .find(|known| *known == ct)
        })
        .or_else(|| content_type_for(std::path::Path::new(file_name)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let (doc, chunks) = state
        .documents
        .get_with_chunks(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("document {id}")))?;

    Ok(Json(DocumentResponse::from(doc).with_chunks(chunks.len())))
}

pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let docs = state.documents.list().await?;
    Ok(Json(docs.into_iter().map(DocumentResponse::from).collect()))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.documents.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_documents(
    State(state): State<AppState>,
    Json(request): Json<SearchDocumentsRequest>,
) -> Result<Json<Vec<SearchResultResponse>>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()));
    }

    let top_k = request.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let results = state.rag.retrieve_top_k(&request.query, top_k).await?;

    Ok(Json(
        results
            .into_iter()
            .map(|r| SearchResultResponse {
                chunk_id: r.chunk.id,
                document_id: r.chunk.document_id,
                chunk_index: r.chunk.chunk_index,
                content: r.chunk.content,
                score: r.score,
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::infrastructure::AppConfig;
    use crate::test_support::app_state;

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_document() {
        let app = create_router(app_state(AppConfig::default()));

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/documents",
                serde_json::json!({ "name": "faq.txt", "content": "Refunds take five days." }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: DocumentResponse = body_json(resp).await;
        assert_eq!(created.chunks, Some(1));

        let resp = app
            .oneshot(
                Request::get(format!("/api/v1/documents/{}", created.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let fetched: DocumentResponse = body_json(resp).await;
        assert_eq!(fetched.name, "faq.txt");
    }

    #[tokio::test]
    async fn test_create_rejects_unsupported_type() {
        let app = create_router(app_state(AppConfig::default()));

        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/v1/documents",
                serde_json::json!({
                    "name": "scan.pdf",
                    "content": "%PDF",
                    "content_type": "application/pdf"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_multipart_text() {
        let app = create_router(app_state(AppConfig::default()));
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"notes.md\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             # Hours\n\nOpen nine to five.\r\n\
             --{boundary}--\r\n"
        );

        let resp = app
            .oneshot(
                Request::post("/api/v1/documents/upload")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        let doc: DocumentResponse = body_json(resp).await;
        assert_eq!(doc.name, "notes.md");
        assert_eq!(doc.content_type, "text/markdown");
    }

    #[tokio::test]
    async fn test_upload_multipart_pdf() {
        let app = create_router(app_state(AppConfig::default()));
        let boundary = "XBOUNDARY";
        let pdf = include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/two_pages.pdf"
        ));
        let mut body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"faq.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(pdf);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let resp = app
            .oneshot(
                Request::post("/api/v1/documents/upload")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        let doc: DocumentResponse = body_json(resp).await;
        assert_eq!(doc.content_type, "application/pdf");
        assert_eq!(doc.chunks, Some(2));
    }

    #[tokio::test]
    async fn test_delete_unknown_document_is_404() {
        let app = create_router(app_state(AppConfig::default()));

        let resp = app
            .oneshot(
                Request::delete(format!("/api/v1/documents/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_returns_scored_chunks() {
        let state = app_state(AppConfig::default());
        state
            .documents
            .ingest(
                "faq.txt",
                "Refunds take five days.\n\nThe office is in Lisbon.",
                None,
            )
            .await
            .unwrap();
        let app = create_router(state);

        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/v1/documents/search",
                serde_json::json!({ "query": "where is the office", "limit": 1 }),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let results: Vec<SearchResultResponse> = body_json(resp).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains("Lisbon"));
    }

    #[test]
    fn test_resolve_content_type() {
        assert_eq!(
            resolve_content_type("a.bin", Some("text/plain; charset=utf-8")),
            Some("text/plain")
        );
        assert_eq!(
            resolve_content_type("a.csv", Some("application/octet-stream")),
            Some("text/csv")
        );
        assert_eq!(
            resolve_content_type("scan", Some("application/pdf")),
            Some("application/pdf")
        );
        assert_eq!(resolve_content_type("a.docx", Some("application/msword")), None);
    }
}
