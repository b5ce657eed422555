pub mod models;
pub mod registry;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use registry::BookRegistry;

/// Books module: owns the in-memory registry and serves it over HTTP
pub struct BooksModule {
    books: Arc<BookRegistry>,
}

impl BooksModule {
    pub fn new() -> Self {
        Self {
            books: Arc::new(BookRegistry::new()),
        }
    }

    /// Shared handle to the registry backing this module
    pub fn registry(&self) -> Arc<BookRegistry> {
        Arc::clone(&self.books)
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.registry())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let fail = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/FailResponse" }
                }
            }
        });
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });
        let flag_param = |name: &str, description: &str| {
            json!({
                "name": name,
                "in": "query",
                "required": false,
                "description": description,
                "schema": { "type": "string", "enum": ["0", "1"] }
            })
        };
        let payload_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookPayload" }
                }
            }
        });
        let message_only = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/MessageResponse" }
                }
            }
        });

        let collection = json!({
            "get": {
                "summary": "List books",
                "tags": ["Books"],
                "parameters": [
                    {
                        "name": "name",
                        "in": "query",
                        "required": false,
                        "description": "Case-insensitive substring of the book name",
                        "schema": { "type": "string" }
                    },
                    flag_param("reading", "Only books whose reading flag matches"),
                    flag_param("finished", "Only books whose finished flag matches")
                ],
                "responses": {
                    "200": {
                        "description": "Brief projections in insertion order",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/BookListResponse" }
                            }
                        }
                    },
                    "400": merge_description(&fail, "Malformed filter")
                }
            },
            "post": {
                "summary": "Add a book",
                "tags": ["Books"],
                "requestBody": payload_body,
                "responses": {
                    "201": {
                        "description": "Book added",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/BookCreatedResponse" }
                            }
                        }
                    },
                    "400": merge_description(&fail, "Missing name or readPage greater than pageCount")
                }
            }
        });

        let item = json!({
            "get": {
                "summary": "Get a book",
                "tags": ["Books"],
                "parameters": [id_param],
                "responses": {
                    "200": {
                        "description": "Full book record",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/BookDetailResponse" }
                            }
                        }
                    },
                    "404": merge_description(&fail, "Book not found")
                }
            },
            "put": {
                "summary": "Replace a book",
                "tags": ["Books"],
                "parameters": [id_param],
                "requestBody": payload_body,
                "responses": {
                    "200": merge_description(&message_only, "Book updated"),
                    "400": merge_description(&fail, "Missing name or readPage greater than pageCount"),
                    "404": merge_description(&fail, "Id not found")
                }
            },
            "delete": {
                "summary": "Delete a book",
                "tags": ["Books"],
                "parameters": [id_param],
                "responses": {
                    "200": merge_description(&message_only, "Book deleted"),
                    "404": merge_description(&fail, "Id not found")
                }
            }
        });

        Some(json!({
            "paths": {
                "/": collection,
                "/{id}": item
            },
            "components": { "schemas": schemas() }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            books = self.books.len(),
            "books module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        // Records are volatile; whatever is held now is discarded with the process.
        tracing::info!(
            module = self.name(),
            books = self.books.len(),
            "books module stopped"
        );
        Ok(())
    }
}

/// Component schemas referenced by the books paths
fn schemas() -> serde_json::Value {
    let mut schemas = serde_json::Map::new();
    schemas.insert(
        "Book".to_string(),
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" },
                "year": { "type": ["integer", "null"] },
                "author": { "type": ["string", "null"] },
                "summary": { "type": ["string", "null"] },
                "publisher": { "type": ["string", "null"] },
                "pageCount": { "type": "integer", "minimum": 0 },
                "readPage": { "type": "integer", "minimum": 0 },
                "finished": { "type": "boolean" },
                "reading": { "type": "boolean" },
                "insertedAt": { "type": "string", "format": "date-time" },
                "updatedAt": { "type": "string", "format": "date-time" }
            },
            "required": [
                "id", "name", "pageCount", "readPage", "finished",
                "reading", "insertedAt", "updatedAt"
            ]
        }),
    );
    schemas.insert(
        "BookBrief".to_string(),
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" },
                "publisher": { "type": ["string", "null"] }
            },
            "required": ["id", "name"]
        }),
    );
    schemas.insert(
        "BookPayload".to_string(),
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "year": { "type": "integer" },
                "author": { "type": "string" },
                "summary": { "type": "string" },
                "publisher": { "type": "string" },
                "pageCount": { "type": "integer", "minimum": 0 },
                "readPage": { "type": "integer", "minimum": 0 },
                "reading": { "type": "boolean" }
            },
            "required": ["name"]
        }),
    );
    schemas.insert(
        "MessageResponse".to_string(),
        json!({
            "type": "object",
            "properties": {
                "status": { "type": "string", "enum": ["success"] },
                "message": { "type": "string" }
            },
            "required": ["status", "message"]
        }),
    );
    schemas.insert(
        "BookCreatedResponse".to_string(),
        json!({
            "type": "object",
            "properties": {
                "status": { "type": "string", "enum": ["success"] },
                "message": { "type": "string" },
                "data": {
                    "type": "object",
                    "properties": { "bookId": { "type": "string" } },
                    "required": ["bookId"]
                }
            },
            "required": ["status", "data"]
        }),
    );
    schemas.insert(
        "BookListResponse".to_string(),
        json!({
            "type": "object",
            "properties": {
                "status": { "type": "string", "enum": ["success"] },
                "data": {
                    "type": "object",
                    "properties": {
                        "books": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/BookBrief" }
                        }
                    },
                    "required": ["books"]
                }
            },
            "required": ["status", "data"]
        }),
    );
    schemas.insert(
        "BookDetailResponse".to_string(),
        json!({
            "type": "object",
            "properties": {
                "status": { "type": "string", "enum": ["success"] },
                "data": {
                    "type": "object",
                    "properties": {
                        "book": { "$ref": "#/components/schemas/Book" }
                    },
                    "required": ["book"]
                }
            },
            "required": ["status", "data"]
        }),
    );
    serde_json::Value::Object(schemas)
}

fn merge_description(response: &serde_json::Value, description: &str) -> serde_json::Value {
    let mut response = response.clone();
    response["description"] = json!(description);
    response
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_fragment_covers_every_route() {
        let spec = BooksModule::new().openapi().unwrap();
        let root = &spec["paths"]["/"];
        let item = &spec["paths"]["/{id}"];

        assert!(root["get"].is_object());
        assert!(root["post"].is_object());
        assert!(item["get"].is_object());
        assert!(item["put"].is_object());
        assert!(item["delete"].is_object());
        assert_eq!(item["put"]["responses"]["404"]["description"], "Id not found");
    }

    #[test]
    fn registry_handle_is_shared() {
        let module = BooksModule::new();
        module
            .registry()
            .create(models::BookPayload {
                name: Some("Shared".to_string()),
                ..models::BookPayload::default()
            })
            .unwrap();
        assert_eq!(module.registry().len(), 1);
    }
}
