use serde::{Deserialize, Serialize};

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Opaque owner id issued by the identity provider
    pub exp: usize,
}

/// Struct to hold authenticated user details, to be passed as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: String,
}

/// Result of an attach/detach call; `changed` is false for no-ops.
#[derive(Debug, Serialize, Deserialize)]
pub struct MembershipResponse {
    pub changed: bool,
}
