use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::health::handlers as health_handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health_handlers::get_health,
        // Files
        files_handlers::list_files,
        files_handlers::get_file,
        files_handlers::upload_file,
        files_handlers::rename_file,
        files_handlers::delete_file,
    ),
    components(
        schemas(
            files_dtos::FileSummaryDto,
            files_dtos::UploadFileDto,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "files", description = "Video upload and management"),
    ),
    info(
        title = "ODrive",
        version = "v1",
        description = "A REST API for the ODrive video storage service",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_every_route() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.paths.paths.contains_key("/health"));
        assert!(openapi.paths.paths.contains_key("/files"));
        assert!(openapi.paths.paths.contains_key("/files/{id}"));
    }

    #[test]
    fn test_swagger_info_modifier() {
        let mut openapi = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Videos".to_string(),
            version: "2".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut openapi);

        assert_eq!(openapi.info.title, "Videos");
        assert_eq!(openapi.info.version, "2");
        assert_eq!(openapi.info.description.as_deref(), Some("desc"));
    }
}
