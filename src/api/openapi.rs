use super::handlers::{health, signin, signup};
use utoipa::openapi::{
    ContactBuilder, Info, InfoBuilder, LicenseBuilder, OpenApi, OpenApiBuilder, Tag,
};
use utoipa_axum::{router::OpenApiRouter, routes};

/// The `OpenAPI` document for every route registered in [`api_router`].
#[must_use]
pub fn openapi() -> OpenApi {
    let (_router, doc) = api_router().split_for_parts();
    doc
}

/// Routes that are both served and documented. `/` and the document itself
/// are mounted in `api::app` and stay out of the document.
pub(crate) fn api_router() -> OpenApiRouter {
    let doc = OpenApiBuilder::new()
        .info(info())
        .tags(Some(vec![
            tag("auth", "Account creation and signin"),
            tag("health", "Service and credential store status"),
        ]))
        .build();

    OpenApiRouter::with_openapi(doc)
        .routes(routes!(health::health))
        .routes(routes!(signup::signup))
        .routes(routes!(signin::signin))
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

// Title, version, description, contact and license all come from Cargo.toml.
fn info() -> Info {
    let (name, email) = split_author(first_author(env!("CARGO_PKG_AUTHORS")));
    let contact = (name.is_some() || email.is_some())
        .then(|| ContactBuilder::new().name(name).email(email).build());

    let license = non_empty(env!("CARGO_PKG_LICENSE")).map(|spdx| {
        LicenseBuilder::new()
            .name(spdx)
            .identifier(Some(spdx))
            .build()
    });

    InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(non_empty(env!("CARGO_PKG_DESCRIPTION")))
        .contact(contact)
        .license(license)
        .build()
}

fn first_author(authors: &str) -> &str {
    authors.split(';').next().unwrap_or_default().trim()
}

/// `"Name <email>"` into its parts; either may be missing.
fn split_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, rest)) => (non_empty(name), non_empty(rest.trim_end_matches('>'))),
        None => (non_empty(author), None),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_comes_from_cargo() {
        let doc = openapi();
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(doc.info.version, env!("CARGO_PKG_VERSION"));

        let contact = doc.info.contact.as_ref();
        assert_eq!(
            contact.and_then(|c| c.name.as_deref()),
            Some("Team AssignmentPro")
        );
        assert_eq!(
            contact.and_then(|c| c.email.as_deref()),
            Some("team@assignmentpro.dev")
        );

        assert_eq!(
            doc.info.license.map(|license| license.name),
            Some("BSD-3-Clause".to_string())
        );
    }

    #[test]
    fn documents_auth_and_health() {
        let doc = openapi();
        let tags: Vec<String> = doc
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        assert_eq!(tags, ["auth", "health"]);

        for path in ["/signup", "/signin", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
        assert!(!doc.paths.paths.contains_key("/"));
    }

    #[test]
    fn split_author_variants() {
        assert_eq!(
            split_author("Jane Doe <jane@example.com>"),
            (Some("Jane Doe"), Some("jane@example.com"))
        );
        assert_eq!(split_author("Jane"), (Some("Jane"), None));
        assert_eq!(
            split_author("<jane@example.com>"),
            (None, Some("jane@example.com"))
        );
        assert_eq!(split_author(""), (None, None));
        assert_eq!(first_author("A <a@x.dev>; B <b@x.dev>"), "A <a@x.dev>");
    }
}
